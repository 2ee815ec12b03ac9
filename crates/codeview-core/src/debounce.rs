//! Replace-on-reschedule deferred tasks.
//!
//! Rapid edit or resize bursts schedule a full content-size recomputation. Each trigger class
//! holds at most one pending task; scheduling again supersedes the previous one (its handle
//! becomes stale), so only the most recently scheduled recomputation per trigger ever runs.
//! Time is passed in explicitly, so the host drives the clock from its frame loop.

use std::time::{Duration, Instant};

/// Default settle period before a deferred recomputation runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Class of event that scheduled a recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecomputeTrigger {
    /// Document edits.
    Edit,
    /// Viewport resizes.
    Resize,
}

impl RecomputeTrigger {
    const ALL: [RecomputeTrigger; 2] = [RecomputeTrigger::Edit, RecomputeTrigger::Resize];

    fn index(self) -> usize {
        match self {
            RecomputeTrigger::Edit => 0,
            RecomputeTrigger::Resize => 1,
        }
    }
}

/// Handle to a scheduled task. A handle is live only while it is the latest one scheduled for
/// its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    /// Trigger class.
    pub trigger: RecomputeTrigger,
    /// Monotonic generation; newer schedules get larger values.
    pub generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    generation: u64,
    deadline: Instant,
}

/// Per-trigger debouncer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    next_generation: u64,
    pending: [Option<Pending>; 2],
}

impl Debouncer {
    /// Create a debouncer with the given settle period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_generation: 0,
            pending: [None; 2],
        }
    }

    /// Settle period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a task for `trigger`, superseding any pending one.
    pub fn schedule(&mut self, trigger: RecomputeTrigger, now: Instant) -> TaskHandle {
        self.next_generation += 1;
        let generation = self.next_generation;
        let slot = &mut self.pending[trigger.index()];
        if slot.is_some() {
            tracing::trace!(?trigger, generation, "superseding pending recomputation");
        }
        *slot = Some(Pending {
            generation,
            deadline: now + self.delay,
        });
        TaskHandle {
            trigger,
            generation,
        }
    }

    /// Cancel `handle`. Returns `false` if it was already superseded, cancelled or run.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let slot = &mut self.pending[handle.trigger.index()];
        if slot.is_some_and(|p| p.generation == handle.generation) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Returns `true` if `handle` is still the live task for its trigger.
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending[handle.trigger.index()].is_some_and(|p| p.generation == handle.generation)
    }

    /// Returns `true` if any task is pending.
    pub fn has_pending(&self) -> bool {
        self.pending.iter().any(Option::is_some)
    }

    /// Take every task whose deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Vec<TaskHandle> {
        let mut due = Vec::new();
        for trigger in RecomputeTrigger::ALL {
            let slot = &mut self.pending[trigger.index()];
            if let Some(pending) = *slot
                && pending.deadline <= now
            {
                *slot = None;
                due.push(TaskHandle {
                    trigger,
                    generation: pending.generation,
                });
            }
        }
        due
    }

    /// Earliest pending deadline, for hosts that arm a real timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().flatten().map(|p| p.deadline).min()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
