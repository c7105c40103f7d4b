//! Injectable timers.
//!
//! The controller never sleeps. It hands a [`TimerTask`] to a [`Scheduler`]
//! and the host calls
//! [`FormController::run_due_timers`](crate::FormController::run_due_timers)
//! once tasks become due. Tests drive time with [`ManualScheduler`]; the
//! terminal host uses [`SystemScheduler`].

use std::time::{Duration, Instant};

use crate::alert::AlertId;
use crate::form::Field;

/// Work the controller defers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Perform the native form submission.
    NativeSubmit,
    /// Start fading an alert out.
    FadeAlert(AlertId),
    /// Remove a faded alert.
    RemoveAlert(AlertId),
    /// Stop the shake animation on a field.
    ClearShake(Field),
    /// Reset the password toggle press animation.
    ReleaseToggle,
    /// Focus the first empty field after load.
    InitialFocus,
}

/// Handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Deferred task queue.
pub trait Scheduler {
    /// Time elapsed since the scheduler was created.
    fn now(&self) -> Duration;

    /// Schedules `task` to run after `delay`.
    fn schedule(&mut self, delay: Duration, task: TimerTask) -> TimerId;

    /// Cancels a task. Returns false if it already ran or never existed.
    fn cancel(&mut self, id: TimerId) -> bool;

    /// Removes and returns every due task, earliest first.
    fn take_due(&mut self) -> Vec<TimerTask>;

    /// Time until the next task is due, if any is pending.
    fn next_due_in(&self) -> Option<Duration>;

    /// Pending tasks with their deadlines, earliest first.
    fn pending(&self) -> Vec<(Duration, TimerTask)>;
}

/// Source of the current time for a [`TimerQueue`].
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn elapsed(&self) -> Duration;
}

/// Monotonic wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: Duration,
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now
    }
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    deadline: Duration,
    task: TimerTask,
}

/// Deadline-ordered task queue over any [`Clock`].
#[derive(Debug, Clone, Default)]
pub struct TimerQueue<C> {
    clock: C,
    next_id: u64,
    // sorted by (deadline, id)
    timers: Vec<Timer>,
}

/// Scheduler driven by the wall clock.
pub type SystemScheduler = TimerQueue<SystemClock>;

/// Scheduler driven by [`ManualScheduler::advance`].
pub type ManualScheduler = TimerQueue<ManualClock>;

impl<C: Clock> TimerQueue<C> {
    /// Creates an empty queue over `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            next_id: 0,
            timers: Vec::new(),
        }
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Whether a task equal to `task` is pending.
    pub fn is_pending(&self, task: TimerTask) -> bool {
        self.timers.iter().any(|t| t.task == task)
    }
}

impl SystemScheduler {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::with_clock(ManualClock::default())
    }

    /// Moves the clock forward. Tasks are not run; call `take_due`.
    pub fn advance(&mut self, by: Duration) {
        self.clock.now += by;
    }
}

impl<C: Clock> Scheduler for TimerQueue<C> {
    fn now(&self) -> Duration {
        self.clock.elapsed()
    }

    fn schedule(&mut self, delay: Duration, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.clock.elapsed() + delay;

        let at = self
            .timers
            .partition_point(|t| (t.deadline, t.id) <= (deadline, id));
        self.timers.insert(at, Timer { id, deadline, task });

        tracing::trace!(?task, ?delay, "scheduled timer");
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        match self.timers.iter().position(|t| t.id == id) {
            Some(index) => {
                self.timers.remove(index);
                true
            }
            None => false,
        }
    }

    fn take_due(&mut self) -> Vec<TimerTask> {
        let now = self.clock.elapsed();
        let due = self.timers.partition_point(|t| t.deadline <= now);
        self.timers.drain(..due).map(|t| t.task).collect()
    }

    fn next_due_in(&self) -> Option<Duration> {
        let now = self.clock.elapsed();
        self.timers
            .first()
            .map(|t| t.deadline.saturating_sub(now))
    }

    fn pending(&self) -> Vec<(Duration, TimerTask)> {
        self.timers.iter().map(|t| (t.deadline, t.task)).collect()
    }
}
