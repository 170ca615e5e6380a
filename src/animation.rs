// Frame-driven animation scheduling
//
// Every animation is an `AnimationTask` with a start time and a duration. One
// scheduler advances all live tasks per frame tick, reports their progress,
// and drops the ones that reached 1.0. Nothing here loops or sleeps; the host
// asks for another frame only while the scheduler is busy.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of elapsed time for the scheduler
pub trait Clock {
    /// Time elapsed since some fixed origin
    fn now(&self) -> Duration;
}

/// Wall clock measured from construction
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
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// The two per-connection effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// Progressive draw-on of the curve
    Reveal,
    /// Dot travelling along the curve
    Marker,
}

/// Identifies a task: one of each kind per connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub connection: usize,
    pub kind: AnimationKind,
}

/// A one-shot progression from 0 to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTask {
    pub key: TaskKey,
    pub start: Duration,
    pub duration: Duration,
}

impl AnimationTask {
    /// Progress at `now`, clamped to [0, 1]
    ///
    /// A zero duration is complete immediately.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

/// Progress of one task for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    pub key: TaskKey,
    pub progress: f64,
    /// True on the last sample a task will ever produce
    pub finished: bool,
}

/// Advances all live tasks once per frame
#[derive(Debug, Clone, Default)]
pub struct AnimationScheduler {
    tasks: Vec<AnimationTask>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a task, replacing any live task with the same key
    pub fn start(&mut self, key: TaskKey, now: Duration, duration: Duration) {
        self.cancel(key);
        self.tasks.push(AnimationTask {
            key,
            start: now,
            duration,
        });
    }

    pub fn cancel(&mut self, key: TaskKey) {
        self.tasks.retain(|t| t.key != key);
    }

    /// Stop every task; removing any connection goes through a full rebuild
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn is_running(&self, key: TaskKey) -> bool {
        self.tasks.iter().any(|t| t.key == key)
    }

    /// True when no further frames are needed
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advance every task to `now`
    ///
    /// Returns one sample per live task in start order. Tasks that reach 1.0
    /// report it once with `finished` set and are then removed.
    pub fn tick(&mut self, now: Duration) -> Vec<FrameSample> {
        let samples: Vec<FrameSample> = self
            .tasks
            .iter()
            .map(|t| {
                let progress = t.progress(now);
                FrameSample {
                    key: t.key,
                    progress,
                    finished: progress >= 1.0,
                }
            })
            .collect();

        self.tasks.retain(|t| t.progress(now) < 1.0);
        samples
    }
}
