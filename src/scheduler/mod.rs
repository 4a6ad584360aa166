//! Scheduler - deferred callbacks and per-frame callbacks on one tick.
//!
//! Two queues, both drained by whoever owns the clock:
//!
//! - a time-ordered timer queue (`set_timeout` / `set_interval`), drained by
//!   [`Scheduler::advance`]
//! - a per-frame callback set (`request_frame`), drained by
//!   [`Scheduler::run_frame`]
//!
//! Nothing runs on its own thread. The host calls `advance` and `run_frame`
//! from its tick, so callbacks always run on the tick that owns the UI.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use spark_bridge::scheduler::Scheduler;
//!
//! let scheduler = Scheduler::new();
//! let fired = Rc::new(Cell::new(0));
//!
//! let f = fired.clone();
//! scheduler.set_interval(100, move || f.set(f.get() + 1));
//!
//! scheduler.advance(250);
//! assert_eq!(fired.get(), 2);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

/// Handle to a scheduled timer or frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task:{}", self.0)
    }
}

/// "Run once before the next frame" primitive.
///
/// A callback requested while a frame is running runs on the following
/// frame, which is what lets a per-frame loop re-arm itself.
pub trait FrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> TaskId;

    fn cancel_frame(&self, id: TaskId);
}

enum TimerCallback {
    Once(Box<dyn FnOnce()>),
    Repeat(Rc<dyn Fn()>),
}

struct Timer {
    id: TaskId,
    interval: Option<u64>,
    callback: TimerCallback,
}

#[derive(Default)]
struct SchedulerInner {
    now: u64,
    next_id: u64,
    /// Keyed by (due, id); equal due times run in scheduling order.
    timers: BTreeMap<(u64, u64), Timer>,
    frames: IndexMap<u64, Box<dyn FnOnce()>>,
    frame_count: u64,
}

impl SchedulerInner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared handle to a scheduler. Cloning shares the queues.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds advanced so far.
    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame_count
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.inner.borrow().frames.len()
    }

    /// Due time of the earliest timer.
    pub fn next_due(&self) -> Option<u64> {
        self.inner.borrow().timers.keys().next().map(|(due, _)| *due)
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Run `callback` once, `delay_ms` from now.
    pub fn set_timeout(&self, delay_ms: u64, callback: impl FnOnce() + 'static) -> TaskId {
        self.schedule(delay_ms, None, TimerCallback::Once(Box::new(callback)))
    }

    /// Run `callback` every `interval_ms` until cleared. Intervals shorter
    /// than 1ms are raised to 1ms.
    pub fn set_interval(&self, interval_ms: u64, callback: impl Fn() + 'static) -> TaskId {
        let interval = interval_ms.max(1);
        self.schedule(interval, Some(interval), TimerCallback::Repeat(Rc::new(callback)))
    }

    fn schedule(&self, delay: u64, interval: Option<u64>, callback: TimerCallback) -> TaskId {
        let mut inner = self.inner.borrow_mut();
        let id = TaskId(inner.next_id());
        let due = inner.now.saturating_add(delay);
        inner.timers.insert((due, id.0), Timer { id, interval, callback });
        id
    }

    /// Cancel a timeout or interval. Unknown ids are ignored.
    pub fn clear(&self, id: TaskId) {
        self.inner.borrow_mut().timers.retain(|_, timer| timer.id != id);
    }

    /// Move the clock forward, running every timer that falls due in order.
    /// Returns the number of callbacks run.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now_ms().saturating_add(ms);
        let mut ran = 0;

        loop {
            let callback = {
                let mut inner = self.inner.borrow_mut();
                let Some(entry) = inner.timers.first_entry() else { break };
                let (due, _) = *entry.key();
                if due > target {
                    break;
                }
                let timer = entry.remove();
                inner.now = due;

                // Intervals are re-queued before they run, so clearing one
                // from its own callback sticks. An interval whose next due
                // time would pass the end of the clock runs one last time.
                match (timer.interval, timer.callback) {
                    (Some(interval), TimerCallback::Repeat(f)) => {
                        match due.checked_add(interval) {
                            Some(next) => {
                                inner.timers.insert(
                                    (next, timer.id.0),
                                    Timer {
                                        id: timer.id,
                                        interval: Some(interval),
                                        callback: TimerCallback::Repeat(Rc::clone(&f)),
                                    },
                                );
                            }
                            None => trace!(id = timer.id.0, "interval past end of clock dropped"),
                        }
                        TimerCallback::Repeat(f)
                    }
                    (_, callback) => callback,
                }
            };

            match callback {
                TimerCallback::Once(f) => f(),
                TimerCallback::Repeat(f) => f(),
            }
            ran += 1;
        }

        self.inner.borrow_mut().now = target;
        ran
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Run every frame callback requested before this call, in request
    /// order. Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let boundary = {
            let mut inner = self.inner.borrow_mut();
            inner.frame_count += 1;
            inner.next_id
        };
        let mut ran = 0;

        loop {
            let callback = {
                let mut inner = self.inner.borrow_mut();
                let ready = matches!(inner.frames.first(), Some((id, _)) if *id <= boundary);
                if ready {
                    inner.frames.shift_remove_index(0).map(|(_, f)| f)
                } else {
                    None
                }
            };
            let Some(callback) = callback else { break };
            callback();
            ran += 1;
        }

        trace!(ran, "frame");
        ran
    }
}

impl FrameScheduler for Scheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> TaskId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        inner.frames.insert(id, callback);
        TaskId(id)
    }

    fn cancel_frame(&self, id: TaskId) {
        self.inner.borrow_mut().frames.shift_remove(&id.0);
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("now", &inner.now)
            .field("timers", &inner.timers.len())
            .field("frames", &inner.frames.len())
            .finish()
    }
}
