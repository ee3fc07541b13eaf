//! Background timed-event scheduling.
//!
//! A [`Scheduler`] owns a set of repeating tasks for one widget. Due-ness
//! bookkeeping runs on a background thread; the thread never touches the
//! widget. Instead it emits [`TimerFired`] messages over an mpsc channel,
//! and the runtime drains that channel between events and invokes the
//! task callbacks on the main thread. Callbacks therefore never run
//! concurrently with event processing, with drawing, or with themselves.

use crate::context::EventContext;
use crate::error::{Error, Result};
use crate::runtime::WidgetId;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Handle for a task within its scheduler. Indices are stable for the
/// scheduler's lifetime; removed tasks leave a tombstone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub usize);

/// Message emitted by the scheduler thread when a task comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    /// The widget whose scheduler fired.
    pub widget: WidgetId,
    /// The task that came due.
    pub task: TaskId,
}

/// Snapshot of a task's bookkeeping, passed to its callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Minimum time between executions.
    pub interval: Duration,
    /// Execution limit; 0 means unbounded.
    pub max_repeats: u32,
    /// Executions so far, counting the one in flight.
    pub repeats_done: u32,
    /// The task's handle.
    pub task: TaskId,
}

type TaskCallback<W> = Box<dyn FnMut(TaskStats, &mut W, &mut EventContext)>;

/// A repeating task: an interval, an optional repeat limit, and the
/// callback to run when due.
pub struct TimerTask<W: ?Sized> {
    /// Minimum time between executions.
    pub interval: Duration,
    /// Execution limit; 0 means unbounded.
    pub max_repeats: u32,
    callback: TaskCallback<W>,
}

impl<W: ?Sized> TimerTask<W> {
    /// Create a task. A `max_repeats` of 0 repeats forever.
    pub fn new(
        interval: Duration,
        max_repeats: u32,
        callback: impl FnMut(TaskStats, &mut W, &mut EventContext) + 'static,
    ) -> Self {
        Self {
            interval,
            max_repeats,
            callback: Box::new(callback),
        }
    }
}

/// Thread-side bookkeeping for one task.
#[derive(Debug, Clone, Copy)]
struct TaskClock {
    interval: Duration,
    max_repeats: u32,
    repeats_done: u32,
    last_run: Option<Instant>,
    active: bool,
}

impl TaskClock {
    fn due(&self, now: Instant) -> bool {
        self.active
            && (self.max_repeats == 0 || self.repeats_done < self.max_repeats)
            && self.last_run.map_or(true, |t| now - t >= self.interval)
    }
}

/// State shared between the scheduler and its background thread.
struct Shared {
    running: AtomicBool,
    clocks: Mutex<Vec<TaskClock>>,
    wake: Condvar,
}

/// A per-widget timed-task scheduler.
///
/// Created idle; [`Scheduler::start`] spawns the clock thread and
/// [`Scheduler::stop`] shuts it down. Callbacks run only through
/// [`Scheduler::fire`], driven by the runtime's channel drain.
pub struct Scheduler<W: ?Sized> {
    resolution: Duration,
    callbacks: Vec<Option<TaskCallback<W>>>,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl<W: ?Sized> Default for Scheduler<W> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RESOLUTION)
    }
}

impl<W: ?Sized> Scheduler<W> {
    /// Wake resolution used by [`Default`].
    pub const DEFAULT_RESOLUTION: Duration = Duration::from_millis(50);

    /// Create an idle scheduler with the given wake resolution: the
    /// longest the clock thread sleeps between due-ness checks, and so
    /// the worst-case extra latency on any task.
    #[must_use]
    pub fn new(resolution: Duration) -> Self {
        Self {
            resolution,
            callbacks: Vec::new(),
            shared: Arc::new(Shared {
                running: AtomicBool::new(false),
                clocks: Mutex::new(Vec::new()),
                wake: Condvar::new(),
            }),
            handle: None,
        }
    }

    /// Register a task, optionally starting it active.
    pub fn add_task(&mut self, task: TimerTask<W>, start_active: bool) -> TaskId {
        let id = TaskId(self.callbacks.len());
        self.callbacks.push(Some(task.callback));
        self.shared
            .clocks
            .lock()
            .expect("timer clock mutex poisoned")
            .push(TaskClock {
                interval: task.interval,
                max_repeats: task.max_repeats,
                repeats_done: 0,
                last_run: None,
                active: start_active,
            });
        id
    }

    fn check_id(&self, id: TaskId) -> Result<()> {
        match self.callbacks.get(id.0) {
            Some(Some(_)) => Ok(()),
            _ => Err(Error::InvalidTask(id)),
        }
    }

    /// Activate or deactivate a task. Activation does not reset its
    /// repeat count.
    pub fn set_active(&mut self, id: TaskId, active: bool) -> Result<()> {
        self.check_id(id)?;
        self.shared
            .clocks
            .lock()
            .expect("timer clock mutex poisoned")[id.0]
            .active = active;
        self.shared.wake.notify_all();
        Ok(())
    }

    /// Flip a task's active state, returning the new state.
    pub fn toggle(&mut self, id: TaskId) -> Result<bool> {
        self.check_id(id)?;
        let mut clocks = self
            .shared
            .clocks
            .lock()
            .expect("timer clock mutex poisoned");
        clocks[id.0].active = !clocks[id.0].active;
        let active = clocks[id.0].active;
        drop(clocks);
        self.shared.wake.notify_all();
        Ok(active)
    }

    /// Current bookkeeping snapshot for a task.
    pub fn task_stats(&self, id: TaskId) -> Result<TaskStats> {
        self.check_id(id)?;
        let clock = self
            .shared
            .clocks
            .lock()
            .expect("timer clock mutex poisoned")[id.0];
        Ok(TaskStats {
            interval: clock.interval,
            max_repeats: clock.max_repeats,
            repeats_done: clock.repeats_done,
            task: id,
        })
    }

    /// Retire a task. Its id becomes invalid; other ids are unaffected.
    pub fn remove_task(&mut self, id: TaskId) -> Result<()> {
        self.check_id(id)?;
        self.callbacks[id.0] = None;
        self.shared
            .clocks
            .lock()
            .expect("timer clock mutex poisoned")[id.0]
            .active = false;
        Ok(())
    }

    /// Number of live (non-retired) tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.iter().filter(|c| c.is_some()).count()
    }

    /// Whether no live task is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the clock thread is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Spawn the clock thread.
    ///
    /// `owner` tags every [`TimerFired`] message so the runtime can find
    /// the widget again; `tx` is the runtime's timer channel. Tasks with
    /// no prior execution are due immediately on the first pass.
    pub fn start(&mut self, owner: WidgetId, tx: Sender<TimerFired>) -> Result<()> {
        if self.is_running() {
            return Err(Error::SchedulerRunning);
        }
        self.shared.running.store(true, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let resolution = self.resolution;
        let handle = thread::Builder::new()
            .name("weft-timer".to_owned())
            .spawn(move || {
                tracing::debug!(widget = owner.0, "timer thread started");
                let mut clocks = shared.clocks.lock().expect("timer clock mutex poisoned");
                while shared.running.load(Ordering::SeqCst) {
                    let now = Instant::now();
                    for (idx, clock) in clocks.iter_mut().enumerate() {
                        if clock.due(now) {
                            clock.repeats_done += 1;
                            clock.last_run = Some(now);
                            if tx
                                .send(TimerFired {
                                    widget: owner,
                                    task: TaskId(idx),
                                })
                                .is_err()
                            {
                                // Receiver gone; the runtime is shutting down.
                                shared.running.store(false, Ordering::SeqCst);
                                return;
                            }
                        }
                    }
                    let (guard, _timeout) = shared
                        .wake
                        .wait_timeout(clocks, resolution)
                        .expect("timer clock mutex poisoned");
                    clocks = guard;
                }
                tracing::debug!(widget = owner.0, "timer thread stopped");
            })?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Stop the clock thread. With `wait` the call joins it; a failed
    /// join aborts the stop with [`Error::SchedulerJoin`].
    pub fn stop(&mut self, wait: bool) -> Result<()> {
        if !self.is_running() && self.handle.is_none() {
            return Err(Error::SchedulerStopped);
        }
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.wake.notify_all();
        if let Some(handle) = self.handle.take() {
            if wait {
                handle.join().map_err(|_| Error::SchedulerJoin)?;
            }
        }
        Ok(())
    }

    /// Run a due task's callback on the calling thread.
    ///
    /// Invoked by the runtime while draining the timer channel. The
    /// stats snapshot already counts the execution in flight.
    pub fn fire(&mut self, id: TaskId, target: &mut W, ctx: &mut EventContext) -> Result<()> {
        let stats = self.task_stats(id)?;
        match self.callbacks.get_mut(id.0) {
            Some(Some(callback)) => {
                callback(stats, target, ctx);
                Ok(())
            }
            _ => Err(Error::InvalidTask(id)),
        }
    }
}

impl<W: ?Sized> Drop for Scheduler<W> {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.wake.notify_all();
    }
}

impl<W: ?Sized> fmt::Debug for Scheduler<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("resolution", &self.resolution)
            .field("tasks", &self.callbacks.len())
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn noop_task(interval_ms: u64, max_repeats: u32) -> TimerTask<()> {
        TimerTask::new(Duration::from_millis(interval_ms), max_repeats, |_, (), _| {})
    }

    fn drain_for(rx: &mpsc::Receiver<TimerFired>, window: Duration) -> Vec<TimerFired> {
        let deadline = Instant::now() + window;
        let mut out = Vec::new();
        while let Some(left) = deadline.checked_duration_since(Instant::now()) {
            match rx.recv_timeout(left) {
                Ok(msg) => out.push(msg),
                Err(_) => break,
            }
        }
        out
    }

    #[test]
    fn test_task_due_immediately_then_respects_interval() {
        let clock = TaskClock {
            interval: Duration::from_millis(100),
            max_repeats: 0,
            repeats_done: 0,
            last_run: None,
            active: true,
        };
        let now = Instant::now();
        assert!(clock.due(now));

        let ran = TaskClock {
            last_run: Some(now),
            ..clock
        };
        assert!(!ran.due(now + Duration::from_millis(50)));
        assert!(ran.due(now + Duration::from_millis(100)));
    }

    #[test]
    fn test_repeat_limit_and_inactive_block_due() {
        let clock = TaskClock {
            interval: Duration::from_millis(1),
            max_repeats: 3,
            repeats_done: 3,
            last_run: None,
            active: true,
        };
        assert!(!clock.due(Instant::now()));

        let inactive = TaskClock {
            repeats_done: 0,
            active: false,
            ..clock
        };
        assert!(!inactive.due(Instant::now()));
    }

    #[test]
    fn test_bounded_task_fires_exactly_max_repeats_times() {
        let mut sched: Scheduler<()> = Scheduler::new(Duration::from_millis(1));
        let id = sched.add_task(noop_task(1, 3), true);

        let (tx, rx) = mpsc::channel();
        sched.start(WidgetId(0), tx).unwrap();
        let fired = drain_for(&rx, Duration::from_millis(200));
        sched.stop(true).unwrap();

        assert_eq!(fired.len(), 3);
        assert!(fired.iter().all(|f| f.task == id && f.widget == WidgetId(0)));
        assert_eq!(sched.task_stats(id).unwrap().repeats_done, 3);
    }

    #[test]
    fn test_double_start_and_double_stop_are_errors() {
        let mut sched: Scheduler<()> = Scheduler::new(Duration::from_millis(5));
        let (tx, _rx) = mpsc::channel();
        sched.start(WidgetId(1), tx.clone()).unwrap();
        assert!(matches!(
            sched.start(WidgetId(1), tx),
            Err(Error::SchedulerRunning)
        ));
        sched.stop(true).unwrap();
        assert!(matches!(sched.stop(true), Err(Error::SchedulerStopped)));
    }

    #[test]
    fn test_fire_runs_callback_with_stats() {
        use std::cell::Cell;
        use std::rc::Rc;

        let seen = Rc::new(Cell::new(0u32));
        let s = Rc::clone(&seen);
        let mut sched: Scheduler<()> = Scheduler::default();
        let id = sched.add_task(
            TimerTask::new(Duration::from_millis(10), 5, move |stats, (), _| {
                s.set(stats.repeats_done);
                assert_eq!(stats.max_repeats, 5);
            }),
            true,
        );

        let mut ctx = EventContext::default();
        sched.fire(id, &mut (), &mut ctx).unwrap();
        // fire() reports the thread-side count, still 0 without the thread.
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn test_removed_task_id_is_invalid() {
        let mut sched: Scheduler<()> = Scheduler::default();
        let id = sched.add_task(noop_task(10, 0), true);
        sched.remove_task(id).unwrap();
        assert!(matches!(sched.task_stats(id), Err(Error::InvalidTask(_))));
        assert!(sched.is_empty());

        let mut ctx = EventContext::default();
        assert!(sched.fire(id, &mut (), &mut ctx).is_err());
    }

    #[test]
    fn test_inactive_task_never_fires() {
        let mut sched: Scheduler<()> = Scheduler::new(Duration::from_millis(1));
        sched.add_task(noop_task(1, 0), false);

        let (tx, rx) = mpsc::channel();
        sched.start(WidgetId(0), tx).unwrap();
        let fired = drain_for(&rx, Duration::from_millis(30));
        sched.stop(true).unwrap();
        assert!(fired.is_empty());
    }
}
