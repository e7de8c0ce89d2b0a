//! Repeating and one-shot timers on top of the event queue.

use crate::context::Context;
use crate::scheduler::EventId;
use crate::time::TimeValue;
use parking_lot::Mutex;
use std::sync::Arc;

/// Passed to timer callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerTick {
    pub playback_time: f64,
    /// Zero-based index of this tick since the last `start`.
    pub count: u64,
}

type TimerCallback = Box<dyn FnMut(&mut Context, TimerTick) + Send>;

#[derive(Debug)]
struct TimerState {
    period: TimeValue,
    repeat: bool,
    count: u64,
    sched_id: EventId,
    running: bool,
}

#[derive(Clone)]
struct Timer {
    state: Arc<Mutex<TimerState>>,
    callback: Arc<Mutex<TimerCallback>>,
}

impl Timer {
    fn new(period: TimeValue, repeat: bool, callback: TimerCallback) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState {
                period,
                repeat,
                count: 0,
                sched_id: EventId::NONE,
                running: false,
            })),
            callback: Arc::new(Mutex::new(callback)),
        }
    }

    fn start(&self, ctx: &mut Context, time: f64) {
        {
            let mut state = self.state.lock();
            if state.running {
                return;
            }
            state.running = true;
            state.count = 0;
        }
        self.schedule(ctx, time);
    }

    fn schedule(&self, ctx: &mut Context, time: f64) {
        let period = {
            let state = self.state.lock();
            ctx.to_seconds(&state.period)
        };
        // never spin faster than one sample
        let period = period.max(1.0 / ctx.sample_rate());

        let timer = self.clone();
        let id = ctx.sched(time + period, move |ctx, t| timer.fire(ctx, t));
        self.state.lock().sched_id = id;
    }

    fn fire(&self, ctx: &mut Context, time: f64) {
        let count = {
            let mut state = self.state.lock();
            if !state.running {
                return;
            }
            state.sched_id = EventId::NONE;
            let count = state.count;
            state.count += 1;
            count
        };

        {
            let mut callback = self.callback.lock();
            (*callback)(
                ctx,
                TimerTick {
                    playback_time: time,
                    count,
                },
            );
        }

        let again = {
            let mut state = self.state.lock();
            if !state.repeat {
                state.running = false;
            }
            state.running && state.sched_id.is_none()
        };
        if again {
            self.schedule(ctx, time);
        }
    }

    fn stop(&self, ctx: &mut Context) {
        let id = {
            let mut state = self.state.lock();
            state.running = false;
            std::mem::take(&mut state.sched_id)
        };
        ctx.unsched(id);
    }

    fn is_running(&self) -> bool {
        self.state.lock().running
    }

    fn count(&self) -> u64 {
        self.state.lock().count
    }
}

/// Calls back every `interval` until stopped.
///
/// ```ignore
/// let metro = Interval::new("4n", |ctx, tick| println!("beat {}", tick.count));
/// metro.start(&mut ctx, 0.0);
/// ```
#[derive(Clone)]
pub struct Interval {
    timer: Timer,
}

impl Interval {
    pub fn new<F>(interval: impl Into<TimeValue>, callback: F) -> Self
    where
        F: FnMut(&mut Context, TimerTick) + Send + 'static,
    {
        Self {
            timer: Timer::new(interval.into(), true, Box::new(callback)),
        }
    }

    /// First tick lands one interval after `time`.
    pub fn start(&self, ctx: &mut Context, time: f64) {
        self.timer.start(ctx, time);
    }

    pub fn stop(&self, ctx: &mut Context) {
        self.timer.stop(ctx);
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Ticks fired since the last start.
    pub fn count(&self) -> u64 {
        self.timer.count()
    }
}

/// Calls back once, `duration` after start.
#[derive(Clone)]
pub struct Timeout {
    timer: Timer,
}

impl Timeout {
    pub fn new<F>(duration: impl Into<TimeValue>, callback: F) -> Self
    where
        F: FnMut(&mut Context, TimerTick) + Send + 'static,
    {
        Self {
            timer: Timer::new(duration.into(), false, Box::new(callback)),
        }
    }

    pub fn start(&self, ctx: &mut Context, time: f64) {
        self.timer.start(ctx, time);
    }

    pub fn stop(&self, ctx: &mut Context) {
        self.timer.stop(ctx);
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }
}
