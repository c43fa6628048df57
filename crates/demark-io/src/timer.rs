//! `setTimeout` scheduling for [`Debouncer`](demark_control::Debouncer).

use std::time::Duration;

use demark_control::Scheduler;
use gloo_timers::callback::Timeout;

/// Schedules debounced calls on the browser's timer queue.
///
/// The handle is a [`Timeout`], which clears the timer when dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    type Handle = Timeout;

    fn schedule(&self, wait: Duration, task: Box<dyn FnOnce()>) -> Timeout {
        let millis = u32::try_from(wait.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, task)
    }
}
