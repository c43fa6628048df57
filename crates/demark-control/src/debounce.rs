//! Trailing-edge debouncing over a pluggable timer.
//!
//! A [`Debouncer`] collapses bursts of calls into one execution that
//! runs `wait` after the last call, with that call's arguments. The
//! timer is supplied by a [`Scheduler`]; in the browser that is a
//! `setTimeout` wrapper, in tests a virtual clock.
//!
//! Each debouncer owns its own pending timer, so two debouncers never
//! cancel each other.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Runs a task once after a delay.
pub trait Scheduler {
    /// Keeps the scheduled task alive. Dropping it before the task has
    /// run must cancel the task.
    type Handle;

    fn schedule(&self, wait: Duration, task: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Wraps a callback so only the latest of a burst of calls runs.
pub struct Debouncer<S: Scheduler, A> {
    scheduler: S,
    wait: Duration,
    callback: Rc<dyn Fn(A)>,
    pending: RefCell<Option<S::Handle>>,
}

impl<S: Scheduler, A: 'static> Debouncer<S, A> {
    pub fn new(scheduler: S, wait: Duration, callback: impl Fn(A) + 'static) -> Self {
        Self {
            scheduler,
            wait,
            callback: Rc::new(callback),
            pending: RefCell::new(None),
        }
    }

    #[must_use]
    pub const fn wait(&self) -> Duration {
        self.wait
    }

    /// Cancel any pending run and schedule a new one with `args`.
    pub fn call(&self, args: A) {
        // Drop the previous handle first so its timer is cleared before
        // the replacement is armed.
        drop(self.pending.borrow_mut().take());

        let callback = Rc::clone(&self.callback);
        let handle = self
            .scheduler
            .schedule(self.wait, Box::new(move || callback(args)));
        *self.pending.borrow_mut() = Some(handle);
    }
}
