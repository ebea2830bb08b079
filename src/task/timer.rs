use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Shared state between a timer's owner and its sleeper thread.
struct TimerState {
  cancelled: Mutex<bool>,
  cond: Condvar,
}

/// A one-shot, cancellable timer backing the expiration scheduler.
///
/// Arming spawns a thread that sleeps on a condvar until the deadline, then
/// runs the task once. `disarm` flips the cancel flag and signals the
/// condvar, so a pending timer is released promptly rather than sleeping out
/// its deadline. The scheduler re-arms by having the task itself run a fresh
/// expiration check, which replaces (and thereby disarms) this timer.
pub(crate) struct CleanupTimer {
  state: Arc<TimerState>,
}

impl CleanupTimer {
  /// Arms a timer that runs `task` once after `delay`, unless disarmed
  /// first. The sleeper thread is detached; it exits after the task returns
  /// or as soon as it observes the cancel flag.
  pub(crate) fn arm(delay: Duration, task: impl FnOnce() + Send + 'static) -> Self {
    let state = Arc::new(TimerState {
      cancelled: Mutex::new(false),
      cond: Condvar::new(),
    });

    let thread_state = state.clone();
    thread::spawn(move || {
      let deadline = Instant::now() + delay;
      let mut cancelled = thread_state.cancelled.lock();
      loop {
        if *cancelled {
          return;
        }
        if thread_state
          .cond
          .wait_until(&mut cancelled, deadline)
          .timed_out()
        {
          break;
        }
        // Spurious wakeup or a signal that raced the deadline; re-check.
      }
      if *cancelled {
        return;
      }
      drop(cancelled);
      task();
    });

    Self { state }
  }

  /// Cancels the timer. Idempotent; safe to call whether or not the task
  /// has already started.
  pub(crate) fn disarm(&self) {
    *self.state.cancelled.lock() = true;
    self.state.cond.notify_all();
  }
}

impl Drop for CleanupTimer {
  fn drop(&mut self) {
    // A replaced or abandoned timer must not fire later.
    self.disarm();
  }
}
