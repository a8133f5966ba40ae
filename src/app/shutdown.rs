//! Cancellation token for the control loop.
//!
//! The token is cloned into whatever delivers the termination request
//! (the signal handler thread in `main`, a test thread) and passed by
//! reference into [`ControlLoop::run`](super::control_loop::ControlLoop::run).
//! The loop checks it at the top of every cycle and races it against the
//! inter-cycle timer, so shutdown latency is bounded by the wake-up of the
//! reactor rather than by the cycle interval.
//!
//! ```text
//!  signal thread ──request()──▶ AtomicBool + Signal ──▶ sleep() returns Cancelled
//! ```

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// How an interruptible wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The full interval elapsed.
    Elapsed,
    /// Cancellation was requested before or during the wait.
    Cancelled,
}

struct Inner {
    requested: AtomicBool,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

/// Shared, cloneable cancellation request.
#[derive(Clone)]
pub struct ShutdownToken {
    inner: Arc<Inner>,
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ShutdownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownToken")
            .field("requested", &self.is_requested())
            .finish()
    }
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                requested: AtomicBool::new(false),
                wake: Signal::new(),
            }),
        }
    }

    /// Request cancellation.  Safe to call from any thread, any number of
    /// times; only the first call has an effect.
    pub fn request(&self) {
        if !self.inner.requested.swap(true, Ordering::AcqRel) {
            self.inner.wake.signal(());
        }
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::Acquire)
    }

    /// Wait for `period` unless cancellation arrives first.
    pub async fn sleep(&self, period: Duration) -> Wake {
        if self.is_requested() {
            return Wake::Cancelled;
        }

        let cancelled = async {
            self.inner.wake.wait().await;
            Wake::Cancelled
        };
        let elapsed = async {
            async_io_mini::Timer::after(period).await;
            Wake::Elapsed
        };

        // `or` polls the cancellation branch first, so a request that lands
        // together with the timer deadline still wins.
        futures_lite::future::or(cancelled, elapsed).await
    }

    /// Blocking form of [`sleep`](Self::sleep) for synchronous callers.
    pub fn sleep_blocking(&self, period: Duration) -> Wake {
        futures_lite::future::block_on(self.sleep(period))
    }
}
