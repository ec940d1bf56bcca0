//! Trailing-edge debounce on the tokio runtime.

use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Delays a call until a quiet period has passed since the last request.
///
/// Each [`call`](Self::call) cancels the previously scheduled one, so only
/// the last call in a burst runs. Dropping the debouncer cancels whatever is
/// pending; nothing fires after teardown.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use tableview_lib::debounce::Debouncer;
///
/// let mut debouncer = Debouncer::new(Duration::from_millis(500));
/// debouncer.call(|| println!("first"));   // cancelled
/// debouncer.call(|| println!("second"));  // runs 500ms from now
/// ```
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Returns the quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `f`, replacing any pending call.
    ///
    /// Outside a tokio runtime there is no timer to wait on, so `f` runs
    /// immediately.
    pub fn call<F>(&mut self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let Ok(handle) = Handle::try_current() else {
            debug!("no runtime available, running debounced call immediately");
            f();
            return;
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let delay = self.delay;
        let task = handle.spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    debug!("debounced call firing after {:?}", delay);
                    f();
                }
            }
        });

        self.pending = Some(Pending { token, task });
    }

    /// Cancels the pending call, if any.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            if !pending.task.is_finished() {
                debug!("cancelling pending debounced call");
            }
            pending.token.cancel();
        }
    }

    /// Returns `true` if a call is scheduled and has not run yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.task.is_finished() && !p.token.is_cancelled())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
