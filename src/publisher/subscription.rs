//! Handles to publishers driven on tokio tasks

use std::future::Future;
use tokio::task::JoinHandle;

/// Handle to a publisher being driven on a tokio task
///
/// Dropping the handle detaches the task; call [`Subscription::cancel`] to
/// stop it.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Spawns `driver` on the current tokio runtime.
    pub(crate) fn spawn<F>(driver: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(driver),
        }
    }

    /// Stops delivery and drops the upstream publisher.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Returns true once the publisher terminated or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits until the publisher terminates or is cancelled.
    ///
    /// A panic raised by a consumer callback is resumed here.
    pub async fn join(self) {
        if let Err(err) = self.handle.await {
            if err.is_panic() {
                std::panic::resume_unwind(err.into_panic());
            }
        }
    }
}
