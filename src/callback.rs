//! Where completion callbacks run.
//!
//! Requests complete on whichever runtime worker drove them. The callback
//! variants of the [`Courier`](crate::Courier) API hand the user's callback
//! to a [`CallbackExecutor`], which decides the context it runs in:
//!
//! - [`InlineExecutor`] runs it immediately on the completing task.
//! - [`QueueExecutor`] posts it to a [`CallbackQueue`] drained by one
//!   designated task or thread (a UI loop, for instance).

use std::fmt;
use tokio::sync::mpsc;

/// A completion ready to run.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Runs completion callbacks in a chosen execution context.
pub trait CallbackExecutor: Send + Sync + fmt::Debug {
    fn execute(&self, callback: Callback);
}

/// Runs callbacks on the task that completed the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl CallbackExecutor for InlineExecutor {
    fn execute(&self, callback: Callback) {
        callback();
    }
}

/// Sending half of a [`CallbackQueue`].
#[derive(Clone)]
pub struct QueueExecutor {
    sender: mpsc::UnboundedSender<Callback>,
}

impl fmt::Debug for QueueExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueExecutor")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl CallbackExecutor for QueueExecutor {
    fn execute(&self, callback: Callback) {
        if self.sender.send(callback).is_err() {
            tracing::warn!("Callback queue was dropped; discarding completion");
        }
    }
}

/// A single designated context for completion callbacks.
///
/// Callbacks run in the order they were posted, on whichever task calls
/// [`run_next`](Self::run_next), [`run_pending`](Self::run_pending) or
/// [`run`](Self::run).
///
/// # Example
///
/// ```ignore
/// let (executor, mut queue) = CallbackQueue::channel();
/// let courier = Courier::builder("https://api.example.com/")
///     .callback_executor(Arc::new(executor))
///     .build();
///
/// courier.get_with::<User, _>("users/me", &[], Query::new(), |user, error| {
///     // runs inside queue.run_next()
/// });
/// queue.run_next().await;
/// ```
pub struct CallbackQueue {
    receiver: mpsc::UnboundedReceiver<Callback>,
}

impl fmt::Debug for CallbackQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackQueue").finish_non_exhaustive()
    }
}

impl CallbackQueue {
    /// Creates a queue and the executor that feeds it.
    #[must_use]
    pub fn channel() -> (QueueExecutor, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (QueueExecutor { sender }, Self { receiver })
    }

    /// Waits for the next callback and runs it.
    ///
    /// Returns `false` once every [`QueueExecutor`] has been dropped and the
    /// queue is empty.
    pub async fn run_next(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Runs every callback already queued without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(callback) = self.receiver.try_recv() {
            callback();
            ran += 1;
        }
        ran
    }

    /// Runs callbacks until every executor is dropped.
    pub async fn run(mut self) {
        while self.run_next().await {}
    }
}
