//! Actor identity propagation into deferred work.
//!
//! Jobs run on worker threads that never saw the request which scheduled
//! them. [`ActorTask`] carries the scheduling actor along and restores it into
//! the identity context of whichever thread executes the job, so file and
//! lifecycle events recorded by the job are attributed correctly.

use custos_core::{context, ActorIdentity};
use std::thread;
use tracing::trace;

/// A job bundled with the identity of the actor that scheduled it.
#[derive(Debug, Clone)]
pub struct ActorTask<F> {
    user_details: Option<ActorIdentity>,
    job: F,
}

impl<F, R> ActorTask<F>
where
    F: FnOnce() -> R,
{
    /// Bundles `job` with an explicit actor. `None` runs the job without an
    /// actor, clearing whatever the executing thread held before.
    pub const fn new(user_details: Option<ActorIdentity>, job: F) -> Self {
        Self { user_details, job }
    }

    /// Bundles `job` with the calling thread's current actor.
    pub fn from_current(job: F) -> Self {
        Self::new(context::current_actor(), job)
    }

    /// Returns the actor the job runs as.
    #[must_use]
    pub const fn user_details(&self) -> Option<&ActorIdentity> {
        self.user_details.as_ref()
    }

    /// Restores the actor on the calling thread and runs the job.
    pub fn call(self) -> R {
        trace!(
            username = ?self.user_details.as_ref().map(|a| &a.username),
            "Restoring task actor"
        );
        context::with_actor(self.user_details, self.job)
    }
}

/// Runs `job` on a new thread as `actor`.
pub fn spawn_with_actor<F, R>(actor: Option<ActorIdentity>, job: F) -> thread::JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let task = ActorTask::new(actor, job);
    thread::spawn(move || task.call())
}

/// Runs `job` on the tokio blocking pool as `actor`.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_blocking_with_actor<F, R>(
    actor: Option<ActorIdentity>,
    job: F,
) -> tokio::task::JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let task = ActorTask::new(actor, job);
    tokio::task::spawn_blocking(move || task.call())
}
