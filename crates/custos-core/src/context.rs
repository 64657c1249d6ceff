//! Per-thread identity context.
//!
//! Request handlers and task runners store the acting user here once, at the
//! start of their work. Interception points read it back to attribute the
//! events they record. The slot is never cleared: the next request or task on
//! the same thread overwrites it.

use crate::actor::ActorIdentity;
use std::cell::RefCell;

thread_local! {
    static CURRENT_ACTOR: RefCell<Option<ActorIdentity>> = const { RefCell::new(None) };
}

/// Stores the identity of the actor for the calling thread.
///
/// Passing `None` records that the current work runs without a known actor.
pub fn set_current_actor(actor: Option<ActorIdentity>) {
    CURRENT_ACTOR.with(|slot| *slot.borrow_mut() = actor);
}

/// Returns the identity stored for the calling thread, or `None` if nothing
/// was stored yet.
#[must_use]
pub fn current_actor() -> Option<ActorIdentity> {
    CURRENT_ACTOR.with(|slot| slot.borrow().clone())
}

/// Stores `actor` for the calling thread and runs `f`.
///
/// The identity stays in place after `f` returns, like any other
/// [`set_current_actor`] call.
///
/// # Examples
///
/// ```rust
/// use custos_core::{context, ActorIdentity};
///
/// let name = context::with_actor(Some(ActorIdentity::new("worker")), || {
///     context::current_actor().map(|a| a.username)
/// });
/// assert_eq!(name.as_deref(), Some("worker"));
/// ```
pub fn with_actor<F, R>(actor: Option<ActorIdentity>, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_current_actor(actor);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_unset_context_is_none() {
        // Fresh thread so earlier tests on this thread cannot leak in.
        let actor = thread::spawn(current_actor).join().unwrap();
        assert_eq!(actor, None);
    }

    #[test]
    fn test_set_and_get() {
        set_current_actor(Some(ActorIdentity::new("alice")));
        assert_eq!(current_actor().unwrap().username, "alice");

        set_current_actor(Some(ActorIdentity::new("bob").staff()));
        let actor = current_actor().unwrap();
        assert_eq!(actor.username, "bob");
        assert!(actor.is_staff);
    }

    #[test]
    fn test_set_none_overwrites() {
        set_current_actor(Some(ActorIdentity::new("alice")));
        set_current_actor(None);
        assert_eq!(current_actor(), None);
    }

    #[test]
    fn test_no_cross_thread_visibility() {
        set_current_actor(Some(ActorIdentity::new("main")));

        let seen = thread::spawn(|| {
            set_current_actor(Some(ActorIdentity::new("other")));
            current_actor()
        })
        .join()
        .unwrap();

        assert_eq!(seen.unwrap().username, "other");
        assert_eq!(current_actor().unwrap().username, "main");
    }

    #[test]
    fn test_with_actor_persists() {
        with_actor(Some(ActorIdentity::new("job")), || ());
        assert_eq!(current_actor().unwrap().username, "job");
    }
}
