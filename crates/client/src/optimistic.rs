//! Optimistic mutations.
//!
//! A [`Mutation`] is a command object: it captures what it needs to undo
//! itself, applies a predicted state change, and later either commits the
//! authoritative result or rolls back. [`run`] drives one invocation:
//!
//! 1. under one write lock, `prepare` (capture a snapshot, or suppress) and
//!    `apply` the prediction;
//! 2. release the lock and await the remote call;
//! 3. `commit` on success, `rollback` with the captured snapshot on failure.
//!
//! Every invocation owns its snapshot, so two in-flight mutations on the
//! same state never restore each other's target. The lock is never held
//! across the remote call.

use std::future::Future;

use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A state change that is applied before the remote side effect confirms it.
pub trait Mutation {
    /// State the mutation operates on.
    type State;
    /// What `rollback` needs to undo this invocation.
    type Snapshot;
    /// Result of the remote call.
    type Output;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Capture the rollback snapshot. `None` suppresses the mutation: nothing
    /// is applied and the remote call is never issued.
    fn prepare(&self, state: &Self::State) -> Option<Self::Snapshot>;

    /// Apply the predicted state.
    fn apply(&self, state: &mut Self::State);

    /// Replace the prediction with the authoritative result.
    fn commit(&self, state: &mut Self::State, output: &Self::Output);

    /// Undo this invocation's prediction.
    fn rollback(&self, state: &mut Self::State, snapshot: Self::Snapshot);
}

/// Result of a mutation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The remote call succeeded and its result was committed.
    Committed(T),
    /// `prepare` declined; no state changed and no call was made.
    Suppressed,
}

impl<T> Outcome<T> {
    /// Whether the mutation was suppressed.
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }

    /// The committed output, if any.
    #[must_use]
    pub fn committed(self) -> Option<T> {
        match self {
            Self::Committed(output) => Some(output),
            Self::Suppressed => None,
        }
    }
}

/// Run `mutation` against `state`, reconciling with the result of `remote`.
///
/// `remote` is only polled when the mutation is not suppressed, so a lazily
/// built request future is never sent for a suppressed mutation.
///
/// # Errors
///
/// Returns the remote call's error after rolling back.
pub async fn run<M, F, E>(
    state: &RwLock<M::State>,
    mutation: &M,
    remote: F,
) -> Result<Outcome<M::Output>, E>
where
    M: Mutation,
    F: Future<Output = Result<M::Output, E>>,
{
    let snapshot = {
        let mut guard = state.write().await;
        let Some(snapshot) = mutation.prepare(&guard) else {
            debug!(mutation = mutation.name(), "Optimistic update suppressed");
            return Ok(Outcome::Suppressed);
        };
        mutation.apply(&mut guard);
        snapshot
    };
    debug!(mutation = mutation.name(), "Optimistic update applied");

    match remote.await {
        Ok(output) => {
            mutation.commit(&mut *state.write().await, &output);
            debug!(mutation = mutation.name(), "Optimistic update committed");
            Ok(Outcome::Committed(output))
        }
        Err(e) => {
            mutation.rollback(&mut *state.write().await, snapshot);
            warn!(mutation = mutation.name(), "Optimistic update rolled back");
            Err(e)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::oneshot;

    use super::*;

    /// Appends a value; rollback removes exactly that value.
    struct Push(u32);

    impl Mutation for Push {
        type State = Vec<u32>;
        type Snapshot = ();
        type Output = &'static str;

        fn name(&self) -> &'static str {
            "push"
        }

        fn prepare(&self, state: &Vec<u32>) -> Option<()> {
            (!state.contains(&self.0)).then_some(())
        }

        fn apply(&self, state: &mut Vec<u32>) {
            state.push(self.0);
        }

        fn commit(&self, state: &mut Vec<u32>, _output: &&'static str) {
            state.push(self.0 * 100);
        }

        fn rollback(&self, state: &mut Vec<u32>, (): ()) {
            state.retain(|v| *v != self.0);
        }
    }

    #[tokio::test]
    async fn test_commit() {
        let state = RwLock::new(vec![]);
        let outcome = run(&state, &Push(1), async { Ok::<_, ()>("ok") }).await;

        assert_eq!(outcome, Ok(Outcome::Committed("ok")));
        assert_eq!(*state.read().await, vec![1, 100]);
    }

    #[tokio::test]
    async fn test_rollback() {
        let state = RwLock::new(vec![7]);
        let outcome = run(&state, &Push(1), async { Err::<&str, _>("boom") }).await;

        assert_eq!(outcome, Err("boom"));
        assert_eq!(*state.read().await, vec![7]);
    }

    #[tokio::test]
    async fn test_suppressed_never_polls_remote() {
        let state = RwLock::new(vec![1]);
        let polled = std::sync::atomic::AtomicBool::new(false);

        let outcome = run(&state, &Push(1), async {
            polled.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok::<_, ()>("ok")
        })
        .await;

        assert!(outcome.unwrap().is_suppressed());
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(*state.read().await, vec![1]);
    }

    #[tokio::test]
    async fn test_prediction_visible_while_in_flight() {
        let state = Arc::new(RwLock::new(vec![]));
        let (tx, rx) = oneshot::channel::<Result<&'static str, ()>>();

        let task = tokio::spawn({
            let state = Arc::clone(&state);
            async move { run(&state, &Push(5), async { rx.await.unwrap() }).await }
        });

        // Wait until the prediction lands.
        while state.read().await.is_empty() {
            tokio::task::yield_now().await;
        }
        assert_eq!(*state.read().await, vec![5]);

        tx.send(Err(())).unwrap();
        assert_eq!(task.await.unwrap(), Err(()));
        assert!(state.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_interleaved_rollbacks_keep_other_entries() {
        let state = Arc::new(RwLock::new(vec![]));
        let (tx_a, rx_a) = oneshot::channel::<Result<&'static str, ()>>();
        let (tx_b, rx_b) = oneshot::channel::<Result<&'static str, ()>>();

        let a = tokio::spawn({
            let state = Arc::clone(&state);
            async move { run(&state, &Push(1), async { rx_a.await.unwrap() }).await }
        });
        let b = tokio::spawn({
            let state = Arc::clone(&state);
            async move { run(&state, &Push(2), async { rx_b.await.unwrap() }).await }
        });

        while state.read().await.len() < 2 {
            tokio::task::yield_now().await;
        }

        tx_a.send(Err(())).unwrap();
        a.await.unwrap().unwrap_err();
        assert_eq!(*state.read().await, vec![2]);

        tx_b.send(Ok("ok")).unwrap();
        b.await.unwrap().unwrap();
        assert_eq!(*state.read().await, vec![2, 200]);
    }
}
