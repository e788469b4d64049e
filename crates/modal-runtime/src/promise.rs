#![forbid(unsafe_code)]

//! Single-assignment result propagation.
//!
//! A [`Deferred`] is the write side: it settles once, with either a value or a
//! rejection. A [`Promise`] is the read side: cheap to clone, awaitable by any
//! number of tasks, and pollable synchronously with [`Promise::try_get`].
//!
//! # Invariants
//!
//! 1. The first call to [`Deferred::settle`] (or `resolve` / `reject`) wins;
//!    every later call returns `false` and has no effect.
//! 2. Every clone of a [`Promise`] observes the same settlement.
//! 3. Dropping an unsettled `Deferred` rejects its promises with the error
//!    type's `From<Canceled>` value.
//!
//! # Example
//!
//! ```
//! use modal_runtime::{ResolveError, deferred};
//!
//! let (tx, rx) = deferred::<u32, ResolveError>();
//! assert!(rx.try_get().is_none());
//! assert!(tx.resolve(7));
//! assert!(!tx.reject(ResolveError::Abandoned));
//! assert_eq!(rx.try_get(), Some(Ok(7)));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot::{self, Canceled};
use futures::future::{FutureExt, Shared};
use futures::task::{LocalSpawn, LocalSpawnExt, SpawnError};

/// Create a connected deferred/promise pair.
pub fn deferred<T: Clone, E: Clone>() -> (Deferred<T, E>, Promise<T, E>) {
    let (tx, rx) = oneshot::channel();
    (
        Deferred {
            tx: RefCell::new(Some(tx)),
        },
        Promise { rx: rx.shared() },
    )
}

/// Write side of a single-assignment result.
pub struct Deferred<T, E> {
    tx: RefCell<Option<oneshot::Sender<Result<T, E>>>>,
}

impl<T, E> Deferred<T, E> {
    /// Settle with a value. Returns `false` if already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settle with a rejection. Returns `false` if already settled.
    pub fn reject(&self, reason: E) -> bool {
        self.settle(Err(reason))
    }

    /// Settle with an outcome. Returns `false` if already settled.
    pub fn settle(&self, outcome: Result<T, E>) -> bool {
        let Some(tx) = self.tx.borrow_mut().take() else {
            return false;
        };
        // Nobody listening is still a settlement.
        let _ = tx.send(outcome);
        true
    }

    /// Whether a settlement has already happened.
    pub fn is_settled(&self) -> bool {
        self.tx.borrow().is_none()
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Read side of a single-assignment result.
pub struct Promise<T, E> {
    rx: Shared<oneshot::Receiver<Result<T, E>>>,
}

impl<T, E> Clone for Promise<T, E>
where
    T: Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T: Clone, E: Clone> Promise<T, E> {
    /// An already-resolved promise.
    pub fn resolved(value: T) -> Self {
        let (tx, rx) = deferred();
        tx.resolve(value);
        rx
    }

    /// An already-rejected promise.
    pub fn rejected(reason: E) -> Self {
        let (tx, rx) = deferred();
        tx.reject(reason);
        rx
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone,
    E: Clone + From<Canceled>,
{
    /// Poll the settlement without blocking.
    ///
    /// Returns `None` while pending.
    pub fn try_get(&self) -> Option<Result<T, E>> {
        self.rx.clone().now_or_never().map(flatten)
    }

    /// Whether the promise has settled (either way).
    pub fn is_settled(&self) -> bool {
        self.try_get().is_some()
    }

    /// Register a continuation that runs on `spawner` once settled.
    pub fn on_settled<S>(
        &self,
        spawner: &S,
        f: impl FnOnce(Result<T, E>) + 'static,
    ) -> Result<(), SpawnError>
    where
        S: LocalSpawn + ?Sized,
        T: 'static,
        E: 'static,
    {
        let promise = self.clone();
        spawner.spawn_local(async move { f(promise.await) })
    }
}

impl<T, E> Future for Promise<T, E>
where
    T: Clone,
    E: Clone + From<Canceled>,
{
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx.poll_unpin(cx).map(flatten)
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").finish_non_exhaustive()
    }
}

fn flatten<T, E: From<Canceled>>(outcome: Result<Result<T, E>, Canceled>) -> Result<T, E> {
    outcome.unwrap_or_else(|canceled| Err(E::from(canceled)))
}
