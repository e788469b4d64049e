#![forbid(unsafe_code)]

//! Caller-facing handles to one dialog.

use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use modal_runtime::{Promise, Scope, Value};

use super::element::ModalWindow;
use super::error::{ModalError, ModalRejection};
use super::lifecycle::{LifecyclePhase, ModalEntry, ModalHandle, ModalId};
use super::stack::{ModalStack, WeakModalStack};

/// Handle returned by [`ModalService::open`](super::ModalService::open).
#[derive(Clone)]
pub struct ModalInstance {
    entry: ModalHandle,
    stack: ModalStack,
}

impl ModalInstance {
    pub(crate) fn new(entry: ModalHandle, stack: ModalStack) -> Self {
        Self { entry, stack }
    }

    pub fn id(&self) -> ModalId {
        self.entry.id()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.entry.phase()
    }

    /// The underlying stack handle.
    pub fn handle(&self) -> &ModalHandle {
        &self.entry
    }

    pub fn window(&self) -> Option<Rc<ModalWindow>> {
        self.entry.window()
    }

    /// Close with a result value. Returns `false` if already settled.
    pub fn close(&self, result: impl Into<Value>) -> bool {
        self.stack.close(&self.entry, result)
    }

    /// Dismiss with a reason. Returns `false` if already settled.
    pub fn dismiss(&self, reason: impl Into<Value>) -> bool {
        self.stack.dismiss(&self.entry, reason)
    }

    pub fn result(&self) -> Promise<Value, ModalRejection> {
        self.entry.result()
    }

    pub fn opened(&self) -> Promise<(), ModalError> {
        self.entry.opened()
    }
}

impl fmt::Debug for ModalInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModalInstance").field(&self.entry).finish()
    }
}

/// A dialog's view-model scope, with `close` and `dismiss` bound to it.
///
/// Holds the dialog and the stack weakly; once either is gone the bound
/// operations do nothing.
#[derive(Clone)]
pub struct ModalScope {
    scope: Scope,
    entry: Weak<ModalEntry>,
    stack: WeakModalStack,
}

impl ModalScope {
    pub(crate) fn new(scope: Scope, entry: &ModalHandle, stack: &ModalStack) -> Self {
        Self {
            scope,
            entry: Rc::downgrade(entry),
            stack: stack.downgrade(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Close the owning dialog. Returns `false` if it had already settled or
    /// no longer exists.
    pub fn close(&self, result: impl Into<Value>) -> bool {
        match (self.entry.upgrade(), self.stack.upgrade()) {
            (Some(entry), Some(stack)) => stack.close(&entry, result),
            _ => false,
        }
    }

    /// Dismiss the owning dialog. Returns `false` if it had already settled or
    /// no longer exists.
    pub fn dismiss(&self, reason: impl Into<Value>) -> bool {
        match (self.entry.upgrade(), self.stack.upgrade()) {
            (Some(entry), Some(stack)) => stack.dismiss(&entry, reason),
            _ => false,
        }
    }
}

impl Deref for ModalScope {
    type Target = Scope;

    fn deref(&self) -> &Scope {
        &self.scope
    }
}

impl fmt::Debug for ModalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalScope")
            .field("scope", &self.scope)
            .field("alive", &(self.entry.strong_count() > 0))
            .finish()
    }
}
