#![forbid(unsafe_code)]

//! Hierarchical view-model scopes.
//!
//! A [`Scope`] holds named values for one piece of UI. Lookups fall back to
//! the parent chain, so a dialog scope created as a child of a page scope sees
//! the page's values without copying them. Destroying a scope destroys its
//! descendants first, runs its destroy listeners, and detaches it from its
//! parent.
//!
//! # Invariants
//!
//! 1. Parents are held weakly and children are held strongly, so dropping the
//!    last external handle to a root drops the whole tree.
//! 2. `destroy()` is idempotent; listeners run exactly once.
//! 3. A destroyed scope rejects writes and reads only its own values.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use serde_json::Value;

static SCOPE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    fn next() -> Self {
        Self(SCOPE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

type DestroyListener = Box<dyn FnOnce()>;

struct ScopeInner {
    id: ScopeId,
    parent: Option<Weak<ScopeInner>>,
    values: RefCell<AHashMap<String, Value>>,
    children: RefCell<Vec<Rc<ScopeInner>>>,
    listeners: RefCell<Vec<DestroyListener>>,
    destroyed: Cell<bool>,
}

/// Shared handle to a view-model scope.
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

impl Scope {
    /// Create a root scope.
    pub fn root() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Weak<ScopeInner>>) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                id: ScopeId::next(),
                parent,
                values: RefCell::new(AHashMap::new()),
                children: RefCell::new(Vec::new()),
                listeners: RefCell::new(Vec::new()),
                destroyed: Cell::new(false),
            }),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    /// Create a child scope that inherits lookups from `self`.
    ///
    /// A child of a destroyed scope is created already detached.
    pub fn child(&self) -> Scope {
        let child = Self::with_parent(Some(Rc::downgrade(&self.inner)));
        if !self.is_destroyed() {
            self.inner
                .children
                .borrow_mut()
                .push(Rc::clone(&child.inner));
        }
        child
    }

    /// The parent scope, if any and still alive.
    pub fn parent(&self) -> Option<Scope> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Scope { inner })
    }

    /// Number of live children.
    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    /// Bind `name` to `value` on this scope.
    ///
    /// Returns `false` (and does nothing) if the scope is destroyed.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.inner
            .values
            .borrow_mut()
            .insert(name.into(), value.into());
        true
    }

    /// Look up `name` on this scope, then on its ancestors.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.inner.values.borrow().get(name) {
            return Some(value.clone());
        }
        if self.is_destroyed() {
            return None;
        }
        self.parent().and_then(|parent| parent.get(name))
    }

    /// Look up `name` on this scope only.
    pub fn get_own(&self, name: &str) -> Option<Value> {
        self.inner.values.borrow().get(name).cloned()
    }

    /// Register a listener run when the scope is destroyed.
    ///
    /// On an already-destroyed scope the listener runs immediately.
    pub fn on_destroy(&self, listener: impl FnOnce() + 'static) {
        if self.is_destroyed() {
            listener();
            return;
        }
        self.inner.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Destroy this scope and all of its descendants.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }

        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in children {
            Scope { inner: child }.destroy();
        }

        let listeners = std::mem::take(&mut *self.inner.listeners.borrow_mut());
        for listener in listeners {
            listener();
        }

        if let Some(parent) = self.inner.parent.as_ref().and_then(Weak::upgrade) {
            parent
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(c, &self.inner));
        }
        tracing::trace!(scope = self.inner.id.0, "scope destroyed");
    }

    /// Whether two handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.inner.id)
            .field("destroyed", &self.is_destroyed())
            .field("children", &self.child_count())
            .finish()
    }
}
