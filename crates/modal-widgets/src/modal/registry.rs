#![forbid(unsafe_code)]

//! Named controller factories.
//!
//! A dialog that names a controller gets one instance built after its resolve
//! entries are ready. The factory receives the dialog scope, an instance
//! handle for closing itself, and the resolved values keyed by name.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use modal_runtime::{Locals, Value};

use super::error::ModalError;
use super::instance::{ModalInstance, ModalScope};

/// Arguments passed to a controller factory.
pub struct ControllerContext {
    /// The dialog's view-model scope.
    pub scope: ModalScope,
    /// Handle for closing or dismissing the dialog.
    pub instance: ModalInstance,
    /// Resolved values keyed by their resolve name.
    pub locals: Locals,
}

impl ControllerContext {
    /// A resolved value by name.
    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }
}

type Factory = dyn Fn(ControllerContext) -> Result<Rc<dyn Any>, String>;

/// Registry of controller factories by name.
#[derive(Default)]
pub struct ControllerRegistry {
    factories: RefCell<AHashMap<String, Rc<Factory>>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `name`.
    pub fn register<C, E, F>(&self, name: impl Into<String>, factory: F)
    where
        C: Any,
        E: fmt::Display,
        F: Fn(ControllerContext) -> Result<C, E> + 'static,
    {
        let factory: Rc<Factory> = Rc::new(move |ctx| {
            factory(ctx)
                .map(|c| Rc::new(c) as Rc<dyn Any>)
                .map_err(|e| e.to_string())
        });
        self.factories.borrow_mut().insert(name.into(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.borrow().contains_key(name)
    }

    /// Build the controller registered as `name`.
    pub fn instantiate(
        &self,
        name: &str,
        context: ControllerContext,
    ) -> Result<Rc<dyn Any>, ModalError> {
        let factory = self
            .factories
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| ModalError::UnknownController(name.to_owned()))?;
        factory(context).map_err(|message| ModalError::Controller {
            name: name.to_owned(),
            message,
        })
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.factories.borrow().keys().cloned().collect();
        names.sort();
        f.debug_struct("ControllerRegistry")
            .field("controllers", &names)
            .finish()
    }
}
