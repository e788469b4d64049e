#![forbid(unsafe_code)]

//! The `open` entry point.
//!
//! [`ModalService::open`] validates options synchronously, then schedules
//! resolution on a single-threaded executor and returns a [`ModalInstance`]
//! immediately. The dialog joins the stack once its template and resolve
//! entries are ready, so stacking order follows resolution order rather than
//! call order.

use std::fmt;
use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};
use modal_runtime::{Injector, Scope, TemplateCache, Value};
use tracing::Instrument;

use super::error::ModalError;
use super::instance::ModalInstance;
use super::lifecycle::{self, ModalEntry, OpenContext};
use super::options::ModalOptions;
use super::registry::ControllerRegistry;
use super::stack::ModalStack;

/// Opens dialogs onto a [`ModalStack`].
pub struct ModalService {
    stack: ModalStack,
    templates: TemplateCache,
    spawner: Rc<dyn LocalSpawn>,
    injector: Rc<Injector>,
    controllers: Rc<ControllerRegistry>,
    root_scope: Scope,
}

impl ModalService {
    pub fn new(stack: ModalStack, templates: TemplateCache, spawner: Rc<dyn LocalSpawn>) -> Self {
        Self {
            stack,
            templates,
            spawner,
            injector: Rc::new(Injector::new()),
            controllers: Rc::new(ControllerRegistry::new()),
            root_scope: Scope::root(),
        }
    }

    /// Use `injector` for resolve entries.
    #[must_use]
    pub fn with_injector(mut self, injector: Rc<Injector>) -> Self {
        self.injector = injector;
        self
    }

    /// Use `controllers` for named controllers.
    #[must_use]
    pub fn with_controllers(mut self, controllers: Rc<ControllerRegistry>) -> Self {
        self.controllers = controllers;
        self
    }

    /// Parent scope for dialogs that do not supply one.
    #[must_use]
    pub fn with_root_scope(mut self, scope: Scope) -> Self {
        self.root_scope = scope;
        self
    }

    pub fn stack(&self) -> &ModalStack {
        &self.stack
    }

    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }

    pub fn injector(&self) -> &Rc<Injector> {
        &self.injector
    }

    pub fn controllers(&self) -> &Rc<ControllerRegistry> {
        &self.controllers
    }

    pub fn root_scope(&self) -> &Scope {
        &self.root_scope
    }

    /// Start opening a dialog.
    ///
    /// Fails synchronously with [`ModalError::MissingTemplate`] when `options`
    /// name no content, or [`ModalError::Spawn`] when the executor is gone.
    /// Every other failure arrives through the instance's futures.
    pub fn open(&self, options: ModalOptions) -> Result<ModalInstance, ModalError> {
        let options = options.resolve_with(self.stack.config())?;
        let entry = ModalEntry::new(options);
        let id = entry.id().id();
        tracing::debug!(
            modal_id = id,
            backdrop = ?entry.options().backdrop,
            keyboard = entry.options().keyboard,
            resolve = entry.options().resolve.len(),
            "modal requested"
        );

        let ctx = OpenContext {
            stack: self.stack.clone(),
            injector: Rc::clone(&self.injector),
            templates: self.templates.clone(),
            controllers: Rc::clone(&self.controllers),
            root_scope: self.root_scope.clone(),
        };
        let task = lifecycle::resolve_and_open(ctx, Rc::clone(&entry))
            .instrument(tracing::debug_span!("modal_resolve", modal_id = id));
        self.spawner.spawn_local(task).map_err(|err| {
            tracing::warn!(modal_id = id, error = %err, "could not schedule modal");
            ModalError::Spawn(err.to_string())
        })?;

        Ok(ModalInstance::new(entry, self.stack.clone()))
    }

    /// Dismiss every open dialog, top first.
    pub fn dismiss_all(&self, reason: impl Into<Value>) -> usize {
        self.stack.dismiss_all(reason)
    }
}

impl fmt::Debug for ModalService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalService")
            .field("stack", &self.stack)
            .field("templates", &self.templates)
            .field("controllers", &self.controllers)
            .finish_non_exhaustive()
    }
}
