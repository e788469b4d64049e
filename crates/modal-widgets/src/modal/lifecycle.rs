#![forbid(unsafe_code)]

//! Per-dialog state and the resolve-then-open pipeline.
//!
//! A dialog moves through these phases:
//!
//! ```text
//! Pending -> Resolving -> Ready -> Open -> Closing -> Destroyed
//!                 |          |
//!                 +----------+--> Failed      (template, resolve, or controller error)
//!                 +----------+--> Destroyed   (closed before it opened)
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Result future | Opened future |
//! |---------|---------------|---------------|
//! | Template or resolve entry fails | `Failed(err)` | `err` |
//! | Controller missing or fails | `Failed(err)` | `err` |
//! | Closed or dismissed while resolving | as settled by the caller | `ClosedBeforeOpen` |

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{self, FutureExt};
use modal_runtime::{
    Deferred, Injector, Locals, Promise, Scope, TemplateCache, TemplateFuture, Value, deferred,
};

use super::element::ModalWindow;
use super::error::{ModalError, ModalRejection};
use super::instance::{ModalInstance, ModalScope};
use super::options::{ResolvedOptions, TemplateRef};
use super::ordered::StackEntry;
use super::registry::{ControllerContext, ControllerRegistry};
use super::stack::ModalStack;

/// Global counter for unique modal IDs.
static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalId(u64);

impl ModalId {
    pub(crate) fn next() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Where a dialog is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    /// Created; resolution not started yet.
    Pending,
    /// Waiting for the template and resolve entries.
    Resolving,
    /// Scope, controller, and window built; about to join the stack.
    Ready,
    /// On the stack.
    Open,
    /// Off the stack; leave transition running.
    Closing,
    /// Torn down.
    Destroyed,
    /// Resolution or controller construction failed.
    Failed,
}

/// Everything built for a dialog once resolution succeeds.
pub(crate) struct ModalView {
    pub(crate) scope: ModalScope,
    pub(crate) window: Rc<ModalWindow>,
    pub(crate) controller: Option<Rc<dyn Any>>,
}

/// One dialog's shared state.
pub struct ModalEntry {
    id: ModalId,
    options: ResolvedOptions,
    result_tx: Deferred<Value, ModalRejection>,
    result_rx: Promise<Value, ModalRejection>,
    opened_tx: Deferred<(), ModalError>,
    opened_rx: Promise<(), ModalError>,
    phase: Cell<LifecyclePhase>,
    view: RefCell<Option<ModalView>>,
}

/// Shared handle to a dialog. Compared by identity.
pub type ModalHandle = Rc<ModalEntry>;

impl ModalEntry {
    pub(crate) fn new(options: ResolvedOptions) -> ModalHandle {
        let (result_tx, result_rx) = deferred();
        let (opened_tx, opened_rx) = deferred();
        Rc::new(Self {
            id: ModalId::next(),
            options,
            result_tx,
            result_rx,
            opened_tx,
            opened_rx,
            phase: Cell::new(LifecyclePhase::Pending),
            view: RefCell::new(None),
        })
    }

    pub fn id(&self) -> ModalId {
        self.id
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase.get()
    }

    /// Settles with the close value, the dismiss reason, or the open failure.
    pub fn result(&self) -> Promise<Value, ModalRejection> {
        self.result_rx.clone()
    }

    /// Settles once the window's enter transition has finished.
    pub fn opened(&self) -> Promise<(), ModalError> {
        self.opened_rx.clone()
    }

    /// Whether the result has been settled.
    pub fn is_settled(&self) -> bool {
        self.result_tx.is_settled()
    }

    /// The window element, once built.
    pub fn window(&self) -> Option<Rc<ModalWindow>> {
        self.view.borrow().as_ref().map(|v| Rc::clone(&v.window))
    }

    /// The dialog's view-model scope, once built.
    pub fn scope(&self) -> Option<Scope> {
        self.view.borrow().as_ref().map(|v| v.scope.scope().clone())
    }

    /// The controller instance, if one was built and is a `C`.
    pub fn controller<C: 'static>(&self) -> Option<Rc<C>> {
        let controller = self.view.borrow().as_ref()?.controller.clone()?;
        controller.downcast::<C>().ok()
    }

    pub(crate) fn settle(&self, outcome: Result<Value, ModalRejection>) -> bool {
        self.result_tx.settle(outcome)
    }

    pub(crate) fn set_phase(&self, phase: LifecyclePhase) {
        let previous = self.phase.replace(phase);
        tracing::trace!(modal_id = self.id.0, ?previous, ?phase, "modal phase");
    }

    pub(crate) fn mark_opened(&self) {
        self.opened_tx.resolve(());
    }

    pub(crate) fn fail(&self, err: ModalError) {
        tracing::warn!(modal_id = self.id.0, error = %err, "modal failed to open");
        self.set_phase(LifecyclePhase::Failed);
        self.result_tx.reject(ModalRejection::Failed(err.clone()));
        self.opened_tx.reject(err);
    }

    /// The dialog left the stack before its window finished attaching.
    pub(crate) fn cancel_opened(&self) {
        self.opened_tx.reject(ModalError::ClosedBeforeOpen);
    }

    fn abandon_open(&self) {
        tracing::debug!(modal_id = self.id.0, "modal closed before it opened");
        self.set_phase(LifecyclePhase::Destroyed);
        self.opened_tx.reject(ModalError::ClosedBeforeOpen);
    }

    pub(crate) fn install_view(&self, view: ModalView) {
        *self.view.borrow_mut() = Some(view);
    }

    pub(crate) fn take_view(&self) -> Option<ModalView> {
        self.view.borrow_mut().take()
    }
}

impl StackEntry for ModalEntry {
    fn wants_backdrop(&self) -> bool {
        self.options.backdrop.is_shown()
    }
}

impl fmt::Debug for ModalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalEntry")
            .field("id", &self.id)
            .field("phase", &self.phase.get())
            .field("backdrop", &self.options.backdrop)
            .field("settled", &self.is_settled())
            .finish_non_exhaustive()
    }
}

/// Collaborators the pipeline needs.
pub(crate) struct OpenContext {
    pub(crate) stack: ModalStack,
    pub(crate) injector: Rc<Injector>,
    pub(crate) templates: TemplateCache,
    pub(crate) controllers: Rc<ControllerRegistry>,
    pub(crate) root_scope: Scope,
}

/// Resolve content and locals, build the view, and push onto the stack.
pub(crate) async fn resolve_and_open(ctx: OpenContext, entry: ModalHandle) {
    entry.set_phase(LifecyclePhase::Resolving);
    let options = entry.options();

    let content: TemplateFuture = match &options.template {
        TemplateRef::Inline(markup) => future::ready(Ok(Rc::clone(markup))).boxed_local(),
        TemplateRef::Url(url) => ctx.templates.get(url),
    };
    let values = future::try_join_all(
        options
            .resolve
            .iter()
            .map(|(_, provider)| ctx.injector.invoke(provider, None)),
    );

    let (content, values) = match future::try_join(content, values).await {
        Ok(resolved) => resolved,
        Err(err) => {
            entry.fail(err.into());
            return;
        }
    };
    if entry.is_settled() {
        entry.abandon_open();
        return;
    }

    let parent = options.scope.as_ref().unwrap_or(&ctx.root_scope);
    let scope = ModalScope::new(parent.child(), &entry, &ctx.stack);

    let controller = match &options.controller {
        Some(name) => {
            let locals: Locals = options
                .resolve
                .iter()
                .map(|(name, _)| name.clone())
                .zip(values)
                .collect();
            let context = ControllerContext {
                scope: scope.clone(),
                instance: ModalInstance::new(Rc::clone(&entry), ctx.stack.clone()),
                locals,
            };
            match ctx.controllers.instantiate(name, context) {
                Ok(controller) => Some(controller),
                Err(err) => {
                    scope.scope().destroy();
                    entry.fail(err);
                    return;
                }
            }
        }
        None => None,
    };
    // The controller may have closed the dialog while it was being built.
    if entry.is_settled() {
        scope.scope().destroy();
        entry.abandon_open();
        return;
    }

    let window = Rc::new(ModalWindow::new(
        entry.id(),
        content,
        options.window_class.clone(),
        options.window_template_url.clone(),
    ));
    entry.install_view(ModalView {
        scope,
        window,
        controller,
    });
    entry.set_phase(LifecyclePhase::Ready);
    ctx.stack.open(&entry);
}
