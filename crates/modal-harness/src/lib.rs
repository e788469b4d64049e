#![forbid(unsafe_code)]

//! Test harness for the modal stack.
//!
//! - [`RecordingHost`]: a [`ModalHost`] that keeps a transcript of every
//!   attach, detach, marker, and focus call.
//! - [`ModalFixture`]: a service wired to a local executor, in-memory
//!   templates, and either immediate or manually completed transitions.
//! - [`gate`]: a resolve entry whose completion the test controls.
//! - [`strategies`]: proptest strategies for option values.
//!
//! # Example
//!
//! ```
//! use modal_harness::ModalFixture;
//! use modal_widgets::modal::ModalOptions;
//!
//! let mut fx = ModalFixture::new();
//! let dialog = fx.open(ModalOptions::new().template("<p>x</p>"));
//! fx.run();
//! assert_eq!(fx.stack().len(), 1);
//! assert!(fx.press_escape());
//! assert!(dialog.result().try_get().is_some());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::executor::{LocalPool, LocalSpawner};
use modal_core::{Event, HitRegion, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use modal_runtime::{
    Deferred, ImmediateTransitions, Injectable, ManualTransitions, ResolveError, StaticTemplates,
    TemplateCache, TransitionSignal, Value, deferred,
};
use modal_widgets::modal::{
    ModalBackdrop, ModalHost, ModalId, ModalInstance, ModalOptions, ModalService, ModalStack,
    ModalStackConfig, ModalWindow,
};

/// One effect observed by a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    AttachWindow { id: ModalId, index: usize },
    DetachWindow { id: ModalId },
    AttachBackdrop { index: usize },
    DetachBackdrop,
    OpenClass { class: String, present: bool },
    Focus { id: ModalId },
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttachWindow { id, index } => write!(f, "attach window #{} @{index}", id.id()),
            Self::DetachWindow { id } => write!(f, "detach window #{}", id.id()),
            Self::AttachBackdrop { index } => write!(f, "attach backdrop @{index}"),
            Self::DetachBackdrop => f.write_str("detach backdrop"),
            Self::OpenClass { class, present } => write!(f, "{class}={present}"),
            Self::Focus { id } => write!(f, "focus #{}", id.id()),
        }
    }
}

/// Host that records every call and mirrors the attached elements.
#[derive(Default)]
pub struct RecordingHost {
    events: RefCell<Vec<HostEvent>>,
    windows: RefCell<Vec<Rc<ModalWindow>>>,
    backdrop: RefCell<Option<Rc<ModalBackdrop>>>,
    open_class: RefCell<Option<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every effect so far, oldest first.
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    /// Drain the transcript.
    pub fn take_events(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Effects rendered as one line each.
    pub fn transcript(&self) -> Vec<String> {
        self.events.borrow().iter().map(ToString::to_string).collect()
    }

    /// Ids of attached windows, bottom first.
    pub fn attached_windows(&self) -> Vec<ModalId> {
        self.windows.borrow().iter().map(|w| w.id()).collect()
    }

    pub fn backdrop(&self) -> Option<Rc<ModalBackdrop>> {
        self.backdrop.borrow().clone()
    }

    /// Whether `class` is currently set on the container.
    pub fn has_open_class(&self, class: &str) -> bool {
        self.open_class.borrow().as_deref() == Some(class)
    }

    fn record(&self, event: HostEvent) {
        tracing::trace!(%event, "host effect");
        self.events.borrow_mut().push(event);
    }
}

impl ModalHost for RecordingHost {
    fn attach_window(&self, window: &Rc<ModalWindow>) {
        self.windows.borrow_mut().push(Rc::clone(window));
        self.record(HostEvent::AttachWindow {
            id: window.id(),
            index: window.index(),
        });
    }

    fn detach_window(&self, window: &Rc<ModalWindow>) {
        self.windows
            .borrow_mut()
            .retain(|w| !Rc::ptr_eq(w, window));
        self.record(HostEvent::DetachWindow { id: window.id() });
    }

    fn attach_backdrop(&self, backdrop: &Rc<ModalBackdrop>) {
        *self.backdrop.borrow_mut() = Some(Rc::clone(backdrop));
        self.record(HostEvent::AttachBackdrop {
            index: backdrop.index(),
        });
    }

    fn detach_backdrop(&self, _backdrop: &Rc<ModalBackdrop>) {
        *self.backdrop.borrow_mut() = None;
        self.record(HostEvent::DetachBackdrop);
    }

    fn set_open_class(&self, class: &str, present: bool) {
        *self.open_class.borrow_mut() = present.then(|| class.to_owned());
        self.record(HostEvent::OpenClass {
            class: class.to_owned(),
            present,
        });
    }

    fn focus_window(&self, window: &Rc<ModalWindow>) {
        self.record(HostEvent::Focus { id: window.id() });
    }
}

impl fmt::Debug for RecordingHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingHost")
            .field("events", &self.events.borrow().len())
            .field("windows", &self.attached_windows())
            .finish_non_exhaustive()
    }
}

/// How the fixture completes enter/leave transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionMode {
    /// Transitions finish synchronously.
    #[default]
    Immediate,
    /// Transitions wait for [`ModalFixture::finish_transitions`].
    Manual,
}

/// Builder for [`ModalFixture`].
#[derive(Debug, Default)]
pub struct FixtureBuilder {
    config: ModalStackConfig,
    transitions: TransitionMode,
    templates: Vec<(String, String)>,
}

impl FixtureBuilder {
    #[must_use]
    pub fn config(mut self, config: ModalStackConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn transitions(mut self, mode: TransitionMode) -> Self {
        self.transitions = mode;
        self
    }

    /// Make `content` available under `url`.
    #[must_use]
    pub fn template(mut self, url: impl Into<String>, content: impl Into<String>) -> Self {
        self.templates.push((url.into(), content.into()));
        self
    }

    pub fn build(self) -> ModalFixture {
        let pool = LocalPool::new();
        let host = Rc::new(RecordingHost::new());
        let manual = Rc::new(ManualTransitions::new());
        let transitions: Rc<dyn TransitionSignal> = match self.transitions {
            TransitionMode::Immediate => Rc::new(ImmediateTransitions),
            TransitionMode::Manual => Rc::clone(&manual) as Rc<dyn TransitionSignal>,
        };

        let templates = Rc::new(StaticTemplates::new());
        for (url, content) in self.templates {
            templates.insert(url, content);
        }

        let stack = ModalStack::new(Rc::clone(&host) as Rc<dyn ModalHost>, transitions, self.config);
        let service = ModalService::new(
            stack,
            TemplateCache::new(Rc::clone(&templates) as Rc<dyn modal_runtime::TemplateSource>),
            Rc::new(pool.spawner()),
        );

        ModalFixture {
            pool,
            host,
            manual,
            templates,
            service,
        }
    }
}

/// A modal service wired for deterministic tests.
pub struct ModalFixture {
    pool: LocalPool,
    host: Rc<RecordingHost>,
    manual: Rc<ManualTransitions>,
    templates: Rc<StaticTemplates>,
    service: ModalService,
}

impl Default for ModalFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalFixture {
    /// Default config and immediate transitions.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> FixtureBuilder {
        FixtureBuilder::default()
    }

    pub fn service(&self) -> &ModalService {
        &self.service
    }

    pub fn stack(&self) -> &ModalStack {
        self.service.stack()
    }

    pub fn host(&self) -> &RecordingHost {
        &self.host
    }

    pub fn templates(&self) -> &StaticTemplates {
        &self.templates
    }

    pub fn spawner(&self) -> LocalSpawner {
        self.pool.spawner()
    }

    /// Open a dialog, panicking on a configuration error.
    pub fn open(&self, options: ModalOptions) -> ModalInstance {
        match self.service.open(options) {
            Ok(instance) => instance,
            Err(err) => panic!("fixture open failed: {err}"),
        }
    }

    /// Run queued tasks until none can make progress.
    pub fn run(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Complete every pending transition (manual mode), then run tasks.
    ///
    /// Returns the number of transitions completed.
    pub fn finish_transitions(&mut self) -> usize {
        let fired = self.manual.finish_all();
        self.run();
        fired
    }

    pub fn transitions(&self) -> &ManualTransitions {
        &self.manual
    }

    /// Route an input event through the stack.
    pub fn send(&self, event: Event, hit: Option<modal_core::Hit>) -> bool {
        self.stack().handle_event(&event, hit)
    }

    pub fn press(&self, code: KeyCode) -> bool {
        self.send(Event::Key(KeyEvent::new(code)), None)
    }

    pub fn press_escape(&self) -> bool {
        self.press(KeyCode::Escape)
    }

    /// Left-click the backdrop surface of `dialog`'s window.
    pub fn click_backdrop(&self, dialog: &ModalInstance) -> bool {
        self.click(dialog, HitRegion::Backdrop)
    }

    /// Left-click inside `dialog`'s content.
    pub fn click_content(&self, dialog: &ModalInstance) -> bool {
        self.click(dialog, HitRegion::Content)
    }

    fn click(&self, dialog: &ModalInstance, region: HitRegion) -> bool {
        let Some(window) = dialog.window() else {
            return false;
        };
        let event = MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 0, 0);
        self.send(Event::Mouse(event), Some((window.hit_id(), region)))
    }
}

impl fmt::Debug for ModalFixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalFixture")
            .field("service", &self.service)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

/// A resolve entry that completes when the returned [`Deferred`] settles.
pub fn gate() -> (Deferred<Value, ResolveError>, Injectable) {
    let (tx, rx) = deferred();
    let provider = Injectable::new(Vec::<String>::new(), move |_| rx.clone());
    (tx, provider)
}

/// Proptest strategies for modal option values.
pub mod strategies {
    use modal_widgets::modal::BackdropMode;
    use proptest::prelude::*;

    pub fn backdrop_mode() -> impl Strategy<Value = BackdropMode> {
        prop_oneof![
            Just(BackdropMode::Enabled),
            Just(BackdropMode::Disabled),
            Just(BackdropMode::Static),
        ]
    }

    /// A stack operation for model-based tests.
    #[derive(Debug, Clone)]
    pub enum StackOp {
        Open(BackdropMode),
        /// Close the dialog at this position (modulo stack length).
        Close(usize),
        DismissTop,
        DismissAll,
    }

    pub fn stack_op() -> impl Strategy<Value = StackOp> {
        prop_oneof![
            4 => backdrop_mode().prop_map(StackOp::Open),
            2 => any::<usize>().prop_map(StackOp::Close),
            1 => Just(StackOp::DismissTop),
            1 => Just(StackOp::DismissAll),
        ]
    }
}
