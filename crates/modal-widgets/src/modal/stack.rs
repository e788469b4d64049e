#![forbid(unsafe_code)]

//! Modal stack controller.
//!
//! `ModalStack` owns the ordered set of open dialogs and the single shared
//! backdrop. It attaches and detaches elements through a [`ModalHost`], runs
//! leave transitions through a [`TransitionSignal`], and routes the dismiss
//! key and backdrop clicks to the top dialog.
//!
//! # Invariants
//!
//! - Only the top dialog receives dismiss-key presses and backdrop clicks.
//! - The backdrop exists iff some open dialog wants one, or the last such
//!   dialog's leave transition is still running.
//! - Removal from the stack is synchronous; element teardown waits for the
//!   leave transition. A second close or dismiss of the same dialog is a
//!   no-op.
//! - The open marker class is present iff the stack is non-empty once a
//!   teardown completes.
//!
//! # Failure Modes
//!
//! - `close`/`dismiss` of a dialog that is not on the stack settles its result
//!   (if still pending) and skips teardown.
//! - `open` of a dialog without a built window is logged and ignored.
//! - `handle_event` with an empty stack returns `false`.
//!
//! # Example
//!
//! ```ignore
//! let stack = ModalStack::new(host, Rc::new(ImmediateTransitions), ModalStackConfig::default());
//!
//! // Route input before the rest of the UI sees it.
//! if stack.handle_event(&event, hit) {
//!     return; // consumed by the top dialog
//! }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use modal_core::{Event, Hit, HitRegion, KeyCode, MouseButton, MouseEventKind};
use modal_runtime::{TransitionPhase, TransitionSignal, Value};

use super::config::ModalStackConfig;
use super::element::ModalBackdrop;
use super::error::ModalRejection;
use super::host::ModalHost;
use super::lifecycle::{LifecyclePhase, ModalEntry, ModalHandle};
use super::ordered::OrderedStack;

/// Reason passed when the dismiss key dismisses the top dialog.
pub const DISMISS_KEY_REASON: &str = "escape key press";

/// Reason passed when a backdrop click dismisses the top dialog.
pub const BACKDROP_CLICK_REASON: &str = "backdrop click";

#[derive(Default)]
struct StackState {
    opened: OrderedStack<ModalEntry>,
    backdrop: Option<Rc<ModalBackdrop>>,
}

struct StackInner {
    state: RefCell<StackState>,
    host: Rc<dyn ModalHost>,
    transitions: Rc<dyn TransitionSignal>,
    config: ModalStackConfig,
    dismiss_key: KeyCode,
}

/// Shared handle to the stack of open dialogs.
#[derive(Clone)]
pub struct ModalStack {
    inner: Rc<StackInner>,
}

/// Non-owning handle to a [`ModalStack`].
#[derive(Clone)]
pub struct WeakModalStack {
    inner: Weak<StackInner>,
}

impl WeakModalStack {
    pub fn upgrade(&self) -> Option<ModalStack> {
        self.inner.upgrade().map(|inner| ModalStack { inner })
    }
}

impl fmt::Debug for WeakModalStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakModalStack")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl ModalStack {
    pub fn new(
        host: Rc<dyn ModalHost>,
        transitions: Rc<dyn TransitionSignal>,
        config: ModalStackConfig,
    ) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "modal stack config is invalid");
        }
        let dismiss_key = config.dismiss_key_code();
        Self {
            inner: Rc::new(StackInner {
                state: RefCell::new(StackState::default()),
                host,
                transitions,
                config,
                dismiss_key,
            }),
        }
    }

    pub fn config(&self) -> &ModalStackConfig {
        &self.inner.config
    }

    pub fn downgrade(&self) -> WeakModalStack {
        WeakModalStack {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles refer to the same stack.
    pub fn ptr_eq(&self, other: &ModalStack) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The most recently opened dialog still on the stack.
    pub fn top(&self) -> Option<ModalHandle> {
        self.inner.state.borrow().opened.top().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().opened.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().opened.is_empty()
    }

    pub fn contains(&self, entry: &ModalHandle) -> bool {
        self.inner.state.borrow().opened.contains(entry)
    }

    /// Number of open dialogs that want a backdrop.
    pub fn backdrop_count(&self) -> usize {
        self.inner.state.borrow().opened.backdrop_count()
    }

    /// The shared backdrop, if it currently exists.
    pub fn backdrop(&self) -> Option<Rc<ModalBackdrop>> {
        self.inner.state.borrow().backdrop.clone()
    }

    /// Open dialogs from bottom to top.
    pub fn entries(&self) -> Vec<ModalHandle> {
        self.inner.state.borrow().opened.iter().cloned().collect()
    }

    /// Push a resolved dialog on top and attach its elements.
    pub fn open(&self, entry: &ModalHandle) {
        let _span = tracing::debug_span!("modal_open", modal_id = entry.id().id()).entered();
        let Some(window) = entry.window() else {
            tracing::warn!("open called before the dialog view was built");
            return;
        };

        let created_backdrop = {
            let mut state = self.inner.state.borrow_mut();
            if state.opened.contains(entry) {
                tracing::debug!("dialog already open");
                return;
            }
            window.set_index(state.opened.len());
            state.opened.add(Rc::clone(entry));

            let count = state.opened.backdrop_count();
            if let Some(backdrop) = state.backdrop.as_ref() {
                if count > 0 {
                    backdrop.set_index(count - 1);
                }
                None
            } else if count > 0 {
                let backdrop = Rc::new(ModalBackdrop::new(
                    count - 1,
                    self.inner.config.backdrop_template_url.clone(),
                ));
                state.backdrop = Some(Rc::clone(&backdrop));
                Some(backdrop)
            } else {
                None
            }
        };

        // Host calls below may close the dialog again; each one is followed
        // by a membership check.
        entry.set_phase(LifecyclePhase::Open);
        let host = &self.inner.host;
        if let Some(backdrop) = created_backdrop {
            tracing::debug!(index = backdrop.index(), "backdrop created");
            host.attach_backdrop(&backdrop);
            if self
                .backdrop()
                .is_some_and(|current| Rc::ptr_eq(&current, &backdrop))
            {
                backdrop.set_animate(true);
            }
            if self.left_while_opening(entry) {
                return;
            }
        }
        window.set_attached(true);
        host.attach_window(&window);
        if self.left_while_opening(entry) {
            return;
        }
        host.set_open_class(&self.inner.config.open_class, true);
        if self.left_while_opening(entry) {
            return;
        }
        window.set_animate(true);
        if !window.has_autofocus() {
            host.focus_window(&window);
            if self.left_while_opening(entry) {
                return;
            }
        }
        tracing::debug!(
            depth = self.len(),
            backdrop_count = self.backdrop_count(),
            index = window.index(),
            "modal opened"
        );

        let opened = Rc::downgrade(entry);
        self.inner.transitions.once_finished(
            entry.id().id(),
            TransitionPhase::Enter,
            Box::new(move || {
                if let Some(entry) = opened.upgrade() {
                    entry.mark_opened();
                }
            }),
        );
    }

    /// Settle `entry`'s result with `result` and tear it down.
    ///
    /// Returns `false` if the result had already settled.
    pub fn close(&self, entry: &ModalHandle, result: impl Into<Value>) -> bool {
        let settled = entry.settle(Ok(result.into()));
        tracing::debug!(modal_id = entry.id().id(), settled, "modal close");
        self.remove_modal_window(entry);
        settled
    }

    /// Reject `entry`'s result with `reason` and tear it down.
    ///
    /// Returns `false` if the result had already settled.
    pub fn dismiss(&self, entry: &ModalHandle, reason: impl Into<Value>) -> bool {
        let settled = entry.settle(Err(ModalRejection::Dismissed(reason.into())));
        tracing::debug!(modal_id = entry.id().id(), settled, "modal dismiss");
        self.remove_modal_window(entry);
        settled
    }

    /// Dismiss every open dialog, top first. Returns how many were dismissed.
    pub fn dismiss_all(&self, reason: impl Into<Value>) -> usize {
        let reason = reason.into();
        let mut dismissed = 0;
        while let Some(top) = self.top() {
            self.dismiss(&top, reason.clone());
            dismissed += 1;
        }
        if dismissed > 0 {
            tracing::debug!(dismissed, "dismissed all modals");
        }
        dismissed
    }

    /// Route an input event to the top dialog.
    ///
    /// `hit` is the host's hit-test result for pointer events. Returns `true`
    /// when the event dismissed the top dialog and should not propagate.
    pub fn handle_event(&self, event: &Event, hit: Option<Hit>) -> bool {
        match event {
            Event::Key(key) if key.is_press() && key.code == self.inner.dismiss_key => {
                let Some(top) = self.top() else {
                    return false;
                };
                if !top.options().keyboard {
                    tracing::trace!(modal_id = top.id().id(), "dismiss key ignored");
                    return false;
                }
                tracing::trace!(modal_id = top.id().id(), "dismiss key");
                self.dismiss(&top, DISMISS_KEY_REASON);
                true
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let Some((hit_id, HitRegion::Backdrop)) = hit else {
                    return false;
                };
                let Some(top) = self.top() else {
                    return false;
                };
                let on_top = top.window().is_some_and(|w| w.hit_id() == hit_id);
                if !on_top || !top.options().backdrop.dismisses_on_click() {
                    return false;
                }
                tracing::trace!(modal_id = top.id().id(), "backdrop click");
                self.dismiss(&top, BACKDROP_CLICK_REASON);
                true
            }
            _ => false,
        }
    }

    fn left_while_opening(&self, entry: &ModalHandle) -> bool {
        if self.contains(entry) {
            return false;
        }
        tracing::debug!("closed by the host while opening");
        entry.cancel_opened();
        true
    }

    fn remove_modal_window(&self, entry: &ModalHandle) {
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            let removed = state.opened.remove(entry);
            let count = state.opened.backdrop_count();
            if removed.is_some()
                && let Some(backdrop) = &state.backdrop
                && count > 0
            {
                backdrop.set_index(count - 1);
            }
            removed
        };
        if removed.is_none() {
            tracing::trace!(modal_id = entry.id().id(), "not on the stack");
            return;
        }

        entry.set_phase(LifecyclePhase::Closing);
        let Some(window) = entry.window() else {
            self.finish_removal(entry);
            return;
        };
        window.set_animate(false);

        let stack = self.downgrade();
        let closing = Rc::clone(entry);
        self.inner.transitions.once_finished(
            entry.id().id(),
            TransitionPhase::Leave,
            Box::new(move || {
                if let Some(stack) = stack.upgrade() {
                    stack.finish_removal(&closing);
                }
            }),
        );
    }

    fn finish_removal(&self, entry: &ModalHandle) {
        let _span = tracing::debug_span!("modal_teardown", modal_id = entry.id().id()).entered();
        let host = &self.inner.host;
        if let Some(view) = entry.take_view() {
            if view.window.is_attached() {
                view.window.set_attached(false);
                host.detach_window(&view.window);
            }
            view.scope.scope().destroy();
        }
        entry.set_phase(LifecyclePhase::Destroyed);
        host.set_open_class(&self.inner.config.open_class, !self.is_empty());
        self.check_remove_backdrop();
    }

    fn check_remove_backdrop(&self) {
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            if state.opened.backdrop_count() == 0 {
                state.backdrop.take()
            } else {
                None
            }
        };
        if let Some(backdrop) = removed {
            backdrop.set_animate(false);
            self.inner.host.detach_backdrop(&backdrop);
            tracing::debug!("backdrop destroyed");
        }
    }
}

impl fmt::Debug for ModalStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ModalStack")
            .field("depth", &state.opened.len())
            .field("backdrop_count", &state.opened.backdrop_count())
            .field("backdrop", &state.backdrop.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::element::ModalWindow;
    use crate::modal::host::NullHost;
    use crate::modal::instance::ModalScope;
    use crate::modal::lifecycle::ModalView;
    use crate::modal::{BackdropMode, ModalError, ModalOptions};
    use modal_core::{HitId, KeyEvent, KeyEventKind, MouseEvent};
    use modal_runtime::{ImmediateTransitions, ManualTransitions, Promise};
    use serde_json::json;
    use std::cell::RefCell;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct LogHost {
        log: RefCell<Vec<String>>,
    }

    impl ModalHost for LogHost {
        fn attach_window(&self, window: &Rc<ModalWindow>) {
            self.log.borrow_mut().push(format!("attach window {}", window.index()));
        }
        fn detach_window(&self, window: &Rc<ModalWindow>) {
            self.log.borrow_mut().push(format!("detach window {}", window.index()));
        }
        fn attach_backdrop(&self, _backdrop: &Rc<ModalBackdrop>) {
            self.log.borrow_mut().push("attach backdrop".into());
        }
        fn detach_backdrop(&self, _backdrop: &Rc<ModalBackdrop>) {
            self.log.borrow_mut().push("detach backdrop".into());
        }
        fn set_open_class(&self, class: &str, present: bool) {
            self.log.borrow_mut().push(format!("{class} {present}"));
        }
        fn focus_window(&self, _window: &Rc<ModalWindow>) {}
    }

    /// Build an entry with its view in place, bypassing resolution.
    fn ready(stack: &ModalStack, backdrop: BackdropMode, keyboard: bool) -> ModalHandle {
        let options = ModalOptions::new()
            .template("<p>body</p>")
            .backdrop(backdrop)
            .keyboard(keyboard)
            .resolve_with(stack.config())
            .expect("valid options");
        let entry = ModalEntry::new(options);
        let window = Rc::new(ModalWindow::new(
            entry.id(),
            "<p>body</p>".into(),
            String::new(),
            stack.config().window_template_url.clone(),
        ));
        let scope = ModalScope::new(modal_runtime::Scope::root(), &entry, stack);
        entry.install_view(ModalView {
            scope,
            window,
            controller: None,
        });
        entry
    }

    fn immediate(host: Rc<dyn ModalHost>) -> ModalStack {
        ModalStack::new(host, Rc::new(ImmediateTransitions), ModalStackConfig::default())
    }

    fn escape() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Escape))
    }

    fn click(hit: HitId) -> (Event, Option<Hit>) {
        (
            Event::Mouse(MouseEvent::new(MouseEventKind::Down(MouseButton::Left), 0, 0)),
            Some((hit, HitRegion::Backdrop)),
        )
    }

    fn hit_of(entry: &ModalHandle) -> HitId {
        entry.window().expect("window built").hit_id()
    }

    fn rejection<T: Clone>(p: Promise<T, ModalRejection>) -> Option<Value> {
        match p.try_get() {
            Some(Err(ModalRejection::Dismissed(reason))) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn open_assigns_indices_and_top() {
        let stack = immediate(Rc::new(NullHost));
        let a = ready(&stack, BackdropMode::Enabled, true);
        let b = ready(&stack, BackdropMode::Disabled, true);
        stack.open(&a);
        stack.open(&b);

        assert_eq!(stack.len(), 2);
        assert!(stack.top().is_some_and(|t| Rc::ptr_eq(&t, &b)));
        assert_eq!(a.window().map(|w| w.index()), Some(0));
        assert_eq!(b.window().map(|w| w.index()), Some(1));
        assert_eq!(stack.backdrop_count(), 1);
        assert_eq!(stack.backdrop().map(|bd| bd.index()), Some(0));
        assert_eq!(a.phase(), LifecyclePhase::Open);
        assert_eq!(a.opened().try_get(), Some(Ok(())));
    }

    #[test]
    fn open_twice_is_ignored() {
        let stack = immediate(Rc::new(NullHost));
        let a = ready(&stack, BackdropMode::Enabled, true);
        stack.open(&a);
        stack.open(&a);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.backdrop_count(), 1);
    }

    #[test]
    fn close_settles_and_tears_down() {
        let host = Rc::new(LogHost::default());
        let stack = immediate(host.clone());
        let a = ready(&stack, BackdropMode::Enabled, true);
        stack.open(&a);

        assert!(stack.close(&a, json!({"saved": true})));
        assert_eq!(a.result().try_get(), Some(Ok(json!({"saved": true}))));
        assert_eq!(a.phase(), LifecyclePhase::Destroyed);
        assert!(stack.is_empty());
        assert!(stack.backdrop().is_none());
        assert_eq!(
            *host.log.borrow(),
            [
                "attach backdrop",
                "attach window 0",
                "modal-open true",
                "detach window 0",
                "modal-open false",
                "detach backdrop",
            ]
        );
    }

    #[test]
    fn duplicate_dismiss_is_noop() {
        let host = Rc::new(LogHost::default());
        let stack = immediate(host.clone());
        let a = ready(&stack, BackdropMode::Disabled, true);
        stack.open(&a);

        assert!(stack.dismiss(&a, "first"));
        let log_len = host.log.borrow().len();
        assert!(!stack.dismiss(&a, "second"));
        assert!(!stack.close(&a, 1));
        assert_eq!(host.log.borrow().len(), log_len);
        assert_eq!(rejection(a.result()), Some(json!("first")));
    }

    #[test]
    fn escape_dismisses_top_only_when_keyboard_enabled() {
        let stack = immediate(Rc::new(NullHost));
        let a = ready(&stack, BackdropMode::Enabled, true);
        let b = ready(&stack, BackdropMode::Enabled, false);
        stack.open(&a);
        stack.open(&b);

        assert!(!stack.handle_event(&escape(), None));
        assert_eq!(stack.len(), 2);

        stack.dismiss(&b, "manual");
        assert!(stack.handle_event(&escape(), None));
        assert_eq!(rejection(a.result()), Some(json!(DISMISS_KEY_REASON)));
        assert!(!stack.handle_event(&escape(), None));
    }

    #[test]
    fn key_release_and_other_keys_are_ignored() {
        let stack = immediate(Rc::new(NullHost));
        let a = ready(&stack, BackdropMode::Enabled, true);
        stack.open(&a);

        let release = Event::Key(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Release));
        assert!(!stack.handle_event(&release, None));
        assert!(!stack.handle_event(&Event::Key(KeyEvent::new(KeyCode::Enter)), None));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn configured_dismiss_key() {
        let stack = ModalStack::new(
            Rc::new(NullHost),
            Rc::new(ImmediateTransitions),
            ModalStackConfig::default().with_dismiss_key("q"),
        );
        let a = ready(&stack, BackdropMode::Enabled, true);
        stack.open(&a);

        assert!(!stack.handle_event(&escape(), None));
        assert!(stack.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char('q'))), None));
        assert!(stack.is_empty());
    }

    #[test]
    fn backdrop_click_respects_mode() {
        let stack = immediate(Rc::new(NullHost));
        let fixed = ready(&stack, BackdropMode::Static, true);
        stack.open(&fixed);

        let (event, hit) = click(hit_of(&fixed));
        assert!(!stack.handle_event(&event, hit));
        assert_eq!(stack.len(), 1);

        let loose = ready(&stack, BackdropMode::Enabled, true);
        stack.open(&loose);
        let (event, hit) = click(hit_of(&loose));
        assert!(stack.handle_event(&event, hit));
        assert_eq!(rejection(loose.result()), Some(json!(BACKDROP_CLICK_REASON)));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn click_on_content_or_lower_window_is_ignored() {
        let stack = immediate(Rc::new(NullHost));
        let a = ready(&stack, BackdropMode::Enabled, true);
        let b = ready(&stack, BackdropMode::Enabled, true);
        stack.open(&a);
        stack.open(&b);

        let (event, _) = click(hit_of(&b));
        assert!(!stack.handle_event(&event, Some((hit_of(&b), HitRegion::Content))));
        let (event, hit) = click(hit_of(&a));
        assert!(!stack.handle_event(&event, hit));
        assert!(!stack.handle_event(&event, None));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn dismiss_all_is_lifo() {
        let host = Rc::new(LogHost::default());
        let stack = immediate(host.clone());
        let entries: Vec<_> = (0..3)
            .map(|_| ready(&stack, BackdropMode::Enabled, true))
            .collect();
        for e in &entries {
            stack.open(e);
        }
        host.log.borrow_mut().clear();

        assert_eq!(stack.dismiss_all("cleanup"), 3);
        for e in &entries {
            assert_eq!(e.phase(), LifecyclePhase::Destroyed);
            assert_eq!(rejection(e.result()), Some(json!("cleanup")));
        }
        let detached: Vec<_> = host
            .log
            .borrow()
            .iter()
            .filter(|line| line.starts_with("detach"))
            .cloned()
            .collect();
        assert_eq!(
            detached,
            ["detach window 2", "detach window 1", "detach window 0", "detach backdrop"]
        );
        assert_eq!(stack.dismiss_all("again"), 0);
    }

    #[test]
    fn pending_leave_keeps_elements_until_transition_ends() {
        let host = Rc::new(LogHost::default());
        let transitions = Rc::new(ManualTransitions::new());
        let stack = ModalStack::new(host.clone(), transitions.clone(), ModalStackConfig::default());
        let a = ready(&stack, BackdropMode::Enabled, true);
        stack.open(&a);
        transitions.finish_all();

        stack.dismiss(&a, "bye");
        assert!(stack.is_empty());
        assert_eq!(stack.backdrop_count(), 0);
        assert!(stack.backdrop().is_some());
        assert_eq!(a.phase(), LifecyclePhase::Closing);
        assert!(a.window().is_some_and(|w| !w.animate()));

        assert!(transitions.finish(a.id().id(), TransitionPhase::Leave));
        assert_eq!(a.phase(), LifecyclePhase::Destroyed);
        assert!(stack.backdrop().is_none());
        assert_eq!(host.log.borrow().last().map(String::as_str), Some("detach backdrop"));
    }

    #[test]
    fn backdrop_index_tracks_count() {
        let stack = immediate(Rc::new(NullHost));
        let a = ready(&stack, BackdropMode::Enabled, true);
        let b = ready(&stack, BackdropMode::Disabled, true);
        let c = ready(&stack, BackdropMode::Static, true);
        stack.open(&a);
        stack.open(&b);
        assert_eq!(stack.backdrop().map(|bd| bd.index()), Some(0));
        stack.open(&c);
        assert_eq!(stack.backdrop_count(), 2);
        assert_eq!(stack.backdrop().map(|bd| bd.index()), Some(1));

        stack.close(&b, Value::Null);
        assert_eq!(stack.backdrop_count(), 2);
        stack.close(&c, Value::Null);
        assert_eq!(stack.backdrop_count(), 1);
        assert_eq!(stack.backdrop().map(|bd| bd.index()), Some(0));
    }

    #[traced_test]
    #[test]
    fn open_without_view_is_ignored() {
        let stack = immediate(Rc::new(NullHost));
        let options = ModalOptions::new()
            .template("x")
            .resolve_with(stack.config())
            .expect("valid options");
        let entry = ModalEntry::new(options);

        stack.open(&entry);
        assert!(stack.is_empty());
        assert_eq!(entry.phase(), LifecyclePhase::Pending);
        assert!(logs_contain("open called before the dialog view was built"));
    }

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    enum Hook {
        Backdrop,
        Window,
        OpenClass,
        Focus,
    }

    /// Host that dismisses its target from inside one of its hooks.
    struct DismissingHost {
        hook: Hook,
        stack: RefCell<Option<WeakModalStack>>,
        target: RefCell<Option<ModalHandle>>,
        inner: LogHost,
    }

    impl DismissingHost {
        fn new(hook: Hook) -> Rc<Self> {
            Rc::new(Self {
                hook,
                stack: RefCell::new(None),
                target: RefCell::new(None),
                inner: LogHost::default(),
            })
        }

        fn fire(&self, hook: Hook) {
            if hook != self.hook {
                return;
            }
            let stack = self.stack.borrow().as_ref().and_then(WeakModalStack::upgrade);
            let target = self.target.borrow_mut().take();
            if let (Some(stack), Some(target)) = (stack, target) {
                stack.dismiss(&target, "host");
            }
        }

        fn log(&self) -> Vec<String> {
            self.inner.log.borrow().clone()
        }
    }

    impl ModalHost for DismissingHost {
        fn attach_window(&self, window: &Rc<ModalWindow>) {
            self.inner.attach_window(window);
            self.fire(Hook::Window);
        }
        fn detach_window(&self, window: &Rc<ModalWindow>) {
            self.inner.detach_window(window);
        }
        fn attach_backdrop(&self, backdrop: &Rc<ModalBackdrop>) {
            self.inner.attach_backdrop(backdrop);
            self.fire(Hook::Backdrop);
        }
        fn detach_backdrop(&self, backdrop: &Rc<ModalBackdrop>) {
            self.inner.detach_backdrop(backdrop);
        }
        fn set_open_class(&self, class: &str, present: bool) {
            self.inner.set_open_class(class, present);
            if present {
                self.fire(Hook::OpenClass);
            }
        }
        fn focus_window(&self, _window: &Rc<ModalWindow>) {
            self.inner.log.borrow_mut().push("focus".into());
            self.fire(Hook::Focus);
        }
    }

    fn open_dismissed_by(
        hook: Hook,
        transitions: Rc<dyn TransitionSignal>,
    ) -> (Rc<DismissingHost>, ModalStack, ModalHandle) {
        let host = DismissingHost::new(hook);
        let stack = ModalStack::new(host.clone(), transitions, ModalStackConfig::default());
        *host.stack.borrow_mut() = Some(stack.downgrade());
        let a = ready(&stack, BackdropMode::Enabled, true);
        *host.target.borrow_mut() = Some(Rc::clone(&a));
        stack.open(&a);
        (host, stack, a)
    }

    #[test]
    fn host_dismissal_during_open_leaves_nothing_attached() {
        let cases = [
            (Hook::Backdrop, vec!["attach backdrop"]),
            (Hook::Window, vec!["attach backdrop", "attach window 0", "detach window 0"]),
            (
                Hook::OpenClass,
                vec!["attach backdrop", "attach window 0", "modal-open true", "detach window 0"],
            ),
            (
                Hook::Focus,
                vec![
                    "attach backdrop",
                    "attach window 0",
                    "modal-open true",
                    "focus",
                    "detach window 0",
                ],
            ),
        ];
        for (hook, prefix) in cases {
            let (host, stack, a) = open_dismissed_by(hook, Rc::new(ImmediateTransitions));

            let mut expected: Vec<String> = prefix.into_iter().map(String::from).collect();
            expected.extend(["modal-open false".to_owned(), "detach backdrop".to_owned()]);
            assert_eq!(host.log(), expected, "{hook:?}");

            assert!(stack.is_empty(), "{hook:?}");
            assert!(stack.backdrop().is_none(), "{hook:?}");
            assert_eq!(a.phase(), LifecyclePhase::Destroyed, "{hook:?}");
            assert_eq!(rejection(a.result()), Some(json!("host")), "{hook:?}");
            assert_eq!(
                a.opened().try_get(),
                Some(Err(ModalError::ClosedBeforeOpen)),
                "{hook:?}"
            );
        }
    }

    #[test]
    fn host_dismissal_during_attach_waits_for_leave() {
        let transitions = Rc::new(ManualTransitions::new());
        let (host, stack, a) = open_dismissed_by(Hook::Window, transitions.clone());

        assert_eq!(host.log(), ["attach backdrop", "attach window 0"]);
        assert!(stack.is_empty());
        assert_eq!(a.phase(), LifecyclePhase::Closing);
        assert!(a.window().is_some_and(|w| w.is_attached() && !w.animate()));
        assert!(stack.backdrop().is_some_and(|b| b.animate()));

        transitions.finish_all();
        assert_eq!(
            host.log(),
            [
                "attach backdrop",
                "attach window 0",
                "detach window 0",
                "modal-open false",
                "detach backdrop",
            ]
        );
        assert_eq!(a.phase(), LifecyclePhase::Destroyed);
        assert!(a.opened().try_get().is_some_and(|r| r.is_err()));
    }
}
