#![forbid(unsafe_code)]

//! The surface dialogs are attached to.
//!
//! The stack never renders anything itself. It tells a [`ModalHost`] when to
//! attach or detach elements, when to toggle the container's open marker, and
//! when to move focus into a window. Hosts must not panic from these calls and
//! may call back into the stack.

use std::rc::Rc;

use super::element::{ModalBackdrop, ModalWindow};

/// Receiver of stack rendering effects.
pub trait ModalHost {
    /// Attach `window` above every currently attached window.
    fn attach_window(&self, window: &Rc<ModalWindow>);

    /// Remove `window`. Called once its leave transition has finished.
    fn detach_window(&self, window: &Rc<ModalWindow>);

    /// Attach the shared backdrop beneath the top backdrop-holding window.
    fn attach_backdrop(&self, backdrop: &Rc<ModalBackdrop>);

    fn detach_backdrop(&self, backdrop: &Rc<ModalBackdrop>);

    /// Add (`present == true`) or remove the open marker `class` on the
    /// container.
    fn set_open_class(&self, class: &str, present: bool);

    /// Move focus to `window` itself.
    ///
    /// Not called when the window content declares its own autofocus target.
    fn focus_window(&self, window: &Rc<ModalWindow>);
}

/// Host that discards every effect. Useful for headless logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl ModalHost for NullHost {
    fn attach_window(&self, _window: &Rc<ModalWindow>) {}
    fn detach_window(&self, _window: &Rc<ModalWindow>) {}
    fn attach_backdrop(&self, _backdrop: &Rc<ModalBackdrop>) {}
    fn detach_backdrop(&self, _backdrop: &Rc<ModalBackdrop>) {}
    fn set_open_class(&self, _class: &str, _present: bool) {}
    fn focus_window(&self, _window: &Rc<ModalWindow>) {}
}
