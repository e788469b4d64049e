#![forbid(unsafe_code)]

//! Modal dialog stack for layered UIs.
//!
//! See [`modal`] for the stack controller, dialog lifecycle, and the
//! [`modal::ModalService::open`] entry point.

pub mod modal;

pub use modal::{
    BackdropMode, ModalError, ModalInstance, ModalOptions, ModalRejection, ModalService,
    ModalStack, ModalStackConfig,
};
