#![forbid(unsafe_code)]

//! Stacked modal dialogs with a shared backdrop.
//!
//! # Components
//!
//! - [`ModalService`]: `open(options)` entry point; resolves content and
//!   locals asynchronously, then pushes the dialog onto the stack.
//! - [`ModalStack`]: ordered stack of open dialogs, shared backdrop, dismiss
//!   key and backdrop-click routing, teardown after leave transitions.
//! - [`ModalInstance`] / [`ModalScope`]: caller-side and view-side handles
//!   for closing or dismissing one dialog.
//! - [`ModalHost`]: where windows and the backdrop are attached.
//! - [`ModalStackConfig`]: stack-wide defaults, loadable from TOML.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use futures::executor::LocalPool;
//! use modal_runtime::{ImmediateTransitions, StaticTemplates, TemplateCache};
//! use modal_widgets::modal::{
//!     ModalOptions, ModalService, ModalStack, ModalStackConfig, NullHost,
//! };
//!
//! let mut pool = LocalPool::new();
//! let stack = ModalStack::new(
//!     Rc::new(NullHost),
//!     Rc::new(ImmediateTransitions),
//!     ModalStackConfig::default(),
//! );
//! let templates = TemplateCache::new(Rc::new(StaticTemplates::new()));
//! let service = ModalService::new(stack, templates, Rc::new(pool.spawner()));
//!
//! let dialog = service
//!     .open(ModalOptions::new().template("<p>Saved.</p>"))
//!     .expect("options are valid");
//! pool.run_until_stalled();
//! assert_eq!(service.stack().len(), 1);
//!
//! dialog.close("ok");
//! assert_eq!(dialog.result().try_get(), Some(Ok("ok".into())));
//! assert!(service.stack().is_empty());
//! ```

mod config;
mod element;
mod error;
mod host;
mod instance;
mod lifecycle;
mod options;
mod ordered;
mod registry;
mod service;
mod stack;

pub use config::ModalStackConfig;
pub use element::{ModalBackdrop, ModalWindow};
pub use error::{ModalError, ModalRejection};
pub use host::{ModalHost, NullHost};
pub use instance::{ModalInstance, ModalScope};
pub use lifecycle::{LifecyclePhase, ModalEntry, ModalHandle, ModalId};
pub use options::{BackdropMode, ModalOptions, ResolvedOptions, TemplateRef};
pub use ordered::{OrderedStack, StackEntry};
pub use registry::{ControllerContext, ControllerRegistry};
pub use service::ModalService;
pub use stack::{BACKDROP_CLICK_REASON, DISMISS_KEY_REASON, ModalStack, WeakModalStack};
