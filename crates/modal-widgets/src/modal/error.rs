#![forbid(unsafe_code)]

//! Modal error types.

use futures::channel::oneshot::Canceled;
use modal_runtime::{ResolveError, Value};

/// Why a dialog could not be opened or configured.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModalError {
    /// Neither inline markup nor a template reference was given.
    #[error("one of template or template_url options is required")]
    MissingTemplate,
    /// `controller` names nothing in the registry.
    #[error("unknown controller '{0}'")]
    UnknownController(String),
    /// The controller factory returned an error.
    #[error("controller '{name}' failed: {message}")]
    Controller { name: String, message: String },
    /// Template loading or a resolve entry failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// The result settled before the dialog became visible.
    #[error("dialog was closed before it opened")]
    ClosedBeforeOpen,
    /// The executor refused the resolution task.
    #[error("failed to schedule dialog resolution: {0}")]
    Spawn(String),
    /// Stack configuration could not be parsed or validated.
    #[error("invalid modal configuration: {0}")]
    Config(String),
    /// The dialog was dropped without ever settling.
    #[error("dialog abandoned before settling")]
    Abandoned,
}

impl From<Canceled> for ModalError {
    fn from(_: Canceled) -> Self {
        Self::Abandoned
    }
}

/// Rejection value of a dialog's result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModalRejection {
    /// The dialog was dismissed with a reason.
    #[error("dialog dismissed: {0}")]
    Dismissed(Value),
    /// Opening the dialog failed.
    #[error(transparent)]
    Failed(ModalError),
}

impl ModalRejection {
    /// The dismissal reason, if this is a dismissal.
    pub fn reason(&self) -> Option<&Value> {
        match self {
            Self::Dismissed(reason) => Some(reason),
            Self::Failed(_) => None,
        }
    }

    pub fn is_dismissal(&self) -> bool {
        matches!(self, Self::Dismissed(_))
    }
}

impl From<ModalError> for ModalRejection {
    fn from(err: ModalError) -> Self {
        Self::Failed(err)
    }
}

impl From<Canceled> for ModalRejection {
    fn from(_: Canceled) -> Self {
        Self::Failed(ModalError::Abandoned)
    }
}
