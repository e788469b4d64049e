#![forbid(unsafe_code)]

//! Errors produced while resolving a dialog's dependencies.

use futures::channel::oneshot::Canceled;
use serde_json::Value;

/// Failure of a template fetch or a resolve-map provider.
///
/// Cloneable so it can be observed through shared futures by every waiter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// A provider asked for an argument that neither the locals nor the
    /// service registry supply.
    #[error("unknown dependency '{name}'")]
    UnknownDependency { name: String },
    /// A provider completed with a rejection value.
    #[error("provider rejected: {0}")]
    Rejected(Value),
    /// A template reference could not be loaded.
    #[error("failed to load template '{url}': {message}")]
    Template { url: String, message: String },
    /// The producing side was dropped before settling.
    #[error("resolution abandoned before completion")]
    Abandoned,
}

impl ResolveError {
    /// Shorthand for a provider rejection carrying a plain message.
    pub fn rejected(reason: impl Into<Value>) -> Self {
        Self::Rejected(reason.into())
    }
}

impl From<Canceled> for ResolveError {
    fn from(_: Canceled) -> Self {
        Self::Abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ResolveError::UnknownDependency {
            name: "users".into(),
        };
        assert_eq!(err.to_string(), "unknown dependency 'users'");

        let err = ResolveError::Template {
            url: "a.html".into(),
            message: "404".into(),
        };
        assert_eq!(err.to_string(), "failed to load template 'a.html': 404");

        assert_eq!(
            ResolveError::rejected("nope").to_string(),
            "provider rejected: \"nope\""
        );
    }

    #[test]
    fn canceled_maps_to_abandoned() {
        assert_eq!(ResolveError::from(Canceled), ResolveError::Abandoned);
    }
}
