#![forbid(unsafe_code)]

//! Per-dialog options and their merge with stack defaults.

use std::fmt;
use std::rc::Rc;

use modal_runtime::{Injectable, Scope};
use serde::{Deserialize, Serialize};

use super::config::ModalStackConfig;
use super::error::ModalError;

/// Backdrop behavior of a dialog.
///
/// Serialized as `true`, `false`, or `"static"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "BackdropRepr", into = "BackdropRepr")]
pub enum BackdropMode {
    /// Backdrop shown; clicking it dismisses the dialog.
    #[default]
    Enabled,
    /// No backdrop.
    Disabled,
    /// Backdrop shown; clicks on it are ignored.
    Static,
}

impl BackdropMode {
    /// Whether this dialog contributes to the shared backdrop.
    #[inline]
    pub const fn is_shown(self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Whether a click on the backdrop dismisses the dialog.
    #[inline]
    pub const fn dismisses_on_click(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl From<bool> for BackdropMode {
    fn from(shown: bool) -> Self {
        if shown { Self::Enabled } else { Self::Disabled }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BackdropRepr {
    Flag(bool),
    Named(String),
}

impl TryFrom<BackdropRepr> for BackdropMode {
    type Error = String;

    fn try_from(repr: BackdropRepr) -> Result<Self, Self::Error> {
        match repr {
            BackdropRepr::Flag(flag) => Ok(flag.into()),
            BackdropRepr::Named(name) if name == "static" => Ok(Self::Static),
            BackdropRepr::Named(name) => Err(format!(
                "invalid backdrop '{name}', expected true, false, or \"static\""
            )),
        }
    }
}

impl From<BackdropMode> for BackdropRepr {
    fn from(mode: BackdropMode) -> Self {
        match mode {
            BackdropMode::Enabled => Self::Flag(true),
            BackdropMode::Disabled => Self::Flag(false),
            BackdropMode::Static => Self::Named("static".to_owned()),
        }
    }
}

/// Where a dialog's content markup comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateRef {
    /// Markup given directly.
    Inline(Rc<str>),
    /// Markup loaded through the template cache.
    Url(String),
}

/// Options passed to [`ModalService::open`](super::ModalService::open).
///
/// Unset fields fall back to the stack's [`ModalStackConfig`].
///
/// # Example
///
/// ```
/// use modal_widgets::modal::{BackdropMode, ModalOptions};
///
/// let options = ModalOptions::new()
///     .template_url("confirm.html")
///     .backdrop(BackdropMode::Static)
///     .keyboard(false);
/// ```
#[derive(Clone, Default)]
pub struct ModalOptions {
    template: Option<Rc<str>>,
    template_url: Option<String>,
    backdrop: Option<BackdropMode>,
    keyboard: Option<bool>,
    window_class: Option<String>,
    window_template_url: Option<String>,
    scope: Option<Scope>,
    controller: Option<String>,
    resolve: Vec<(String, Injectable)>,
}

impl ModalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inline content markup. Takes precedence over [`template_url`](Self::template_url).
    #[must_use]
    pub fn template(mut self, markup: impl Into<Rc<str>>) -> Self {
        self.template = Some(markup.into());
        self
    }

    /// Content markup reference, loaded through the template cache.
    #[must_use]
    pub fn template_url(mut self, url: impl Into<String>) -> Self {
        self.template_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn backdrop(mut self, mode: impl Into<BackdropMode>) -> Self {
        self.backdrop = Some(mode.into());
        self
    }

    /// Whether the dismiss key dismisses this dialog.
    #[must_use]
    pub fn keyboard(mut self, enabled: bool) -> Self {
        self.keyboard = Some(enabled);
        self
    }

    /// Extra style class for the window element.
    #[must_use]
    pub fn window_class(mut self, class: impl Into<String>) -> Self {
        self.window_class = Some(class.into());
        self
    }

    /// Override the window chrome template.
    #[must_use]
    pub fn window_template_url(mut self, url: impl Into<String>) -> Self {
        self.window_template_url = Some(url.into());
        self
    }

    /// Parent scope for the dialog's view-model. Defaults to the service root.
    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Name of a registered controller to instantiate.
    #[must_use]
    pub fn controller(mut self, name: impl Into<String>) -> Self {
        self.controller = Some(name.into());
        self
    }

    /// Add a named value resolved before the dialog opens.
    ///
    /// A repeated name replaces the earlier provider.
    #[must_use]
    pub fn resolve(mut self, name: impl Into<String>, provider: Injectable) -> Self {
        let name = name.into();
        match self.resolve.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = provider,
            None => self.resolve.push((name, provider)),
        }
        self
    }

    /// Merge with `config` defaults.
    ///
    /// Fails with [`ModalError::MissingTemplate`] when no content source is
    /// given.
    pub fn resolve_with(self, config: &ModalStackConfig) -> Result<ResolvedOptions, ModalError> {
        let template = match (self.template, self.template_url) {
            (Some(markup), _) => TemplateRef::Inline(markup),
            (None, Some(url)) => TemplateRef::Url(url),
            (None, None) => return Err(ModalError::MissingTemplate),
        };
        Ok(ResolvedOptions {
            template,
            backdrop: self.backdrop.unwrap_or(config.backdrop),
            keyboard: self.keyboard.unwrap_or(config.keyboard),
            window_class: self.window_class.unwrap_or_default(),
            window_template_url: self
                .window_template_url
                .unwrap_or_else(|| config.window_template_url.clone()),
            scope: self.scope,
            controller: self.controller,
            resolve: self.resolve,
        })
    }
}

impl fmt::Debug for ModalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalOptions")
            .field("template", &self.template.is_some())
            .field("template_url", &self.template_url)
            .field("backdrop", &self.backdrop)
            .field("keyboard", &self.keyboard)
            .field("controller", &self.controller)
            .field("resolve", &self.resolve.len())
            .finish_non_exhaustive()
    }
}

/// Options after merging with stack defaults.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub template: TemplateRef,
    pub backdrop: BackdropMode,
    pub keyboard: bool,
    pub window_class: String,
    pub window_template_url: String,
    pub scope: Option<Scope>,
    pub controller: Option<String>,
    pub resolve: Vec<(String, Injectable)>,
}
