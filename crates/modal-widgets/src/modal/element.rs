#![forbid(unsafe_code)]

//! Rendered elements owned by the stack: one window per open dialog and the
//! single shared backdrop.
//!
//! Both carry an `animate` flag. It is set once the element is attached so a
//! host can start its enter animation, and cleared when removal begins so the
//! host can run the leave animation before the element is detached.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use modal_core::HitId;

use super::lifecycle::ModalId;

/// Attribute that marks content wanting to manage its own initial focus.
const AUTOFOCUS_ATTR: &str = "autofocus";

/// The window element of one open dialog.
pub struct ModalWindow {
    id: ModalId,
    index: Cell<usize>,
    window_class: String,
    template_url: String,
    content: Rc<str>,
    animate: Cell<bool>,
    attached: Cell<bool>,
}

impl ModalWindow {
    pub(crate) fn new(
        id: ModalId,
        content: Rc<str>,
        window_class: String,
        template_url: String,
    ) -> Self {
        Self {
            id,
            index: Cell::new(0),
            window_class,
            template_url,
            content,
            animate: Cell::new(false),
            attached: Cell::new(false),
        }
    }

    pub fn id(&self) -> ModalId {
        self.id
    }

    /// Hit id under which the host registers this window's regions.
    pub fn hit_id(&self) -> HitId {
        HitId::new(self.id.id())
    }

    /// Stacking index: 0 for the first dialog, increasing upward.
    pub fn index(&self) -> usize {
        self.index.get()
    }

    pub(crate) fn set_index(&self, index: usize) {
        self.index.set(index);
    }

    /// Extra style class requested by the caller (may be empty).
    pub fn window_class(&self) -> &str {
        &self.window_class
    }

    /// Window chrome template.
    pub fn template_url(&self) -> &str {
        &self.template_url
    }

    /// Resolved content markup.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn animate(&self) -> bool {
        self.animate.get()
    }

    pub(crate) fn set_animate(&self, animate: bool) {
        self.animate.set(animate);
    }

    /// Whether the host has been told to attach this window and not yet to
    /// detach it.
    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    pub(crate) fn set_attached(&self, attached: bool) {
        self.attached.set(attached);
    }

    /// Whether the content asks to focus one of its own descendants, i.e. some
    /// start tag carries an `autofocus` attribute.
    pub fn has_autofocus(&self) -> bool {
        has_start_tag_attr(&self.content, AUTOFOCUS_ATTR)
    }
}

/// Scan `markup` for a start tag carrying the attribute `name`.
///
/// Text, comments, closing tags and quoted attribute values are skipped.
fn has_start_tag_attr(markup: &str, name: &str) -> bool {
    let bytes = markup.as_bytes();
    let mut pos = 0;
    while let Some(offset) = markup[pos..].find('<') {
        let start = pos + offset + 1;
        let end = tag_end(bytes, start);
        if bytes.get(start).is_some_and(u8::is_ascii_alphabetic)
            && tag_has_attr(&bytes[start..end], name.as_bytes())
        {
            return true;
        }
        pos = end;
    }
    false
}

/// Index of the `>` closing the tag opened just before `start`, or the end of
/// input.
fn tag_end(bytes: &[u8], start: usize) -> usize {
    let mut quote = None;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match (quote, b) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return i,
            _ => {}
        }
    }
    bytes.len()
}

fn tag_has_attr(tag: &[u8], name: &[u8]) -> bool {
    let is_space = |b: u8| b.is_ascii_whitespace();
    let is_gap = |b: u8| is_space(b) || b == b'/';
    let len = tag.len();

    // Tag name.
    let mut i = tag.iter().position(|&b| is_gap(b)).unwrap_or(len);
    loop {
        while i < len && is_gap(tag[i]) {
            i += 1;
        }
        if i >= len {
            return false;
        }
        let attr_start = i;
        while i < len && !is_gap(tag[i]) && tag[i] != b'=' {
            i += 1;
        }
        if tag[attr_start..i].eq_ignore_ascii_case(name) {
            return true;
        }
        while i < len && is_space(tag[i]) {
            i += 1;
        }
        if i < len && tag[i] == b'=' {
            i += 1;
            while i < len && is_space(tag[i]) {
                i += 1;
            }
            match tag.get(i) {
                Some(&(q @ (b'"' | b'\''))) => {
                    i += 1;
                    while i < len && tag[i] != q {
                        i += 1;
                    }
                    i += 1;
                }
                _ => {
                    while i < len && !is_space(tag[i]) {
                        i += 1;
                    }
                }
            }
        }
    }
}

impl fmt::Debug for ModalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalWindow")
            .field("id", &self.id)
            .field("index", &self.index.get())
            .field("window_class", &self.window_class)
            .field("animate", &self.animate.get())
            .field("attached", &self.attached.get())
            .finish_non_exhaustive()
    }
}

/// The shared backdrop element.
#[derive(Debug)]
pub struct ModalBackdrop {
    index: Cell<usize>,
    template_url: String,
    animate: Cell<bool>,
}

impl ModalBackdrop {
    pub(crate) fn new(index: usize, template_url: String) -> Self {
        Self {
            index: Cell::new(index),
            template_url,
            animate: Cell::new(false),
        }
    }

    /// Backdrop-holding dialogs below it, minus one.
    pub fn index(&self) -> usize {
        self.index.get()
    }

    pub(crate) fn set_index(&self, index: usize) {
        self.index.set(index);
    }

    pub fn template_url(&self) -> &str {
        &self.template_url
    }

    pub fn animate(&self) -> bool {
        self.animate.get()
    }

    pub(crate) fn set_animate(&self, animate: bool) {
        self.animate.set(animate);
    }
}
