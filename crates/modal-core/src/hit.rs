#![forbid(unsafe_code)]

//! Hit-test identifiers for pointer routing.
//!
//! Every modal window registers two regions under its own [`HitId`]: the
//! full-area backdrop surface and the content rectangle. A click is "outside"
//! the dialog exactly when the hit region is [`HitRegion::Backdrop`]; clicks on
//! descendants report [`HitRegion::Content`].

/// Identifier of a hit-testable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HitId(u64);

impl HitId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitRegion {
    /// The element's own surface behind its content.
    Backdrop,
    /// The element's content or one of its descendants.
    Content,
    /// Host-defined region.
    Custom(u8),
}

/// A hit-test result: the element and the region within it.
pub type Hit = (HitId, HitRegion);
