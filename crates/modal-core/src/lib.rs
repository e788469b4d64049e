#![forbid(unsafe_code)]

//! Input events and hit-test identifiers shared by the modal stack crates.
//!
//! The host translates its native input (terminal, DOM, windowing system)
//! into [`event::Event`] values and, for pointer input, the hit-test result of
//! the last rendered frame as a [`hit::HitId`] / [`hit::HitRegion`] pair.

pub mod event;
pub mod hit;

pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use hit::{Hit, HitId, HitRegion};
