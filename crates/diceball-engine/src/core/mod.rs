//! Dice, pitch and swing rules.
//!
//! Nothing here keeps state between pitches; see [`crate::engine`] for that.

pub use self::{dice::*, pitch::*, swing::*};

pub(crate) mod dice;
pub(crate) mod pitch;
pub(crate) mod swing;
