//! Rules engine for diceball, a two-player dice game that plays out a single
//! baseball at-bat.
//!
//! The pitcher rolls a pool of dice and builds a pitch from three of them. The
//! hitter declares an approach, may commit to a guess of the pitch, and
//! secretly decides whether to swing. Swings are settled with contact and
//! power rolls. The at-bat ends on a walk, a strikeout or a ball in play.
//!
//! - [`core`] holds the dice, pitch and swing rules.
//! - [`engine`] holds the count, the pitch streak, the decision contracts and
//!   the [`AtBat`] state machine.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("die value must be between 1 and 6, got {value}")]
pub struct InvalidDieError {
    pub value: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DicePoolError {
    #[display("invalid die in pool")]
    InvalidDie(InvalidDieError),
    #[display("a pool holds at most 8 dice, got {_0}")]
    TooManyDice(#[error(not(source))] usize),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DiceSeedParseError {
    #[display("dice seed must be 32 hex digits, got {_0}")]
    InvalidLength(#[error(not(source))] usize),
    #[display("dice seed contains invalid hex: {_0:?}")]
    InvalidHex(#[error(not(source))] String),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("reroll positions must be numbers, got {token:?}")]
pub struct RerollParseError {
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("pool size must be between 4 and 7 dice, got {_0}")]
    PoolSizeOutOfRange(#[error(not(source))] usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("the at-bat is already over")]
pub struct AtBatOverError;
