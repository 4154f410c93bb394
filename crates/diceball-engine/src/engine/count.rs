use std::fmt;

use serde::Serialize;

use crate::core::pitch::PitchResult;

/// Balls and strikes in the current at-bat.
///
/// # Example
///
/// ```
/// use diceball_engine::{Count, PitchResult};
///
/// let mut count = Count::new();
/// count.record_pitch(PitchResult::Ball);
/// count.record_pitch(PitchResult::Strike);
/// count.record_foul();
/// count.record_foul(); // a foul never makes the third strike
/// assert_eq!(count.to_string(), "1-2");
/// assert!(!count.is_terminal());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Count {
    balls: u8,
    strikes: u8,
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.balls, self.strikes)
    }
}

impl Count {
    pub const WALK_BALLS: u8 = 4;
    pub const STRIKEOUT_STRIKES: u8 = 3;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            balls: 0,
            strikes: 0,
        }
    }

    /// Builds a count directly, clamping to the terminal values.
    #[must_use]
    pub fn with(balls: u8, strikes: u8) -> Self {
        Self {
            balls: balls.min(Self::WALK_BALLS),
            strikes: strikes.min(Self::STRIKEOUT_STRIKES),
        }
    }

    #[must_use]
    pub const fn balls(&self) -> u8 {
        self.balls
    }

    #[must_use]
    pub const fn strikes(&self) -> u8 {
        self.strikes
    }

    #[must_use]
    pub const fn is_walk(&self) -> bool {
        self.balls >= Self::WALK_BALLS
    }

    #[must_use]
    pub const fn is_strikeout(&self) -> bool {
        self.strikes >= Self::STRIKEOUT_STRIKES
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.is_walk() || self.is_strikeout()
    }

    /// Records a pitch the hitter did not swing at.
    pub fn record_pitch(&mut self, result: PitchResult) {
        match result {
            PitchResult::Strike => self.record_strike(),
            PitchResult::Ball => self.balls = (self.balls + 1).min(Self::WALK_BALLS),
        }
    }

    /// Records a swing and miss.
    pub fn record_strike(&mut self) {
        self.strikes = (self.strikes + 1).min(Self::STRIKEOUT_STRIKES);
    }

    /// Records a foul ball, which only counts as a strike before two strikes.
    pub fn record_foul(&mut self) {
        if self.strikes < Self::STRIKEOUT_STRIKES - 1 {
            self.strikes += 1;
        }
    }
}
