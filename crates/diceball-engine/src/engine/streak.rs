use std::fmt;

use serde::Serialize;

use crate::core::pitch::PitchCategory;

/// Consecutive pitches of one category thrown by the pitcher.
///
/// A long streak sets up a pitch of the other category (it plays harder) but
/// makes a third same-category pitch predictable (it plays easier).
///
/// The modifier for a pitch is always computed from the streak as it stood
/// *before* that pitch, then the pitch is recorded:
///
/// ```
/// use diceball_engine::{PitchCategory, Streak};
///
/// let mut streak = Streak::new();
/// streak.record(PitchCategory::Fastball);
/// streak.record(PitchCategory::Fastball);
///
/// assert_eq!(streak.difficulty_modifier(PitchCategory::Fastball), -1);
/// assert_eq!(streak.difficulty_modifier(PitchCategory::Offspeed), 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streak {
    category: Option<PitchCategory>,
    length: u32,
}

impl fmt::Display for Streak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            Some(category) if self.length > 0 => {
                write!(f, "{} {category} pitch(es)", self.length)
            }
            _ => f.write_str("none"),
        }
    }
}

impl Streak {
    /// Largest setup bonus a streak can award.
    pub const MAX_SETUP_BONUS: u32 = 2;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            category: None,
            length: 0,
        }
    }

    /// Builds a streak directly; a zero length clears the category.
    #[must_use]
    pub const fn with(category: PitchCategory, length: u32) -> Self {
        if length == 0 {
            return Self::new();
        }
        Self {
            category: Some(category),
            length,
        }
    }

    #[must_use]
    pub const fn category(&self) -> Option<PitchCategory> {
        self.category
    }

    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Setup bonus earned by breaking this streak.
    #[must_use]
    pub fn setup_bonus(&self) -> u32 {
        if self.length >= 2 {
            (self.length - 1).min(Self::MAX_SETUP_BONUS)
        } else {
            0
        }
    }

    /// Difficulty modifier for a pitch of `category` thrown against this streak.
    #[must_use]
    pub fn difficulty_modifier(&self, category: PitchCategory) -> i32 {
        if self.length < 2 {
            return 0;
        }
        if self.category == Some(category) {
            -1
        } else {
            i32::try_from(self.setup_bonus()).unwrap_or(0)
        }
    }

    /// Counts a pitch of `category` towards the streak.
    pub fn record(&mut self, category: PitchCategory) {
        if self.category == Some(category) {
            self.length += 1;
        } else {
            self.category = Some(category);
            self.length = 1;
        }
    }
}
