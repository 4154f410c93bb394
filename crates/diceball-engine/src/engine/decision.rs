//! Decision-provider contracts for the two players.
//!
//! The at-bat state machine never knows whether a person or a heuristic is
//! behind a decision. It calls the methods of [`PitcherDecider`] and
//! [`HitterDecider`] at fixed points of the pitch protocol and passes a
//! read-only view of what that player is allowed to see at that moment.
//!
//! Secret commitments are collected in order (pitcher move, then the hitter's
//! swing decision) and only revealed afterwards in the [`PitchReport`](super::PitchReport).

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{
    RerollParseError,
    core::{
        dice::DicePool,
        pitch::PitchType,
        swing::{BonusAllocation, PowerTable, SwingArchetype, SwingModifiers},
    },
};

use super::{count::Count, streak::Streak};

/// The hitter's approach to a pitch, declared before the dice are rolled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant, Serialize,
)]
pub enum HitterApproach {
    Take,
    Sit,
    Wait,
}

/// The hitter's full pre-pitch declaration.
///
/// Taking a pitch needs no swing; sitting names the guessed pitch up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HitterPlan {
    Take,
    Sit {
        guess: PitchType,
        swing: SwingArchetype,
    },
    Wait {
        swing: SwingArchetype,
    },
}

impl HitterPlan {
    #[must_use]
    pub const fn approach(&self) -> HitterApproach {
        match self {
            Self::Take => HitterApproach::Take,
            Self::Sit { .. } => HitterApproach::Sit,
            Self::Wait { .. } => HitterApproach::Wait,
        }
    }

    #[must_use]
    pub const fn swing(&self) -> Option<SwingArchetype> {
        match self {
            Self::Take => None,
            Self::Sit { swing, .. } | Self::Wait { swing } => Some(*swing),
        }
    }
}

/// A hitter's guess of the coming pitch.
///
/// Every sit starts hard. Shifting the guess after seeing the pitcher's roll
/// downgrades it to a soft sit for the rest of the pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SitCommitment {
    guess: PitchType,
    hard: bool,
}

impl fmt::Display for SitCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.hard { "hard" } else { "shifted" };
        write!(f, "{kind} sit on {}", self.guess.code())
    }
}

impl SitCommitment {
    #[must_use]
    pub const fn hard(guess: PitchType) -> Self {
        Self { guess, hard: true }
    }

    #[must_use]
    pub const fn guess(&self) -> PitchType {
        self.guess
    }

    #[must_use]
    pub const fn is_hard(&self) -> bool {
        self.hard
    }

    /// Moves the guess, losing the hard-sit payoff.
    #[must_use]
    pub const fn shifted(self, guess: PitchType) -> Self {
        Self { guess, hard: false }
    }

    /// Swing modifiers earned when the pitcher actually threw `thrown`.
    #[must_use]
    pub fn modifiers(&self, thrown: PitchType) -> SwingModifiers {
        match (self.hard, self.guess == thrown) {
            (true, true) => SwingModifiers::HARD_SIT_CORRECT,
            (false, true) => SwingModifiers::SOFT_SIT_CORRECT,
            (_, false) => SwingModifiers::SIT_WRONG,
        }
    }
}

/// Swing modifiers for an optional sit.
///
/// Waiting (no sit) is the neutral baseline.
#[must_use]
pub fn sit_modifiers(sit: Option<SitCommitment>, thrown: PitchType) -> SwingModifiers {
    sit.map_or(SwingModifiers::NONE, |s| s.modifiers(thrown))
}

/// A hard-sitting hitter's reaction to the pitcher's initial roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitAdjustment {
    Keep,
    Shift(PitchType),
}

/// Dice positions the pitcher publicly declares to re-roll.
///
/// Positions are 1-based, as shown to players. Positions that do not exist in
/// the pool are ignored one by one when the reroll is executed.
///
/// # Example
///
/// ```
/// use diceball_engine::RerollRequest;
///
/// let request: RerollRequest = "1 3 4".parse().unwrap();
/// assert_eq!(request.positions(), [1, 3, 4]);
/// assert!("1 x".parse::<RerollRequest>().is_err());
/// assert!(RerollRequest::parse_lenient("1 x").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RerollRequest {
    positions: Vec<usize>,
}

impl fmt::Display for RerollRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positions.is_empty() {
            return f.write_str("none");
        }
        for (i, pos) in self.positions.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{pos}")?;
        }
        Ok(())
    }
}

impl FromStr for RerollRequest {
    type Err = RerollParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let positions = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<usize>().map_err(|_| RerollParseError {
                    token: token.to_owned(),
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { positions })
    }
}

impl RerollRequest {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            positions: Vec::new(),
        }
    }

    /// Creates a request from 1-based positions.
    #[must_use]
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Self {
            positions: positions.into_iter().collect(),
        }
    }

    /// Parses a typed request, treating malformed input as "no reroll".
    #[must_use]
    pub fn parse_lenient(input: &str) -> Self {
        input.parse().unwrap_or_else(|e| {
            tracing::warn!(input, error = %e, "invalid reroll request, keeping all dice");
            Self::none()
        })
    }

    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Resolves the request against a pool of `pool_len` dice.
    ///
    /// Out-of-range and repeated positions are dropped. When `budget` is
    /// given, positions beyond it are trimmed in declared order.
    #[must_use]
    pub fn resolve(&self, pool_len: usize, budget: Option<usize>) -> ResolvedReroll {
        let mut resolved = ResolvedReroll::default();
        for &pos in &self.positions {
            if pos == 0 || pos > pool_len {
                resolved.ignored.push(pos);
                continue;
            }
            if resolved.positions.contains(&pos) {
                continue;
            }
            if budget.is_some_and(|b| resolved.positions.len() >= b) {
                resolved.over_budget.push(pos);
                continue;
            }
            resolved.positions.push(pos);
        }
        resolved
    }
}

/// A reroll request after validation against the pool and budget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedReroll {
    /// Valid, distinct 1-based positions that will be re-rolled.
    pub positions: Vec<usize>,
    /// Positions outside the pool.
    pub ignored: Vec<usize>,
    /// Valid positions dropped because the reroll budget ran out.
    pub over_budget: Vec<usize>,
}

impl ResolvedReroll {
    /// 0-based indices into the pool.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.positions.iter().map(|p| p - 1).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// What the pitcher sees when choosing a move.
#[derive(Debug, Clone, Copy)]
pub struct PitcherView<'a> {
    pub pool: &'a DicePool,
    pub count: Count,
    pub streak: Streak,
    /// Dice the pitcher may still re-roll in this at-bat.
    pub reroll_budget: usize,
}

/// The pitcher's public reroll declaration plus secret pitch commitment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitcherMove {
    pub reroll: RerollRequest,
    pub pitch: PitchType,
}

/// What the hitter sees before declaring an approach.
#[derive(Debug, Clone, Copy)]
pub struct HitterView {
    pub count: Count,
    pub streak: Streak,
    pub bonus_dice: u8,
}

/// What the hitter sees when secretly deciding whether to swing.
///
/// The pitcher's reroll has been announced but not executed.
#[derive(Debug, Clone, Copy)]
pub struct SwingView<'a> {
    pub pool: &'a DicePool,
    pub reroll: &'a ResolvedReroll,
    /// Dice the pitcher keeps through the reroll.
    pub kept: &'a DicePool,
    pub swing: SwingArchetype,
    pub sit: Option<SitCommitment>,
    pub count: Count,
    pub streak: Streak,
    pub bonus_dice: u8,
    pub power_table: PowerTable,
}

/// Decides the pitcher's reroll and pitch.
pub trait PitcherDecider {
    fn choose_pitcher_move(&mut self, view: &PitcherView<'_>) -> PitcherMove;
}

/// Decides the hitter's approach, sit adjustment, swing and bonus allocation.
pub trait HitterDecider {
    fn choose_plan(&mut self, view: &HitterView) -> HitterPlan;

    /// Called only while hard-sitting, after the pitcher's initial roll.
    fn adjust_sit(&mut self, sit: SitCommitment, pool: &DicePool) -> SitAdjustment;

    /// Called unless the approach was [`HitterApproach::Take`].
    fn choose_swing(&mut self, view: &SwingView<'_>) -> bool;

    /// Called when swinging with a bonus die available.
    fn choose_bonus_allocation(&mut self, view: &SwingView<'_>) -> BonusAllocation;
}

impl<T> PitcherDecider for Box<T>
where
    T: PitcherDecider + ?Sized,
{
    fn choose_pitcher_move(&mut self, view: &PitcherView<'_>) -> PitcherMove {
        (**self).choose_pitcher_move(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reroll_request() {
        let request: RerollRequest = "  2, 5 ".parse().unwrap();
        assert_eq!(request.positions(), [2, 5]);
        assert!("".parse::<RerollRequest>().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_reroll_is_rejected() {
        let err = "1 two 3".parse::<RerollRequest>().unwrap_err();
        assert_eq!(err.token, "two");
        assert!("-1".parse::<RerollRequest>().is_err());
        assert!(RerollRequest::parse_lenient("1 two").is_empty());
    }

    #[test]
    fn test_resolve_ignores_out_of_range_individually() {
        let request = RerollRequest::from_positions([0, 2, 9, 2, 5]);
        let resolved = request.resolve(5, None);
        assert_eq!(resolved.positions, [2, 5]);
        assert_eq!(resolved.ignored, [0, 9]);
        assert_eq!(resolved.indices(), [1, 4]);
    }

    #[test]
    fn test_resolve_trims_to_budget() {
        let request = RerollRequest::from_positions([1, 2, 3]);
        let resolved = request.resolve(6, Some(2));
        assert_eq!(resolved.positions, [1, 2]);
        assert_eq!(resolved.over_budget, [3]);
    }

    #[test]
    fn test_sit_modifiers_table() {
        use crate::core::pitch::PitchType::{Curveball, Fastball};

        let hard = SitCommitment::hard(Fastball);
        assert_eq!(hard.modifiers(Fastball), SwingModifiers::HARD_SIT_CORRECT);
        assert_eq!(hard.modifiers(Curveball), SwingModifiers::SIT_WRONG);

        let soft = hard.shifted(Curveball);
        assert!(!soft.is_hard());
        assert_eq!(soft.modifiers(Curveball), SwingModifiers::SOFT_SIT_CORRECT);
        assert_eq!(soft.modifiers(Fastball), SwingModifiers::SIT_WRONG);

        assert_eq!(sit_modifiers(None, Fastball), SwingModifiers::NONE);
    }

    #[test]
    fn test_plan_approach_and_swing() {
        let plan = HitterPlan::Sit {
            guess: PitchType::Changeup,
            swing: SwingArchetype::Power,
        };
        assert!(plan.approach().is_sit());
        assert_eq!(plan.swing(), Some(SwingArchetype::Power));
        assert_eq!(HitterPlan::Take.swing(), None);
    }
}
