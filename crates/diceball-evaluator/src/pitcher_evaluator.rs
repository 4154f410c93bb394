//! Automated pitcher: choosing a reroll and a pitch from the rolled pool.
//!
//! # How It Works
//!
//! 1. **Analyze the Pool** - Collect possible pitches and near misses within the
//!    reroll budget ([`PoolAnalysis`])
//! 2. **Read the Count** - Derive an [`Aggressiveness`] from balls and strikes
//! 3. **Choose** - Throw the best pitch on hand, chase a near miss, or fall
//!    back to re-rolling the lowest dice
//!
//! # Decision Policy
//!
//! With a pitch on hand, a conservative or aggressive pitcher throws the
//! hardest one without re-rolling. A neutral pitcher keeps a pitch of
//! difficulty 5 or more, and otherwise chases the near miss with the highest
//! potential if it beats what is on hand.
//!
//! With nothing on hand, a conservative pitcher chases fastballs first, then
//! changeups, and never a curveball. Every pool of four or more dice without
//! a pitch on hand holds a fastball or changeup near miss. Everyone else scores near misses by potential
//! difficulty plus the setup bonus that breaking the current streak would earn.
//!
//! When no near miss fits the budget, the three lowest dice are re-rolled and
//! a fastball is committed.
//!
//! # Usage
//!
//! ```
//! use diceball_engine::{Count, DicePool, PitchType, PitcherDecider, PitcherView, Streak};
//! use diceball_evaluator::pitcher_evaluator::PitcherEvaluator;
//!
//! let pool = DicePool::from_values(&[2, 2, 2, 3, 5]).unwrap();
//! let view = PitcherView {
//!     pool: &pool,
//!     count: Count::with(3, 0),
//!     streak: Streak::new(),
//!     reroll_budget: 5,
//! };
//! let mv = PitcherEvaluator::new().choose_pitcher_move(&view);
//! assert_eq!(mv.pitch, PitchType::Fastball);
//! assert!(mv.reroll.is_empty());
//! ```

use std::cmp::Reverse;

use diceball_engine::{
    Count, PitchCategory, PitchType, PitcherDecider, PitcherMove, PitcherView, RerollRequest,
    Streak,
};

use crate::pool_analysis::{NearMiss, PoolAnalysis};

/// How much risk the count allows the pitcher to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Aggressiveness {
    /// Three balls: a strike is needed now.
    Conservative,
    /// Two strikes: go for the strikeout.
    Aggressive,
    Neutral,
}

impl Aggressiveness {
    #[must_use]
    pub fn from_count(count: Count) -> Self {
        if count.balls() >= 3 {
            Self::Conservative
        } else if count.strikes() == 2 {
            Self::Aggressive
        } else {
            Self::Neutral
        }
    }
}

/// Why the evaluator picked its move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PlanKind {
    /// Throw a pitch already in the pool.
    OnHand,
    /// Re-roll around a pair to complete a harder pitch.
    ChaseNearMiss,
    /// Nothing playable: re-roll the lowest dice.
    Fallback,
}

/// The evaluator's chosen move and the reasoning behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitcherPlan {
    kind: PlanKind,
    pitch: PitchType,
    reroll: RerollRequest,
}

impl PitcherPlan {
    fn on_hand(pitch: PitchType) -> Self {
        Self {
            kind: PlanKind::OnHand,
            pitch,
            reroll: RerollRequest::none(),
        }
    }

    fn chase(near_miss: &NearMiss) -> Self {
        Self {
            kind: PlanKind::ChaseNearMiss,
            pitch: near_miss.pitch(),
            reroll: RerollRequest::from_positions(near_miss.reroll().iter().map(|i| i + 1)),
        }
    }

    fn fallback(pool_len: usize, reroll_budget: usize) -> Self {
        let count = PitcherEvaluator::FALLBACK_REROLL
            .min(reroll_budget)
            .min(pool_len);
        Self {
            kind: PlanKind::Fallback,
            pitch: PitchType::Fastball,
            reroll: RerollRequest::from_positions(1..=count),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PlanKind {
        self.kind
    }

    #[must_use]
    pub fn pitch(&self) -> PitchType {
        self.pitch
    }

    /// 1-based positions to re-roll.
    #[must_use]
    pub fn reroll(&self) -> &RerollRequest {
        &self.reroll
    }

    #[must_use]
    pub fn into_move(self) -> PitcherMove {
        PitcherMove {
            reroll: self.reroll,
            pitch: self.pitch,
        }
    }
}

/// Setup bonus a near miss would earn by breaking the current streak.
fn streak_break_bonus(streak: Streak, category: PitchCategory) -> u32 {
    if streak.category() == Some(category) {
        0
    } else {
        streak.setup_bonus()
    }
}

/// Order in which a conservative pitcher chases near misses.
fn conservative_rank(pitch: PitchType) -> Option<u8> {
    match pitch {
        PitchType::Fastball => Some(0),
        PitchType::Changeup => Some(1),
        PitchType::Curveball => None,
    }
}

/// Heuristic pitcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct PitcherEvaluator;

impl PitcherEvaluator {
    /// A pitch this hard is kept even with a better near miss available.
    pub const KEEP_DIFFICULTY: u8 = 5;
    /// Dice re-rolled when nothing is playable.
    pub const FALLBACK_REROLL: usize = 3;

    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Chooses a reroll and pitch for the pool in `view`.
    #[must_use]
    pub fn plan(&self, view: &PitcherView<'_>) -> PitcherPlan {
        let aggressiveness = Aggressiveness::from_count(view.count);
        let analysis = PoolAnalysis::new(view.pool, view.reroll_budget);
        let near_misses = analysis.near_misses();

        if let Some(best) = analysis.best_possible() {
            if !aggressiveness.is_neutral() || best.difficulty >= Self::KEEP_DIFFICULTY {
                return PitcherPlan::on_hand(best.pitch);
            }
            return near_misses
                .iter()
                .filter(|n| n.potential_difficulty() > best.difficulty)
                .min_by_key(|n| Reverse(n.potential_difficulty()))
                .map_or_else(|| PitcherPlan::on_hand(best.pitch), PitcherPlan::chase);
        }

        let target = if aggressiveness.is_conservative() {
            near_misses
                .iter()
                .filter_map(|n| conservative_rank(n.pitch()).map(|rank| (rank, n)))
                .min_by_key(|(rank, n)| (*rank, Reverse(n.potential_difficulty())))
                .map(|(_, n)| n)
        } else {
            near_misses.iter().min_by_key(|n| {
                let bonus = streak_break_bonus(view.streak, n.pitch().category());
                Reverse(u32::from(n.potential_difficulty()) + bonus)
            })
        };

        target.map_or_else(
            || PitcherPlan::fallback(view.pool.len(), view.reroll_budget),
            PitcherPlan::chase,
        )
    }
}

impl PitcherDecider for PitcherEvaluator {
    fn choose_pitcher_move(&mut self, view: &PitcherView<'_>) -> PitcherMove {
        let plan = self.plan(view);
        tracing::debug!(
            pool = %view.pool,
            count = %view.count,
            kind = ?plan.kind(),
            reroll = %plan.reroll(),
            "automated pitcher move"
        );
        plan.into_move()
    }
}
