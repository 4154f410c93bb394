//! Analysis of a pitcher's rolled pool.
//!
//! [`PoolAnalysis`] collects two things the pitcher heuristic needs:
//!
//! 1. **Possible pitches** - every (pitch, triple) already present in the pool
//! 2. **Near misses** - every pair of dice one die away from a pitch, together
//!    with the dice that would have to be re-rolled to chase it
//!
//! Near misses whose reroll would exceed the remaining budget are dropped at
//! construction time, so everything in the analysis is actually playable.

use std::cmp::Reverse;

use arrayvec::ArrayVec;
use diceball_engine::{DicePool, Die, MAX_POOL_DICE, PitchType, PossiblePitch, possible_pitches};

/// A pair of dice that could complete a pitch after re-rolling the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearMiss {
    pitch: PitchType,
    pair: [usize; 2],
    potential_difficulty: u8,
    reroll: ArrayVec<usize, MAX_POOL_DICE>,
}

impl NearMiss {
    #[must_use]
    pub fn pitch(&self) -> PitchType {
        self.pitch
    }

    /// 0-based positions of the pair kept through the reroll.
    #[must_use]
    pub fn pair(&self) -> [usize; 2] {
        self.pair
    }

    /// Difficulty of the pitch if the pair is completed.
    #[must_use]
    pub fn potential_difficulty(&self) -> u8 {
        self.potential_difficulty
    }

    /// 0-based positions to re-roll: every die outside the pair.
    #[must_use]
    pub fn reroll(&self) -> &[usize] {
        &self.reroll
    }
}

/// Pitches that a pair of dice is one die away from, with their potential difficulty.
///
/// `low <= high` must hold.
fn near_miss_targets(low: Die, high: Die) -> ArrayVec<(PitchType, u8), 2> {
    let (low, high) = (low.value(), high.value());
    let mut targets = ArrayVec::new();
    if low == high {
        targets.push((PitchType::Fastball, high));
        return targets;
    }
    match high - low {
        // 4-5 can only become 3-4-5, any lower pair extends upwards.
        1 if high < 6 => targets.push((PitchType::Curveball, (high + 1).min(5))),
        2 if high < 6 => targets.push((PitchType::Curveball, high)),
        _ => {}
    }
    if low % 2 == high % 2 {
        targets.push((PitchType::Changeup, high));
    }
    targets
}

/// Possible pitches and eligible near misses of one pool.
///
/// # Example
///
/// ```
/// use diceball_engine::DicePool;
/// use diceball_evaluator::pool_analysis::PoolAnalysis;
///
/// let pool = DicePool::from_values(&[1, 1, 4, 6, 6]).unwrap();
/// let analysis = PoolAnalysis::new(&pool, 3);
/// assert!(analysis.best_possible().is_none());
/// let best = analysis.near_misses().iter().map(|n| n.potential_difficulty()).max();
/// assert_eq!(best, Some(6));
///
/// // Every near miss in a 5-die pool re-rolls 3 dice.
/// assert!(PoolAnalysis::new(&pool, 2).near_misses().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct PoolAnalysis {
    possible: Vec<PossiblePitch>,
    near_misses: Vec<NearMiss>,
}

impl PoolAnalysis {
    /// Analyzes `pool`, keeping near misses that re-roll at most `reroll_budget` dice.
    #[must_use]
    pub fn new(pool: &DicePool, reroll_budget: usize) -> Self {
        let possible = possible_pitches(pool).collect();

        let dice = pool.as_slice();
        let mut near_misses = Vec::new();
        if dice.len().saturating_sub(2) <= reroll_budget {
            for i in 0..dice.len() {
                for j in i + 1..dice.len() {
                    for (pitch, potential_difficulty) in near_miss_targets(dice[i], dice[j]) {
                        near_misses.push(NearMiss {
                            pitch,
                            pair: [i, j],
                            potential_difficulty,
                            reroll: (0..dice.len()).filter(|&k| k != i && k != j).collect(),
                        });
                    }
                }
            }
        }

        Self {
            possible,
            near_misses,
        }
    }

    #[must_use]
    pub fn possible(&self) -> &[PossiblePitch] {
        &self.possible
    }

    #[must_use]
    pub fn near_misses(&self) -> &[NearMiss] {
        &self.near_misses
    }

    /// The possible pitch with the highest difficulty.
    ///
    /// Ties go to the first pitch in [`PitchType::ALL`] order.
    #[must_use]
    pub fn best_possible(&self) -> Option<&PossiblePitch> {
        self.possible.iter().min_by_key(|p| Reverse(p.difficulty))
    }
}
