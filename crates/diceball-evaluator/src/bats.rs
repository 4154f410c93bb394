//! B.A.T.S.: exact outcome odds for the hitter's swing decision.
//!
//! Given the dice the pitcher keeps, how many dice will be re-rolled and the
//! hitter's swing, [`calculate`] reports for every pitch type (and every
//! allocation of an available bonus die) the chance that:
//!
//! - the pitcher completes the pitch (`pitch_success_prob`)
//! - the contact roll puts the ball in play (`contact_prob`)
//! - the power roll lands in each tier of the power table (`power`)
//!
//! and combines them as `P(tier) = pitch_success_prob * contact_prob * power[tier]`.
//!
//! Every probability is computed by walking all `6^n` outcomes of the dice
//! involved; nothing is sampled. At most 7 pitcher dice and 6 power dice are
//! ever enumerated.
//!
//! The pitch difficulty the hitter will face is not known before the reveal,
//! so contact odds are computed against an estimate: the best difficulty of
//! the pitch among the kept dice (3 when it cannot be made from them), plus
//! the streak modifier that pitch would receive.

use diceball_engine::{
    BonusAllocation, DicePool, Die, MAX_POOL_DICE, PitchType, PowerTable, SitCommitment,
    Streak, SwingArchetype, SwingDice, SwingOutcome, SwingView, best_attempt, can_throw,
    judge_contact, sit_modifiers,
};
use serde::Serialize;

/// Difficulty assumed when the kept dice cannot make the pitch.
pub const DEFAULT_DIFFICULTY: i32 = 3;

/// Calls `f` with every possible roll of `count` dice.
fn for_each_roll<F>(count: usize, mut f: F)
where
    F: FnMut(&[Die]),
{
    let mut roll = vec![Die::ONE; count];
    loop {
        f(&roll);
        // Odometer increment, least significant die first.
        let mut i = 0;
        loop {
            if i == count {
                return;
            }
            if roll[i] == Die::SIX {
                roll[i] = Die::ONE;
                i += 1;
            } else {
                roll[i] = Die::new(roll[i].value() + 1).unwrap_or(Die::SIX);
                break;
            }
        }
    }
}

/// Fraction of all rolls of `count` dice for which `pred` holds.
fn fraction_of_rolls<F>(count: usize, mut pred: F) -> f64
where
    F: FnMut(&[Die]) -> bool,
{
    let mut hits = 0_u32;
    let mut total = 0_u32;
    for_each_roll(count, |roll| {
        total += 1;
        if pred(roll) {
            hits += 1;
        }
    });
    f64::from(hits) / f64::from(total)
}

/// Chance that the final pool can make `pitch`.
///
/// # Panics
///
/// Panics if `kept.len() + reroll_count` exceeds [`MAX_POOL_DICE`].
///
/// # Example
///
/// ```
/// use diceball_engine::{DicePool, PitchType};
/// use diceball_evaluator::bats::pitch_success_prob;
///
/// let kept = DicePool::from_values(&[2, 2]).unwrap();
/// let p = pitch_success_prob(&kept, 1, PitchType::Fastball);
/// assert!((p - 1.0 / 6.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn pitch_success_prob(kept: &DicePool, reroll_count: usize, pitch: PitchType) -> f64 {
    assert!(
        kept.len() + reroll_count <= MAX_POOL_DICE,
        "cannot evaluate a pool of {} dice",
        kept.len() + reroll_count
    );
    if kept.len() + reroll_count < 3 {
        return 0.0;
    }
    if can_throw(kept, pitch) {
        return 1.0;
    }
    if reroll_count == 0 {
        return 0.0;
    }
    fraction_of_rolls(reroll_count, |roll| {
        let pool = kept.iter().chain(roll.iter().copied()).collect::<DicePool>();
        can_throw(&pool, pitch)
    })
}

/// Chance that `contact_dice` dice put the ball in play.
///
/// Zero dice can never make contact.
#[must_use]
pub fn contact_prob(contact_dice: usize, contact_roll_bonus: i8, difficulty: i32) -> f64 {
    if contact_dice == 0 {
        return 0.0;
    }
    fraction_of_rolls(contact_dice, |roll| {
        judge_contact(roll, contact_roll_bonus, difficulty).is_in_play()
    })
}

/// Probability of each power table tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PowerProbs {
    pub home_run: f64,
    pub double: f64,
    pub single: f64,
    pub out: f64,
    pub weak_out: f64,
}

impl PowerProbs {
    fn slot_mut(&mut self, outcome: SwingOutcome) -> Option<&mut f64> {
        match outcome {
            SwingOutcome::HomeRun => Some(&mut self.home_run),
            SwingOutcome::Double => Some(&mut self.double),
            SwingOutcome::Single => Some(&mut self.single),
            SwingOutcome::Out => Some(&mut self.out),
            SwingOutcome::WeakOut => Some(&mut self.weak_out),
            SwingOutcome::Miss | SwingOutcome::Foul => None,
        }
    }
}

/// Distribution of `power_dice` dice over the tiers of `table`.
///
/// Zero dice always total 0.
#[must_use]
pub fn power_probs(power_dice: usize, table: PowerTable) -> PowerProbs {
    let mut probs = PowerProbs::default();
    let mut total = 0_u32;
    let mut counts = [0_u32; 5];
    let tiers = [
        SwingOutcome::HomeRun,
        SwingOutcome::Double,
        SwingOutcome::Single,
        SwingOutcome::Out,
        SwingOutcome::WeakOut,
    ];
    for_each_roll(power_dice, |roll| {
        total += 1;
        let sum = roll.iter().map(|d| u32::from(d.value())).sum();
        let outcome = table.tier(sum);
        if let Some(slot) = tiers.iter().position(|&t| t == outcome) {
            counts[slot] += 1;
        }
    });
    for (tier, count) in tiers.into_iter().zip(counts) {
        if let Some(slot) = probs.slot_mut(tier) {
            *slot = f64::from(count) / f64::from(total);
        }
    }
    probs
}

/// Difficulty the hitter should expect for `pitch`.
#[must_use]
pub fn estimated_difficulty(kept: &DicePool, pitch: PitchType, streak: Streak) -> i32 {
    let base = if kept.len() >= 3 && can_throw(kept, pitch) {
        i32::from(best_attempt(kept, pitch).difficulty())
    } else {
        DEFAULT_DIFFICULTY
    };
    base + streak.difficulty_modifier(pitch.category())
}

/// Everything the hitter knows when deciding to swing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatsQuery {
    /// Dice the pitcher keeps through the announced reroll.
    pub kept: DicePool,
    pub reroll_count: usize,
    pub swing: SwingArchetype,
    pub sit: Option<SitCommitment>,
    pub bonus_dice: u8,
    pub streak: Streak,
    pub power_table: PowerTable,
}

impl BatsQuery {
    #[must_use]
    pub fn from_swing_view(view: &SwingView<'_>) -> Self {
        Self {
            kept: view.kept.clone(),
            reroll_count: view.reroll.len(),
            swing: view.swing,
            sit: view.sit,
            bonus_dice: view.bonus_dice,
            streak: view.streak,
            power_table: view.power_table,
        }
    }

    /// Bonus allocations worth evaluating.
    fn allocations(&self) -> Vec<Option<BonusAllocation>> {
        if self.bonus_dice > 0 {
            vec![Some(BonusAllocation::Contact), Some(BonusAllocation::Power)]
        } else {
            vec![None]
        }
    }
}

/// Odds against one pitch type with one bonus allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatsEntry {
    pub pitch: PitchType,
    pub bonus: Option<BonusAllocation>,
    pub pitch_success_prob: f64,
    pub estimated_difficulty: i32,
    pub dice: SwingDice,
    pub contact_prob: f64,
    pub power: PowerProbs,
    pub single_prob: f64,
    pub double_prob: f64,
    pub home_run_prob: f64,
}

impl BatsEntry {
    /// Chance of any hit against this pitch.
    #[must_use]
    pub fn hit_prob(&self) -> f64 {
        self.single_prob + self.double_prob + self.home_run_prob
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatsReport {
    pub entries: Vec<BatsEntry>,
}

impl BatsReport {
    #[must_use]
    pub fn entry(&self, pitch: PitchType, bonus: Option<BonusAllocation>) -> Option<&BatsEntry> {
        self.entries
            .iter()
            .find(|e| e.pitch == pitch && e.bonus == bonus)
    }
}

/// Runs the analytics for every pitch type and bonus allocation.
///
/// Entries are ordered by allocation, then by [`PitchType::ALL`].
///
/// # Example
///
/// ```
/// use diceball_engine::{DicePool, PowerTable, Streak, SwingArchetype};
/// use diceball_evaluator::bats::{BatsQuery, calculate};
///
/// let query = BatsQuery {
///     kept: DicePool::from_values(&[3, 3, 3]).unwrap(),
///     reroll_count: 2,
///     swing: SwingArchetype::Balanced,
///     sit: None,
///     bonus_dice: 0,
///     streak: Streak::new(),
///     power_table: PowerTable::Tiered,
/// };
/// let report = calculate(&query);
/// assert_eq!(report.entries.len(), 3);
/// assert_eq!(report.entries[0].pitch_success_prob, 1.0);
/// ```
#[must_use]
pub fn calculate(query: &BatsQuery) -> BatsReport {
    let mut entries = Vec::new();
    for bonus in query.allocations() {
        for pitch in PitchType::ALL {
            let modifiers = sit_modifiers(query.sit, pitch);
            let dice = SwingDice::new(query.swing, bonus, modifiers);
            let pitch_success_prob = pitch_success_prob(&query.kept, query.reroll_count, pitch);
            let estimated_difficulty = estimated_difficulty(&query.kept, pitch, query.streak);
            let contact_prob = contact_prob(
                dice.contact,
                modifiers.contact_roll_bonus,
                estimated_difficulty,
            );
            let power = power_probs(dice.power, query.power_table);
            let in_play = pitch_success_prob * contact_prob;
            entries.push(BatsEntry {
                pitch,
                bonus,
                pitch_success_prob,
                estimated_difficulty,
                dice,
                contact_prob,
                power,
                single_prob: in_play * power.single,
                double_prob: in_play * power.double,
                home_run_prob: in_play * power.home_run,
            });
        }
    }
    tracing::debug!(?query, entries = entries.len(), "b.a.t.s. calculated");
    BatsReport { entries }
}
