use serde::{Deserialize, Serialize};

use crate::{
    AtBatOverError, ConfigError,
    core::{
        dice::{DicePool, DiceSeed, DiceSource, RandomDice},
        pitch::{PitchAttempt, PitchType, best_attempt},
        swing::{PowerTable, SwingOutcome, SwingResolution, SwingSetup, resolve_swing},
    },
};

use super::{
    count::Count,
    decision::{
        HitterApproach, HitterDecider, HitterPlan, HitterView, PitcherDecider, PitcherView,
        ResolvedReroll, SitAdjustment, SitCommitment, SwingView, sit_modifiers,
    },
    streak::Streak,
};

/// Settings fixed at the start of an at-bat.
///
/// # Example
///
/// ```
/// use diceball_engine::{AtBatConfig, PowerTable};
///
/// let config = AtBatConfig::new(6)
///     .unwrap()
///     .with_reroll_budget(Some(4))
///     .with_power_table(PowerTable::HitsOnly);
/// assert_eq!(config.pool_size(), 6);
/// assert!(AtBatConfig::new(8).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAtBatConfig")]
pub struct AtBatConfig {
    pool_size: usize,
    reroll_budget: Option<usize>,
    power_table: PowerTable,
}

/// Unchecked form of [`AtBatConfig`], validated through [`AtBatConfig::new`].
#[derive(Deserialize)]
struct RawAtBatConfig {
    pool_size: usize,
    reroll_budget: Option<usize>,
    power_table: PowerTable,
}

impl TryFrom<RawAtBatConfig> for AtBatConfig {
    type Error = ConfigError;

    fn try_from(raw: RawAtBatConfig) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.pool_size)?
            .with_reroll_budget(raw.reroll_budget)
            .with_power_table(raw.power_table))
    }
}

impl Default for AtBatConfig {
    fn default() -> Self {
        Self {
            pool_size: 5,
            reroll_budget: None,
            power_table: PowerTable::default(),
        }
    }
}

impl AtBatConfig {
    pub const MIN_POOL_SIZE: usize = 4;
    pub const MAX_POOL_SIZE: usize = 7;

    pub fn new(pool_size: usize) -> Result<Self, ConfigError> {
        if !(Self::MIN_POOL_SIZE..=Self::MAX_POOL_SIZE).contains(&pool_size) {
            return Err(ConfigError::PoolSizeOutOfRange(pool_size));
        }
        Ok(Self {
            pool_size,
            ..Self::default()
        })
    }

    /// Caps the total number of dice the pitcher may re-roll in the at-bat.
    ///
    /// `None` leaves rerolls unlimited.
    #[must_use]
    pub const fn with_reroll_budget(mut self, budget: Option<usize>) -> Self {
        self.reroll_budget = budget;
        self
    }

    #[must_use]
    pub const fn with_power_table(mut self, power_table: PowerTable) -> Self {
        self.power_table = power_table;
        self
    }

    #[must_use]
    pub const fn pool_size(&self) -> usize {
        self.pool_size
    }

    #[must_use]
    pub const fn reroll_budget(&self) -> Option<usize> {
        self.reroll_budget
    }

    #[must_use]
    pub const fn power_table(&self) -> PowerTable {
        self.power_table
    }
}

/// Where the at-bat stands within the pitch protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PitchPhase {
    NewPitch,
    ApproachChosen,
    PitcherRolled,
    SitAdjusted,
    RerollDeclared,
    SecretsCommitted,
    Revealed,
    PitchResolved,
    CountUpdated,
    Terminal,
}

impl PitchPhase {
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        use PitchPhase as P;
        matches!(
            (self, next),
            (P::NewPitch, P::ApproachChosen)
                | (P::ApproachChosen, P::PitcherRolled)
                | (P::PitcherRolled | P::SitAdjusted, P::RerollDeclared)
                | (P::PitcherRolled, P::SitAdjusted)
                | (P::RerollDeclared, P::SecretsCommitted)
                | (P::SecretsCommitted, P::Revealed)
                | (P::Revealed, P::PitchResolved)
                | (P::PitchResolved, P::CountUpdated)
                | (P::CountUpdated, P::NewPitch | P::Terminal)
        )
    }
}

/// How an at-bat ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant, Serialize,
)]
pub enum AtBatOutcome {
    #[display("WALK")]
    Walk,
    #[display("STRIKEOUT")]
    Strikeout,
    #[display("{_0}")]
    InPlay(SwingOutcome),
}

/// The hitter's resolved action on a pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HitterAction {
    /// Committed to taking before the roll; earns a bonus die.
    Take,
    /// Did not take, but secretly chose not to swing.
    Watch,
    Swing {
        setup: SwingSetup,
        resolution: SwingResolution,
    },
}

impl HitterAction {
    #[must_use]
    pub fn swing_outcome(&self) -> Option<SwingOutcome> {
        match self {
            Self::Swing { resolution, .. } => Some(resolution.outcome),
            Self::Take | Self::Watch => None,
        }
    }
}

/// The revealed record of one pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PitchReport {
    /// 1-based pitch number within the at-bat.
    pub number: usize,
    pub count_before: Count,
    pub streak_before: Streak,
    pub approach: HitterApproach,
    /// The sit as it stood when the pitch was thrown.
    pub sit: Option<SitCommitment>,
    pub rolled: DicePool,
    pub reroll: ResolvedReroll,
    pub final_pool: DicePool,
    pub pitch: PitchType,
    pub attempt: PitchAttempt,
    pub streak_modifier: i32,
    pub effective_difficulty: i32,
    pub action: HitterAction,
    pub count_after: Count,
    pub outcome: Option<AtBatOutcome>,
}

/// One hitter-versus-pitcher contest, from the first pitch to a terminal outcome.
///
/// The at-bat owns the count, the pitcher's streak, the hitter's bonus die and
/// the remaining reroll budget. Each call to [`AtBat::play_pitch`] runs the
/// whole pitch protocol against the two decision providers:
///
/// 1. hitter declares an approach
/// 2. pitcher rolls
/// 3. a hard-sitting hitter may shift the sit
/// 4. pitcher declares a reroll and secretly commits a pitch
/// 5. hitter secretly decides to swing
/// 6. reveal, execute the reroll, evaluate the pitch
/// 7. apply the streak modifier, then record the pitch in the streak
/// 8. resolve the hitter's action and update the count
///
/// # Example
///
/// ```
/// use diceball_engine::{
///     AtBat, AtBatConfig, BonusAllocation, DicePool, DiceSeed, HitterDecider, HitterPlan,
///     HitterView, PitchType, PitcherDecider, PitcherMove, PitcherView, RerollRequest,
///     SitAdjustment, SitCommitment, SwingView,
/// };
///
/// struct Patient;
///
/// impl HitterDecider for Patient {
///     fn choose_plan(&mut self, _: &HitterView) -> HitterPlan {
///         HitterPlan::Take
///     }
///     fn adjust_sit(&mut self, _: SitCommitment, _: &DicePool) -> SitAdjustment {
///         SitAdjustment::Keep
///     }
///     fn choose_swing(&mut self, _: &SwingView<'_>) -> bool {
///         false
///     }
///     fn choose_bonus_allocation(&mut self, _: &SwingView<'_>) -> BonusAllocation {
///         BonusAllocation::Contact
///     }
/// }
///
/// struct AlwaysFastball;
///
/// impl PitcherDecider for AlwaysFastball {
///     fn choose_pitcher_move(&mut self, _: &PitcherView<'_>) -> PitcherMove {
///         PitcherMove { reroll: RerollRequest::none(), pitch: PitchType::Fastball }
///     }
/// }
///
/// let seed: DiceSeed = "00000000000000000000000000000001".parse().unwrap();
/// let mut at_bat = AtBat::with_seed(AtBatConfig::default(), seed);
/// let (outcome, reports) = at_bat.play_to_end(&mut AlwaysFastball, &mut Patient);
/// assert!(outcome.is_walk() || outcome.is_strikeout());
/// assert!(reports.len() >= 3 && reports.len() <= 6);
/// ```
#[derive(Debug, Clone)]
pub struct AtBat<D = RandomDice> {
    config: AtBatConfig,
    dice: D,
    count: Count,
    streak: Streak,
    bonus_dice: u8,
    rerolls_left: Option<usize>,
    phase: PitchPhase,
    pitches: usize,
    outcome: Option<AtBatOutcome>,
}

impl AtBat<RandomDice> {
    #[must_use]
    pub fn new(config: AtBatConfig) -> Self {
        Self::with_dice(config, RandomDice::new())
    }

    /// Like [`Self::new`], but every die in the at-bat comes from `seed`.
    #[must_use]
    pub fn with_seed(config: AtBatConfig, seed: DiceSeed) -> Self {
        Self::with_dice(config, RandomDice::with_seed(seed))
    }
}

impl<D> AtBat<D>
where
    D: DiceSource,
{
    #[must_use]
    pub fn with_dice(config: AtBatConfig, dice: D) -> Self {
        Self {
            config,
            dice,
            count: Count::new(),
            streak: Streak::new(),
            bonus_dice: 0,
            rerolls_left: config.reroll_budget(),
            phase: PitchPhase::NewPitch,
            pitches: 0,
            outcome: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AtBatConfig {
        &self.config
    }

    #[must_use]
    pub fn count(&self) -> Count {
        self.count
    }

    #[must_use]
    pub fn streak(&self) -> Streak {
        self.streak
    }

    #[must_use]
    pub fn bonus_dice(&self) -> u8 {
        self.bonus_dice
    }

    #[must_use]
    pub fn phase(&self) -> PitchPhase {
        self.phase
    }

    /// Number of pitches thrown so far.
    #[must_use]
    pub fn pitches(&self) -> usize {
        self.pitches
    }

    /// Dice the pitcher may still re-roll, or `None` when unlimited.
    #[must_use]
    pub fn rerolls_left(&self) -> Option<usize> {
        self.rerolls_left
    }

    #[must_use]
    pub fn outcome(&self) -> Option<AtBatOutcome> {
        self.outcome
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    fn advance(&mut self, next: PitchPhase) {
        assert!(
            self.phase.can_advance_to(next),
            "illegal pitch phase transition {:?} -> {next:?}",
            self.phase
        );
        tracing::trace!(from = ?self.phase, to = ?next, "pitch phase");
        self.phase = next;
    }

    /// Plays one pitch through the full protocol.
    pub fn play_pitch<P, H>(
        &mut self,
        pitcher: &mut P,
        hitter: &mut H,
    ) -> Result<PitchReport, AtBatOverError>
    where
        P: PitcherDecider + ?Sized,
        H: HitterDecider + ?Sized,
    {
        if self.is_over() {
            return Err(AtBatOverError);
        }
        Ok(self.run_pitch(pitcher, hitter))
    }

    /// Plays pitches until the at-bat ends.
    pub fn play_to_end<P, H>(
        &mut self,
        pitcher: &mut P,
        hitter: &mut H,
    ) -> (AtBatOutcome, Vec<PitchReport>)
    where
        P: PitcherDecider + ?Sized,
        H: HitterDecider + ?Sized,
    {
        let mut reports = Vec::new();
        loop {
            if let Some(outcome) = self.outcome {
                return (outcome, reports);
            }
            reports.push(self.run_pitch(pitcher, hitter));
        }
    }

    fn run_pitch<P, H>(&mut self, pitcher: &mut P, hitter: &mut H) -> PitchReport
    where
        P: PitcherDecider + ?Sized,
        H: HitterDecider + ?Sized,
    {
        self.pitches += 1;
        let count_before = self.count;
        let streak_before = self.streak;

        let plan = hitter.choose_plan(&HitterView {
            count: self.count,
            streak: self.streak,
            bonus_dice: self.bonus_dice,
        });
        let mut sit = match plan {
            HitterPlan::Sit { guess, .. } => Some(SitCommitment::hard(guess)),
            HitterPlan::Take | HitterPlan::Wait { .. } => None,
        };
        self.advance(PitchPhase::ApproachChosen);

        let rolled = DicePool::roll(self.config.pool_size(), &mut self.dice);
        self.advance(PitchPhase::PitcherRolled);
        tracing::debug!(pitch = self.pitches, count = %self.count, pool = %rolled, "pitcher rolled");

        if let Some(current) = sit.filter(SitCommitment::is_hard) {
            if let SitAdjustment::Shift(guess) = hitter.adjust_sit(current, &rolled) {
                sit = Some(current.shifted(guess));
            }
            self.advance(PitchPhase::SitAdjusted);
        }

        let budget = self.rerolls_left.unwrap_or(rolled.len());
        let pitcher_move = pitcher.choose_pitcher_move(&PitcherView {
            pool: &rolled,
            count: self.count,
            streak: self.streak,
            reroll_budget: budget,
        });
        let reroll = pitcher_move
            .reroll
            .resolve(rolled.len(), self.rerolls_left);
        if !reroll.ignored.is_empty() {
            tracing::warn!(ignored = ?reroll.ignored, "ignoring reroll positions outside the pool");
        }
        if !reroll.over_budget.is_empty() {
            tracing::warn!(dropped = ?reroll.over_budget, "reroll exceeds remaining budget");
        }
        self.advance(PitchPhase::RerollDeclared);

        let swung = match plan.swing() {
            Some(swing) => {
                let kept = rolled.without_positions(&reroll.indices());
                let view = SwingView {
                    pool: &rolled,
                    reroll: &reroll,
                    kept: &kept,
                    swing,
                    sit,
                    count: self.count,
                    streak: self.streak,
                    bonus_dice: self.bonus_dice,
                    power_table: self.config.power_table(),
                };
                let swung = hitter.choose_swing(&view);
                let bonus = (swung && self.bonus_dice > 0)
                    .then(|| hitter.choose_bonus_allocation(&view));
                swung.then_some((swing, bonus))
            }
            None => None,
        };
        self.advance(PitchPhase::SecretsCommitted);

        let pitch = pitcher_move.pitch;
        let mut final_pool = rolled.clone();
        final_pool.reroll_positions(&reroll.indices(), &mut self.dice);
        if let Some(left) = &mut self.rerolls_left {
            *left -= reroll.len();
        }
        self.advance(PitchPhase::Revealed);

        let attempt = best_attempt(&final_pool, pitch);
        let category = pitch.category();
        let streak_modifier = self.streak.difficulty_modifier(category);
        let effective_difficulty = i32::from(attempt.difficulty()) + streak_modifier;
        self.streak.record(category);
        tracing::debug!(
            ?pitch,
            pool = %final_pool,
            result = %attempt.result(),
            difficulty = attempt.difficulty(),
            streak_modifier,
            "pitch evaluated"
        );

        let action = match swung {
            None if plan.approach().is_take() => {
                self.count.record_pitch(attempt.result());
                self.bonus_dice = 1;
                HitterAction::Take
            }
            None => {
                self.count.record_pitch(attempt.result());
                HitterAction::Watch
            }
            Some((archetype, bonus)) => {
                let setup = SwingSetup {
                    archetype,
                    modifiers: sit_modifiers(sit, pitch),
                    bonus,
                    difficulty: effective_difficulty,
                    power_table: self.config.power_table(),
                };
                let resolution = resolve_swing(&setup, &mut self.dice);
                self.bonus_dice = 0;
                match resolution.outcome {
                    SwingOutcome::Miss => self.count.record_strike(),
                    SwingOutcome::Foul => self.count.record_foul(),
                    outcome => self.outcome = Some(AtBatOutcome::InPlay(outcome)),
                }
                HitterAction::Swing { setup, resolution }
            }
        };
        self.advance(PitchPhase::PitchResolved);

        if self.outcome.is_none() {
            if self.count.is_strikeout() {
                self.outcome = Some(AtBatOutcome::Strikeout);
            } else if self.count.is_walk() {
                self.outcome = Some(AtBatOutcome::Walk);
            }
        }
        self.advance(PitchPhase::CountUpdated);

        if let Some(outcome) = self.outcome {
            tracing::info!(%outcome, pitches = self.pitches, count = %self.count, "at-bat over");
            self.advance(PitchPhase::Terminal);
        } else {
            self.advance(PitchPhase::NewPitch);
        }

        PitchReport {
            number: self.pitches,
            count_before,
            streak_before,
            approach: plan.approach(),
            sit,
            rolled,
            reroll,
            final_pool,
            pitch,
            attempt,
            streak_modifier,
            effective_difficulty,
            action,
            count_after: self.count,
            outcome: self.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::core::{
        dice::ScriptedDice,
        pitch::PitchResult,
        swing::{BonusAllocation, SwingArchetype},
    };
    use crate::engine::decision::{PitcherMove, RerollRequest};

    #[derive(Debug, Default)]
    struct ScriptedPitcher {
        moves: VecDeque<PitcherMove>,
        budgets: Vec<usize>,
    }

    impl ScriptedPitcher {
        fn throwing(pitches: &[PitchType]) -> Self {
            Self {
                moves: pitches
                    .iter()
                    .map(|&pitch| PitcherMove {
                        reroll: RerollRequest::none(),
                        pitch,
                    })
                    .collect(),
                budgets: Vec::new(),
            }
        }
    }

    impl PitcherDecider for ScriptedPitcher {
        fn choose_pitcher_move(&mut self, view: &PitcherView<'_>) -> PitcherMove {
            self.budgets.push(view.reroll_budget);
            self.moves.pop_front().expect("pitcher script exhausted")
        }
    }

    #[derive(Debug, Default)]
    struct ScriptedHitter {
        plans: VecDeque<HitterPlan>,
        swings: VecDeque<bool>,
        shift: Option<PitchType>,
        allocation: Option<BonusAllocation>,
        allocations_asked: usize,
        seen_kept: Vec<DicePool>,
    }

    impl ScriptedHitter {
        fn new(plans: &[HitterPlan], swings: &[bool]) -> Self {
            Self {
                plans: plans.iter().copied().collect(),
                swings: swings.iter().copied().collect(),
                allocation: Some(BonusAllocation::Contact),
                ..Self::default()
            }
        }
    }

    impl HitterDecider for ScriptedHitter {
        fn choose_plan(&mut self, _view: &HitterView) -> HitterPlan {
            self.plans.pop_front().expect("hitter script exhausted")
        }

        fn adjust_sit(&mut self, _sit: SitCommitment, _pool: &DicePool) -> SitAdjustment {
            self.shift.map_or(SitAdjustment::Keep, SitAdjustment::Shift)
        }

        fn choose_swing(&mut self, view: &SwingView<'_>) -> bool {
            self.seen_kept.push(view.kept.clone());
            self.swings.pop_front().unwrap_or(false)
        }

        fn choose_bonus_allocation(&mut self, _view: &SwingView<'_>) -> BonusAllocation {
            self.allocations_asked += 1;
            self.allocation.unwrap()
        }
    }

    const WAIT_BALANCED: HitterPlan = HitterPlan::Wait {
        swing: SwingArchetype::Balanced,
    };

    fn at_bat(pool_size: usize, dice: &[u8]) -> AtBat<ScriptedDice> {
        AtBat::with_dice(AtBatConfig::new(pool_size).unwrap(), ScriptedDice::new(dice))
    }

    #[test]
    fn test_config_rejects_pool_size() {
        assert_eq!(
            AtBatConfig::new(3),
            Err(ConfigError::PoolSizeOutOfRange(3))
        );
        assert!(AtBatConfig::new(4).is_ok());
        assert!(AtBatConfig::new(7).is_ok());
    }

    #[test]
    fn test_deserialized_config_is_validated() {
        let config = AtBatConfig::new(6).unwrap().with_reroll_budget(Some(3));
        let mut json = serde_json::to_value(config).unwrap();
        assert_eq!(serde_json::from_value::<AtBatConfig>(json.clone()).unwrap(), config);

        json["pool_size"] = serde_json::json!(2);
        let err = serde_json::from_value::<AtBatConfig>(json).unwrap_err();
        assert!(err.to_string().contains("pool size must be between 4 and 7"));
    }

    #[test]
    fn test_phase_transitions() {
        assert!(PitchPhase::PitcherRolled.can_advance_to(PitchPhase::SitAdjusted));
        assert!(PitchPhase::PitcherRolled.can_advance_to(PitchPhase::RerollDeclared));
        assert!(!PitchPhase::NewPitch.can_advance_to(PitchPhase::Revealed));
        assert!(!PitchPhase::Terminal.can_advance_to(PitchPhase::NewPitch));
    }

    #[test]
    fn test_take_ball_grants_bonus_die_then_swing_uses_it() {
        // Pitch 1: no fastball in [1,2,3,4,6] -> ball.
        // Pitch 2: [2,2,2,5,6] fastball diff 2; contact 3 base + 1 bonus = 4 dice.
        let mut at_bat = at_bat(5, &[1, 2, 3, 4, 6, 2, 2, 2, 5, 6, 1, 1, 1, 1]);
        let mut pitcher = ScriptedPitcher::throwing(&[PitchType::Fastball, PitchType::Fastball]);
        let mut hitter = ScriptedHitter::new(&[HitterPlan::Take, WAIT_BALANCED], &[true]);

        let first = at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        assert_eq!(first.attempt.result(), PitchResult::Ball);
        assert_eq!(first.action, HitterAction::Take);
        assert_eq!(at_bat.count().balls(), 1);
        assert_eq!(at_bat.bonus_dice(), 1);

        let second = at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        let HitterAction::Swing { setup, resolution } = &second.action else {
            panic!("expected a swing, got {:?}", second.action);
        };
        assert_eq!(setup.bonus, Some(BonusAllocation::Contact));
        assert_eq!(resolution.dice.contact, 4);
        assert_eq!(resolution.contact_roll.len(), 4);
        assert_eq!(resolution.outcome, SwingOutcome::Miss);
        assert_eq!(hitter.allocations_asked, 1);
        assert_eq!(at_bat.bonus_dice(), 0);
        assert_eq!(at_bat.count(), Count::with(1, 1));
    }

    #[test]
    fn test_bonus_die_persists_across_takes() {
        let mut at_bat = at_bat(4, &[1, 1, 1, 2, 1, 1, 1, 2]);
        let mut pitcher = ScriptedPitcher::throwing(&[PitchType::Fastball; 2]);
        let mut hitter = ScriptedHitter::new(&[HitterPlan::Take, HitterPlan::Take], &[]);
        at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        assert_eq!(at_bat.bonus_dice(), 1);
        assert_eq!(at_bat.count(), Count::with(0, 2));
    }

    #[test]
    fn test_watching_does_not_grant_bonus() {
        let mut at_bat = at_bat(4, &[1, 2, 4, 6]);
        let mut pitcher = ScriptedPitcher::throwing(&[PitchType::Fastball]);
        let mut hitter = ScriptedHitter::new(&[WAIT_BALANCED], &[false]);
        let report = at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        assert_eq!(report.action, HitterAction::Watch);
        assert_eq!(at_bat.bonus_dice(), 0);
        assert_eq!(at_bat.count(), Count::with(1, 0));
        assert_eq!(hitter.allocations_asked, 0);
    }

    #[test]
    fn test_foul_with_two_strikes_does_not_strike_out() {
        // Two called strikes, then a swing whose contact roll is [1, 2, 6].
        let mut at_bat = at_bat(4, &[3, 3, 3, 1, 3, 3, 3, 1, 5, 5, 5, 1, 1, 2, 6]);
        let mut pitcher = ScriptedPitcher::throwing(&[PitchType::Fastball; 3]);
        let mut hitter = ScriptedHitter::new(
            &[WAIT_BALANCED, WAIT_BALANCED, WAIT_BALANCED],
            &[false, false, true],
        );
        at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        assert_eq!(at_bat.count(), Count::with(0, 2));

        // Third fastball in a row: difficulty 5 - 1 = 4; only the 6 succeeds.
        let report = at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        assert_eq!(report.streak_modifier, -1);
        assert_eq!(report.effective_difficulty, 4);
        assert_eq!(report.action.swing_outcome(), Some(SwingOutcome::Foul));
        assert_eq!(at_bat.count(), Count::with(0, 2));
        assert!(!at_bat.is_over());
    }

    #[test]
    fn test_batted_ball_ends_at_bat() {
        // Hard sit on fastball, correct: +2 per contact die, +1 power die.
        let mut at_bat = at_bat(4, &[4, 4, 4, 1, 2, 3, 1, 6, 6, 6, 6]);
        let mut pitcher = ScriptedPitcher::throwing(&[PitchType::Fastball]);
        let plan = HitterPlan::Sit {
            guess: PitchType::Fastball,
            swing: SwingArchetype::Balanced,
        };
        let mut hitter = ScriptedHitter::new(&[plan], &[true]);
        let report = at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();

        let HitterAction::Swing { setup, resolution } = &report.action else {
            panic!("expected a swing");
        };
        assert_eq!(setup.modifiers.contact_roll_bonus, 2);
        assert_eq!(resolution.dice.power, 4);
        // Contact [1,2,3] +2 vs difficulty 4: two successes.
        assert_eq!(resolution.outcome, SwingOutcome::HomeRun);
        assert_eq!(
            report.outcome,
            Some(AtBatOutcome::InPlay(SwingOutcome::HomeRun))
        );
        assert!(at_bat.phase().is_terminal());
        assert_eq!(
            at_bat.play_pitch(&mut pitcher, &mut hitter),
            Err(AtBatOverError)
        );
    }

    #[test]
    fn test_shifted_sit_wrong_is_penalised() {
        let mut at_bat = at_bat(4, &[4, 4, 4, 1, 6]);
        let mut pitcher = ScriptedPitcher::throwing(&[PitchType::Fastball]);
        let plan = HitterPlan::Sit {
            guess: PitchType::Fastball,
            swing: SwingArchetype::Power,
        };
        let mut hitter = ScriptedHitter::new(&[plan], &[true]);
        hitter.shift = Some(PitchType::Changeup);
        let report = at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();

        let sit = report.sit.unwrap();
        assert!(!sit.is_hard());
        assert_eq!(sit.guess(), PitchType::Changeup);
        let HitterAction::Swing { resolution, .. } = &report.action else {
            panic!("expected a swing");
        };
        // Power swing 2 contact - 1 = 1 die; a lone 6 fouls.
        assert_eq!(resolution.dice.contact, 1);
        assert_eq!(resolution.dice.power, 3);
        assert_eq!(resolution.outcome, SwingOutcome::Foul);
        assert_eq!(at_bat.count(), Count::with(0, 1));
    }

    #[test]
    fn test_reroll_executes_and_ignores_bad_positions() {
        let mut at_bat = at_bat(5, &[1, 2, 5, 5, 5, 5]);
        let mut pitcher = ScriptedPitcher::default();
        pitcher.moves.push_back(PitcherMove {
            reroll: RerollRequest::from_positions([1, 9, 0]),
            pitch: PitchType::Fastball,
        });
        let mut hitter = ScriptedHitter::new(&[WAIT_BALANCED], &[false]);
        let report = at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();

        assert_eq!(report.reroll.positions, [1]);
        assert_eq!(report.reroll.ignored, [9, 0]);
        assert_eq!(hitter.seen_kept, [DicePool::from_values(&[2, 5, 5, 5]).unwrap()]);
        assert_eq!(
            report.final_pool,
            DicePool::from_values(&[2, 5, 5, 5, 5]).unwrap()
        );
        assert!(report.attempt.result().is_strike());
        assert_eq!(at_bat.count(), Count::with(0, 1));
    }

    #[test]
    fn test_reroll_budget_is_enforced_and_spent() {
        let mut at_bat = AtBat::with_dice(
            AtBatConfig::new(4).unwrap().with_reroll_budget(Some(3)),
            ScriptedDice::new(&[1, 2, 3, 4, 6, 6, 1, 2, 3, 4, 6]),
        );
        let mut pitcher = ScriptedPitcher::default();
        for _ in 0..2 {
            pitcher.moves.push_back(PitcherMove {
                reroll: RerollRequest::from_positions([1, 2]),
                pitch: PitchType::Curveball,
            });
        }
        let mut hitter = ScriptedHitter::new(&[HitterPlan::Take, HitterPlan::Take], &[]);

        let first = at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        assert_eq!(first.reroll.positions, [1, 2]);
        assert_eq!(at_bat.rerolls_left(), Some(1));

        let second = at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        assert_eq!(second.reroll.positions, [1]);
        assert_eq!(second.reroll.over_budget, [2]);
        assert_eq!(at_bat.rerolls_left(), Some(0));
        assert_eq!(pitcher.budgets, [3, 1]);
    }

    #[test]
    fn test_streak_setup_bonus_applies_to_breaking_pitch() {
        let mut at_bat = at_bat(4, &[1, 1, 1, 2, 1, 1, 1, 2, 1, 2, 3, 6]);
        let mut pitcher = ScriptedPitcher::throwing(&[
            PitchType::Fastball,
            PitchType::Fastball,
            PitchType::Curveball,
        ]);
        let mut hitter =
            ScriptedHitter::new(&[HitterPlan::Take, HitterPlan::Take, HitterPlan::Take], &[]);
        at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        let third = at_bat.play_pitch(&mut pitcher, &mut hitter).unwrap();
        assert_eq!(third.attempt.difficulty(), 3);
        assert_eq!(third.streak_modifier, 1);
        assert_eq!(third.effective_difficulty, 4);
        assert_eq!(at_bat.streak(), Streak::with(PitchType::Curveball.category(), 1));
        // Three called strikes.
        assert_eq!(at_bat.outcome(), Some(AtBatOutcome::Strikeout));
    }

    #[test]
    fn test_four_balls_walk() {
        let mut at_bat = at_bat(4, &[1u8, 2, 4, 6].repeat(4));
        let mut pitcher = ScriptedPitcher::throwing(&[PitchType::Fastball; 4]);
        let mut hitter = ScriptedHitter::new(&[HitterPlan::Take; 4], &[]);
        let (outcome, reports) = at_bat.play_to_end(&mut pitcher, &mut hitter);
        assert_eq!(outcome, AtBatOutcome::Walk);
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[3].count_after, Count::with(4, 0));
    }

    #[test]
    fn test_seeded_at_bats_are_reproducible() {
        let seed: DiceSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
        let play = || {
            let mut at_bat = AtBat::with_seed(AtBatConfig::default(), seed);
            let mut pitcher = ScriptedPitcher::throwing(&[PitchType::Changeup; 8]);
            let mut hitter = ScriptedHitter::new(&[HitterPlan::Take; 8], &[]);
            at_bat.play_to_end(&mut pitcher, &mut hitter)
        };
        assert_eq!(play(), play());
    }
}
