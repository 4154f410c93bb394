use serde::{Deserialize, Serialize};

use super::dice::{DicePool, DiceSource, Die};

/// How the hitter splits their swing between contact and power.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::FromStr,
    Serialize,
    Deserialize,
)]
pub enum SwingArchetype {
    Power,
    Contact,
    #[default]
    Balanced,
}

impl SwingArchetype {
    pub const ALL: [Self; 3] = [Self::Power, Self::Contact, Self::Balanced];

    /// Base `(contact_dice, power_dice)` before any bonus or modifier.
    #[must_use]
    pub const fn base_dice(self) -> (u8, u8) {
        match self {
            Self::Power => (2, 4),
            Self::Contact => (4, 2),
            Self::Balanced => (3, 3),
        }
    }
}

/// Where the hitter places a bonus die earned by taking a pitch.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::FromStr,
    Serialize,
    Deserialize,
)]
pub enum BonusAllocation {
    Contact,
    Power,
}

/// Adjustments applied to a swing by the hitter's sit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwingModifiers {
    /// Added to the number of contact dice.
    pub contact_dice: i8,
    /// Added to the number of power dice.
    pub power_dice: i8,
    /// Added to every contact die before comparing against the difficulty.
    pub contact_roll_bonus: i8,
}

impl SwingModifiers {
    pub const NONE: Self = Self {
        contact_dice: 0,
        power_dice: 0,
        contact_roll_bonus: 0,
    };
    pub const HARD_SIT_CORRECT: Self = Self {
        contact_dice: 0,
        power_dice: 1,
        contact_roll_bonus: 2,
    };
    pub const SOFT_SIT_CORRECT: Self = Self {
        contact_dice: 0,
        power_dice: 0,
        contact_roll_bonus: 1,
    };
    /// Hard and shifted sits share the same penalty when wrong.
    pub const SIT_WRONG: Self = Self {
        contact_dice: -1,
        power_dice: -1,
        contact_roll_bonus: 0,
    };
}

/// Final number of dice rolled for a swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwingDice {
    pub contact: usize,
    pub power: usize,
}

impl SwingDice {
    /// Applies the bonus die and modifiers to the archetype's base dice.
    ///
    /// Both counts are floored at zero.
    #[must_use]
    pub fn new(
        archetype: SwingArchetype,
        bonus: Option<BonusAllocation>,
        modifiers: SwingModifiers,
    ) -> Self {
        let (mut contact, mut power) = archetype.base_dice();
        match bonus {
            Some(BonusAllocation::Contact) => contact += 1,
            Some(BonusAllocation::Power) => power += 1,
            None => {}
        }
        let apply = |base: u8, delta: i8| {
            usize::try_from((i16::from(base) + i16::from(delta)).max(0)).unwrap_or(0)
        };
        Self {
            contact: apply(contact, modifiers.contact_dice),
            power: apply(power, modifiers.power_dice),
        }
    }
}

/// Result of a single swing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::IsVariant,
    Serialize,
    Deserialize,
)]
pub enum SwingOutcome {
    #[display("MISS")]
    Miss,
    #[display("FOUL")]
    Foul,
    #[display("SINGLE")]
    Single,
    #[display("DOUBLE")]
    Double,
    #[display("HOME RUN")]
    HomeRun,
    #[display("OUT")]
    Out,
    #[display("WEAK OUT")]
    WeakOut,
}

impl SwingOutcome {
    /// Whether the ball was put in play, which ends the at-bat.
    #[must_use]
    pub const fn is_batted_ball(self) -> bool {
        !matches!(self, Self::Miss | Self::Foul)
    }
}

/// Maps a power roll total to a batted-ball outcome.
///
/// Two tier tables exist. [`PowerTable::Tiered`] splits low totals into
/// routine and weak outs; [`PowerTable::HitsOnly`] turns every ball in play
/// into at least a single. The swing resolver and the probability analytics
/// both read from the table configured for the at-bat.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::FromStr,
    Serialize,
    Deserialize,
)]
pub enum PowerTable {
    #[default]
    Tiered,
    HitsOnly,
}

impl PowerTable {
    pub const HOME_RUN_MIN: u32 = 17;
    pub const DOUBLE_MIN: u32 = 14;
    pub const SINGLE_MIN: u32 = 11;
    pub const OUT_MIN: u32 = 7;

    #[must_use]
    pub const fn tier(self, power_total: u32) -> SwingOutcome {
        if power_total >= Self::HOME_RUN_MIN {
            return SwingOutcome::HomeRun;
        }
        if power_total >= Self::DOUBLE_MIN {
            return SwingOutcome::Double;
        }
        match self {
            Self::HitsOnly => SwingOutcome::Single,
            Self::Tiered => {
                if power_total >= Self::SINGLE_MIN {
                    SwingOutcome::Single
                } else if power_total >= Self::OUT_MIN {
                    SwingOutcome::Out
                } else {
                    SwingOutcome::WeakOut
                }
            }
        }
    }
}

/// Whether the contact roll put the ball in play, fouled it off, or missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ContactQuality {
    InPlay,
    Foul,
    Miss,
}

/// Judges a contact roll against the pitch difficulty.
///
/// Two or more natural 6s always put the ball in play, whatever the
/// difficulty. Otherwise two successful dice are needed, and a single success
/// fouls the pitch off.
#[must_use]
pub fn judge_contact(roll: &[Die], contact_roll_bonus: i8, difficulty: i32) -> ContactQuality {
    let critical = roll.iter().filter(|&&d| d == Die::SIX).count() >= 2;
    let successes = roll
        .iter()
        .filter(|d| i32::from(d.value()) + i32::from(contact_roll_bonus) >= difficulty)
        .count();
    if successes >= 2 || critical {
        ContactQuality::InPlay
    } else if successes == 1 {
        ContactQuality::Foul
    } else {
        ContactQuality::Miss
    }
}

/// Everything the resolver needs to settle a swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwingSetup {
    pub archetype: SwingArchetype,
    pub modifiers: SwingModifiers,
    pub bonus: Option<BonusAllocation>,
    /// Effective difficulty of the pitch, after streak modifiers.
    pub difficulty: i32,
    pub power_table: PowerTable,
}

/// The dice and outcome of a resolved swing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwingResolution {
    pub dice: SwingDice,
    pub contact_roll: DicePool,
    pub critical: bool,
    /// Present only when contact was made.
    pub power_roll: Option<DicePool>,
    pub outcome: SwingOutcome,
}

/// Rolls a swing and determines its outcome.
///
/// # Example
///
/// ```
/// use diceball_engine::{PowerTable, RandomDice, SwingArchetype, SwingModifiers, SwingSetup, resolve_swing};
///
/// let setup = SwingSetup {
///     archetype: SwingArchetype::Balanced,
///     modifiers: SwingModifiers::NONE,
///     bonus: None,
///     difficulty: 4,
///     power_table: PowerTable::Tiered,
/// };
/// let resolution = resolve_swing(&setup, &mut RandomDice::new());
/// assert_eq!(resolution.contact_roll.len(), 3);
/// ```
pub fn resolve_swing<D>(setup: &SwingSetup, source: &mut D) -> SwingResolution
where
    D: DiceSource + ?Sized,
{
    let dice = SwingDice::new(setup.archetype, setup.bonus, setup.modifiers);
    let contact_roll = DicePool::roll(dice.contact, source);
    let critical = contact_roll.count_of(Die::SIX) >= 2;
    let quality = judge_contact(
        contact_roll.as_slice(),
        setup.modifiers.contact_roll_bonus,
        setup.difficulty,
    );

    let (power_roll, outcome) = match quality {
        ContactQuality::InPlay => {
            let power_roll = DicePool::roll(dice.power, source);
            let outcome = setup.power_table.tier(power_roll.sum());
            (Some(power_roll), outcome)
        }
        ContactQuality::Foul => (None, SwingOutcome::Foul),
        ContactQuality::Miss => (None, SwingOutcome::Miss),
    };

    tracing::debug!(
        contact = %contact_roll,
        critical,
        difficulty = setup.difficulty,
        ?outcome,
        "swing resolved"
    );

    SwingResolution {
        dice,
        contact_roll,
        critical,
        power_roll,
        outcome,
    }
}
