use serde::{Deserialize, Serialize};

use super::dice::{DicePool, Die};

/// The three pitches in every pitcher's arsenal.
///
/// Each pitch is thrown by finding a matching 3-die combination in the
/// pitcher's pool:
///
/// - **Fastball**: three of a kind (`3-3-3`)
/// - **Curveball**: a three-die run that does not use a 6 (`2-3-4`, never `4-5-6`)
/// - **Changeup**: three different dice that are all odd or all even (`1-3-5`, `2-4-6`)
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
pub enum PitchType {
    Fastball,
    Curveball,
    Changeup,
}

/// Streak category of a pitch.
///
/// Curveballs and changeups collapse into a single off-speed category.
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
pub enum PitchCategory {
    Fastball,
    #[display("Off-speed")]
    Offspeed,
}

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
pub enum PitchResult {
    #[display("STRIKE")]
    Strike,
    #[display("BALL")]
    Ball,
}

impl PitchType {
    pub const ALL: [Self; 3] = [Self::Fastball, Self::Curveball, Self::Changeup];

    /// Two-letter code used in prompts (`FB`, `CB`, `CU`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Fastball => "FB",
            Self::Curveball => "CB",
            Self::Changeup => "CU",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(code))
    }

    #[must_use]
    pub const fn category(self) -> PitchCategory {
        match self {
            Self::Fastball => PitchCategory::Fastball,
            Self::Curveball | Self::Changeup => PitchCategory::Offspeed,
        }
    }

    /// Returns whether the three dice form this pitch.
    ///
    /// # Example
    ///
    /// ```
    /// use diceball_engine::{Die, PitchType};
    ///
    /// let dice = |a, b, c| [Die::new(a).unwrap(), Die::new(b).unwrap(), Die::new(c).unwrap()];
    /// assert!(PitchType::Curveball.matches(&dice(5, 3, 4)));
    /// assert!(!PitchType::Curveball.matches(&dice(4, 5, 6)));
    /// assert!(PitchType::Changeup.matches(&dice(2, 4, 6)));
    /// ```
    #[must_use]
    pub fn matches(self, triple: &[Die; 3]) -> bool {
        let mut sorted = triple.map(Die::value);
        sorted.sort_unstable();
        let [a, b, c] = sorted;
        match self {
            Self::Fastball => a == b && b == c,
            Self::Curveball => c != 6 && a + 1 == b && b + 1 == c,
            Self::Changeup => {
                a != b && b != c && a % 2 == b % 2 && b % 2 == c % 2
            }
        }
    }
}

/// The evaluated version of a committed pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PitchAttempt {
    dice: [Die; 3],
    difficulty: u8,
    result: PitchResult,
}

impl PitchAttempt {
    fn new(dice: [Die; 3], result: PitchResult) -> Self {
        let difficulty = dice.iter().map(|d| d.value()).max().unwrap_or(0);
        Self {
            dice,
            difficulty,
            result,
        }
    }

    /// The three dice used for the attempt, ascending.
    #[must_use]
    pub fn dice(&self) -> [Die; 3] {
        self.dice
    }

    /// Raw difficulty: the highest of the three dice.
    #[must_use]
    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    #[must_use]
    pub fn result(&self) -> PitchResult {
        self.result
    }
}

/// A pitch that can be thrown from a pool as it stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PossiblePitch {
    pub pitch: PitchType,
    pub dice: [Die; 3],
    pub difficulty: u8,
}

/// Iterates over every 3-combination of positions in a pool of `len` dice.
pub fn triple_positions(len: usize) -> impl Iterator<Item = [usize; 3]> {
    (0..len).flat_map(move |i| {
        (i + 1..len).flat_map(move |j| (j + 1..len).map(move |k| [i, j, k]))
    })
}

fn triples(pool: &DicePool) -> impl Iterator<Item = [Die; 3]> + '_ {
    let dice = pool.as_slice();
    triple_positions(dice.len()).map(move |[i, j, k]| [dice[i], dice[j], dice[k]])
}

/// Returns whether any 3 dice of the pool form `pitch`.
#[must_use]
pub fn can_throw(pool: &DicePool, pitch: PitchType) -> bool {
    triples(pool).any(|t| pitch.matches(&t))
}

/// Lists every matching (pitch, triple) combination in the pool.
///
/// The same triple may appear once per pitch it satisfies, and duplicate dice
/// produce duplicate entries.
pub fn possible_pitches(pool: &DicePool) -> impl Iterator<Item = PossiblePitch> + '_ {
    PitchType::ALL.into_iter().flat_map(move |pitch| {
        triples(pool)
            .filter(move |t| pitch.matches(t))
            .map(move |dice| PossiblePitch {
                pitch,
                dice,
                difficulty: dice[2].value(),
            })
    })
}

/// Finds the best version of `pitch` available in the pool.
///
/// Among matching triples the one with the highest difficulty wins. When no
/// triple matches, the pitch is a ball thrown with the three highest dice.
///
/// # Panics
///
/// Panics if the pool holds fewer than 3 dice.
///
/// # Example
///
/// ```
/// use diceball_engine::{DicePool, PitchResult, PitchType, best_attempt};
///
/// let pool = DicePool::from_values(&[3, 3, 3, 5, 6, 6]).unwrap();
/// let attempt = best_attempt(&pool, PitchType::Fastball);
/// assert_eq!(attempt.result(), PitchResult::Strike);
/// assert_eq!(attempt.difficulty(), 3);
/// ```
#[must_use]
pub fn best_attempt(pool: &DicePool, pitch: PitchType) -> PitchAttempt {
    assert!(
        pool.len() >= 3,
        "a pitch needs at least 3 dice, got {}",
        pool.len()
    );

    // Pool is sorted, so each triple is ascending and its last die is the max.
    let best = triples(pool)
        .filter(|t| pitch.matches(t))
        .max_by_key(|t| t[2]);
    if let Some(dice) = best {
        return PitchAttempt::new(dice, PitchResult::Strike);
    }

    let mut top = [Die::ONE; 3];
    for (slot, die) in top.iter_mut().zip(pool.highest(3)) {
        *slot = die;
    }
    top.sort_unstable();
    PitchAttempt::new(top, PitchResult::Ball)
}
