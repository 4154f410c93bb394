use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{DicePoolError, DiceSeedParseError, InvalidDieError};

/// A single six-sided die showing a value in `1..=6`.
///
/// The only way to obtain a `Die` is through a checked constructor, so every
/// value held by a [`DicePool`] is a legal face.
///
/// # Example
///
/// ```
/// use diceball_engine::Die;
///
/// let die = Die::new(4).unwrap();
/// assert_eq!(die.value(), 4);
/// assert!(Die::new(0).is_none());
/// assert!(Die::new(7).is_none());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display, Serialize,
)]
#[serde(into = "u8")]
pub struct Die(u8);

impl Die {
    /// Number of faces on a die.
    pub const FACES: usize = 6;
    /// The lowest face.
    pub const ONE: Self = Self(1);
    /// The highest face.
    pub const SIX: Self = Self(6);

    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if matches!(value, 1..=6) {
            Some(Self(value))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Iterates over every face from 1 to 6.
    pub fn faces() -> impl Iterator<Item = Self> + Clone {
        (1..=6).map(Self)
    }
}

impl TryFrom<u8> for Die {
    type Error = InvalidDieError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidDieError { value })
    }
}

impl<'de> Deserialize<'de> for Die {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl From<Die> for u8 {
    fn from(die: Die) -> Self {
        die.0
    }
}

impl Distribution<Die> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Die {
        Die(rng.random_range(1..=6))
    }
}

/// Anything that can produce fresh die rolls.
///
/// The at-bat state machine and the swing resolver only ever roll through this
/// trait, which keeps them independent of the random number generator in use.
pub trait DiceSource {
    fn roll_die(&mut self) -> Die;
}

impl<T> DiceSource for &mut T
where
    T: DiceSource + ?Sized,
{
    fn roll_die(&mut self) -> Die {
        (**self).roll_die()
    }
}

/// Seed for deterministic dice generation.
///
/// A 128-bit seed for the PCG generator behind [`RandomDice`]. It is written
/// as a 32 character hex string, both on the command line and in JSON.
///
/// # Example
///
/// ```
/// use diceball_engine::{DicePool, DiceSeed, RandomDice};
///
/// let seed: DiceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
/// let first = DicePool::roll(6, &mut RandomDice::with_seed(seed));
/// let second = DicePool::roll(6, &mut RandomDice::with_seed(seed));
/// assert_eq!(first, second);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSeed([u8; 16]);

impl fmt::Display for DiceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for DiceSeed {
    type Err = DiceSeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(DiceSeedParseError::InvalidLength(s.len()));
        }
        let num = u128::from_str_radix(s, 16)
            .map_err(|_| DiceSeedParseError::InvalidHex(s.to_owned()))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for DiceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DiceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<DiceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        DiceSeed(seed)
    }
}

/// Dice rolled from a seeded PCG generator.
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: Pcg32,
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomDice {
    /// Creates a dice source from a fresh random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: DiceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }
}

impl DiceSource for RandomDice {
    fn roll_die(&mut self) -> Die {
        self.rng.random()
    }
}

/// Maximum number of dice a pool can hold.
///
/// Pitcher pools top out at 7; the largest hitter roll is 6 (4 base, 1 bonus,
/// 1 from a correct hard sit).
pub const MAX_POOL_DICE: usize = 8;

/// An ordered collection of dice, always sorted ascending.
///
/// Every constructor and mutator re-sorts the pool, so positions reported to
/// players (1-based in the UI, 0-based here) refer to the sorted order.
///
/// # Example
///
/// ```
/// use diceball_engine::DicePool;
///
/// let pool = DicePool::from_values(&[6, 2, 4]).unwrap();
/// assert_eq!(pool.to_string(), "[2, 4, 6]");
/// assert_eq!(pool.sum(), 12);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DicePool {
    dice: ArrayVec<Die, MAX_POOL_DICE>,
}

impl Serialize for DicePool {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.dice.iter().map(|d| d.value()))
    }
}

impl fmt::Display for DicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, die) in self.dice.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{die}")?;
        }
        f.write_str("]")
    }
}

impl FromIterator<Die> for DicePool {
    fn from_iter<I: IntoIterator<Item = Die>>(iter: I) -> Self {
        Self::from_dice(iter)
    }
}

impl DicePool {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dice: ArrayVec::new_const(),
        }
    }

    /// Builds a sorted pool from arbitrary dice.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_POOL_DICE`] dice are supplied.
    #[must_use]
    pub fn from_dice<I>(dice: I) -> Self
    where
        I: IntoIterator<Item = Die>,
    {
        let mut dice = dice.into_iter().collect::<ArrayVec<_, MAX_POOL_DICE>>();
        dice.sort_unstable();
        Self { dice }
    }

    /// Builds a pool from raw face values.
    ///
    /// Rejects faces outside `1..=6` and more than [`MAX_POOL_DICE`] values.
    pub fn from_values(values: &[u8]) -> Result<Self, DicePoolError> {
        if values.len() > MAX_POOL_DICE {
            return Err(DicePoolError::TooManyDice(values.len()));
        }
        values
            .iter()
            .map(|&v| Die::try_from(v))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_dice)
            .map_err(DicePoolError::InvalidDie)
    }

    /// Rolls `count` fresh dice.
    ///
    /// A count of zero yields an empty pool.
    #[must_use]
    pub fn roll<D>(count: usize, source: &mut D) -> Self
    where
        D: DiceSource + ?Sized,
    {
        assert!(
            count <= MAX_POOL_DICE,
            "cannot roll {count} dice into a pool of capacity {MAX_POOL_DICE}"
        );
        Self::from_dice((0..count).map(|_| source.roll_die()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dice.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Die] {
        &self.dice
    }

    pub fn iter(&self) -> impl Iterator<Item = Die> + '_ {
        self.dice.iter().copied()
    }

    #[must_use]
    pub fn max(&self) -> Option<Die> {
        self.dice.last().copied()
    }

    #[must_use]
    pub fn sum(&self) -> u32 {
        self.dice.iter().map(|d| u32::from(d.value())).sum()
    }

    /// Counts the dice showing exactly `face`.
    #[must_use]
    pub fn count_of(&self, face: Die) -> usize {
        self.dice.iter().filter(|&&d| d == face).count()
    }

    /// Returns the `n` highest dice in descending order.
    pub fn highest(&self, n: usize) -> impl Iterator<Item = Die> + '_ {
        self.dice.iter().rev().take(n).copied()
    }

    /// Returns the pool with the given 0-based positions removed.
    ///
    /// Positions outside the pool are ignored.
    #[must_use]
    pub fn without_positions(&self, positions: &[usize]) -> Self {
        self.dice
            .iter()
            .enumerate()
            .filter(|(i, _)| !positions.contains(i))
            .map(|(_, d)| *d)
            .collect()
    }

    /// Re-rolls the dice at the given 0-based positions and re-sorts the pool.
    ///
    /// Positions must be distinct and in range; callers validate user input
    /// before reaching this point.
    pub fn reroll_positions<D>(&mut self, positions: &[usize], source: &mut D)
    where
        D: DiceSource + ?Sized,
    {
        for &index in positions {
            self.dice[index] = source.roll_die();
        }
        self.dice.sort_unstable();
    }
}

#[cfg(test)]
pub(crate) use self::scripted::ScriptedDice;
