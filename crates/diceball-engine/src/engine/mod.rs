//! At-bat state and the pitch protocol.
//!
//! - [`AtBat`] - One at-bat, played pitch by pitch
//! - [`Count`] - Balls and strikes
//! - [`Streak`] - Consecutive pitches of one category and their difficulty modifier
//! - [`PitcherDecider`] / [`HitterDecider`] - Where the players' choices come from
//!
//! # Pitch Flow
//!
//! 1. Hitter declares TAKE, SIT (with a guess) or WAIT
//! 2. Pitcher rolls the pool
//! 3. A hard-sitting hitter may shift the guess
//! 4. Pitcher announces a reroll and secretly commits a pitch
//! 5. A hitter who did not take secretly decides to swing
//! 6. Everything is revealed and the pitch is resolved
//!
//! Each call to [`AtBat::play_pitch`] runs the whole flow and returns a
//! [`PitchReport`].

pub use self::{at_bat::*, count::*, decision::*, streak::*};

pub(crate) mod at_bat;
pub(crate) mod count;
pub(crate) mod decision;
pub(crate) mod streak;
