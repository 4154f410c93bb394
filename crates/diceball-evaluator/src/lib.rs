//! Automated decision making and decision support for diceball.
//!
//! - [`pool_analysis`] - What a rolled pool can throw now, and which pairs are
//!   one die away from a pitch
//! - [`pitcher_evaluator`] - The automated pitcher, choosing a reroll and a
//!   pitch from the count, streak and reroll budget
//! - [`bats`] - B.A.T.S., exact outcome odds shown to the hitter before the
//!   swing decision
//!
//! # Architecture
//!
//! ```text
//! PitcherEvaluator (PitcherDecider)      bats::calculate
//!     ↓ uses                                 ↓ uses
//! PoolAnalysis                           pitch / swing rules of diceball-engine
//! ```
//!
//! Nothing here mutates at-bat state. The evaluator only sees the
//! [`PitcherView`](diceball_engine::PitcherView) handed to it, and the
//! analytics work on a copy of what the hitter can see.

pub mod bats;
pub mod pitcher_evaluator;
pub mod pool_analysis;
