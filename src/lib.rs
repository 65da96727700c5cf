//! # Yahtzee: optimal solitaire solver and coach
//!
//! Computes the expected final score under optimal play for every reachable
//! turn-start state using **backward induction** (retrograde analysis), then
//! uses that table to grade moves while a game is played.
//!
//! ## Algorithm overview
//!
//! | Phase | Rust module | Description |
//! |-------|-------------|-------------|
//! | 0 | [`dice_store`], [`dice_selection`] | Every dice multiset of size 0..=5, keep deduplication, reroll transition table |
//! | 1 | [`reachability`] | Prune unreachable (upper categories, upper subtotal) pairs |
//! | 2 | [`state_computation`] | Backward induction from 13 used categories down to 0, one [`turn_analyzer::TurnAnalyzer`] per state |
//!
//! ## State representation
//!
//! A [`types::TurnState`] is (used categories, upper subtotal capped at 63,
//! Yahtzee box holds 50). [`types::TurnState::id`] maps it into
//! `0..=0xBFFFF`; 536,448 ids are reachable. Values are held as f64 and
//! persisted as f32 by [`storage`].
//!
//! ## Rules
//!
//! Standard Yahtzee: 35-point upper bonus at 63, 100 points per extra Yahtzee
//! once the Yahtzee box holds 50, and the forced joker rule (see
//! [`game_mechanics::score_for`]). The start-of-game value is 254.59.

#![allow(clippy::needless_range_loop)]

pub mod coach;
pub mod constants;
pub mod dice_mechanics;
pub mod dice_selection;
pub mod dice_store;
pub mod env_config;
pub mod game_mechanics;
pub mod reachability;
pub mod simulation;
pub mod state_computation;
pub mod storage;
pub mod turn_analyzer;
pub mod types;
