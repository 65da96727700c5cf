//! Game constants and table dimensions.
//!
//! - |categories| = [`CATEGORY_COUNT`] = 13 (standard Yahtzee)
//! - |R_{n,6}| = [`NUM_COMBINATIONS`]`[n]` for n dice, 252 for a full roll
//! - |keeps| = [`NUM_KEEP_MULTISETS`] = 462 (all multisets of 0..=5 dice)
//! - TurnState ids occupy `0..=`[`MAX_TURN_STATE_ID`], of which
//!   [`TURN_STATE_COUNT`] are reachable.

/// Number of scoring categories (Aces through Chance).
pub const CATEGORY_COUNT: usize = 13;

/// Number of dice rolled each turn.
pub const DICE_COUNT: usize = 5;

/// Number of faces on a die.
pub const NUM_FACES: usize = 6;

/// Rerolls allowed after the initial roll of a turn.
pub const EXTRA_ROLLS: usize = 2;

/// Combinations with repetition: C(n+5, n) multisets of n dice.
pub const NUM_COMBINATIONS: [usize; DICE_COUNT + 1] = [1, 6, 21, 56, 126, 252];

/// Permutations with repetition: 6^n ordered rolls of n dice.
pub const NUM_PERMUTATIONS: [usize; DICE_COUNT + 1] = [1, 6, 36, 216, 1296, 7776];

/// Number of distinct full rolls, C(10,5) = 252.
pub const NUM_DICE_SETS: usize = 252;

/// Number of unique keep-multisets for 0-5 dice: 1+6+21+56+126+252 = 462.
pub const NUM_KEEP_MULTISETS: usize = 462;

/// Offset of the first n-dice multiset in a flat 0..462 index.
pub const KEEP_OFFSETS: [usize; DICE_COUNT + 1] = [0, 1, 7, 28, 84, 210];

/// Largest TurnState id: Yahtzee-scored bit plus every lower bit set.
pub const MAX_TURN_STATE_ID: usize = 0xBFFFF;

/// Number of TurnStates reachable from the start of the game.
pub const TURN_STATE_COUNT: usize = 536_448;

/// Upper subtotal needed to earn the upper bonus. Also the subtotal cap.
pub const UPPER_BONUS_THRESHOLD: u32 = 63;

/// Points awarded for reaching [`UPPER_BONUS_THRESHOLD`].
pub const UPPER_BONUS: u32 = 35;

pub const FULL_HOUSE_POINTS: u32 = 25;
pub const SMALL_STRAIGHT_POINTS: u32 = 30;
pub const LARGE_STRAIGHT_POINTS: u32 = 40;
pub const YAHTZEE_POINTS: u32 = 50;

/// Bonus for each extra Yahtzee once the Yahtzee box holds 50.
pub const YAHTZEE_BONUS: u32 = 100;

/// Value-table file magic number: "YHTZ" in little-endian hex.
pub const VALUE_FILE_MAGIC: u32 = 0x5A54_4859;

/// Value-table file format version.
pub const VALUE_FILE_VERSION: u32 = 1;

/// Size in bytes of the binary value-table header.
pub const VALUE_FILE_HEADER_LEN: usize = 16;

/// Published optimal-play expectation for the start of the game (Glenn).
pub const OPTIMAL_GAME_VALUE: f64 = 254.59;

/// Standard deviation of the final score under optimal play.
pub const OPTIMAL_GAME_STD_DEV: f64 = 59.64;

/// Human-readable category names.
pub const CATEGORY_NAMES: [&str; CATEGORY_COUNT] = [
    "Aces",
    "Twos",
    "Threes",
    "Fours",
    "Fives",
    "Sixes",
    "Three of a Kind",
    "Four of a Kind",
    "Full House",
    "Small Straight",
    "Large Straight",
    "Yahtzee",
    "Chance",
];
