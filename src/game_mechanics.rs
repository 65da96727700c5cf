//! Yahtzee scoring rules: base points, the joker rule and both bonuses.
//!
//! [`base_points`] is what a category pays for a roll in isolation. [`score_for`]
//! applies the game context from a [`TurnState`]: used boxes pay nothing, an
//! extra Yahtzee may act as a joker, and bonuses are reported separately so the
//! successor state only sees the points written in the box.

use serde::Serialize;

use crate::constants::*;
use crate::dice_mechanics::{Dice, DicePattern};
use crate::types::{Category, TurnState};

/// Points for placing canonical `values` in `category` with no game context.
pub fn base_points(values: &[u8], category: Category, pattern: DicePattern, longest_run: u8) -> u32 {
    let sum: u32 = values.iter().map(|&v| v as u32).sum();
    match category {
        Category::Aces
        | Category::Twos
        | Category::Threes
        | Category::Fours
        | Category::Fives
        | Category::Sixes => {
            let face = category.index() as u8 + 1;
            values.iter().filter(|&&v| v == face).map(|&v| v as u32).sum()
        }
        Category::ThreeOfAKind if pattern.is_at_least_three_of_a_kind() => sum,
        Category::FourOfAKind if pattern.is_at_least_four_of_a_kind() => sum,
        Category::FullHouse if pattern == DicePattern::FullHouse => FULL_HOUSE_POINTS,
        Category::SmallStraight if longest_run >= 4 => SMALL_STRAIGHT_POINTS,
        Category::LargeStraight if longest_run == 5 => LARGE_STRAIGHT_POINTS,
        Category::Yahtzee if pattern == DicePattern::FiveOfAKind => YAHTZEE_POINTS,
        Category::Chance => sum,
        _ => 0,
    }
}

/// Points earned by one scoring action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreBreakdown {
    /// Written in the chosen box.
    pub for_category: u32,
    /// Upper bonus triggered by this action.
    pub upper_bonus: u32,
    /// Extra-Yahtzee bonus triggered by this action.
    pub yahtzee_bonus: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.for_category + self.upper_bonus + self.yahtzee_bonus
    }
}

/// Points for scoring five `dice` in `category` from `state`.
///
/// A five-of-a-kind rolled after the Yahtzee box is used is a joker: it must
/// go in the matching upper box while that is open (any other box pays 0),
/// otherwise it pays full value in Full House and both straights. It also
/// earns the extra-Yahtzee bonus when the Yahtzee box holds 50.
pub fn score_for(state: &TurnState, dice: &Dice, category: Category) -> ScoreBreakdown {
    debug_assert_eq!(dice.count(), DICE_COUNT);
    let used = state.used();
    if used.contains(category) {
        return ScoreBreakdown::default();
    }

    let base = dice.base_points(category);
    let mut breakdown = ScoreBreakdown {
        for_category: base,
        ..ScoreBreakdown::default()
    };

    if dice.pattern() == DicePattern::FiveOfAKind && used.contains(Category::Yahtzee) {
        let matching_upper = Category::from_face(dice.values()[0]);
        if used.contains(matching_upper) {
            match category {
                Category::FullHouse => breakdown.for_category = FULL_HOUSE_POINTS,
                Category::SmallStraight => breakdown.for_category = SMALL_STRAIGHT_POINTS,
                Category::LargeStraight => breakdown.for_category = LARGE_STRAIGHT_POINTS,
                _ => {}
            }
        } else if category != matching_upper {
            breakdown.for_category = 0;
        }
        if state.yahtzee_scored() {
            breakdown.yahtzee_bonus = YAHTZEE_BONUS;
        }
    }

    let upper_total = state.upper_total();
    if category.is_upper()
        && upper_total < UPPER_BONUS_THRESHOLD
        && upper_total + base >= UPPER_BONUS_THRESHOLD
    {
        breakdown.upper_bonus = UPPER_BONUS;
    }

    breakdown
}
