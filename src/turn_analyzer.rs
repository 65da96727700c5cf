//! Optimal play within a single turn, given the values of every next state.
//!
//! A turn is a small expectimax tree: roll, up to two keep/reroll decisions,
//! then a scoring decision. For a fixed [`TurnState`] the analyzer caches two
//! layers per reroll level:
//!
//! - `roll_values[r][ord]`: best expected value holding five-dice roll `ord`
//!   with `r` rerolls left
//! - `keep_values[r][k]`: expected value of keeping multiset `k` and rolling
//!   the rest, with `r` rerolls left afterwards
//!
//! Keeps are deduplicated by multiset, so each expectation is computed once
//! per turn state however many rolls share it.

use crate::constants::*;
use crate::dice_mechanics::Dice;
use crate::dice_selection::DiceSelection;
use crate::dice_store::DiceStore;
use crate::game_mechanics::score_for;
use crate::storage::TurnValues;
use crate::types::{Action, ActionValue, Category, TurnState};

const KEEP_SLOTS: usize = KEEP_OFFSETS[DICE_COUNT];

pub struct TurnAnalyzer<'a> {
    store: &'a DiceStore,
    values: &'a TurnValues,
    state: TurnState,
    roll_values: [[f64; NUM_DICE_SETS]; EXTRA_ROLLS],
    keep_values: [[f64; KEEP_SLOTS]; EXTRA_ROLLS],
}

impl<'a> TurnAnalyzer<'a> {
    /// Build the per-turn caches. `values` must already hold every state
    /// reachable from `state` by one scoring action.
    pub fn new(store: &'a DiceStore, values: &'a TurnValues, state: TurnState) -> Self {
        let mut analyzer = TurnAnalyzer {
            store,
            values,
            state,
            roll_values: [[0.0; NUM_DICE_SETS]; EXTRA_ROLLS],
            keep_values: [[0.0; KEEP_SLOTS]; EXTRA_ROLLS],
        };
        for rolls_left in 0..EXTRA_ROLLS {
            for dice in store.all(DICE_COUNT) {
                analyzer.roll_values[rolls_left][dice.ordinal()] =
                    analyzer.evaluate_roll(dice, rolls_left);
            }
            for kept in store.keeps() {
                analyzer.keep_values[rolls_left][kept.index()] =
                    analyzer.reroll_value(kept, rolls_left);
            }
        }
        analyzer
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Points plus future value of scoring `dice` in `category`.
    #[inline]
    pub fn score_value(&self, dice: &Dice, category: Category) -> f64 {
        let points = score_for(&self.state, dice, category);
        let next = self.state.next(category, points.for_category);
        points.total() as f64 + self.values.get(&next)
    }

    /// Expected value of keeping `kept` and rolling the rest, with
    /// `rolls_left` rerolls remaining after this roll.
    #[inline]
    fn reroll_value(&self, kept: &Dice, rolls_left: usize) -> f64 {
        let row = &self.roll_values[rolls_left];
        self.store
            .reroll_outcomes(kept)
            .iter()
            .map(|&(ord, p)| row[ord as usize] * p)
            .sum()
    }

    /// Best expected value holding five `dice` with `rolls_left` rerolls.
    pub fn evaluate_roll(&self, dice: &Dice, rolls_left: usize) -> f64 {
        assert_eq!(dice.count(), DICE_COUNT, "only full rolls can be evaluated");
        assert!(rolls_left <= EXTRA_ROLLS, "at most {EXTRA_ROLLS} rerolls");

        if rolls_left == 0 {
            return self
                .state
                .used()
                .unused()
                .map(|c| self.score_value(dice, c))
                .fold(0.0, f64::max);
        }

        let keeps = &self.keep_values[rolls_left - 1];
        dice.keep_results()
            .iter()
            .map(|&k| keeps[k])
            .fold(self.roll_values[0][dice.ordinal()], f64::max)
    }

    /// Expected value of the whole turn, before the first roll.
    pub fn evaluate(&self) -> f64 {
        self.store
            .all(DICE_COUNT)
            .iter()
            .map(|dice| self.evaluate_roll(dice, EXTRA_ROLLS) * dice.probability())
            .sum()
    }

    /// Every legal action for `dice` with its value, best first.
    ///
    /// Rolls are listed only while rerolls remain, one per distinct kept
    /// multiset, using the canonical selection for it.
    pub fn analyze(&self, dice: &Dice, rolls_left: usize) -> Vec<ActionValue> {
        assert_eq!(dice.count(), DICE_COUNT, "only full rolls can be analyzed");
        assert!(rolls_left <= EXTRA_ROLLS, "at most {EXTRA_ROLLS} rerolls");

        let mut actions: Vec<ActionValue> = self
            .state
            .used()
            .unused()
            .map(|c| ActionValue {
                action: Action::Score(c),
                value: self.score_value(dice, c),
            })
            .collect();

        if rolls_left > 0 {
            let keeps = &self.keep_values[rolls_left - 1];
            let selections = DiceSelection::distinct(dice.pattern());
            actions.extend(selections.iter().zip(dice.keep_results()).map(|(&s, &k)| {
                ActionValue {
                    action: Action::Roll(s),
                    value: keeps[k],
                }
            }));
        }

        actions.sort_by(|a, b| b.value.total_cmp(&a.value));
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategorySet;
    use approx::assert_relative_eq;

    fn only_yahtzee_open() -> TurnState {
        TurnState::new(CategorySet::full().without(Category::Yahtzee), 0, false)
    }

    #[test]
    fn test_last_turn_yahtzee_values() {
        let store = DiceStore::new();
        let values = TurnValues::new();
        let analyzer = TurnAnalyzer::new(&store, &values, only_yahtzee_open());
        let d = |v: &[u8]| store.find(v).unwrap();

        for r in 0..=2 {
            assert_eq!(analyzer.evaluate_roll(d(&[1, 1, 1, 1, 1]), r), 50.0);
        }

        let four = d(&[1, 1, 1, 1, 2]);
        assert_eq!(analyzer.evaluate_roll(four, 0), 0.0);
        assert_relative_eq!(analyzer.evaluate_roll(four, 1), 50.0 / 6.0, epsilon = 1e-9);
        assert_relative_eq!(analyzer.evaluate_roll(four, 2), 50.0 * 11.0 / 36.0, epsilon = 1e-9);

        let three = d(&[1, 1, 1, 3, 4]);
        assert_eq!(analyzer.evaluate_roll(three, 0), 0.0);
        assert_relative_eq!(analyzer.evaluate_roll(three, 1), 50.0 / 36.0, epsilon = 1e-9);
        assert_relative_eq!(
            analyzer.evaluate_roll(three, 2),
            50.0 * (1.0 / 36.0 + 10.0 / 216.0 + 25.0 / 1296.0),
            epsilon = 1e-9
        );

        assert_relative_eq!(analyzer.evaluate(), 50.0 * 0.046029, epsilon = 1e-4);
    }

    #[test]
    fn test_analyze_orders_best_first() {
        let store = DiceStore::new();
        let values = TurnValues::new();
        let analyzer = TurnAnalyzer::new(&store, &values, only_yahtzee_open());
        let four = store.find(&[2, 1, 1, 1, 1]).unwrap();

        let actions = analyzer.analyze(four, 1);
        assert_eq!(actions.len(), 1 + DiceSelection::distinct(four.pattern()).len());
        assert!(actions.windows(2).all(|w| w[0].value >= w[1].value));
        assert_eq!(
            actions[0].action,
            Action::Roll(DiceSelection::from_flags(0b01111))
        );
        assert_relative_eq!(actions[0].value, 50.0 / 6.0, epsilon = 1e-9);

        let scoring_only = analyzer.analyze(four, 0);
        assert_eq!(scoring_only.len(), 1);
        assert_eq!(scoring_only[0].action, Action::Score(Category::Yahtzee));
        assert_eq!(scoring_only[0].value, 0.0);
    }

    #[test]
    fn test_game_over_state_is_worth_nothing() {
        let store = DiceStore::new();
        let values = TurnValues::new();
        let analyzer = TurnAnalyzer::new(&store, &values, TurnState::new(CategorySet::full(), 0, false));
        assert_eq!(analyzer.evaluate(), 0.0);
        assert!(analyzer.analyze(store.find(&[6; 5]).unwrap(), 0).is_empty());
    }

    #[test]
    fn test_only_chance_open() {
        let store = DiceStore::new();
        let values = TurnValues::new();
        let state = TurnState::new(CategorySet::full().without(Category::Chance), 0, false);
        let analyzer = TurnAnalyzer::new(&store, &values, state);
        // Keep dice showing 5 or 6 after each roll: 3.5 -> 4.25 -> 4.666..
        assert_relative_eq!(analyzer.evaluate(), 5.0 * 14.0 / 3.0, epsilon = 1e-9);
    }
}
