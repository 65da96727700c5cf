//! A single game played one action at a time.
//!
//! Dice are kept in the order the player sees them. Actions arrive in player
//! terms and are translated to canonical ones for grading; the best action is
//! translated back before it is shown.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::coach::Coach;
use crate::constants::*;
use crate::dice_mechanics::Dice;
use crate::dice_store::{DiceError, DiceStore};
use crate::game_mechanics::{score_for, ScoreBreakdown};
use crate::storage::TurnValues;
use crate::turn_analyzer::TurnAnalyzer;
use crate::types::{Action, ActionValue, Category, TurnState};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("the game is over")]
    GameOver,
    #[error("{0} is already scored")]
    CategoryUsed(Category),
    #[error("no rerolls left this turn")]
    NoRerollsLeft,
    #[error("keeping all five dice is not a reroll")]
    KeepAll,
    #[error(transparent)]
    Dice(#[from] DiceError),
}

/// Scorecard rows, including the derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Scorecard {
    /// Points per box in category order; `None` while open. The Yahtzee box
    /// includes extra-Yahtzee bonuses.
    pub boxes: [Option<u32>; CATEGORY_COUNT],
    pub upper_subtotal: u32,
    pub upper_bonus: u32,
    pub upper_total: u32,
    pub lower_total: u32,
    pub grand_total: u32,
}

pub struct Game<'a> {
    store: &'a DiceStore,
    values: &'a TurnValues,
    state: TurnState,
    boxes: [Option<u32>; CATEGORY_COUNT],
    upper_bonus: u32,
    dice: [u8; DICE_COUNT],
    rolls_left: usize,
    analyzer: TurnAnalyzer<'a>,
    analysis: Vec<ActionValue>,
}

fn roll_die<R: Rng>(rng: &mut R) -> u8 {
    rng.random_range(1..=NUM_FACES as u8)
}

impl<'a> Game<'a> {
    /// New game with the first roll already on the table.
    pub fn new<R: Rng>(
        store: &'a DiceStore,
        values: &'a TurnValues,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let state = TurnState::default();
        let mut game = Game {
            store,
            values,
            state,
            boxes: [None; CATEGORY_COUNT],
            upper_bonus: 0,
            dice: [0; DICE_COUNT],
            rolls_left: EXTRA_ROLLS,
            analyzer: TurnAnalyzer::new(store, values, state),
            analysis: Vec::new(),
        };
        game.dice.iter_mut().for_each(|d| *d = roll_die(rng));
        game.refresh_analysis()?;
        Ok(game)
    }

    /// Dice in player order.
    pub fn dice(&self) -> &[u8; DICE_COUNT] {
        &self.dice
    }

    pub fn rolls_left(&self) -> usize {
        self.rolls_left
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Canonical actions for the current dice, best first.
    pub fn analysis(&self) -> &[ActionValue] {
        &self.analysis
    }

    fn canonical(&self) -> Result<&'a Dice, GameError> {
        Ok(self.store.find(&self.dice)?)
    }

    fn refresh_analysis(&mut self) -> Result<(), GameError> {
        self.analysis = if self.is_over() {
            Vec::new()
        } else {
            let canonical = self.canonical()?;
            self.analyzer.analyze(canonical, self.rolls_left)
        };
        Ok(())
    }

    /// Best action in player terms; `None` once the game is over.
    pub fn best_action(&self) -> Option<Action> {
        let best = Coach::best(&self.analysis)?;
        let canonical = self.canonical().ok()?;
        Some(best.action.uncanonize(canonical, &self.dice))
    }

    /// Expected final-score contribution of a player action, or `None` if it
    /// is not legal now.
    pub fn action_value(&self, action: Action) -> Option<f64> {
        let canonical = self.canonical().ok()?;
        let canon = action.canonize(&self.dice, canonical)?;
        self.analysis
            .iter()
            .find(|a| a.action == canon)
            .map(|a| a.value)
    }

    /// Rounded points lost by a player action relative to the best.
    pub fn action_cost(&self, action: Action) -> Option<f64> {
        let canonical = self.canonical().ok()?;
        let canon = action.canonize(&self.dice, canonical)?;
        Coach::action_cost(&self.analysis, canon)
    }

    /// Points the current dice would earn in `category`.
    pub fn points_for(&self, category: Category) -> Result<ScoreBreakdown, GameError> {
        Ok(score_for(&self.state, self.canonical()?, category))
    }

    /// Can the upper bonus still be earned (or is it already)?
    pub fn upper_bonus_possible(&self) -> bool {
        let used = self.state.used();
        let best_remaining: u32 = (1..=NUM_FACES as u8)
            .filter(|&face| !used.contains_face(face))
            .map(|face| face as u32 * DICE_COUNT as u32)
            .sum();
        self.state.upper_total() + best_remaining >= UPPER_BONUS_THRESHOLD
    }

    pub fn take_action<R: Rng>(&mut self, action: Action, rng: &mut R) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        match action {
            Action::Roll(selection) => {
                if self.rolls_left == 0 {
                    return Err(GameError::NoRerollsLeft);
                }
                if !selection.is_reroll() {
                    return Err(GameError::KeepAll);
                }
                for (i, die) in self.dice.iter_mut().enumerate() {
                    if !selection.is_kept(i) {
                        *die = roll_die(rng);
                    }
                }
                self.rolls_left -= 1;
            }
            Action::Score(category) => {
                if self.state.used().contains(category) {
                    return Err(GameError::CategoryUsed(category));
                }
                let points = self.points_for(category)?;
                self.boxes[category.index()] = Some(points.for_category);
                if points.yahtzee_bonus > 0 {
                    let yahtzee = &mut self.boxes[Category::Yahtzee.index()];
                    *yahtzee = Some(yahtzee.unwrap_or(0) + points.yahtzee_bonus);
                }
                self.upper_bonus += points.upper_bonus;
                self.state = self.state.next(category, points.for_category);

                if !self.is_over() {
                    self.analyzer = TurnAnalyzer::new(self.store, self.values, self.state);
                    self.dice.iter_mut().for_each(|d| *d = roll_die(rng));
                    self.rolls_left = EXTRA_ROLLS;
                }
            }
        }
        self.refresh_analysis()
    }

    pub fn scorecard(&self) -> Scorecard {
        let sum = |upper: bool| -> u32 {
            Category::ALL
                .iter()
                .filter(|c| c.is_upper() == upper)
                .filter_map(|c| self.boxes[c.index()])
                .sum()
        };
        let upper_subtotal = sum(true);
        let upper_total = upper_subtotal + self.upper_bonus;
        let lower_total = sum(false);
        Scorecard {
            boxes: self.boxes,
            upper_subtotal,
            upper_bonus: self.upper_bonus,
            upper_total,
            lower_total,
            grand_total: upper_total + lower_total,
        }
    }
}
