//! Move grading: mapping player actions onto canonical ones and pricing them.
//!
//! The solver only knows canonical dice (see
//! [`canonical_order`](crate::dice_mechanics::canonical_order)). Players see
//! their dice in roll order, so reroll selections are translated between the
//! two by matching the kept multiset.

use crate::dice_mechanics::{dice_key, Dice};
use crate::dice_selection::DiceSelection;
use crate::types::{Action, ActionValue};

/// Default loss, in points, above which a move draws feedback.
pub const FEEDBACK_THRESHOLD: f64 = 0.2;

impl Action {
    /// Canonical equivalent of an action taken on `player` dice.
    ///
    /// Returns `None` for a selection that keeps all five dice.
    pub fn canonize(self, player: &[u8], canonical: &Dice) -> Option<Action> {
        match self {
            Action::Score(_) => Some(self),
            Action::Roll(selection) => {
                let key = dice_key(&selection.apply(player));
                DiceSelection::distinct(canonical.pattern())
                    .iter()
                    .find(|option| dice_key(&option.apply(canonical.values())) == key)
                    .map(|&option| Action::Roll(option))
            }
        }
    }

    /// Player-dice equivalent of a canonical action.
    ///
    /// Picks the lowest selection over `player` that keeps the same multiset.
    pub fn uncanonize(self, canonical: &Dice, player: &[u8]) -> Action {
        match self {
            Action::Score(_) => self,
            Action::Roll(selection) => {
                assert_eq!(
                    dice_key(player),
                    canonical.key(),
                    "player dice differ from canonical dice"
                );
                let key = dice_key(&selection.apply(canonical.values()));
                DiceSelection::all()
                    .find(|option| dice_key(&option.apply(player)) == key)
                    .map_or(self, Action::Roll)
            }
        }
    }
}

/// Grades actions against a sorted analysis from
/// [`TurnAnalyzer::analyze`](crate::turn_analyzer::TurnAnalyzer::analyze).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coach {
    /// When off, every move is approved.
    pub enabled: bool,
    pub feedback_threshold: f64,
}

impl Default for Coach {
    fn default() -> Self {
        Coach {
            enabled: true,
            feedback_threshold: FEEDBACK_THRESHOLD,
        }
    }
}

impl Coach {
    pub fn best(analysis: &[ActionValue]) -> Option<&ActionValue> {
        analysis.first()
    }

    /// `chosen - best`, never positive. `None` if the action is not in the
    /// analysis.
    pub fn relative_value(analysis: &[ActionValue], action: Action) -> Option<f64> {
        let best = Self::best(analysis)?.value;
        let chosen = analysis.iter().find(|a| a.action == action)?.value;
        Some(chosen - best)
    }

    /// Expected points lost by `action` relative to the best, rounded to a
    /// tenth.
    pub fn action_cost(analysis: &[ActionValue], action: Action) -> Option<f64> {
        Self::relative_value(analysis, action).map(|relative| round_cost(-relative))
    }

    /// True when coaching is off or the loss is below the feedback threshold.
    pub fn is_approved(&self, cost: f64) -> bool {
        !self.enabled || cost < self.feedback_threshold
    }
}

/// Round a point loss to one decimal.
pub fn round_cost(loss: f64) -> f64 {
    0.1 * (10.0 * loss).round()
}
