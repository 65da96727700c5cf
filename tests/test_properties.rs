//! Property-based tests for dice handling and scoring rules.

use proptest::prelude::*;

use yahtzee::constants::*;
use yahtzee::dice_mechanics::{canonical_order, dice_key};
use yahtzee::dice_selection::DiceSelection;
use yahtzee::dice_store::DiceStore;
use yahtzee::game_mechanics::score_for;
use yahtzee::reachability::UpperTotals;
use yahtzee::types::{Action, Category, CategorySet, TurnState};

use std::sync::OnceLock;

fn store() -> &'static DiceStore {
    static STORE: OnceLock<DiceStore> = OnceLock::new();
    STORE.get_or_init(DiceStore::new)
}

/// Strategy: generate a valid dice array (each die 1-6).
fn dice_strategy() -> impl Strategy<Value = [u8; 5]> {
    prop::array::uniform5(1..=6u8)
}

fn category_strategy() -> impl Strategy<Value = Category> {
    (0..CATEGORY_COUNT).prop_map(|i| Category::ALL[i])
}

/// Strategy: a reachable turn state with the Yahtzee box in any status.
fn state_strategy() -> impl Strategy<Value = TurnState> {
    (0..=0x1FFFu16, any::<prop::sample::Index>(), any::<bool>()).prop_map(|(bits, idx, scored)| {
        let used = CategorySet::from_bits(bits);
        let totals = UpperTotals::shared().all_possible(used);
        let upper_total = totals[idx.index(totals.len())];
        TurnState::new(used, upper_total, scored && used.contains(Category::Yahtzee))
    })
}

proptest! {
    #[test]
    fn canonical_order_is_permutation_invariant(dice in dice_strategy(), rot in 0..5usize) {
        let mut rotated = dice;
        rotated.rotate_left(rot);
        prop_assert_eq!(canonical_order(&dice), canonical_order(&rotated));
        prop_assert_eq!(dice_key(&dice), dice_key(&rotated));
    }

    #[test]
    fn store_finds_canonical(dice in dice_strategy()) {
        let found = store().find(&dice).unwrap();
        let expected = canonical_order(&dice);
        prop_assert_eq!(found.values(), expected.as_slice());
        prop_assert_eq!(found.key(), dice_key(&dice));
    }

    #[test]
    fn used_category_scores_zero(dice in dice_strategy(), cat in category_strategy(), state in state_strategy()) {
        let d = store().find(&dice).unwrap();
        let points = score_for(&state, d, cat);
        if state.used().contains(cat) {
            prop_assert_eq!(points.total(), 0);
        } else {
            prop_assert!(points.for_category <= d.base_points(cat).max(LARGE_STRAIGHT_POINTS));
        }
    }

    #[test]
    fn next_state_stays_reachable(dice in dice_strategy(), state in state_strategy(), cat in category_strategy()) {
        prop_assume!(!state.used().contains(cat));
        let d = store().find(&dice).unwrap();
        let points = score_for(&state, d, cat);
        let next = state.next(cat, points.for_category);
        prop_assert_eq!(next.turn(), state.turn() + 1);
        prop_assert!(next.upper_total() >= state.upper_total());
        prop_assert!(next.upper_total() <= UPPER_BONUS_THRESHOLD);
        prop_assert!(UpperTotals::shared().is_reachable(next.used(), next.upper_total()));
        prop_assert!(next.id() <= MAX_TURN_STATE_ID);
    }

    #[test]
    fn yahtzee_status_never_reverts(state in state_strategy(), cat in category_strategy(), points in 0..=50u32) {
        prop_assume!(!state.used().contains(cat));
        let next = state.next(cat, points);
        if cat == Category::Yahtzee {
            prop_assert_eq!(next.yahtzee_scored(), points > 0);
        } else {
            prop_assert_eq!(next.yahtzee_status(), state.yahtzee_status());
        }
    }

    #[test]
    fn upper_bonus_only_on_crossing(dice in dice_strategy(), state in state_strategy(), face in 1..=6u8) {
        let cat = Category::from_face(face);
        prop_assume!(!state.used().contains(cat));
        let d = store().find(&dice).unwrap();
        let points = score_for(&state, d, cat);
        let crosses = state.upper_total() < UPPER_BONUS_THRESHOLD
            && state.upper_total() + d.base_points(cat) >= UPPER_BONUS_THRESHOLD;
        prop_assert_eq!(points.upper_bonus > 0, crosses);
    }

    #[test]
    fn canonize_round_trip(dice in dice_strategy(), flags in 0..31u8) {
        let canonical = store().find(&dice).unwrap();
        let action = Action::Roll(DiceSelection::from_flags(flags));
        let canon = action.canonize(&dice, canonical).unwrap();
        let back = canon.uncanonize(canonical, &dice);
        let (Action::Roll(a), Action::Roll(b)) = (action, back) else {
            return Err(TestCaseError::fail("roll became a score"));
        };
        prop_assert_eq!(dice_key(&a.apply(&dice)), dice_key(&b.apply(&dice)));
        prop_assert!(b.flags() <= a.flags());
    }
}
