//! Shared, immutable registry of every dice multiset of size 0..=5.
//!
//! Built once and read concurrently by every solver worker. Multisets are
//! stored in one flat vector, grouped by size, so a [`Dice::index`] is also a
//! position in that vector.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::constants::*;
use crate::dice_mechanics::{dice_key, Dice};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiceError {
    #[error("invalid die face {0}, expected 1..=6")]
    InvalidFace(u8),
    #[error("too many dice: {0}, at most 5")]
    TooMany(usize),
}

/// Every n-dice multiset in generation order, faces ascending.
///
/// Starts at all ones; each step finds the first die below 6 and sets it and
/// every die before it to its value plus one.
pub fn generate_combos(count: usize) -> Vec<Vec<u8>> {
    let mut combos = Vec::with_capacity(NUM_COMBINATIONS[count]);
    let mut combo = vec![1u8; count];
    loop {
        combos.push(combo.clone());
        let Some(idx) = combo.iter().position(|&v| v < NUM_FACES as u8) else {
            break;
        };
        let next = combo[idx] + 1;
        combo[..=idx].fill(next);
    }
    combos
}

pub struct DiceStore {
    dice: Vec<Dice>,
    by_key: HashMap<u32, usize>,
    /// 5-dice ordinal for (1-dice ordinal, 4-dice ordinal).
    add14: Vec<u16>,
    /// 5-dice ordinal for (2-dice ordinal, 3-dice ordinal).
    add23: Vec<u16>,
    /// Reroll outcomes per keep, CSR layout: row `k` spans
    /// `outcome_start[k]..outcome_start[k + 1]`.
    outcomes: Vec<(u16, f64)>,
    outcome_start: Vec<usize>,
}

impl DiceStore {
    pub fn new() -> Self {
        let mut dice: Vec<Dice> = Vec::with_capacity(NUM_KEEP_MULTISETS);
        let mut by_key: HashMap<u32, usize> = HashMap::with_capacity(NUM_KEEP_MULTISETS);

        for count in 0..=DICE_COUNT {
            for (ordinal, values) in generate_combos(count).into_iter().enumerate() {
                let entry = Dice::new(&values, ordinal, |key| by_key[&key]);
                by_key.insert(entry.key(), dice.len());
                dice.push(entry);
            }
        }
        debug_assert_eq!(dice.len(), NUM_KEEP_MULTISETS);

        let ordinal_of = |lhs: &Dice, rhs: &Dice| -> u16 {
            dice[by_key[&(lhs.key() + rhs.key())]].ordinal() as u16
        };
        let slice = |count: usize| &dice[KEEP_OFFSETS[count]..][..NUM_COMBINATIONS[count]];

        let mut add14 = Vec::with_capacity(NUM_COMBINATIONS[1] * NUM_COMBINATIONS[4]);
        for one in slice(1) {
            for four in slice(4) {
                add14.push(ordinal_of(one, four));
            }
        }
        let mut add23 = Vec::with_capacity(NUM_COMBINATIONS[2] * NUM_COMBINATIONS[3]);
        for two in slice(2) {
            for three in slice(3) {
                add23.push(ordinal_of(two, three));
            }
        }

        let mut store = DiceStore {
            dice,
            by_key,
            add14,
            add23,
            outcomes: Vec::new(),
            outcome_start: Vec::new(),
        };

        let mut outcomes = Vec::new();
        let mut outcome_start = Vec::with_capacity(KEEP_OFFSETS[DICE_COUNT] + 1);
        for kept in store.keeps() {
            outcome_start.push(outcomes.len());
            for rolled in store.all(DICE_COUNT - kept.count()) {
                let joined = store.concatenate(kept, rolled);
                outcomes.push((joined.ordinal() as u16, rolled.probability()));
            }
        }
        outcome_start.push(outcomes.len());
        store.outcomes = outcomes;
        store.outcome_start = outcome_start;

        debug!(
            multisets = store.dice.len(),
            transitions = store.outcomes.len(),
            "dice store built"
        );
        store
    }

    /// All multisets of `count` dice, in ordinal order.
    #[inline(always)]
    pub fn all(&self, count: usize) -> &[Dice] {
        &self.dice[KEEP_OFFSETS[count]..][..NUM_COMBINATIONS[count]]
    }

    /// Multisets of 0..=4 dice: everything a reroll can keep.
    pub fn keeps(&self) -> &[Dice] {
        &self.dice[..KEEP_OFFSETS[DICE_COUNT]]
    }

    /// Multiset at a flat [`Dice::index`].
    #[inline(always)]
    pub fn get(&self, index: usize) -> &Dice {
        &self.dice[index]
    }

    pub fn find_by_key(&self, key: u32) -> Option<&Dice> {
        self.by_key.get(&key).map(|&i| &self.dice[i])
    }

    /// Canonical multiset for faces in any order.
    pub fn find(&self, values: &[u8]) -> Result<&Dice, DiceError> {
        if values.len() > DICE_COUNT {
            return Err(DiceError::TooMany(values.len()));
        }
        if let Some(&bad) = values.iter().find(|v| !(1..=6).contains(*v)) {
            return Err(DiceError::InvalidFace(bad));
        }
        Ok(&self.dice[self.by_key[&dice_key(values)]])
    }

    /// Union of two multisets totalling five dice.
    #[inline]
    pub fn concatenate(&self, lhs: &Dice, rhs: &Dice) -> &Dice {
        assert_eq!(
            lhs.count() + rhs.count(),
            DICE_COUNT,
            "concatenation must produce five dice"
        );
        let (l, r) = (lhs.ordinal(), rhs.ordinal());
        let ordinal = match lhs.count() {
            0 => return &self.dice[rhs.index()],
            1 => self.add14[l * NUM_COMBINATIONS[4] + r],
            2 => self.add23[l * NUM_COMBINATIONS[3] + r],
            3 => self.add23[r * NUM_COMBINATIONS[3] + l],
            4 => self.add14[r * NUM_COMBINATIONS[4] + l],
            _ => return &self.dice[lhs.index()],
        };
        &self.dice[KEEP_OFFSETS[DICE_COUNT] + ordinal as usize]
    }

    /// Five-dice results of rerolling everything but `kept`, as
    /// (five-dice ordinal, probability) pairs summing to 1.
    #[inline(always)]
    pub fn reroll_outcomes(&self, kept: &Dice) -> &[(u16, f64)] {
        let k = kept.index();
        &self.outcomes[self.outcome_start[k]..self.outcome_start[k + 1]]
    }

    /// Kept remainders of a five-dice roll, aligned with
    /// [`DiceSelection::distinct`](crate::dice_selection::DiceSelection::distinct).
    pub fn keep_results<'a>(&'a self, dice: &'a Dice) -> impl Iterator<Item = &'a Dice> + 'a {
        dice.keep_results().iter().map(move |&i| &self.dice[i])
    }
}

impl Default for DiceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice_mechanics::DicePattern;
    use crate::dice_selection::DiceSelection;

    #[test]
    fn test_generate_combos_counts() {
        for count in 0..=DICE_COUNT {
            assert_eq!(generate_combos(count).len(), NUM_COMBINATIONS[count]);
        }
        let ones = generate_combos(1);
        assert_eq!(ones, (1..=6).map(|v| vec![v]).collect::<Vec<_>>());
        let fives = generate_combos(5);
        assert_eq!(fives.first(), Some(&vec![1, 1, 1, 1, 1]));
        assert_eq!(fives.last(), Some(&vec![6, 6, 6, 6, 6]));
    }

    #[test]
    fn test_store_layout() {
        let store = DiceStore::new();
        for count in 0..=DICE_COUNT {
            let all = store.all(count);
            assert_eq!(all.len(), NUM_COMBINATIONS[count]);
            for (ordinal, dice) in all.iter().enumerate() {
                assert_eq!(dice.count(), count);
                assert_eq!(dice.ordinal(), ordinal);
                assert_eq!(store.get(dice.index()), dice);
            }
        }
        assert_eq!(store.keeps().len(), 210);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let store = DiceStore::new();
        for count in 0..=DICE_COUNT {
            let sum: f64 = store.all(count).iter().map(|d| d.probability()).sum();
            assert!((sum - 1.0).abs() < 1e-12, "count {count}: {sum}");
        }
    }

    #[test]
    fn test_find_any_order() {
        let store = DiceStore::new();
        let a = store.find(&[3, 1, 3, 6, 2]).unwrap();
        let b = store.find(&[6, 3, 2, 3, 1]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.values(), &[3, 3, 6, 2, 1]);
        assert_eq!(store.find(&[1, 7]), Err(DiceError::InvalidFace(7)));
        assert_eq!(store.find(&[1; 6]), Err(DiceError::TooMany(6)));
    }

    #[test]
    fn test_concatenate_all_splits() {
        let store = DiceStore::new();
        for kept_count in 0..=DICE_COUNT {
            for kept in store.all(kept_count) {
                for rolled in store.all(DICE_COUNT - kept_count) {
                    let joined = store.concatenate(kept, rolled);
                    assert_eq!(joined.count(), DICE_COUNT);
                    assert_eq!(joined.key(), kept.key() + rolled.key());
                }
            }
        }
    }

    #[test]
    fn test_reroll_outcomes() {
        let store = DiceStore::new();
        for kept in store.keeps() {
            let outcomes = store.reroll_outcomes(kept);
            assert_eq!(outcomes.len(), NUM_COMBINATIONS[DICE_COUNT - kept.count()]);
            let total: f64 = outcomes.iter().map(|&(_, p)| p).sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
        let four_ones = store.find(&[1, 1, 1, 1]).unwrap();
        let yahtzee = store.find(&[1, 1, 1, 1, 1]).unwrap();
        let p = store
            .reroll_outcomes(four_ones)
            .iter()
            .find(|&&(ord, _)| ord as usize == yahtzee.ordinal())
            .map(|&(_, p)| p);
        assert_eq!(p, Some(1.0 / 6.0));
    }

    #[test]
    fn test_concatenate_with_empty_side() {
        let store = DiceStore::new();
        let empty = &store.all(0)[0];
        let full = store.find(&[6, 2, 2, 5, 2]).unwrap();
        assert_eq!(store.concatenate(empty, full), full);
        assert_eq!(store.concatenate(full, empty), full);
        assert!(std::ptr::eq(store.concatenate(empty, full), store.get(full.index())));
    }

    #[test]
    #[should_panic(expected = "five dice")]
    fn test_concatenate_wrong_total_panics() {
        let store = DiceStore::new();
        store.concatenate(&store.all(2)[0], &store.all(2)[0]);
    }

    #[test]
    fn test_keep_results_match_selections() {
        let store = DiceStore::new();
        for dice in store.all(DICE_COUNT) {
            let selections = DiceSelection::distinct(dice.pattern());
            assert_eq!(selections.len(), dice.keep_results().len());
            for (selection, kept) in selections.iter().zip(store.keep_results(dice)) {
                assert_eq!(kept.key(), dice_key(&selection.apply(dice.values())));
                assert!(kept.count() < DICE_COUNT);
            }
        }
    }

    #[test]
    fn test_yahtzee_has_five_keeps() {
        let store = DiceStore::new();
        let yahtzee = store.find(&[4, 4, 4, 4, 4]).unwrap();
        assert_eq!(yahtzee.pattern(), DicePattern::FiveOfAKind);
        let counts: Vec<_> = store.keep_results(yahtzee).map(|d| d.count()).collect();
        assert_eq!(counts, vec![0, 1, 2, 3, 4]);
    }
}
