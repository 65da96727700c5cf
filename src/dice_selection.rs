//! Keep/reroll choices over the five positions of a canonical roll.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::constants::DICE_COUNT;
use crate::dice_mechanics::{dice_key, DicePattern};

/// Bitmask over five dice positions; bit i set means keep `values[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiceSelection(u8);

const KEEP_ALL_FLAGS: u8 = (1 << DICE_COUNT) - 1;

static DISTINCT: LazyLock<[Vec<DiceSelection>; 7]> =
    LazyLock::new(|| DicePattern::ALL.map(compute_distinct));

fn compute_distinct(pattern: DicePattern) -> Vec<DiceSelection> {
    let example = pattern.canonical_example();
    let mut seen = Vec::new();
    let mut distinct = Vec::new();
    for selection in DiceSelection::all() {
        let key = dice_key(&selection.apply(&example));
        if !seen.contains(&key) {
            seen.push(key);
            distinct.push(selection);
        }
    }
    distinct
}

impl DiceSelection {
    /// Reroll every die.
    pub const KEEP_NONE: DiceSelection = DiceSelection(0);

    pub fn from_flags(flags: u8) -> Self {
        assert!(flags <= KEEP_ALL_FLAGS, "invalid selection flags {flags:#x}");
        Self(flags)
    }

    /// Selection keeping the given positions.
    pub fn keeping(positions: &[usize]) -> Self {
        let mut selection = Self::KEEP_NONE;
        for &p in positions {
            selection.set(p, true);
        }
        selection
    }

    #[inline(always)]
    pub fn flags(self) -> u8 {
        self.0
    }

    /// Number of kept dice.
    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_kept(self, position: usize) -> bool {
        assert!(position < DICE_COUNT, "position {position} out of range");
        self.0 & (1 << position) != 0
    }

    pub fn set(&mut self, position: usize, keep: bool) {
        assert!(position < DICE_COUNT, "position {position} out of range");
        if keep {
            self.0 |= 1 << position;
        } else {
            self.0 &= !(1 << position);
        }
    }

    pub fn toggle(&mut self, position: usize) {
        let kept = self.is_kept(position);
        self.set(position, !kept);
    }

    /// Keeping all five dice is not a reroll.
    pub fn is_reroll(self) -> bool {
        self.0 != KEEP_ALL_FLAGS
    }

    /// Kept values, in position order.
    pub fn apply(self, values: &[u8]) -> Vec<u8> {
        values
            .iter()
            .enumerate()
            .filter(|&(i, _)| self.0 & (1 << i) != 0)
            .map(|(_, &v)| v)
            .collect()
    }

    /// All 31 selections that reroll at least one die, in flag order.
    pub fn all() -> impl Iterator<Item = DiceSelection> + Clone {
        (0..KEEP_ALL_FLAGS).map(DiceSelection)
    }

    /// Selections of a canonical roll with `pattern` that keep distinct
    /// multisets. The first selection in flag order represents each multiset.
    pub fn distinct(pattern: DicePattern) -> &'static [DiceSelection] {
        &DISTINCT[pattern.index()]
    }
}
