//! Core value types: scoring categories, category sets, turn states and actions.
//!
//! [`TurnState`] is the dense key of the DP. Its [`TurnState::id`] is a perfect
//! hash into `0..=MAX_TURN_STATE_ID`:
//!
//! | bits   | meaning                                               |
//! |--------|-------------------------------------------------------|
//! | 0..11  | used flags for Aces..Large Straight                   |
//! | 11     | Chance used                                           |
//! | 12..18 | upper subtotal, capped at 63                          |
//! | 18     | Yahtzee box used with 0 points                        |
//! | 19     | Yahtzee box used with 50 points                       |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::dice_selection::DiceSelection;
use crate::reachability::UpperTotals;

/// One of the 13 boxes on the scorecard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Category {
    Aces,
    Twos,
    Threes,
    Fours,
    Fives,
    Sixes,
    ThreeOfAKind,
    FourOfAKind,
    FullHouse,
    SmallStraight,
    LargeStraight,
    Yahtzee,
    Chance,
}

impl Category {
    pub const ALL: [Category; CATEGORY_COUNT] = [
        Category::Aces,
        Category::Twos,
        Category::Threes,
        Category::Fours,
        Category::Fives,
        Category::Sixes,
        Category::ThreeOfAKind,
        Category::FourOfAKind,
        Category::FullHouse,
        Category::SmallStraight,
        Category::LargeStraight,
        Category::Yahtzee,
        Category::Chance,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Category> {
        Self::ALL.get(index).copied()
    }

    /// Is this category scored in the upper section of the scorecard?
    #[inline(always)]
    pub fn is_upper(self) -> bool {
        self <= Category::Sixes
    }

    /// Upper category counting dice showing `face`.
    pub fn from_face(face: u8) -> Category {
        assert!((1..=6).contains(&face), "die face {face} out of range");
        Self::ALL[face as usize - 1]
    }

    /// Die face counted by an upper category.
    pub fn face(self) -> Option<u8> {
        self.is_upper().then(|| self as u8 + 1)
    }

    pub fn name(self) -> &'static str {
        CATEGORY_NAMES[self.index()]
    }

    #[inline(always)]
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of categories, one bit per [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet(u16);

impl CategorySet {
    const ALL_BITS: u16 = 0x1FFF;
    const UPPER_BITS: u16 = 0x003F;
    const LOWER_BITS: u16 = 0x1FC0;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn full() -> Self {
        Self(Self::ALL_BITS)
    }

    pub fn from_bits(bits: u16) -> Self {
        assert!(bits & !Self::ALL_BITS == 0, "invalid category bits {bits:#x}");
        Self(bits)
    }

    #[inline(always)]
    pub fn bits(self) -> u16 {
        self.0
    }

    #[inline(always)]
    pub fn contains(self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    /// Checks the upper category for a die face.
    pub fn contains_face(self, face: u8) -> bool {
        self.contains(Category::from_face(face))
    }

    pub fn insert(&mut self, category: Category) {
        self.0 |= category.bit();
    }

    pub fn remove(&mut self, category: Category) {
        self.0 &= !category.bit();
    }

    pub fn with(mut self, category: Category) -> Self {
        self.insert(category);
        self
    }

    pub fn without(mut self, category: Category) -> Self {
        self.remove(category);
        self
    }

    pub fn is_full(self) -> bool {
        self.0 == Self::ALL_BITS
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn upper(self) -> Self {
        Self(self.0 & Self::UPPER_BITS)
    }

    pub fn lower(self) -> Self {
        Self(self.0 & Self::LOWER_BITS)
    }

    /// Categories in the set, in scorecard order.
    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |&c| self.contains(c))
    }

    /// Categories not in the set, in scorecard order.
    pub fn unused(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |&c| !self.contains(c))
    }

    /// Every set with exactly `turn` categories, in increasing bit order.
    ///
    /// Walks the bit patterns with the next-higher-same-popcount step, so the
    /// result has C(13, turn) entries and no duplicates.
    pub fn all_for_turn(turn: usize) -> Vec<CategorySet> {
        assert!(turn <= CATEGORY_COUNT, "turn {turn} out of range");
        if turn == 0 {
            return vec![Self::empty()];
        }
        let mut sets = Vec::new();
        let mut bits: u32 = (1 << turn) - 1;
        while bits <= Self::ALL_BITS as u32 {
            sets.push(Self(bits as u16));
            let lowest = bits & bits.wrapping_neg();
            let ripple = bits + lowest;
            bits = (((ripple ^ bits) >> 2) / lowest) | ripple;
        }
        sets
    }
}

/// Status of the Yahtzee box, which decides bonus and joker eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YahtzeeStatus {
    Unused,
    Zeroed,
    Scored,
}

/// Minimal state needed to value the rest of a game at the start of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TurnState {
    used: CategorySet,
    upper_total: u8,
    yahtzee_scored: bool,
}

impl TurnState {
    pub fn new(used: CategorySet, upper_total: u8, yahtzee_scored: bool) -> Self {
        assert!(
            upper_total as u32 <= UPPER_BONUS_THRESHOLD,
            "upper total {upper_total} exceeds cap"
        );
        assert!(
            !yahtzee_scored || used.contains(Category::Yahtzee),
            "Yahtzee scored but box unused"
        );
        Self {
            used,
            upper_total,
            yahtzee_scored,
        }
    }

    #[inline(always)]
    pub fn used(&self) -> CategorySet {
        self.used
    }

    /// Upper-section subtotal, capped at the bonus threshold.
    #[inline(always)]
    pub fn upper_total(&self) -> u32 {
        self.upper_total as u32
    }

    /// True when the Yahtzee box holds 50 points.
    #[inline(always)]
    pub fn yahtzee_scored(&self) -> bool {
        self.yahtzee_scored
    }

    pub fn yahtzee_status(&self) -> YahtzeeStatus {
        if self.yahtzee_scored {
            YahtzeeStatus::Scored
        } else if self.used.contains(Category::Yahtzee) {
            YahtzeeStatus::Zeroed
        } else {
            YahtzeeStatus::Unused
        }
    }

    /// Number of categories already used; 13 at game over.
    pub fn turn(&self) -> usize {
        self.used.len()
    }

    pub fn is_game_over(&self) -> bool {
        self.used.is_full()
    }

    /// Dense index into the value table.
    #[inline]
    pub fn id(&self) -> usize {
        let flags = self.used.bits() as usize;
        let mut id = flags & 0x7FF;
        if self.used.contains(Category::Chance) {
            id |= 0x800;
        }
        id |= (self.upper_total as usize) << 12;
        if self.yahtzee_scored {
            id |= 1 << 19;
        } else if self.used.contains(Category::Yahtzee) {
            id |= 1 << 18;
        }
        id
    }

    /// State after writing `points` into `category`.
    ///
    /// `points` is the value written in the box itself; upper and Yahtzee
    /// bonuses are excluded. Panics if `category` is already used.
    pub fn next(&self, category: Category, points: u32) -> TurnState {
        assert!(
            !self.used.contains(category),
            "category {category} already used"
        );
        let mut upper_total = self.upper_total as u32;
        let mut yahtzee_scored = self.yahtzee_scored;
        if category.is_upper() {
            upper_total = (upper_total + points).min(UPPER_BONUS_THRESHOLD);
        } else if category == Category::Yahtzee && points > 0 {
            yahtzee_scored = true;
        }
        TurnState {
            used: self.used.with(category),
            upper_total: upper_total as u8,
            yahtzee_scored,
        }
    }

    /// Every reachable state with exactly `turn` categories used.
    pub fn all_for_turn(turn: usize) -> Vec<TurnState> {
        let upper_totals = UpperTotals::shared();
        let mut states = Vec::new();
        for used in CategorySet::all_for_turn(turn) {
            let has_yahtzee = used.contains(Category::Yahtzee);
            for &upper_total in upper_totals.all_possible(used) {
                states.push(TurnState::new(used, upper_total, false));
                if has_yahtzee {
                    states.push(TurnState::new(used, upper_total, true));
                }
            }
        }
        states
    }
}

/// A decision available while dice are on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Keep the selected dice and reroll the rest.
    Roll(DiceSelection),
    /// End the turn by scoring the dice in a category.
    Score(Category),
}

impl Action {
    /// Stable id; the low bit separates rolls from scores.
    pub fn id(&self) -> u32 {
        match self {
            Action::Roll(selection) => (selection.flags() as u32) << 1,
            Action::Score(category) => ((category.index() as u32) << 1) | 1,
        }
    }

    pub fn is_roll(&self) -> bool {
        matches!(self, Action::Roll(_))
    }

    pub fn is_score(&self) -> bool {
        matches!(self, Action::Score(_))
    }
}

/// An action paired with its expected final-score contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionValue {
    pub action: Action,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn binomial(n: usize, k: usize) -> usize {
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    #[test]
    fn test_is_upper() {
        assert!(Category::Sixes.is_upper());
        assert!(!Category::ThreeOfAKind.is_upper());
        assert_eq!(Category::from_face(4), Category::Fours);
        assert_eq!(Category::Fives.face(), Some(5));
        assert_eq!(Category::Chance.face(), None);
    }

    #[test]
    fn test_set_insert() {
        let mut set = CategorySet::empty();
        for c in Category::ALL {
            assert!(!set.contains(c));
            set.insert(c);
            assert!(set.contains(c));
        }
        assert!(set.is_full());
        set.remove(Category::Chance);
        assert!(!set.contains(Category::Chance));
        assert_eq!(set.len(), 12);
    }

    #[test]
    fn test_upper_lower_split() {
        let all = CategorySet::full();
        for c in Category::ALL {
            assert_eq!(all.upper().contains(c), c.is_upper());
            assert_eq!(all.lower().contains(c), !c.is_upper());
        }
    }

    #[test]
    fn test_all_for_turn_counts() {
        for turn in 0..=CATEGORY_COUNT {
            let sets = CategorySet::all_for_turn(turn);
            assert_eq!(sets.len(), binomial(CATEGORY_COUNT, turn), "turn {turn}");
            let unique: HashSet<_> = sets.iter().collect();
            assert_eq!(unique.len(), sets.len());
            assert!(sets.iter().all(|s| s.len() == turn));
        }
    }

    #[test]
    fn test_next() {
        let mut state = TurnState::default();
        state = state.next(Category::Threes, 9);
        assert_eq!(state.upper_total(), 9);
        state = state.next(Category::ThreeOfAKind, 22);
        assert_eq!(state.upper_total(), 9);
        state = state.next(Category::Fives, 20);
        state = state.next(Category::Sixes, 24);
        assert_eq!(state.upper_total(), 53);
        state = state.next(Category::Fours, 16);
        assert_eq!(state.upper_total(), UPPER_BONUS_THRESHOLD);
        assert!(state.next(Category::Yahtzee, 50).yahtzee_scored());
        assert!(!state.next(Category::Yahtzee, 0).yahtzee_scored());
        assert_eq!(
            state.next(Category::Yahtzee, 0).yahtzee_status(),
            YahtzeeStatus::Zeroed
        );
    }

    #[test]
    fn test_next_leaves_receiver_untouched() {
        let state = TurnState::default().next(Category::Aces, 3);
        let copy = state;
        let _ = state.next(Category::Twos, 8);
        assert_eq!(state, copy);
    }

    #[test]
    #[should_panic(expected = "already used")]
    fn test_next_on_used_category_panics() {
        TurnState::default()
            .next(Category::Chance, 20)
            .next(Category::Chance, 20);
    }

    #[test]
    fn test_id_layout() {
        assert_eq!(TurnState::default().id(), 0);
        let chance = TurnState::default().next(Category::Chance, 17);
        assert_eq!(chance.id(), 0x800);
        let zeroed = TurnState::default().next(Category::Yahtzee, 0);
        assert_eq!(zeroed.id(), 1 << 18);
        let scored = TurnState::default().next(Category::Yahtzee, 50);
        assert_eq!(scored.id(), 1 << 19);
        let mut full = TurnState::new(CategorySet::full(), 63, true);
        assert_eq!(full.id(), MAX_TURN_STATE_ID);
        full = TurnState::new(CategorySet::full(), 63, false);
        assert_eq!(full.id(), 0x7FFFF);
    }

    #[test]
    fn test_action_ids_distinct() {
        let mut ids = HashSet::new();
        for c in Category::ALL {
            assert!(ids.insert(Action::Score(c).id()));
        }
        for s in DiceSelection::all() {
            assert!(ids.insert(Action::Roll(s).id()));
        }
    }
}
