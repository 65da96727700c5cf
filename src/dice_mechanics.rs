//! Dice multisets and the per-roll facts the solver reads in its hot loops.
//!
//! A [`Dice`] is an unordered multiset of 0..=5 dice kept in canonical order:
//! sorted by face frequency (descending), ties by face (descending). Every
//! derived quantity (pattern, probability, longest run, base points) is
//! computed once when the [`DiceStore`](crate::dice_store::DiceStore) is built.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::dice_selection::DiceSelection;
use crate::game_mechanics::base_points;
use crate::types::Category;

/// Frequency shape of a multiset, independent of faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DicePattern {
    None,
    Pair,
    TwoPair,
    ThreeOfAKind,
    FullHouse,
    FourOfAKind,
    FiveOfAKind,
}

/// Orderings of one n-dice multiset with a given pattern.
/// Row n, column = pattern index.
const PERMUTATIONS_BY_PATTERN: [[u32; 7]; DICE_COUNT + 1] = [
    [1, 0, 0, 0, 0, 0, 0],
    [1, 0, 0, 0, 0, 0, 0],
    [2, 1, 0, 0, 0, 0, 0],
    [6, 3, 0, 1, 0, 0, 0],
    [24, 12, 6, 4, 0, 1, 0],
    [120, 60, 30, 20, 10, 5, 1],
];

impl DicePattern {
    pub const ALL: [DicePattern; 7] = [
        DicePattern::None,
        DicePattern::Pair,
        DicePattern::TwoPair,
        DicePattern::ThreeOfAKind,
        DicePattern::FullHouse,
        DicePattern::FourOfAKind,
        DicePattern::FiveOfAKind,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Classify from the two largest face frequencies.
    pub fn from_counts(first: u8, second: u8) -> DicePattern {
        match (first, second) {
            (2, 2) => DicePattern::TwoPair,
            (2, _) => DicePattern::Pair,
            (3, 2) => DicePattern::FullHouse,
            (3, _) => DicePattern::ThreeOfAKind,
            (4, _) => DicePattern::FourOfAKind,
            (5, _) => DicePattern::FiveOfAKind,
            _ => DicePattern::None,
        }
    }

    /// A canonical five-dice roll with this pattern.
    pub fn canonical_example(self) -> [u8; DICE_COUNT] {
        match self {
            DicePattern::None => [5, 4, 3, 2, 1],
            DicePattern::Pair => [4, 4, 3, 2, 1],
            DicePattern::TwoPair => [3, 3, 2, 2, 1],
            DicePattern::ThreeOfAKind => [3, 3, 3, 2, 1],
            DicePattern::FullHouse => [2, 2, 2, 1, 1],
            DicePattern::FourOfAKind => [2, 2, 2, 2, 1],
            DicePattern::FiveOfAKind => [1, 1, 1, 1, 1],
        }
    }

    pub fn is_at_least_three_of_a_kind(self) -> bool {
        matches!(
            self,
            DicePattern::ThreeOfAKind
                | DicePattern::FullHouse
                | DicePattern::FourOfAKind
                | DicePattern::FiveOfAKind
        )
    }

    pub fn is_at_least_four_of_a_kind(self) -> bool {
        matches!(self, DicePattern::FourOfAKind | DicePattern::FiveOfAKind)
    }
}

/// Order-independent multiset key: sum of 6^(face-1).
///
/// Unique for up to five dice since no face count reaches 6.
pub fn dice_key(values: &[u8]) -> u32 {
    values
        .iter()
        .map(|&v| NUM_PERMUTATIONS[v as usize - 1] as u32)
        .sum()
}

/// Count occurrences of each face. `face_count[0]` is unused and
/// `face_count[7]` is a sentinel zero for run detection.
pub fn count_faces(values: &[u8]) -> [u8; 8] {
    let mut face_count = [0u8; 8];
    for &v in values {
        face_count[v as usize] += 1;
    }
    face_count
}

/// Longest run of consecutive faces present.
pub fn longest_run(face_count: &[u8; 8]) -> u8 {
    let mut longest = 0;
    let mut run = 0;
    for &count in &face_count[1..] {
        if count > 0 {
            run += 1;
        } else {
            longest = longest.max(run);
            run = 0;
        }
    }
    longest
}

/// Sort into canonical order: frequency descending, then face descending.
pub fn canonical_order(values: &[u8]) -> Vec<u8> {
    let face_count = count_faces(values);
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|&a, &b| {
        face_count[b as usize]
            .cmp(&face_count[a as usize])
            .then(b.cmp(&a))
    });
    sorted
}

/// An unordered multiset of 0..=5 dice with its precomputed facts.
///
/// Two `Dice` are equal when they have the same count and ordinal, which for
/// store-owned instances means the same multiset.
#[derive(Debug, Clone)]
pub struct Dice {
    values: [u8; DICE_COUNT],
    count: u8,
    ordinal: u16,
    pattern: DicePattern,
    longest_run: u8,
    probability: f64,
    key: u32,
    /// Store indices of the kept remainder for each distinct selection of
    /// this pattern; empty unless `count == 5`.
    keep_results: Vec<usize>,
    base_points: [u32; CATEGORY_COUNT],
}

impl Dice {
    /// Build a multiset from faces in any order.
    ///
    /// For five dice, `resolve` maps the key of each kept remainder to that
    /// remainder's store index, so every smaller multiset must already exist.
    pub(crate) fn new(values: &[u8], ordinal: usize, resolve: impl Fn(u32) -> usize) -> Self {
        let count = values.len();
        assert!(count <= DICE_COUNT, "too many dice: {count}");
        assert!(values.iter().all(|v| (1..=6).contains(v)), "face out of range");

        let face_count = count_faces(values);
        let run = longest_run(&face_count);
        let canonical = canonical_order(values);

        let first = canonical.first().map_or(0, |&v| face_count[v as usize]);
        let second = canonical
            .get(first as usize)
            .map_or(0, |&v| face_count[v as usize]);
        let pattern = DicePattern::from_counts(first, second);

        let probability = PERMUTATIONS_BY_PATTERN[count][pattern.index()] as f64
            / NUM_PERMUTATIONS[count] as f64;

        let mut padded = [0u8; DICE_COUNT];
        padded[..count].copy_from_slice(&canonical);

        let mut keep_results = Vec::new();
        let mut points = [0u32; CATEGORY_COUNT];
        if count == DICE_COUNT {
            keep_results = DiceSelection::distinct(pattern)
                .iter()
                .map(|selection| resolve(dice_key(&selection.apply(&canonical))))
                .collect();
            for category in Category::ALL {
                points[category.index()] = base_points(&canonical, category, pattern, run);
            }
        }

        Dice {
            values: padded,
            count: count as u8,
            ordinal: ordinal as u16,
            pattern,
            longest_run: run,
            probability,
            key: dice_key(values),
            keep_results,
            base_points: points,
        }
    }

    /// Faces in canonical order.
    #[inline(always)]
    pub fn values(&self) -> &[u8] {
        &self.values[..self.count as usize]
    }

    #[inline(always)]
    pub fn count(&self) -> usize {
        self.count as usize
    }

    /// Position among all multisets of the same size.
    #[inline(always)]
    pub fn ordinal(&self) -> usize {
        self.ordinal as usize
    }

    /// Position among all 462 multisets of 0..=5 dice.
    #[inline(always)]
    pub fn index(&self) -> usize {
        KEEP_OFFSETS[self.count as usize] + self.ordinal as usize
    }

    #[inline(always)]
    pub fn pattern(&self) -> DicePattern {
        self.pattern
    }

    pub fn longest_run(&self) -> u8 {
        self.longest_run
    }

    /// Chance of rolling exactly this multiset with `count` dice.
    #[inline(always)]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    #[inline(always)]
    pub fn key(&self) -> u32 {
        self.key
    }

    /// Store indices of the distinct kept remainders, aligned with
    /// [`DiceSelection::distinct`] for this pattern.
    #[inline(always)]
    pub fn keep_results(&self) -> &[usize] {
        &self.keep_results
    }

    /// Rule points before any joker, bonus or used-category adjustments.
    #[inline(always)]
    pub fn base_points(&self, category: Category) -> u32 {
        self.base_points[category.index()]
    }

    pub fn sum(&self) -> u32 {
        self.values().iter().map(|&v| v as u32).sum()
    }
}

impl PartialEq for Dice {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.ordinal == other.ordinal
    }
}

impl Eq for Dice {}
