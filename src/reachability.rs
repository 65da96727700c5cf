//! Reachable upper-section subtotals for each set of used upper categories.
//!
//! A subtotal n is reachable for a set of upper boxes when some assignment of
//! 0..=5 matching dice per box sums to exactly n. Subtotals of 63 and above
//! collapse to 63, matching the cap kept in [`TurnState`](crate::types::TurnState).
//! Pruning the unreachable pairs keeps the solver's state space at
//! [`TURN_STATE_COUNT`](crate::constants::TURN_STATE_COUNT).

use std::sync::LazyLock;

use tracing::debug;

use crate::constants::*;
use crate::types::CategorySet;

/// Highest exact upper subtotal: five of every face.
const MAX_UPPER_SUM: usize = 5 * (1 + 2 + 3 + 4 + 5 + 6);

const UPPER_MASKS: usize = 1 << NUM_FACES;

static SHARED: LazyLock<UpperTotals> = LazyLock::new(UpperTotals::new);

/// Reachable capped subtotals, per upper-category mask, ascending.
#[derive(Debug, Clone)]
pub struct UpperTotals {
    totals: Vec<Vec<u8>>,
}

impl UpperTotals {
    pub fn new() -> Self {
        // exact[n][mask]: mask's boxes can sum to exactly n
        let mut exact = vec![[false; UPPER_MASKS]; MAX_UPPER_SUM + 1];
        exact[0][0] = true;

        // Add one face at a time. A mask is settled when its highest face is
        // processed, since `prev` then only holds faces already added.
        for face in 1..=NUM_FACES {
            let bit = 1 << (face - 1);
            for n in (0..=MAX_UPPER_SUM).rev() {
                for mask in (0..UPPER_MASKS).filter(|m| m & bit != 0) {
                    if exact[n][mask] {
                        continue;
                    }
                    let prev = mask ^ bit;
                    exact[n][mask] = (0..=DICE_COUNT)
                        .map(|k| k * face)
                        .take_while(|&points| points <= n)
                        .any(|points| exact[n - points][prev]);
                }
            }
        }

        let cap = UPPER_BONUS_THRESHOLD as usize;
        let totals: Vec<Vec<u8>> = (0..UPPER_MASKS)
            .map(|mask| {
                let mut list: Vec<u8> = (0..cap).filter(|&n| exact[n][mask]).map(|n| n as u8).collect();
                if (cap..=MAX_UPPER_SUM).any(|n| exact[n][mask]) {
                    list.push(cap as u8);
                }
                list
            })
            .collect();

        let reachable: usize = totals.iter().map(Vec::len).sum();
        debug!(
            reachable,
            total = UPPER_MASKS * (cap + 1),
            "upper subtotal reachability"
        );
        UpperTotals { totals }
    }

    /// Process-wide instance, built on first use.
    pub fn shared() -> &'static UpperTotals {
        &SHARED
    }

    /// Capped subtotals reachable with exactly the upper boxes in `used`.
    pub fn all_possible(&self, used: CategorySet) -> &[u8] {
        &self.totals[used.upper().bits() as usize]
    }

    pub fn is_reachable(&self, used: CategorySet, upper_total: u32) -> bool {
        self.all_possible(used).contains(&(upper_total as u8))
    }
}

impl Default for UpperTotals {
    fn default() -> Self {
        Self::new()
    }
}
