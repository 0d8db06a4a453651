//! Weighted random selection.
//!
//! Draws a uniform `r` in `[0, total)` and walks the candidates accumulating
//! weight, returning the first whose running sum exceeds `r`. Each candidate
//! is therefore chosen with probability `weight / total`.

use rand::rngs::{SmallRng, StdRng, ThreadRng};
use rand::Rng;

use crate::option::DecisionOption;

/// Anything with a selection weight.
pub trait Weighted {
    /// Relative likelihood mass.
    fn weight(&self) -> u64;
}

impl Weighted for DecisionOption {
    fn weight(&self) -> u64 {
        u64::from(self.weight.get())
    }
}

/// Source of uniform integers for the sampler.
///
/// Production code passes a real generator; tests pass a seeded one or a
/// scripted sequence.
pub trait RandomSource {
    /// Returns a uniform integer in `[0, bound)`. `bound` is never zero.
    fn below(&mut self, bound: u64) -> u64;
}

impl RandomSource for StdRng {
    fn below(&mut self, bound: u64) -> u64 {
        self.random_range(0..bound)
    }
}

impl RandomSource for SmallRng {
    fn below(&mut self, bound: u64) -> u64 {
        self.random_range(0..bound)
    }
}

impl RandomSource for ThreadRng {
    fn below(&mut self, bound: u64) -> u64 {
        self.random_range(0..bound)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn below(&mut self, bound: u64) -> u64 {
        (**self).below(bound)
    }
}

/// Sum of all weights, saturating.
#[must_use]
pub fn total_weight<T: Weighted + ?Sized>(items: &[&T]) -> u64 {
    items
        .iter()
        .fold(0u64, |acc, item| acc.saturating_add(item.weight()))
}

/// Picks one item with probability proportional to its weight.
///
/// Returns `None` only for an empty slice. If every weight is zero the first
/// item is returned without consuming randomness.
pub fn pick_weighted<'a, T, R>(items: &[&'a T], rng: &mut R) -> Option<&'a T>
where
    T: Weighted + ?Sized,
    R: RandomSource + ?Sized,
{
    let first = *items.first()?;
    let total = total_weight(items);
    if total == 0 {
        return Some(first);
    }

    let r = rng.below(total);
    let mut cumulative = 0u64;
    for item in items {
        cumulative = cumulative.saturating_add(item.weight());
        if r < cumulative {
            return Some(*item);
        }
    }

    // Only reachable if the source broke its contract (r >= total).
    items.last().copied()
}
