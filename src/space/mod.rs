//! Parameter space enumeration
//!
//! The search space is the Cartesian product of the pipeline's axes. Instead
//! of materializing it, every tuple is addressed by a linear index in
//! `[0, ∏ bases)` and recovered by mixed-radix unranking, with the last axis
//! varying fastest. Any sub-range of indices is therefore a valid, cheap
//! unit of work.

pub mod tasks;

pub use tasks::{TaskPlan, WorkerTask};

/// Linear index into a parameter space.
///
/// 128 bits leaves room for products such as `26 · n² · n · n` with
/// realistic dictionaries.
pub type SpaceIndex = u128;

/// Mixed-radix digits of `x` over `bases`, in axis order.
///
/// `x` must be below the product of `bases`; every base must be non-zero.
pub fn mixed_radix_unrank(x: SpaceIndex, bases: &[usize]) -> Vec<usize> {
    let mut digits = vec![0; bases.len()];
    unrank_into(x, bases, &mut digits);
    digits
}

/// Allocation-free form of [`mixed_radix_unrank`]: writes into `digits`,
/// which must be as long as `bases`.
#[inline]
pub fn unrank_into(mut x: SpaceIndex, bases: &[usize], digits: &mut [usize]) {
    debug_assert_eq!(bases.len(), digits.len());
    for (digit, &base) in digits.iter_mut().zip(bases).rev() {
        let base = base as SpaceIndex;
        *digit = (x % base) as usize;
        x /= base;
    }
}

/// Inverse of [`mixed_radix_unrank`].
pub fn mixed_radix_rank(digits: &[usize], bases: &[usize]) -> SpaceIndex {
    digits
        .iter()
        .zip(bases)
        .fold(0, |acc, (&d, &b)| acc * b as SpaceIndex + d as SpaceIndex)
}

/// Number of tuples in the product of `bases`, or `None` on overflow.
///
/// An empty base list has exactly one (empty) tuple.
pub fn total_combinations(bases: &[usize]) -> Option<SpaceIndex> {
    bases
        .iter()
        .try_fold(1 as SpaceIndex, |acc, &b| acc.checked_mul(b as SpaceIndex))
}
