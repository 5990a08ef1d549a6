//! Synthetic data for the dashboard. Nothing here is real: transactions come
//! from a fixed catalog of merchant profiles and period figures from sine-wave
//! variance around a base revenue.
//!
//! All randomness flows through one [`StdRng`] built from a seed, so the same
//! seed always yields the same books.

pub mod periods;
pub mod transactions;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::catalog::Catalog;
use crate::store::TransactionStore;

pub const DEFAULT_SEED: u64 = 0x6269_7073;

pub fn rng_from_seed(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A store loaded with `count` generated transactions dated up to `today`.
pub fn demo_store(seed: u64, count: usize, today: NaiveDate) -> TransactionStore {
    let catalog = Catalog::standard();
    let mut rng = rng_from_seed(seed);
    let txns = transactions::generate_transactions(&mut rng, &catalog, today, count);
    TransactionStore::new(txns, catalog)
}
