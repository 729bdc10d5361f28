//! Reference data consumed during normalization
//!
//! Shanghai snapshots do not carry daily price limits, so they are looked up
//! from a per-date table loaded once before decoding starts.

mod price_limit;

pub use price_limit::{PriceLimit, PriceLimitSource, PriceLimitTable};
