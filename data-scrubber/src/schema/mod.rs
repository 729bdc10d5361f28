//! Data schema
//!
//! Raw venue records as decoded from the exports, and the canonical events
//! they are normalized into.

mod market_data;
mod raw;

pub use market_data::*;
pub use raw::*;
