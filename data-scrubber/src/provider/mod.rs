//! Venue providers
//!
//! Each venue module knows its archive names, binds decoders to a file's
//! header and normalizes raw records into canonical events.

pub mod fields;
pub mod sse;
pub mod szse;
mod traits;

pub use traits::*;
