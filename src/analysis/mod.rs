//! Analysis modules.
//!
//! Validation, region filtering and fund aggregation. Each step takes the
//! table it operates on and returns new derived values.

pub mod aggregator;
pub mod region;
pub mod validator;

pub use aggregator::*;
pub use region::*;
pub use validator::*;
