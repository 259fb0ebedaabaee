//! Reaction kinetics

pub mod rates;

pub use rates::{RateModel, QUOTIENT_EPSILON};
