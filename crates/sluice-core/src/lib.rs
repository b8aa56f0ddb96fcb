//! # sluice-core
//! Foundation types and traits for the Sluice wallet stack.

pub mod address;
pub mod amount;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod risk;
pub mod traits;
pub mod transfer;
pub mod types;
