//! Domain layer types and invariants.

pub mod cakes;
pub mod entities;
pub mod error;
