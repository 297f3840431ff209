//! Application services layer.

pub mod cakes;
pub mod context;
pub mod error;
pub mod repos;
