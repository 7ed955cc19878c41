// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod learning;
pub mod persistence;

pub use crate::core::engine::{ApplyOptions, DirtEngine};
pub use crate::core::model::{EquivalenceIndex, EquivalenceModel, EquivalenceRecord};
pub use crate::core::oracle::{ConlluOracle, LinguisticOracle};
pub use crate::learning::ModelBuilder;
