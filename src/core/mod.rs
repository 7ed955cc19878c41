// src/core/mod.rs

pub mod context;
pub mod engine;
pub mod extractor;
pub mod model;
pub mod oracle;
pub mod scorer;
pub mod types;
