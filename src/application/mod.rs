//! Application services: fragment rendering and build orchestration.

pub mod build;
pub mod error;
pub mod render;
