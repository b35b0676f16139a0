//! CLI commands

pub mod render;
pub mod reset;
