//! Controller layer: line parsing and command forwarding.

pub mod commands;
pub mod orchestration;
