//! handlers/mod.rs
pub mod tracking_handler;
