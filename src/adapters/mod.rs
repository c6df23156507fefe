//! Adapters for external systems.

pub mod cf;
