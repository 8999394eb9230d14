//! Core module - display state, configuration, and the pipeline error taxonomy

pub mod config;
pub mod error;
pub mod state;
