//! Public API module.
//!
//! This module contains the high-level user-facing API for the `btplayer` crate.

pub mod config;
pub mod host;
pub mod models;
pub mod player;
