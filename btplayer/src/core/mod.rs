//! Core internal logic of the player.
//!
//! This module contains the state shared with the poll loop, the poll loop
//! itself, and the audio engine hand-over.

pub(crate) mod engine;
pub(crate) mod poll_loop;
pub(crate) mod session;
