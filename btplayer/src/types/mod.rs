//! Type definitions and constants.
//!
//! This module contains BlueZ names and the adapter's default timings.

pub(crate) mod constants;
