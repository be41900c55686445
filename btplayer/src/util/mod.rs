//! Utility functions for D-Bus value conversion.

pub(crate) mod utils;
