//! Miscelaneous items.

pub mod log;
