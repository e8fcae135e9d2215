//! Key structures, such as literals, sequences of literals, and three-valued results.
//!
//! Literals and sequences of literals are defined as traits, so that any representation used by a client may be passed to a solver directly.
//! The native implementation of each trait is the representation used by the IPASIR-2 API.

pub mod literal;
pub mod literals;
pub mod optional_bool;
