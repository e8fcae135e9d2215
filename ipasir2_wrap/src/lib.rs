//! A wrapper for incremental satisfiability solvers which implement the IPASIR-2 C API.
//!
//! IPASIR-2 is a C API for incremental sat solvers, with support for solver options, clauses of differing redundancy, and callbacks made during a solve.
//! Information about the API may be found at [github.com/ipasir2/ipasir2](https://github.com/ipasir2/ipasir2).
//!
//! The library wraps the API with owned [solvers](Solver), typed literals, and closures as callbacks.
//! Solvers may be loaded from a shared library at runtime, linked at build time, or built from any table of functions implementing the API.
//!
//! # Orientation
//!
//! - An [Ipasir2] instance holds the functions of the API, and creates [solvers](Solver).
//! - Clauses and assumptions may be given as any collection of [literals](structures::literals).
//!   Literals are native `i32` literals, or any type implementing the [Literal](structures::literal::Literal) trait.
//! - The results of a solve, and the values of literals, are [OptionalBool]s.
//! - Terminate and export [callbacks] are closures, and may borrow from the environment.
//! - Solver [options] are discovered on first use, and may be set from text through [config].
//!
//! Errors reported by a solver through an error code are returned as an [ErrorKind], see [types::err].
//!
//! # Examples
//!
//! ```rust,ignore
//! use ipasir2_wrap::{Ipasir2, OptionalBool, Redundancy};
//!
//! let api = Ipasir2::load("./libcadical.so")?;
//! let mut solver = api.create_solver()?;
//!
//! let mut learnt = 0;
//! solver.set_export_callback(|_: &[i32]| learnt += 1, 2)?;
//!
//! solver.add_clause(&[1, 2, 3], Redundancy::None)?;
//! solver.add_clause(&[-1], Redundancy::None)?;
//! solver.add_clause(&vec![-2], Redundancy::None)?;
//!
//! assert_eq!(solver.solve()?, OptionalBool::TRUE);
//! assert_eq!(solver.lit_value(3)?, OptionalBool::TRUE);
//!
//! assert_eq!(solver.solve_assuming(&[-3])?, OptionalBool::FALSE);
//! assert!(solver.assumption_failed(-3)?);
//!
//! solver.release()?;
//! ```
//!
//! # Safety
//!
//! A solver is trusted to follow the API.
//! Still, values returned by a solver are checked where a check is cheap, and values outside of those permitted are returned as a [ProtocolViolation](ErrorKind::ProtocolViolation).
//!
//! # Logs
//!
//! Calls to [log!](log) are made throughout the library, and the targets are listed in [misc::log].
//!
//! For example, when used with [env_logger](https://docs.rs/env_logger/latest/env_logger/):
//! - Calls made to a solver can be found with `RUST_LOG=solver=trace …`
//! - Registration of callbacks can be found with `RUST_LOG=callbacks …`

pub mod api;
pub mod callbacks;
pub mod config;
pub mod ffi;
pub mod options;
pub mod solver;
pub mod structures;
pub mod symbols;
pub mod types;

pub mod misc;

pub use api::Ipasir2;
pub use options::SolverOption;
pub use solver::{Redundancy, Solver};
pub use structures::{
    literal::Literal,
    literals::{Contiguity, Literals},
    optional_bool::OptionalBool,
};
pub use symbols::Symbols;
pub use types::err::ErrorKind;

/// A result whose error is an [ErrorKind].
pub type Result<T> = std::result::Result<T, ErrorKind>;
