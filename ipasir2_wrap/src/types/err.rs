//! Error types used in the library.
//!
//! - Failures reported by a solver through an error code are [NativeCallFailed](ErrorKind::NativeCallFailed), and always note the failing function.
//! - A solver which returns a value outside of the documented range of a function is noted with a [ProtocolViolation](ErrorKind::ProtocolViolation).
//!   If this error is returned there is likely an issue with the solver, rather than with the use of the library.
//! - Errors when loading a solver are only returned when building an [Ipasir2](crate::Ipasir2) instance, and so no partially loaded API is ever seen.
//!
//! Panics inside callbacks are not errors of this kind.
//! These are caught during a solve and resumed once the solver has returned control, see [callbacks](crate::callbacks).
//
//  As with other modules, err::{self} is often used to prefix use of the types with `err::`.

use std::path::PathBuf;

use crate::ffi::ipasir2_errorcode;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// A call to the solver returned a code other than [IPASIR2_E_OK](ipasir2_errorcode::IPASIR2_E_OK).
    #[error("{operation} failed with {code}")]
    NativeCallFailed {
        /// The name of the IPASIR-2 function.
        operation: &'static str,

        /// The code returned.
        code: ipasir2_errorcode,
    },

    /// No option with the given name is supported by the solver.
    #[error("the solver has no option named '{name}'")]
    UnknownOption { name: String },

    /// The solver returned a value which is not permitted by the API.
    #[error("solver protocol violation: {description}")]
    ProtocolViolation { description: String },

    /// A clause or set of assumptions has more literals than may be given to a solver.
    #[error("{length} literals exceed the limit of the API")]
    BufferTooLong { length: usize },

    /// A library could not be opened, or some required function was missing from the library.
    #[error("failed to load {}: {detail}", path.display())]
    LoadFailure { path: PathBuf, detail: String },
}

/// Checks the code returned by a call to the solver.
pub(crate) fn check(operation: &'static str, code: ipasir2_errorcode) -> Result<(), ErrorKind> {
    match code.is_ok() {
        true => Ok(()),
        false => {
            log::trace!(target: crate::misc::log::targets::SOLVER, "{operation} returned {code}");
            Err(ErrorKind::NativeCallFailed { operation, code })
        }
    }
}
