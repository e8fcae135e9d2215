//! Types of the IPASIR-2 C API, as seen from the side of a client.
//!
//! Information about the API may be found at <https://github.com/ipasir2/ipasir2>.
//!
//! Names follow the C header, so the types in this module are not in Rust case.
//!
//! # Enumerations
//!
//! The header defines error codes, redundancy tags, and solver states as C enums.
//! Values of these types are read from memory written by a solver, and a solver may write a value outside of the enumeration.
//! As constructing a Rust enum from an out of range integer is undefined behaviour, each enumeration is instead a transparent wrapper around [c_int] with the enumerated values as associated constants.

#![allow(non_camel_case_types)]

use std::ffi::{c_char, c_int, c_void};

/// Codes used to indicate the success or failure of a function call.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ipasir2_errorcode(pub c_int);

impl ipasir2_errorcode {
    pub const IPASIR2_E_OK: Self = Self(0);
    pub const IPASIR2_E_UNKNOWN: Self = Self(1);
    pub const IPASIR2_E_UNSUPPORTED: Self = Self(2);
    pub const IPASIR2_E_UNSUPPORTED_ARGUMENT: Self = Self(3);
    pub const IPASIR2_E_UNSUPPORTED_OPTION: Self = Self(4);
    pub const IPASIR2_E_INVALID_STATE: Self = Self(5);
    pub const IPASIR2_E_INVALID_ARGUMENT: Self = Self(6);
    pub const IPASIR2_E_INVALID_OPTION_VALUE: Self = Self(7);

    /// Whether the code indicates success.
    pub fn is_ok(self) -> bool {
        self == Self::IPASIR2_E_OK
    }

    /// The name of the code in the C header, if the code is part of the enumeration.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::IPASIR2_E_OK => "IPASIR2_E_OK",
            Self::IPASIR2_E_UNKNOWN => "IPASIR2_E_UNKNOWN",
            Self::IPASIR2_E_UNSUPPORTED => "IPASIR2_E_UNSUPPORTED",
            Self::IPASIR2_E_UNSUPPORTED_ARGUMENT => "IPASIR2_E_UNSUPPORTED_ARGUMENT",
            Self::IPASIR2_E_UNSUPPORTED_OPTION => "IPASIR2_E_UNSUPPORTED_OPTION",
            Self::IPASIR2_E_INVALID_STATE => "IPASIR2_E_INVALID_STATE",
            Self::IPASIR2_E_INVALID_ARGUMENT => "IPASIR2_E_INVALID_ARGUMENT",
            Self::IPASIR2_E_INVALID_OPTION_VALUE => "IPASIR2_E_INVALID_OPTION_VALUE",
            _ => return None,
        };
        Some(name)
    }
}

impl std::fmt::Display for ipasir2_errorcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "unrecognised code {}", self.0),
        }
    }
}

/// Tags noting whether a clause is required, or may be forgotten by the solver.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ipasir2_redundancy(pub c_int);

impl ipasir2_redundancy {
    pub const IPASIR2_R_NONE: Self = Self(0);
    pub const IPASIR2_R_FORGETTABLE: Self = Self(1);
    pub const IPASIR2_R_EQUISATISFIABLE: Self = Self(2);
    pub const IPASIR2_R_EQUIVALENT: Self = Self(3);
}

/// States of a solver, used to note the last state in which an option may be set.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ipasir2_state(pub c_int);

impl ipasir2_state {
    pub const IPASIR2_S_CONFIG: Self = Self(0);
    pub const IPASIR2_S_INPUT: Self = Self(1);
    pub const IPASIR2_S_SAT: Self = Self(2);
    pub const IPASIR2_S_UNSAT: Self = Self(3);
    pub const IPASIR2_S_SOLVING: Self = Self(4);
}

/// A configuration option, as described by a solver.
///
/// Arrays of options returned by [ipasir2_options_fn] end with an option whose name is null.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ipasir2_option {
    /// Unique option identifier.
    pub name: *const c_char,

    /// Minimum allowed value for the option.
    pub min: i64,

    /// Maximum allowed value for the option.
    pub max: i64,

    /// Maximal state in which the option may be set.
    pub max_state: ipasir2_state,

    /// Specifies if the option is eligible for use by automatic tuners.
    pub tunable: c_int,

    /// Specifies if the option may be set per variable.
    pub indexed: c_int,

    /// An opaque pointer for internal use in the setter function.
    pub handle: *const c_void,
}

/// The solve result code for a satisfiable formula.
pub const IPASIR2_SATISFIABLE: c_int = 10;

/// The solve result code for an unsatisfiable formula.
pub const IPASIR2_UNSATISFIABLE: c_int = 20;

/// The callback polled by a solver to check whether a solve should stop.
pub type ipasir2_terminate_callback = extern "C" fn(data: *mut c_void) -> c_int;

/// The callback used by a solver to export a zero-terminated clause.
pub type ipasir2_export_callback = extern "C" fn(data: *mut c_void, clause: *const i32);

pub type ipasir2_signature_fn = unsafe extern "C" fn(signature: *mut *const c_char) -> ipasir2_errorcode;

pub type ipasir2_init_fn = unsafe extern "C" fn(solver: *mut *mut c_void) -> ipasir2_errorcode;

pub type ipasir2_release_fn = unsafe extern "C" fn(solver: *mut c_void) -> ipasir2_errorcode;

pub type ipasir2_add_fn = unsafe extern "C" fn(
    solver: *mut c_void,
    clause: *const i32,
    len: i32,
    redundancy: ipasir2_redundancy,
) -> ipasir2_errorcode;

pub type ipasir2_solve_fn = unsafe extern "C" fn(
    solver: *mut c_void,
    result: *mut c_int,
    literals: *const i32,
    len: i32,
) -> ipasir2_errorcode;

pub type ipasir2_val_fn =
    unsafe extern "C" fn(solver: *mut c_void, lit: i32, result: *mut i32) -> ipasir2_errorcode;

pub type ipasir2_failed_fn =
    unsafe extern "C" fn(solver: *mut c_void, lit: i32, result: *mut i32) -> ipasir2_errorcode;

pub type ipasir2_options_fn = unsafe extern "C" fn(
    solver: *mut c_void,
    options: *mut *const ipasir2_option,
) -> ipasir2_errorcode;

pub type ipasir2_set_option_fn = unsafe extern "C" fn(
    solver: *mut c_void,
    handle: *const ipasir2_option,
    value: i64,
    index: i64,
) -> ipasir2_errorcode;

pub type ipasir2_set_terminate_fn = unsafe extern "C" fn(
    solver: *mut c_void,
    data: *mut c_void,
    callback: Option<ipasir2_terminate_callback>,
) -> ipasir2_errorcode;

pub type ipasir2_set_export_fn = unsafe extern "C" fn(
    solver: *mut c_void,
    data: *mut c_void,
    max_length: i32,
    callback: Option<ipasir2_export_callback>,
) -> ipasir2_errorcode;
