//! A three-valued result, for solves and for the values of literals.
//!
//! An [OptionalBool] is true, false, or unknown.
//! In contrast to a [bool] there is no conversion to a boolean, and in contrast to an [Option] of a boolean there is no `if let Some(_)` which silently treats false as a result to act on.
//! So, code such as the following does not compile, and the case of an unknown result must be handled explicitly:
//!
//! ```compile_fail
//! # use ipasir2_wrap::OptionalBool;
//! let result = OptionalBool::UNKNOWN;
//! if result { }
//! ```
//!
//! Instead, for example:
//!
//! ```rust
//! # use ipasir2_wrap::OptionalBool;
//! let result = OptionalBool::from(Some(true));
//! let report = result.map("SAT", "UNSAT", "UNKNOWN");
//! assert_eq!(report, "SAT");
//! ```

/// A boolean which may be unknown.
#[must_use]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OptionalBool {
    value: Option<bool>,
}

impl OptionalBool {
    /// Known, and true.
    pub const TRUE: Self = Self { value: Some(true) };

    /// Known, and false.
    pub const FALSE: Self = Self { value: Some(false) };

    /// Unknown.
    pub const UNKNOWN: Self = Self { value: None };

    /// A known value.
    pub fn new(value: bool) -> Self {
        Self { value: Some(value) }
    }

    /// The value, if known.
    ///
    /// # Panics
    /// If the value is unknown.
    pub fn unwrap(self) -> bool {
        match self.value {
            Some(value) => value,
            None => panic!("called `OptionalBool::unwrap()` on an unknown value"),
        }
    }

    /// Whether the value is known.
    pub fn has_value(self) -> bool {
        self.value.is_some()
    }

    pub fn as_option(self) -> Option<bool> {
        self.value
    }

    /// One of the given values, depending on whether the value is true, false, or unknown.
    pub fn map<T>(self, if_true: T, if_false: T, if_unknown: T) -> T {
        match self.value {
            Some(true) => if_true,
            Some(false) => if_false,
            None => if_unknown,
        }
    }
}

impl From<Option<bool>> for OptionalBool {
    fn from(value: Option<bool>) -> Self {
        Self { value }
    }
}

impl From<OptionalBool> for Option<bool> {
    fn from(value: OptionalBool) -> Self {
        value.value
    }
}

impl std::fmt::Display for OptionalBool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.map("true", "false", "unknown"))
    }
}
