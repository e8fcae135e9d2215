//! Literals are atoms paired with a (boolean) polarity.
//!
//! Or, rather, anything which can be converted to and from the integer representation of a literal used by the IPASIR-2 API.
//! In this representation the absolute value of the integer is the atom, and the sign of the integer is the polarity.
//! Zero is reserved as a terminator of clauses and is never a literal.
//!
//! The 'native' implementation of the literal trait is [i32], with both conversions the identity.
//!
//! An example of a custom literal type:
//!
//! ```rust
//! # use ipasir2_wrap::Literal;
//! #[derive(Clone, Copy, Debug, PartialEq, Eq)]
//! struct Lit {
//!     atom: u32,
//!     polarity: bool,
//! }
//!
//! impl Literal for Lit {
//!     fn to_native(self) -> i32 {
//!         match self.polarity {
//!             true => self.atom as i32,
//!             false => -(self.atom as i32),
//!         }
//!     }
//!
//!     fn from_native(native: i32) -> Self {
//!         Lit {
//!             atom: native.unsigned_abs(),
//!             polarity: native.is_positive(),
//!         }
//!     }
//! }
//!
//! let lit = Lit { atom: 7, polarity: false };
//! assert_eq!(lit.to_native(), -7);
//! assert_eq!(Lit::from_native(-7), lit);
//! ```
//!
//! # Implementation details
//!
//! Whether a slice of literals may be passed to a solver without a copy is decided by the type of the literal, through [native_slice](Literal::native_slice) and [from_native_slice](Literal::from_native_slice).
//! The default implementations of these methods return `None`, and only [i32] returns `Some`.
//! So, the choice is made at compile time and the library never inspects the type of a literal at runtime.

/// Something which can be converted to and from the native representation of a literal.
pub trait Literal: Copy {
    /// The literal in the integer form used by the IPASIR-2 API.
    fn to_native(self) -> i32;

    /// The literal represented by the given integer.
    ///
    /// The integer is never zero when called by the library.
    fn from_native(native: i32) -> Self;

    /// A view of the given literals as native literals, if this requires no conversion.
    fn native_slice(literals: &[Self]) -> Option<&[i32]> {
        let _ = literals;
        None
    }

    /// A view of the given native literals as literals of this type, if this requires no conversion.
    fn from_native_slice(natives: &[i32]) -> Option<&[Self]> {
        let _ = natives;
        None
    }
}

impl Literal for i32 {
    fn to_native(self) -> i32 {
        self
    }

    fn from_native(native: i32) -> Self {
        native
    }

    fn native_slice(literals: &[Self]) -> Option<&[i32]> {
        Some(literals)
    }

    fn from_native_slice(natives: &[i32]) -> Option<&[Self]> {
        Some(natives)
    }
}
