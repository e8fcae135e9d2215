//! Sequences of literals, such as clauses and assumptions, and their conversion to buffers for the IPASIR-2 API.
//!
//! The API takes a sequence of literals as a pointer to contiguous native literals and a length.
//! A sequence is converted to such a buffer in one of three ways, chosen by [classify](Literals::classify):
//! - [Direct](Contiguity::Direct): the sequence is backed by contiguous native literals, and a view of these is passed to the solver without a copy.
//! - [NeedsCopy](Contiguity::NeedsCopy): the sequence contains native literals, though not in contiguous memory, and so the literals are copied to a buffer.
//! - [NeedsConvert](Contiguity::NeedsConvert): the sequence contains some other literal type, and each literal is converted to a buffer.
//!
//! The trait is implemented for slices, arrays, vectors, and boxed slices (contiguous), as well as double-ended queues, linked lists, and ordered sets (not contiguous), and references to any of these.
//!
//! Custom clause types implement the trait, most often by delegating to some contained slice:
//!
//! ```rust
//! # use ipasir2_wrap::structures::literals::{Contiguity, Literals};
//! struct TaggedClause {
//!     literals: Vec<i32>,
//!     tag: usize,
//! }
//!
//! impl Literals for TaggedClause {
//!     fn classify(&self) -> Contiguity<'_> {
//!         self.literals.classify()
//!     }
//!
//!     fn extend_native(&self, buffer: &mut Vec<i32>) {
//!         self.literals.extend_native(buffer)
//!     }
//! }
//! ```
//!
//! # Empty sequences
//!
//! The API distinguishes a null pointer from an explicit length of zero, and so an empty sequence is never passed as a dangling pointer.
//! Instead, the buffer is used and holds only a terminating zero.

use std::collections::{BTreeSet, LinkedList, VecDeque};

use super::literal::Literal;

/// How a sequence of literals may be passed to the solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contiguity<'a> {
    /// The sequence is backed by the given native literals.
    Direct(&'a [i32]),

    /// The sequence contains native literals, but these must be copied.
    NeedsCopy,

    /// The sequence contains some other literal type, and each literal must be converted.
    NeedsConvert,
}

/// A sequence of literals.
pub trait Literals {
    /// How the literals may be passed to the solver.
    fn classify(&self) -> Contiguity<'_>;

    /// Extends the buffer with the literals of the sequence, in native form and in order.
    fn extend_native(&self, buffer: &mut Vec<i32>);
}

/// Whether literals of the type are native literals.
fn is_native<L: Literal>() -> bool {
    L::native_slice(&[]).is_some()
}

/// The classification of a sequence which is not backed by contiguous memory.
fn detached<L: Literal>() -> Contiguity<'static> {
    match is_native::<L>() {
        true => Contiguity::NeedsCopy,
        false => Contiguity::NeedsConvert,
    }
}

impl<L: Literal> Literals for [L] {
    fn classify(&self) -> Contiguity<'_> {
        match L::native_slice(self) {
            Some(natives) => Contiguity::Direct(natives),
            None => Contiguity::NeedsConvert,
        }
    }

    fn extend_native(&self, buffer: &mut Vec<i32>) {
        buffer.extend(self.iter().map(|literal| literal.to_native()))
    }
}

impl<L: Literal, const N: usize> Literals for [L; N] {
    fn classify(&self) -> Contiguity<'_> {
        self.as_slice().classify()
    }

    fn extend_native(&self, buffer: &mut Vec<i32>) {
        self.as_slice().extend_native(buffer)
    }
}

impl<L: Literal> Literals for Vec<L> {
    fn classify(&self) -> Contiguity<'_> {
        self.as_slice().classify()
    }

    fn extend_native(&self, buffer: &mut Vec<i32>) {
        self.as_slice().extend_native(buffer)
    }
}

impl<L: Literal> Literals for Box<[L]> {
    fn classify(&self) -> Contiguity<'_> {
        self.as_ref().classify()
    }

    fn extend_native(&self, buffer: &mut Vec<i32>) {
        self.as_ref().extend_native(buffer)
    }
}

impl<L: Literal> Literals for VecDeque<L> {
    fn classify(&self) -> Contiguity<'_> {
        detached::<L>()
    }

    fn extend_native(&self, buffer: &mut Vec<i32>) {
        buffer.extend(self.iter().map(|literal| literal.to_native()))
    }
}

impl<L: Literal> Literals for LinkedList<L> {
    fn classify(&self) -> Contiguity<'_> {
        detached::<L>()
    }

    fn extend_native(&self, buffer: &mut Vec<i32>) {
        buffer.extend(self.iter().map(|literal| literal.to_native()))
    }
}

impl<L: Literal> Literals for BTreeSet<L> {
    fn classify(&self) -> Contiguity<'_> {
        detached::<L>()
    }

    fn extend_native(&self, buffer: &mut Vec<i32>) {
        buffer.extend(self.iter().map(|literal| literal.to_native()))
    }
}

impl<T: Literals + ?Sized> Literals for &T {
    fn classify(&self) -> Contiguity<'_> {
        (**self).classify()
    }

    fn extend_native(&self, buffer: &mut Vec<i32>) {
        (**self).extend_native(buffer)
    }
}

/// A contiguous view of the literals as native literals, using the buffer only if required.
///
/// The view is either the memory backing the literals, or the front of the buffer.
/// If the buffer is used it is cleared first, and a terminating zero follows the view.
pub fn as_contiguous<'a, S: Literals + ?Sized>(
    literals: &'a S,
    buffer: &'a mut Vec<i32>,
) -> &'a [i32] {
    if let Contiguity::Direct(natives) = literals.classify() {
        if !natives.is_empty() {
            return natives;
        }
    }

    buffer.clear();
    literals.extend_native(buffer);
    terminate(buffer)
}

/// A contiguous view of the literals of an iterator, written to the buffer.
pub fn collect_contiguous<L: Literal, I: IntoIterator<Item = L>>(
    literals: I,
    buffer: &mut Vec<i32>,
) -> &[i32] {
    buffer.clear();
    buffer.extend(literals.into_iter().map(|literal| literal.to_native()));
    terminate(buffer)
}

fn terminate(buffer: &mut Vec<i32>) -> &[i32] {
    let length = buffer.len();
    buffer.push(0);
    &buffer[..length]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    struct Lit(u32, bool);

    impl Literal for Lit {
        fn to_native(self) -> i32 {
            match self.1 {
                true => self.0 as i32,
                false => -(self.0 as i32),
            }
        }

        fn from_native(native: i32) -> Self {
            Lit(native.unsigned_abs(), native.is_positive())
        }
    }

    #[test]
    fn vec_is_direct() {
        let input = vec![1, 2, 3];
        let mut buffer = Vec::default();

        let view = as_contiguous(&input, &mut buffer);
        assert_eq!(view.as_ptr(), input.as_ptr());
        assert_eq!(view.len(), 3);
        assert!(buffer.is_empty());
    }

    #[test]
    fn arrays_and_slices_are_direct() {
        let array = [4, -5];
        let mut buffer = Vec::default();
        assert_eq!(as_contiguous(&array, &mut buffer).as_ptr(), array.as_ptr());

        let slice: &[i32] = &array[1..];
        assert_eq!(as_contiguous(slice, &mut buffer).as_ptr(), slice.as_ptr());

        let boxed: Box<[i32]> = Box::new([7, 8, 9]);
        assert_eq!(as_contiguous(&boxed, &mut buffer).as_ptr(), boxed.as_ptr());
    }

    #[test]
    fn list_is_copied() {
        let input: LinkedList<i32> = [1, -2, 3].into_iter().collect();
        let mut buffer = Vec::default();

        assert_eq!(input.classify(), Contiguity::NeedsCopy);

        let view = as_contiguous(&input, &mut buffer);
        assert_eq!(view, &[1, -2, 3]);
        let view_ptr = view.as_ptr();
        assert_eq!(view_ptr, buffer.as_ptr());
        assert_eq!(buffer, vec![1, -2, 3, 0]);
    }

    #[test]
    fn custom_literals_are_converted() {
        let input = vec![Lit(1, true), Lit(2, false), Lit(3, true)];
        let mut buffer = Vec::default();

        assert_eq!(input.classify(), Contiguity::NeedsConvert);
        assert_eq!(
            VecDeque::from(input.clone()).classify(),
            Contiguity::NeedsConvert
        );

        let view = as_contiguous(&input, &mut buffer);
        assert_eq!(view, &[1, -2, 3]);
        let view_ptr = view.as_ptr();
        assert_eq!(view_ptr, buffer.as_ptr());
    }

    #[test]
    fn empty_is_terminated_buffer() {
        let input: Vec<i32> = Vec::default();
        let mut buffer = vec![5, 6];

        let view = as_contiguous(&input, &mut buffer);
        assert!(view.is_empty());
        let view_ptr = view.as_ptr();
        assert_eq!(view_ptr, buffer.as_ptr());
        assert_eq!(buffer, vec![0]);
    }

    #[test]
    fn buffer_is_reused() {
        let mut buffer = Vec::default();

        let first: VecDeque<i32> = VecDeque::from(vec![1, 2, 3, 4]);
        assert_eq!(as_contiguous(&first, &mut buffer), &[1, 2, 3, 4]);

        let second: BTreeSet<i32> = [-9].into_iter().collect();
        assert_eq!(as_contiguous(&second, &mut buffer), &[-9]);
        assert_eq!(buffer, vec![-9, 0]);
    }

    #[test]
    fn iterators_are_collected() {
        let mut buffer = Vec::default();

        let view = collect_contiguous((1..=3).map(|atom| Lit(atom, atom % 2 == 0)), &mut buffer);
        assert_eq!(view, &[-1, 2, -3]);

        let view = collect_contiguous(std::iter::empty::<i32>(), &mut buffer);
        assert!(view.is_empty());
        assert_eq!(buffer, vec![0]);
    }
}
