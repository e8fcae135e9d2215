//! A solver instance, created from an [Ipasir2](crate::Ipasir2) instance.
//!
//! A [Solver] owns the native solver, and releases the native solver when dropped.
//! Release may also be made explicitly through [release](Solver::release), in order to observe whether release was successful.
//!
//! # Buffers
//!
//! Clauses and assumptions are given to the native solver as a pointer and a length.
//! Where the literals of a clause are already laid out as native literals in contiguous memory, the memory is given to the solver directly.
//! Otherwise, the literals are copied to a buffer kept by the solver, and reused for each call.
//!
//! # Threads
//!
//! A solver may be sent to another thread, and so callbacks must be [Send].
//! However, calls to a solver are never made concurrently, and so a solver is not [Sync].
//!
//! # Example
//!
//! ```rust,ignore
//! let api = Ipasir2::load("libcadical.so")?;
//! let mut solver = api.create_solver()?;
//!
//! solver.add_clause(&[1, 2], Redundancy::None)?;
//! solver.add_clause(&vec![-1], Redundancy::None)?;
//!
//! if solver.solve()?.unwrap() {
//!     assert_eq!(solver.lit_value(2)?, OptionalBool::TRUE);
//! }
//! ```

use std::{
    ffi::{c_int, c_void},
    ptr::NonNull,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{
    callbacks::CallbackBridge,
    ffi::{ipasir2_redundancy, IPASIR2_SATISFIABLE, IPASIR2_UNSATISFIABLE},
    misc::log::targets::{self},
    options::OptionCache,
    structures::{
        literal::Literal,
        literals::{as_contiguous, collect_contiguous, Literals},
        optional_bool::OptionalBool,
    },
    symbols::SymbolTable,
    types::err::{self},
};

/// Redundancy tags, noting whether a clause must be kept by the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Redundancy {
    /// The clause is part of the formula.
    #[default]
    None,

    /// The clause may be removed by the solver at any time.
    Forgettable,

    /// The clause may be removed, as the clause preserves satisfiability of the formula.
    Equisatisfiable,

    /// The clause may be removed, as the clause preserves the models of the formula.
    Equivalent,
}

impl From<Redundancy> for ipasir2_redundancy {
    fn from(value: Redundancy) -> Self {
        match value {
            Redundancy::None => ipasir2_redundancy::IPASIR2_R_NONE,
            Redundancy::Forgettable => ipasir2_redundancy::IPASIR2_R_FORGETTABLE,
            Redundancy::Equisatisfiable => ipasir2_redundancy::IPASIR2_R_EQUISATISFIABLE,
            Redundancy::Equivalent => ipasir2_redundancy::IPASIR2_R_EQUIVALENT,
        }
    }
}

/// A solver instance.
///
/// Callbacks given to the solver may borrow from the environment for the lifetime `'cb`.
pub struct Solver<'cb> {
    /// The native solver.
    pub(crate) handle: *mut c_void,

    /// An identity, never shared with any other solver of the process.
    identity: u64,

    /// A buffer for literals which require conversion.
    buffer: Vec<i32>,

    /// The closures of the solver, at an address which is stable for the lifetime of the solver.
    bridge: NonNull<CallbackBridge<'cb>>,

    pub(crate) options: OptionCache,

    /// Whether release of the native solver has been attempted.
    released: bool,

    pub(crate) table: Arc<SymbolTable>,
}

// SAFETY: The native solver is only used through the solver, and each closure of the bridge is Send.
unsafe impl Send for Solver<'_> {}

/// The identity of the next solver created.
static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Checks a length fits within the length type of the API.
fn native_length(literals: &[i32]) -> Result<i32, err::ErrorKind> {
    i32::try_from(literals.len()).map_err(|_| err::ErrorKind::BufferTooLong {
        length: literals.len(),
    })
}

impl<'cb> Solver<'cb> {
    /// Creates a native solver through the functions of the table.
    pub(crate) fn create(table: Arc<SymbolTable>) -> Result<Self, err::ErrorKind> {
        let mut handle: *mut c_void = std::ptr::null_mut();
        let code = unsafe { (table.symbols.init)(&mut handle) };
        err::check("ipasir2_init", code)?;
        log::debug!(target: targets::SOLVER, "Created solver {handle:?}");

        let bridge = NonNull::from(Box::leak(Box::<CallbackBridge<'cb>>::default()));

        Ok(Solver {
            handle,
            identity: NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed),
            buffer: Vec::default(),
            bridge,
            options: OptionCache::default(),
            released: false,
            table,
        })
    }

    /// An identity of the solver, distinct from that of every other solver, whether live or released.
    pub(crate) fn identity(&self) -> u64 {
        self.identity
    }

    /// The data pointer given to the native solver with a callback.
    pub(crate) fn cookie(&self) -> *mut c_void {
        self.bridge.as_ptr() as *mut c_void
    }

    pub(crate) fn bridge_mut(&mut self) -> &mut CallbackBridge<'cb> {
        // SAFETY: The bridge is owned by the solver, and is only otherwise accessed by a trampoline during a call to the native solver.
        unsafe { self.bridge.as_mut() }
    }

    /// The native solver, for use with functions outside of the library.
    ///
    /// The pointer must not be released, and remains valid only for the lifetime of the solver.
    pub fn as_raw(&self) -> *mut c_void {
        self.handle
    }

    /// Adds a clause to the solver.
    ///
    /// Any collection of [Literals] may be used, and an empty clause may be added.
    pub fn add_clause<S>(&mut self, clause: &S, redundancy: Redundancy) -> Result<(), err::ErrorKind>
    where
        S: Literals + ?Sized,
    {
        let literals = as_contiguous(clause, &mut self.buffer);
        let length = native_length(literals)?;
        log::trace!(target: targets::SOLVER, "ipasir2_add {literals:?} ({redundancy:?})");

        let code =
            unsafe { (self.table.symbols.add)(self.handle, literals.as_ptr(), length, redundancy.into()) };
        err::check("ipasir2_add", code)
    }

    /// Adds a clause given by an iterator to the solver.
    pub fn add_clause_iter<L, I>(&mut self, clause: I, redundancy: Redundancy) -> Result<(), err::ErrorKind>
    where
        L: Literal,
        I: IntoIterator<Item = L>,
    {
        let literals = collect_contiguous(clause, &mut self.buffer);
        let length = native_length(literals)?;
        log::trace!(target: targets::SOLVER, "ipasir2_add {literals:?} ({redundancy:?})");

        let code =
            unsafe { (self.table.symbols.add)(self.handle, literals.as_ptr(), length, redundancy.into()) };
        err::check("ipasir2_add", code)
    }

    /// Solves the formula of the solver, without any assumptions.
    ///
    /// Returns true if the formula is satisfiable, false if unsatisfiable, and unknown if the solve was stopped early.
    ///
    /// # Panics
    /// If a callback panics during the solve, the panic is resumed once the native solver returns.
    pub fn solve(&mut self) -> Result<OptionalBool, err::ErrorKind> {
        self.solve_assuming(&[] as &[i32])
    }

    /// Solves the formula of the solver under the given assumptions.
    ///
    /// The assumptions hold only for the solve, and failed assumptions may be queried after an unsatisfiable result.
    pub fn solve_assuming<S>(&mut self, assumptions: &S) -> Result<OptionalBool, err::ErrorKind>
    where
        S: Literals + ?Sized,
    {
        let literals = as_contiguous(assumptions, &mut self.buffer);
        let length = native_length(literals)?;
        log::trace!(target: targets::SOLVER, "ipasir2_solve assuming {literals:?}");

        let literals = literals.as_ptr();
        self.solve_native(literals, length)
    }

    /// Solves the formula of the solver under assumptions given by an iterator.
    pub fn solve_assuming_iter<L, I>(&mut self, assumptions: I) -> Result<OptionalBool, err::ErrorKind>
    where
        L: Literal,
        I: IntoIterator<Item = L>,
    {
        let literals = collect_contiguous(assumptions, &mut self.buffer);
        let length = native_length(literals)?;
        log::trace!(target: targets::SOLVER, "ipasir2_solve assuming {literals:?}");

        let literals = literals.as_ptr();
        self.solve_native(literals, length)
    }

    fn solve_native(&mut self, literals: *const i32, length: i32) -> Result<OptionalBool, err::ErrorKind> {
        let mut result: c_int = 0;
        let code = unsafe { (self.table.symbols.solve)(self.handle, &mut result, literals, length) };

        if let Some(failure) = self.bridge_mut().take_failure() {
            log::debug!(target: targets::CALLBACKS, "Resuming a panic from a callback");
            std::panic::resume_unwind(failure);
        }

        err::check("ipasir2_solve", code)?;
        log::trace!(target: targets::SOLVER, "ipasir2_solve result: {result}");

        match result {
            IPASIR2_SATISFIABLE => Ok(OptionalBool::TRUE),
            IPASIR2_UNSATISFIABLE => Ok(OptionalBool::FALSE),
            _ => Ok(OptionalBool::UNKNOWN),
        }
    }

    /// The value of a literal in the model of the last satisfiable solve.
    ///
    /// Unknown if the solver has not assigned a value to the literal.
    pub fn lit_value<L: Literal>(&self, literal: L) -> Result<OptionalBool, err::ErrorKind> {
        let native = literal.to_native();
        let mut result: i32 = 0;
        let code = unsafe { (self.table.symbols.val)(self.handle, native, &mut result) };
        err::check("ipasir2_val", code)?;

        match result {
            0 => Ok(OptionalBool::UNKNOWN),
            value if value == native => Ok(OptionalBool::TRUE),
            value if value == native.wrapping_neg() => Ok(OptionalBool::FALSE),
            value => Err(err::ErrorKind::ProtocolViolation {
                description: format!("ipasir2_val gave {value} for literal {native}"),
            }),
        }
    }

    /// Whether the (assumed) literal is part of the reason for the last unsatisfiable solve.
    pub fn assumption_failed<L: Literal>(&self, literal: L) -> Result<bool, err::ErrorKind> {
        let native = literal.to_native();
        let mut result: i32 = 0;
        let code = unsafe { (self.table.symbols.failed)(self.handle, native, &mut result) };
        err::check("ipasir2_failed", code)?;

        match result {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(err::ErrorKind::ProtocolViolation {
                description: format!("ipasir2_failed gave {value} for literal {native}"),
            }),
        }
    }

    /// Releases the native solver, returning whether release was successful.
    ///
    /// Release is attempted once, and the solver is consumed regardless of the result.
    pub fn release(mut self) -> Result<(), err::ErrorKind> {
        self.released = true;
        let code = unsafe { (self.table.symbols.release)(self.handle) };
        log::debug!(target: targets::SOLVER, "Released solver {:?}: {code}", self.handle);
        err::check("ipasir2_release", code)
    }
}

impl Drop for Solver<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            let code = unsafe { (self.table.symbols.release)(self.handle) };
            match code.is_ok() {
                true => log::debug!(target: targets::SOLVER, "Released solver {:?}", self.handle),
                false => log::warn!(target: targets::SOLVER, "Release of solver {:?} failed with {code}", self.handle),
            }
        }

        // SAFETY: The bridge was leaked from a box on creation, and the native solver no longer has the address.
        unsafe { drop(Box::from_raw(self.bridge.as_ptr())) };
    }
}
