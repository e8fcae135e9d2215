//! Callbacks made by a solver during a solve, and the bridge between these and closures.
//!
//! Two callbacks are supported:
//! - A terminate callback, polled by the solver to check whether the solve should stop.
//! - An export callback, given clauses learnt by the solver up to some length.
//!
//! # Implementation details
//!
//! Each solver owns a [CallbackBridge], allocated on the heap when the solver is created and freed only after the native solver has been released.
//! The address of the bridge is given to the native solver as the data pointer of a callback, together with one of the trampolines of this module.
//! So, the native solver never holds the address of a closure, and replacing or clearing a closure can never leave the native solver with a dangling pointer.
//!
//! ## Panics
//!
//! A panic must not unwind into the native solver.
//! Each call to a closure is made within [catch_unwind](std::panic::catch_unwind), and a panic payload is stored in the (single) failure cell of the bridge.
//! The trampoline then asks the solver to stop, and while the cell is occupied no further closures are called.
//! Once the native solve returns, the solver drains the cell and [resumes](std::panic::resume_unwind) the panic, before looking at the code returned.

use std::{
    any::Any,
    ffi::{c_int, c_void},
    panic::{catch_unwind, AssertUnwindSafe},
};

use crate::{
    ffi::{ipasir2_export_callback, ipasir2_terminate_callback},
    misc::log::targets::{self},
    solver::Solver,
    structures::literal::Literal,
    types::err::{self},
};

/// A terminate closure; returning true requests that the solve stop.
pub type TerminateClosure<'cb> = Box<dyn FnMut() -> bool + Send + 'cb>;

/// An export closure, over native literals.
pub type ExportClosure<'cb> = Box<dyn FnMut(&[i32]) + Send + 'cb>;

/// A payload from a panic in some closure.
pub type Failure = Box<dyn Any + Send + 'static>;

/// The closures of a solver, and the cell for a panic from any of these.
#[derive(Default)]
pub(crate) struct CallbackBridge<'cb> {
    terminate: Option<TerminateClosure<'cb>>,

    export: Option<ExportClosure<'cb>>,

    failure: Option<Failure>,
}

impl<'cb> CallbackBridge<'cb> {
    /// Calls the terminate closure, if there is one.
    ///
    /// Returns true if the solve should stop, which is always the case after a panic.
    pub(crate) fn poll_terminate(&mut self) -> bool {
        if self.failure.is_some() {
            return true;
        }

        let Some(callback) = self.terminate.as_mut() else {
            return false;
        };

        match catch_unwind(AssertUnwindSafe(callback)) {
            Ok(stop) => stop,
            Err(payload) => {
                log::debug!(target: targets::CALLBACKS, "Captured a panic from the terminate callback");
                self.failure = Some(payload);
                true
            }
        }
    }

    /// Calls the export closure with the given clause, if there is one and no panic has been captured.
    pub(crate) fn export(&mut self, clause: &[i32]) {
        if self.failure.is_some() {
            return;
        }

        let Some(callback) = self.export.as_mut() else {
            return;
        };

        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(clause))) {
            log::debug!(target: targets::CALLBACKS, "Captured a panic from the export callback");
            self.failure = Some(payload);
        }
    }

    /// Removes and returns a captured panic, if any.
    pub(crate) fn take_failure(&mut self) -> Option<Failure> {
        self.failure.take()
    }

    pub(crate) fn has_terminate(&self) -> bool {
        self.terminate.is_some()
    }

    pub(crate) fn set_terminate(&mut self, callback: Option<TerminateClosure<'cb>>) {
        self.terminate = callback;
    }

    pub(crate) fn set_export(&mut self, callback: Option<ExportClosure<'cb>>) {
        self.export = callback;
    }
}

/// The terminate trampoline given to the native solver.
pub(crate) extern "C" fn terminate_trampoline(data: *mut c_void) -> c_int {
    // SAFETY: The data pointer is the address of the bridge of the solver which registered the trampoline.
    // The bridge lives until the native solver has been released, and no other reference to the bridge exists during a solve.
    let bridge = unsafe { &mut *(data as *mut CallbackBridge<'_>) };

    bridge.poll_terminate() as c_int
}

/// The export trampoline given to the native solver.
pub(crate) extern "C" fn export_trampoline(data: *mut c_void, clause: *const i32) {
    // SAFETY: As with the terminate trampoline.
    let bridge = unsafe { &mut *(data as *mut CallbackBridge<'_>) };

    // SAFETY: The solver passes a zero-terminated clause.
    let clause = unsafe { zero_terminated(clause) };
    bridge.export(clause)
}

/// The literals of a zero-terminated clause, excluding the terminating zero.
///
/// # Safety
/// The pointer must be null, or point to a sequence of integers containing zero which remains valid for the lifetime chosen.
pub(crate) unsafe fn zero_terminated<'a>(clause: *const i32) -> &'a [i32] {
    if clause.is_null() {
        return &[];
    }

    let mut length = 0;
    while *clause.add(length) != 0 {
        length += 1;
    }
    std::slice::from_raw_parts(clause, length)
}

/// An export closure over native literals, which calls the given closure with literals of the given type.
///
/// No conversion is made if the literal type is native, otherwise the literals are converted to a buffer kept by the closure.
pub(crate) fn typed_export<'cb, L, F>(mut callback: F) -> ExportClosure<'cb>
where
    L: Literal + Send + 'cb,
    F: FnMut(&[L]) + Send + 'cb,
{
    let mut converted: Vec<L> = Vec::default();

    Box::new(move |natives: &[i32]| match L::from_native_slice(natives) {
        Some(literals) => callback(literals),
        None => {
            converted.clear();
            converted.extend(natives.iter().map(|native| L::from_native(*native)));
            callback(&converted)
        }
    })
}

/// Registration of callbacks.
///
/// The solver is updated first, unless a terminate callback replaces another.
/// If the update fails, the previous closure is still dropped, and so will not be called again, as the solver may or may not have kept the previous registration.
impl<'cb> Solver<'cb> {
    /// Sets a callback polled during a solve, which stops the solve by returning true.
    ///
    /// Any previous terminate callback is replaced.
    /// As the solver already polls the bridge when a terminate callback is set, a replacement is made without a call to the solver.
    ///
    /// A panic from the callback is resumed by the next solve, and so a panic from a poll made outside of a solve is kept until some later solve.
    ///
    /// ```rust,ignore
    /// let start = std::time::Instant::now();
    /// solver.set_terminate_callback(move || start.elapsed().as_secs() > 10)?;
    /// ```
    pub fn set_terminate_callback<F>(&mut self, callback: F) -> Result<(), err::ErrorKind>
    where
        F: FnMut() -> bool + Send + 'cb,
    {
        if self.bridge_mut().has_terminate() {
            log::debug!(target: targets::CALLBACKS, "Replaced terminate callback");
            self.bridge_mut().set_terminate(Some(Box::new(callback)));
            return Ok(());
        }

        let trampoline: ipasir2_terminate_callback = terminate_trampoline;
        let code = unsafe {
            (self.table.symbols.set_terminate)(self.handle, self.cookie(), Some(trampoline))
        };
        log::debug!(target: targets::CALLBACKS, "Set terminate callback: {code}");

        let outcome = err::check("ipasir2_set_terminate", code);
        let callback: Option<TerminateClosure<'cb>> = match outcome {
            Ok(()) => Some(Box::new(callback)),
            Err(_) => None,
        };
        self.bridge_mut().set_terminate(callback);
        outcome
    }

    /// Clears the terminate callback.
    pub fn clear_terminate_callback(&mut self) -> Result<(), err::ErrorKind> {
        let code = unsafe {
            (self.table.symbols.set_terminate)(self.handle, std::ptr::null_mut(), None)
        };
        log::debug!(target: targets::CALLBACKS, "Cleared terminate callback: {code}");

        self.bridge_mut().set_terminate(None);
        err::check("ipasir2_set_terminate", code)
    }

    /// Sets a callback given each clause learnt during a solve of length at most `max_length`.
    ///
    /// The literals of the clause are given as the chosen literal type.
    /// With native literals the clause is a view of memory owned by the solver, otherwise the clause is converted to a buffer.
    ///
    /// Any previous export callback is replaced.
    /// The solver is always updated, as the maximum length is kept by the solver.
    ///
    /// As with a terminate callback, a panic from the callback is resumed by the next solve.
    pub fn set_export_callback<L, F>(
        &mut self,
        callback: F,
        max_length: i32,
    ) -> Result<(), err::ErrorKind>
    where
        L: Literal + Send + 'cb,
        F: FnMut(&[L]) + Send + 'cb,
    {
        let trampoline: ipasir2_export_callback = export_trampoline;
        let code = unsafe {
            (self.table.symbols.set_export)(
                self.handle,
                self.cookie(),
                max_length,
                Some(trampoline),
            )
        };
        log::debug!(target: targets::CALLBACKS, "Set export callback (max length {max_length}): {code}");

        let outcome = err::check("ipasir2_set_export", code);
        let callback = match outcome {
            Ok(()) => Some(typed_export(callback)),
            Err(_) => None,
        };
        self.bridge_mut().set_export(callback);
        outcome
    }

    /// Clears the export callback.
    pub fn clear_export_callback(&mut self) -> Result<(), err::ErrorKind> {
        let code = unsafe {
            (self.table.symbols.set_export)(self.handle, std::ptr::null_mut(), 0, None)
        };
        log::debug!(target: targets::CALLBACKS, "Cleared export callback: {code}");

        self.bridge_mut().set_export(None);
        err::check("ipasir2_set_export", code)
    }
}
