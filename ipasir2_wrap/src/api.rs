//! An instance of the IPASIR-2 API, from which solvers are created.
//!
//! An [Ipasir2] instance is a handle to a shared table of functions, and so is cheap to clone.
//! Any number of solvers may be created from an instance, and each solver keeps the table alive.
//!
//! ```rust,ignore
//! let api = Ipasir2::load("./libsolver.so")?;
//! println!("Loaded {}", api.signature()?);
//!
//! let mut solver = api.create_solver()?;
//! ```

use std::{
    ffi::{c_char, c_void, CStr},
    path::Path,
    sync::Arc,
};

use crate::{
    misc::log::targets::{self},
    solver::Solver,
    symbols::{KeepAlive, SymbolTable, Symbols},
    types::err::{self},
};

/// An instance of the IPASIR-2 API.
#[derive(Clone)]
pub struct Ipasir2 {
    table: Arc<SymbolTable>,
}

impl Ipasir2 {
    /// An instance from the given functions.
    ///
    /// # Safety
    /// Each function must implement the matching function of the IPASIR-2 API, and must remain valid for the lifetime of the process.
    pub unsafe fn from_symbols(symbols: Symbols) -> Self {
        Ipasir2 {
            table: Arc::new(SymbolTable::from_symbols(symbols)),
        }
    }

    /// An instance from the functions resolved when linking.
    #[cfg(feature = "linked")]
    pub fn linked() -> Self {
        // SAFETY: Linked functions are the IPASIR-2 API and are valid for the lifetime of the process.
        unsafe { Self::from_symbols(Symbols::linked()) }
    }

    /// An instance from the shared library at the given path.
    ///
    /// Fails if the library cannot be opened, or if any function of the API is missing from the library.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, err::ErrorKind> {
        let table = SymbolTable::load(path.as_ref())?;
        log::info!(target: targets::LOADER, "Loaded {}", path.as_ref().display());
        Ok(Ipasir2 {
            table: Arc::new(table),
        })
    }

    /// An instance from functions resolved by name through some other means, such as a library opened elsewhere.
    ///
    /// The path is used only to note where the functions were found.
    /// Anything which must outlive the functions, such as the library resolved from, may be given to be kept alive.
    ///
    /// # Safety
    /// Each address returned by the resolver must be that of the IPASIR-2 function named, and must remain valid while the keep alive value exists (or forever, if there is no such value).
    pub unsafe fn load_with<F>(
        path: impl AsRef<Path>,
        keep_alive: Option<KeepAlive>,
        resolve: F,
    ) -> Result<Self, err::ErrorKind>
    where
        F: FnMut(&str) -> Result<*const c_void, String>,
    {
        let table = SymbolTable::resolve_with(path.as_ref(), keep_alive, resolve)?;
        Ok(Ipasir2 {
            table: Arc::new(table),
        })
    }

    /// The name and version of the solver.
    pub fn signature(&self) -> Result<String, err::ErrorKind> {
        let mut signature: *const c_char = std::ptr::null();
        let code = unsafe { (self.table.symbols.signature)(&mut signature) };
        err::check("ipasir2_signature", code)?;

        if signature.is_null() {
            return Err(err::ErrorKind::ProtocolViolation {
                description: "ipasir2_signature gave a null signature".to_string(),
            });
        }

        // SAFETY: A non-null signature is a C string owned by the solver.
        let signature = unsafe { CStr::from_ptr(signature) };
        Ok(signature.to_string_lossy().into_owned())
    }

    /// Creates a solver.
    pub fn create_solver<'cb>(&self) -> Result<Solver<'cb>, err::ErrorKind> {
        Solver::create(Arc::clone(&self.table))
    }

    /// The path of the library the functions were loaded from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.table.origin.as_deref()
    }
}

impl std::fmt::Debug for Ipasir2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ipasir2")
            .field("origin", &self.table.origin)
            .finish_non_exhaustive()
    }
}
