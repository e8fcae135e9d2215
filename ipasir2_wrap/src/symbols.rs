//! The functions of the IPASIR-2 API, resolved once and shared by every solver built from an [Ipasir2](crate::Ipasir2) instance.
//!
//! The functions may be resolved in a few ways:
//! - By loading a library at runtime, see [Ipasir2::load](crate::Ipasir2::load).
//! - By name, through some other means of resolution, see [Ipasir2::load_with](crate::Ipasir2::load_with).
//! - At link time, with the `linked` feature, see [Ipasir2::linked](crate::Ipasir2::linked).
//! - Directly, from a table of functions, see [Ipasir2::from_symbols](crate::Ipasir2::from_symbols).
//!
//! # Library lifetime
//!
//! A loaded library is kept by the table in an [Arc].
//! Each solver holds a reference to the table, and so the library remains loaded until every solver built from the library has been released.

use std::{
    any::Any,
    ffi::c_void,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    ffi::*,
    misc::log::targets::{self},
    types::err::{self},
};

/// A table of the functions of the IPASIR-2 API used by the library.
#[derive(Clone, Copy, Debug)]
pub struct Symbols {
    pub signature: ipasir2_signature_fn,
    pub init: ipasir2_init_fn,
    pub release: ipasir2_release_fn,
    pub add: ipasir2_add_fn,
    pub solve: ipasir2_solve_fn,
    pub val: ipasir2_val_fn,
    pub failed: ipasir2_failed_fn,
    pub options: ipasir2_options_fn,
    pub set_option: ipasir2_set_option_fn,
    pub set_terminate: ipasir2_set_terminate_fn,
    pub set_export: ipasir2_set_export_fn,
}

/// Owned data which must outlive any call through a symbol table, such as a loaded library.
pub type KeepAlive = Arc<dyn Any + Send + Sync>;

/// Resolves each field of [Symbols] by name, returning early with a load failure on the first missing name.
macro_rules! resolve_symbols {
    ($path:expr, $resolve:expr, { $($field:ident: $name:literal),* $(,)? }) => {
        Symbols {
            $(
                $field: {
                    let address = match $resolve($name) {
                        Ok(address) if !address.is_null() => address,
                        Ok(_) => {
                            return Err(missing_symbol($path, $name, "the address is null"));
                        }
                        Err(detail) => {
                            return Err(missing_symbol($path, $name, &detail));
                        }
                    };
                    log::trace!(target: targets::LOADER, "Resolved {} at {address:?}", $name);
                    // SAFETY: The resolver promises an address of a function with the signature of the IPASIR-2 function named.
                    std::mem::transmute::<*const c_void, _>(address)
                },
            )*
        }
    };
}

fn missing_symbol(path: &Path, name: &str, detail: &str) -> err::ErrorKind {
    log::warn!(target: targets::LOADER, "Symbol {name} not found in {}", path.display());
    err::ErrorKind::LoadFailure {
        path: path.to_path_buf(),
        detail: format!("symbol {name} not found: {detail}"),
    }
}

/// The resolved functions, together with anything required to keep the functions valid.
pub(crate) struct SymbolTable {
    pub(crate) symbols: Symbols,

    /// Where the symbols were found, if loaded.
    pub(crate) origin: Option<PathBuf>,

    _keep_alive: Option<KeepAlive>,
}

impl SymbolTable {
    /// A table of functions which remain valid for the lifetime of the process.
    pub(crate) fn from_symbols(symbols: Symbols) -> Self {
        SymbolTable {
            symbols,
            origin: None,
            _keep_alive: None,
        }
    }

    /// A table of functions resolved by name.
    ///
    /// # Safety
    /// Each address returned by the resolver must be that of the IPASIR-2 function named, and must remain valid while the keep alive value exists (or forever, if there is no such value).
    pub(crate) unsafe fn resolve_with<F>(
        path: &Path,
        keep_alive: Option<KeepAlive>,
        mut resolve: F,
    ) -> Result<Self, err::ErrorKind>
    where
        F: FnMut(&str) -> Result<*const c_void, String>,
    {
        let symbols = resolve_symbols!(path, resolve, {
            init: "ipasir2_init",
            release: "ipasir2_release",
            add: "ipasir2_add",
            solve: "ipasir2_solve",
            val: "ipasir2_val",
            failed: "ipasir2_failed",
            options: "ipasir2_options",
            set_option: "ipasir2_set_option",
            set_terminate: "ipasir2_set_terminate",
            set_export: "ipasir2_set_export",
            signature: "ipasir2_signature",
        });

        Ok(SymbolTable {
            symbols,
            origin: Some(path.to_path_buf()),
            _keep_alive: keep_alive,
        })
    }

    /// A table of functions from the library at the given path.
    pub(crate) fn load(path: &Path) -> Result<Self, err::ErrorKind> {
        log::debug!(target: targets::LOADER, "Loading {}", path.display());

        // SAFETY: Initialisation routines of the library are run, and these are trusted as much as the solver itself.
        let library = match unsafe { libloading::Library::new(path) } {
            Ok(library) => Arc::new(library),
            Err(e) => {
                log::warn!(target: targets::LOADER, "Could not open {}: {e}", path.display());
                return Err(err::ErrorKind::LoadFailure {
                    path: path.to_path_buf(),
                    detail: format!("could not open the library: {e}"),
                });
            }
        };

        let resolver = Arc::clone(&library);
        let resolve = |name: &str| -> Result<*const c_void, String> {
            // SAFETY: The symbol is read as an address, and only called through the matching IPASIR-2 signature.
            match unsafe { resolver.get::<*const c_void>(name.as_bytes()) } {
                Ok(symbol) => Ok(*symbol),
                Err(e) => Err(e.to_string()),
            }
        };

        // SAFETY: The library is kept alive by the table, and the symbols are those of the IPASIR-2 API.
        unsafe { Self::resolve_with(path, Some(library as KeepAlive), resolve) }
    }
}

#[cfg(feature = "linked")]
mod linked {
    use std::ffi::{c_char, c_int, c_void};

    use crate::ffi::*;

    extern "C" {
        pub fn ipasir2_signature(signature: *mut *const c_char) -> ipasir2_errorcode;
        pub fn ipasir2_init(solver: *mut *mut c_void) -> ipasir2_errorcode;
        pub fn ipasir2_release(solver: *mut c_void) -> ipasir2_errorcode;
        pub fn ipasir2_add(
            solver: *mut c_void,
            clause: *const i32,
            len: i32,
            redundancy: ipasir2_redundancy,
        ) -> ipasir2_errorcode;
        pub fn ipasir2_solve(
            solver: *mut c_void,
            result: *mut c_int,
            literals: *const i32,
            len: i32,
        ) -> ipasir2_errorcode;
        pub fn ipasir2_val(solver: *mut c_void, lit: i32, result: *mut i32) -> ipasir2_errorcode;
        pub fn ipasir2_failed(solver: *mut c_void, lit: i32, result: *mut i32)
            -> ipasir2_errorcode;
        pub fn ipasir2_options(
            solver: *mut c_void,
            options: *mut *const ipasir2_option,
        ) -> ipasir2_errorcode;
        pub fn ipasir2_set_option(
            solver: *mut c_void,
            handle: *const ipasir2_option,
            value: i64,
            index: i64,
        ) -> ipasir2_errorcode;
        pub fn ipasir2_set_terminate(
            solver: *mut c_void,
            data: *mut c_void,
            callback: Option<ipasir2_terminate_callback>,
        ) -> ipasir2_errorcode;
        pub fn ipasir2_set_export(
            solver: *mut c_void,
            data: *mut c_void,
            max_length: i32,
            callback: Option<ipasir2_export_callback>,
        ) -> ipasir2_errorcode;
    }
}

#[cfg(feature = "linked")]
impl Symbols {
    /// The functions of the IPASIR-2 API as resolved when linking.
    pub fn linked() -> Self {
        Symbols {
            signature: linked::ipasir2_signature,
            init: linked::ipasir2_init,
            release: linked::ipasir2_release,
            add: linked::ipasir2_add,
            solve: linked::ipasir2_solve,
            val: linked::ipasir2_val,
            failed: linked::ipasir2_failed,
            options: linked::ipasir2_options,
            set_option: linked::ipasir2_set_option,
            set_terminate: linked::ipasir2_set_terminate,
            set_export: linked::ipasir2_set_export,
        }
    }
}
