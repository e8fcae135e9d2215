//! Configuration options supported by a solver.
//!
//! Options are discovered on first use through `ipasir2_options`, and the result of the call is kept for the lifetime of the solver.
//! This is so even if discovery fails, as the set of options of a solver does not change.
//!
//! A [SolverOption] is an owned copy of the description given by the solver, noting the solver it was taken from.
//! Setting an option taken from some other solver fails with [UnknownOption](err::ErrorKind::UnknownOption), without a call to the solver.

use std::ffi::{c_void, CStr};

use crate::{
    ffi::{ipasir2_option, ipasir2_state},
    misc::log::targets::{self},
    solver::Solver,
    types::err::{self},
};

/// A configuration option of a solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverOption {
    name: String,

    min: i64,

    max: i64,

    max_state: ipasir2_state,

    tunable: bool,

    indexed: bool,

    /// The identity of the solver which described the option.
    owner: u64,

    /// The position of the description in the array given by the solver.
    position: usize,
}

impl SolverOption {
    /// The (unique) name of the option.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The least value permitted.
    pub fn min_value(&self) -> i64 {
        self.min
    }

    /// The greatest value permitted.
    pub fn max_value(&self) -> i64 {
        self.max
    }

    /// The last state in which the option may be set.
    pub fn max_state(&self) -> ipasir2_state {
        self.max_state
    }

    /// Whether the option is intended for use by automatic tuners.
    pub fn is_tunable(&self) -> bool {
        self.tunable
    }

    /// Whether the option may be set per variable, with the variable as the index.
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }
}

impl std::fmt::Display for SolverOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}, {}]", self.name, self.min, self.max)
    }
}

/// The options of a solver, together with the descriptions used to set each option.
///
/// The descriptions are owned by the solver, and remain valid until the solver is released.
pub(crate) struct Discovered {
    options: Vec<SolverOption>,

    descriptions: Vec<*const ipasir2_option>,
}

impl Discovered {
    fn position(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|option| option.name == name)
    }
}

/// The result of discovery, if discovery has been made.
#[derive(Default)]
pub(crate) struct OptionCache {
    discovered: Option<Result<Discovered, err::ErrorKind>>,
}

/// Reads the array of descriptions given by a solver, up to the first description with a null name.
///
/// # Safety
/// The array must be terminated by a description with a null name, and each name before must be a valid C string.
unsafe fn read_descriptions(array: *const ipasir2_option, owner: u64) -> Discovered {
    let mut discovered = Discovered {
        options: Vec::default(),
        descriptions: Vec::default(),
    };

    if array.is_null() {
        return discovered;
    }

    let mut position = 0;
    loop {
        let description = array.add(position);
        let raw = &*description;
        if raw.name.is_null() {
            break;
        }

        discovered.options.push(SolverOption {
            name: CStr::from_ptr(raw.name).to_string_lossy().into_owned(),
            min: raw.min,
            max: raw.max,
            max_state: raw.max_state,
            tunable: raw.tunable != 0,
            indexed: raw.indexed != 0,
            owner,
            position,
        });
        discovered.descriptions.push(description);
        position += 1;
    }

    discovered
}

impl Solver<'_> {
    /// The options of the solver, discovering these if needed.
    fn discovered(&mut self) -> Result<&Discovered, err::ErrorKind> {
        let owner = self.identity();
        let handle = self.handle;
        let options_fn = self.table.symbols.options;

        let outcome = self.options.discovered.get_or_insert_with(|| {
            let mut array: *const ipasir2_option = std::ptr::null();
            let code = unsafe { options_fn(handle, &mut array) };
            err::check("ipasir2_options", code)?;

            let discovered = unsafe { read_descriptions(array, owner) };
            log::debug!(target: targets::OPTIONS, "Discovered {} options", discovered.options.len());
            Ok(discovered)
        });

        match &*outcome {
            Ok(discovered) => Ok(discovered),
            Err(e) => Err(e.clone()),
        }
    }

    /// All options supported by the solver, in the order given by the solver.
    pub fn get_options(&mut self) -> Result<&[SolverOption], err::ErrorKind> {
        Ok(&self.discovered()?.options)
    }

    /// The option with the given name.
    pub fn get_option(&mut self, name: &str) -> Result<SolverOption, err::ErrorKind> {
        let discovered = self.discovered()?;
        match discovered.position(name) {
            Some(position) => Ok(discovered.options[position].clone()),
            None => Err(err::ErrorKind::UnknownOption {
                name: name.to_owned(),
            }),
        }
    }

    /// Whether the solver has an option with the given name.
    pub fn has_option(&mut self, name: &str) -> Result<bool, err::ErrorKind> {
        Ok(self.discovered()?.position(name).is_some())
    }

    /// Sets an option of the solver, where the option was taken from this solver.
    ///
    /// The index is ignored by the solver unless the option is indexed.
    pub fn set_option(
        &mut self,
        option: &SolverOption,
        value: i64,
        index: i64,
    ) -> Result<(), err::ErrorKind> {
        let identity = self.identity();
        let discovered = self.discovered()?;

        let description = match option.owner == identity {
            true => discovered.descriptions.get(option.position).copied(),
            false => None,
        };

        match description {
            Some(description) => self.set_described(description, &option.name, value, index),
            None => Err(err::ErrorKind::UnknownOption {
                name: option.name.clone(),
            }),
        }
    }

    /// Sets the option of the solver with the given name.
    pub fn set_option_by_name(
        &mut self,
        name: &str,
        value: i64,
        index: i64,
    ) -> Result<(), err::ErrorKind> {
        let discovered = self.discovered()?;

        match discovered.position(name) {
            Some(position) => {
                let description = discovered.descriptions[position];
                self.set_described(description, name, value, index)
            }
            None => Err(err::ErrorKind::UnknownOption {
                name: name.to_owned(),
            }),
        }
    }

    fn set_described(
        &mut self,
        description: *const ipasir2_option,
        name: &str,
        value: i64,
        index: i64,
    ) -> Result<(), err::ErrorKind> {
        log::trace!(target: targets::OPTIONS, "ipasir2_set_option {name} = {value} (index {index})");
        let code = unsafe { (self.table.symbols.set_option)(self.handle, description, value, index) };
        err::check("ipasir2_set_option", code)
    }
}
