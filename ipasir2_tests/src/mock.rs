//! A mock solver, implementing the IPASIR-2 API by checking each call against a queue of expected calls.
//!
//! Each test creates a [Mock], which is current for the thread of the test until dropped.
//! Calls to `ipasir2_init` and `ipasir2_signature` are answered by the current mock, and the solvers created by a mock refer back to the mock, so a solver may be used from any thread.
//!
//! Every instance has an id, given to the mock before the instance is created, and calls are expected per instance:
//!
//! ```rust,ignore
//! let mock = Mock::new();
//! let api = mock.api();
//!
//! mock.expect_init(1);
//! let mut solver = api.create_solver().unwrap();
//!
//! mock.expect_call(1, Call::add([1, 2]));
//! solver.add_clause(&[1, 2], Redundancy::None).unwrap();
//!
//! drop(solver);
//! mock.verify();
//! ```
//!
//! A call which was not expected, or which differs from the call expected, is recorded as a failure and answered with `IPASIR2_E_UNKNOWN`, as it is not possible to panic through the API.
//! Failures are checked by [verify](Mock::verify), and when the mock is dropped.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    ffi::{c_char, c_int, c_void, CStr, CString},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use ipasir2_wrap::{
    ffi::{
        ipasir2_errorcode, ipasir2_export_callback, ipasir2_option, ipasir2_redundancy, ipasir2_state,
        ipasir2_terminate_callback,
    },
    Ipasir2, Symbols,
};

pub type InstanceId = usize;

const OK: ipasir2_errorcode = ipasir2_errorcode::IPASIR2_E_OK;
const UNKNOWN: ipasir2_errorcode = ipasir2_errorcode::IPASIR2_E_UNKNOWN;

/// Callbacks made by the mock during a solve, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum During {
    /// Polls the terminate callback, expecting the given result.
    Terminate { expect: bool },

    /// Exports the given clause, without terminating zero.
    Export(Vec<i32>),
}

/// A call expected by the mock, together with the response of the mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Add {
        clause: Vec<i32>,
        redundancy: ipasir2_redundancy,
        returns: ipasir2_errorcode,
    },

    Solve {
        assumptions: Vec<i32>,
        result: c_int,
        returns: ipasir2_errorcode,
        during: Vec<During>,
    },

    Val {
        literal: i32,
        result: i32,
        returns: ipasir2_errorcode,
    },

    Failed {
        literal: i32,
        result: i32,
        returns: ipasir2_errorcode,
    },

    Options {
        returns: ipasir2_errorcode,
    },

    SetOption {
        name: String,
        value: i64,
        index: i64,
        returns: ipasir2_errorcode,
    },

    SetTerminate {
        registers: bool,
        returns: ipasir2_errorcode,
    },

    SetExport {
        registers: bool,
        max_length: i32,
        returns: ipasir2_errorcode,
    },
}

impl Call {
    pub fn add(clause: impl IntoIterator<Item = i32>) -> Self {
        Call::Add {
            clause: clause.into_iter().collect(),
            redundancy: ipasir2_redundancy::IPASIR2_R_NONE,
            returns: OK,
        }
    }

    pub fn solve(assumptions: impl IntoIterator<Item = i32>, result: c_int) -> Self {
        Call::Solve {
            assumptions: assumptions.into_iter().collect(),
            result,
            returns: OK,
            during: Vec::default(),
        }
    }

    pub fn val(literal: i32, result: i32) -> Self {
        Call::Val {
            literal,
            result,
            returns: OK,
        }
    }

    pub fn failed(literal: i32, result: i32) -> Self {
        Call::Failed {
            literal,
            result,
            returns: OK,
        }
    }

    pub fn options() -> Self {
        Call::Options { returns: OK }
    }

    pub fn set_option(name: &str, value: i64, index: i64) -> Self {
        Call::SetOption {
            name: name.to_string(),
            value,
            index,
            returns: OK,
        }
    }

    pub fn set_terminate(registers: bool) -> Self {
        Call::SetTerminate { registers, returns: OK }
    }

    pub fn set_export(registers: bool, max_length: i32) -> Self {
        Call::SetExport {
            registers,
            max_length,
            returns: OK,
        }
    }

    /// The call, responded to with the given code.
    pub fn returning(mut self, code: ipasir2_errorcode) -> Self {
        match &mut self {
            Call::Add { returns, .. }
            | Call::Solve { returns, .. }
            | Call::Val { returns, .. }
            | Call::Failed { returns, .. }
            | Call::Options { returns }
            | Call::SetOption { returns, .. }
            | Call::SetTerminate { returns, .. }
            | Call::SetExport { returns, .. } => *returns = code,
        }
        self
    }

    /// An add call, expecting the given redundancy.
    pub fn with_redundancy(mut self, expected: ipasir2_redundancy) -> Self {
        if let Call::Add { redundancy, .. } = &mut self {
            *redundancy = expected;
        }
        self
    }

    /// A solve call, making the given callbacks before returning.
    pub fn during(mut self, events: impl IntoIterator<Item = During>) -> Self {
        if let Call::Solve { during, .. } = &mut self {
            during.extend(events);
        }
        self
    }

    fn function(&self) -> &'static str {
        match self {
            Call::Add { .. } => "ipasir2_add",
            Call::Solve { .. } => "ipasir2_solve",
            Call::Val { .. } => "ipasir2_val",
            Call::Failed { .. } => "ipasir2_failed",
            Call::Options { .. } => "ipasir2_options",
            Call::SetOption { .. } => "ipasir2_set_option",
            Call::SetTerminate { .. } => "ipasir2_set_terminate",
            Call::SetExport { .. } => "ipasir2_set_export",
        }
    }
}

/// An option described by the mock.
#[derive(Clone, Debug)]
pub struct MockOption {
    pub name: &'static str,
    pub min: i64,
    pub max: i64,
    pub max_state: ipasir2_state,
    pub tunable: bool,
    pub indexed: bool,
}

#[derive(Default)]
struct Instance {
    initialized: bool,

    released: bool,

    expected: VecDeque<Call>,

    /// Names of the options, kept for as long as the descriptions.
    _names: Vec<CString>,

    /// Descriptions of the options, terminated with a null name once described.
    options: Vec<ipasir2_option>,

    terminate: Option<(ipasir2_terminate_callback, *mut c_void)>,

    export: Option<(ipasir2_export_callback, *mut c_void)>,
}

/// The native handle of an instance.
struct Handle {
    id: InstanceId,

    state: Weak<Mutex<State>>,
}

struct NextInit {
    id: Option<InstanceId>,

    returns: ipasir2_errorcode,
}

#[derive(Default)]
struct State {
    instances: HashMap<InstanceId, Instance>,

    handles: Vec<Box<Handle>>,

    next_init: Option<NextInit>,

    signature: Option<(Option<CString>, ipasir2_errorcode)>,

    failures: Vec<String>,
}

// SAFETY: Raw pointers held by the state are only read or called by the thread holding the lock.
unsafe impl Send for State {}

impl State {
    fn fail(&mut self, message: String) {
        #[cfg(feature = "log")]
        log::error!(target: "mock", "{message}");
        self.failures.push(message);
    }

    fn instance(&mut self, id: InstanceId) -> Result<&mut Instance, String> {
        match self.instances.get_mut(&id) {
            Some(instance) if instance.initialized && !instance.released => Ok(instance),
            Some(_) => Err("function called for a released or uninitialised solver".to_string()),
            None => Err("function called for an unknown solver".to_string()),
        }
    }

    fn pop_expected(&mut self, id: InstanceId, function: &str) -> Result<Call, String> {
        let instance = self.instance(id)?;
        match instance.expected.front() {
            None => Err(format!("{function}(): called, but no further calls expected")),
            Some(call) if call.function() != function => Err(format!(
                "{function}(): called, but {} expected",
                call.function()
            )),
            Some(_) => instance
                .expected
                .pop_front()
                .ok_or_else(|| format!("{function}(): no expected call")),
        }
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

thread_local! {
    static CURRENT: RefCell<Weak<Mutex<State>>> = RefCell::new(Weak::new());
}

fn current() -> Option<Arc<Mutex<State>>> {
    CURRENT.with(|current| current.borrow().upgrade())
}

/// A mock instance of the API.
pub struct Mock {
    state: Arc<Mutex<State>>,
}

impl Default for Mock {
    fn default() -> Self {
        Self::new()
    }
}

impl Mock {
    /// Creates a mock, current for this thread.
    ///
    /// # Panics
    /// If some other mock is current for this thread.
    pub fn new() -> Self {
        let state = Arc::new(Mutex::new(State::default()));
        CURRENT.with(|current| {
            let mut current = current.borrow_mut();
            if current.upgrade().is_some() {
                panic!("a mock already exists on this thread");
            }
            *current = Arc::downgrade(&state);
        });
        Mock { state }
    }

    /// An API instance whose functions are those of the mock.
    pub fn api(&self) -> Ipasir2 {
        // SAFETY: The functions of the mock implement the API, and are static.
        unsafe { Ipasir2::from_symbols(symbols()) }
    }

    /// Expects a call to `ipasir2_init`, creating the instance with the given id.
    pub fn expect_init(&self, id: InstanceId) {
        let mut state = lock(&self.state);
        if state.next_init.is_some() {
            panic!("an init call is already expected");
        }
        if state.instances.get(&id).is_some_and(|instance| instance.initialized) {
            panic!("instance {id} has already been created");
        }
        state.next_init = Some(NextInit { id: Some(id), returns: OK });
    }

    /// Expects a call to `ipasir2_init`, which fails with the given code.
    pub fn expect_init_failure(&self, code: ipasir2_errorcode) {
        lock(&self.state).next_init = Some(NextInit { id: None, returns: code });
    }

    /// Expects a call to the instance with the given id, after any calls already expected.
    pub fn expect_call(&self, id: InstanceId, call: Call) {
        let mut state = lock(&self.state);
        state.instances.entry(id).or_default().expected.push_back(call);
    }

    /// Sets the response to `ipasir2_signature`.
    pub fn set_signature(&self, signature: Option<&str>, returns: ipasir2_errorcode) {
        let signature = signature.map(|s| CString::new(s).expect("a signature without nul"));
        lock(&self.state).signature = Some((signature, returns));
    }

    /// Sets the options described by the instance with the given id.
    pub fn set_options(&self, id: InstanceId, options: &[MockOption]) {
        let names: Vec<CString> = options
            .iter()
            .map(|option| CString::new(option.name).expect("a name without nul"))
            .collect();

        let mut descriptions: Vec<ipasir2_option> = options
            .iter()
            .zip(&names)
            .map(|(option, name)| ipasir2_option {
                name: name.as_ptr(),
                min: option.min,
                max: option.max,
                max_state: option.max_state,
                tunable: option.tunable as c_int,
                indexed: option.indexed as c_int,
                handle: std::ptr::null(),
            })
            .collect();
        descriptions.push(sentinel());

        let mut state = lock(&self.state);
        let instance = state.instances.entry(id).or_default();
        instance._names = names;
        instance.options = descriptions;
    }

    /// Calls the terminate callback registered by the instance, returning the result.
    ///
    /// # Panics
    /// If no terminate callback is registered.
    pub fn simulate_terminate(&self, id: InstanceId) -> bool {
        let registration = lock(&self.state).instances.get(&id).and_then(|i| i.terminate);
        match registration {
            Some((callback, data)) => callback(data) != 0,
            None => panic!("no terminate callback is registered for instance {id}"),
        }
    }

    /// Calls the export callback registered by the instance with the given clause.
    ///
    /// # Panics
    /// If no export callback is registered.
    pub fn simulate_export(&self, id: InstanceId, clause: &[i32]) {
        let registration = lock(&self.state).instances.get(&id).and_then(|i| i.export);
        match registration {
            Some((callback, data)) => export(callback, data, clause),
            None => panic!("no export callback is registered for instance {id}"),
        }
    }

    /// Whether some expected call has not been made, or some instance has not been released.
    pub fn has_outstanding_expects(&self) -> bool {
        let state = lock(&self.state);
        state.next_init.is_some()
            || state
                .instances
                .values()
                .any(|instance| !instance.expected.is_empty() || (instance.initialized && !instance.released))
    }

    /// Failures recorded so far.
    pub fn failures(&self) -> Vec<String> {
        lock(&self.state).failures.clone()
    }

    /// Removes and returns the failures recorded so far.
    pub fn take_failures(&self) -> Vec<String> {
        std::mem::take(&mut lock(&self.state).failures)
    }

    /// Checks no failure has been recorded, and every expected call has been made.
    ///
    /// # Panics
    /// If either check fails.
    pub fn verify(&self) {
        let failures = self.failures();
        assert!(failures.is_empty(), "mock failures: {failures:?}");
        assert!(!self.has_outstanding_expects(), "outstanding expected calls");
    }
}

impl Drop for Mock {
    fn drop(&mut self) {
        CURRENT.with(|current| *current.borrow_mut() = Weak::new());

        if !std::thread::panicking() {
            let failures = self.failures();
            assert!(failures.is_empty(), "mock failures: {failures:?}");
        }
    }
}

fn sentinel() -> ipasir2_option {
    ipasir2_option {
        name: std::ptr::null(),
        min: 0,
        max: 0,
        max_state: ipasir2_state::IPASIR2_S_CONFIG,
        tunable: 0,
        indexed: 0,
        handle: std::ptr::null(),
    }
}

fn export(callback: ipasir2_export_callback, data: *mut c_void, clause: &[i32]) {
    let mut terminated = clause.to_vec();
    terminated.push(0);
    callback(data, terminated.as_ptr())
}

/// The functions of the mock.
pub fn symbols() -> Symbols {
    Symbols {
        signature: mock_signature,
        init: mock_init,
        release: mock_release,
        add: mock_add,
        solve: mock_solve,
        val: mock_val,
        failed: mock_failed,
        options: mock_options,
        set_option: mock_set_option,
        set_terminate: mock_set_terminate,
        set_export: mock_set_export,
    }
}

/// Pops the call expected of an instance, and responds to the call.
fn respond<F>(solver: *mut c_void, function: &'static str, check: F) -> ipasir2_errorcode
where
    F: FnOnce(&Mutex<State>, InstanceId, Call) -> Result<ipasir2_errorcode, String>,
{
    // SAFETY: Non-null solvers are handles created by the mock.
    let Some(handle) = (unsafe { (solver as *const Handle).as_ref() }) else {
        if let Some(state) = current() {
            lock(&state).fail(format!("{function}(): called with a null solver"));
        }
        return UNKNOWN;
    };

    let Some(state) = handle.state.upgrade() else {
        eprintln!("{function}(): called after the mock was dropped");
        return UNKNOWN;
    };

    let expected = lock(&state).pop_expected(handle.id, function);
    let outcome = expected.and_then(|call| check(&state, handle.id, call));

    match outcome {
        Ok(code) => code,
        Err(message) => {
            lock(&state).fail(message);
            UNKNOWN
        }
    }
}

/// The literals given to a function, where a null buffer is a misuse even when empty.
unsafe fn literals<'a>(function: &str, literals: *const i32, length: i32) -> Result<&'a [i32], String> {
    match (literals.is_null(), length) {
        (true, _) => Err(format!("{function}(): called with a null buffer of length {length}")),
        (false, length) if length < 0 => Err(format!("{function}(): called with length {length}")),
        (false, length) => Ok(std::slice::from_raw_parts(literals, length as usize)),
    }
}

unsafe extern "C" fn mock_signature(signature: *mut *const c_char) -> ipasir2_errorcode {
    let Some(state) = current() else {
        eprintln!("ipasir2_signature(): called without a mock");
        return UNKNOWN;
    };

    let mut state = lock(&state);
    let response = state
        .signature
        .as_ref()
        .map(|(name, returns)| (name.as_ref().map_or(std::ptr::null(), |name| name.as_ptr()), *returns));

    match response {
        Some((name, returns)) => {
            *signature = name;
            returns
        }
        None => {
            state.fail("ipasir2_signature(): called unexpectedly".to_string());
            UNKNOWN
        }
    }
}

unsafe extern "C" fn mock_init(solver: *mut *mut c_void) -> ipasir2_errorcode {
    let Some(state) = current() else {
        eprintln!("ipasir2_init(): called without a mock");
        return UNKNOWN;
    };
    let weak = Arc::downgrade(&state);

    let mut state = lock(&state);
    let Some(next) = state.next_init.take() else {
        state.fail("ipasir2_init(): called unexpectedly".to_string());
        return UNKNOWN;
    };

    if let Some(id) = next.id {
        state.instances.entry(id).or_default().initialized = true;

        let handle = Box::new(Handle { id, state: weak });
        *solver = &*handle as *const Handle as *mut c_void;
        state.handles.push(handle);
    }

    next.returns
}

unsafe extern "C" fn mock_release(solver: *mut c_void) -> ipasir2_errorcode {
    let Some(handle) = (solver as *const Handle).as_ref() else {
        if let Some(state) = current() {
            lock(&state).fail("ipasir2_release(): called with a null solver".to_string());
        }
        return UNKNOWN;
    };

    let Some(state) = handle.state.upgrade() else {
        return UNKNOWN;
    };

    let mut state = lock(&state);
    let outcome = match state.instance(handle.id) {
        Ok(instance) if !instance.expected.is_empty() => {
            Err("ipasir2_release(): called with outstanding expected calls".to_string())
        }
        Ok(instance) => {
            instance.released = true;
            instance.terminate = None;
            instance.export = None;
            Ok(OK)
        }
        Err(e) => Err(format!("ipasir2_release(): {e}")),
    };

    match outcome {
        Ok(code) => code,
        Err(message) => {
            state.fail(message);
            UNKNOWN
        }
    }
}

unsafe extern "C" fn mock_add(
    solver: *mut c_void,
    clause: *const i32,
    length: i32,
    redundancy: ipasir2_redundancy,
) -> ipasir2_errorcode {
    let actual = literals("ipasir2_add", clause, length);
    respond(solver, "ipasir2_add", |_, _, call| match call {
        Call::Add {
            clause: expected,
            redundancy: expected_redundancy,
            returns,
        } => {
            let actual = actual?;
            if actual != expected.as_slice() {
                return Err(format!("ipasir2_add(): unexpected clause {actual:?}, expected {expected:?}"));
            }
            if redundancy != expected_redundancy {
                return Err(format!("ipasir2_add(): unexpected redundancy {redundancy:?}"));
            }
            Ok(returns)
        }
        other => Err(format!("ipasir2_add(): expected {other:?}")),
    })
}

unsafe extern "C" fn mock_solve(
    solver: *mut c_void,
    result: *mut c_int,
    assumptions: *const i32,
    length: i32,
) -> ipasir2_errorcode {
    let actual = literals("ipasir2_solve", assumptions, length);
    respond(solver, "ipasir2_solve", |state, id, call| match call {
        Call::Solve {
            assumptions: expected,
            result: outcome,
            returns,
            during,
        } => {
            let actual = actual?;
            if actual != expected.as_slice() {
                return Err(format!(
                    "ipasir2_solve(): unexpected assumptions {actual:?}, expected {expected:?}"
                ));
            }

            for event in during {
                let registrations = lock(state).instances.get(&id).map(|i| (i.terminate, i.export));
                let (terminate, exporter) = registrations.unwrap_or_default();

                match (event, terminate, exporter) {
                    (During::Terminate { expect }, Some((callback, data)), _) => {
                        let stop = callback(data) != 0;
                        if stop != expect {
                            return Err(format!("ipasir2_solve(): terminate callback returned {stop}"));
                        }
                    }
                    (During::Export(clause), _, Some((callback, data))) => export(callback, data, &clause),
                    (event, _, _) => {
                        return Err(format!("ipasir2_solve(): no callback registered for {event:?}"));
                    }
                }
            }

            *result = outcome;
            Ok(returns)
        }
        other => Err(format!("ipasir2_solve(): expected {other:?}")),
    })
}

unsafe extern "C" fn mock_val(solver: *mut c_void, literal: i32, result: *mut i32) -> ipasir2_errorcode {
    respond(solver, "ipasir2_val", |_, _, call| match call {
        Call::Val {
            literal: expected,
            result: value,
            returns,
        } if expected == literal => {
            *result = value;
            Ok(returns)
        }
        other => Err(format!("ipasir2_val(): unexpected literal {literal}, expected {other:?}")),
    })
}

unsafe extern "C" fn mock_failed(solver: *mut c_void, literal: i32, result: *mut i32) -> ipasir2_errorcode {
    respond(solver, "ipasir2_failed", |_, _, call| match call {
        Call::Failed {
            literal: expected,
            result: value,
            returns,
        } if expected == literal => {
            *result = value;
            Ok(returns)
        }
        other => Err(format!("ipasir2_failed(): unexpected literal {literal}, expected {other:?}")),
    })
}

unsafe extern "C" fn mock_options(solver: *mut c_void, options: *mut *const ipasir2_option) -> ipasir2_errorcode {
    respond(solver, "ipasir2_options", |state, id, call| match call {
        Call::Options { returns } => {
            let mut state = lock(state);
            let instance = state.instance(id)?;
            if instance.options.is_empty() {
                instance.options.push(sentinel());
            }
            *options = instance.options.as_ptr();
            Ok(returns)
        }
        other => Err(format!("ipasir2_options(): expected {other:?}")),
    })
}

unsafe extern "C" fn mock_set_option(
    solver: *mut c_void,
    handle: *const ipasir2_option,
    value: i64,
    index: i64,
) -> ipasir2_errorcode {
    let name = match handle.as_ref() {
        Some(option) if !option.name.is_null() => CStr::from_ptr(option.name).to_string_lossy().into_owned(),
        _ => String::default(),
    };

    respond(solver, "ipasir2_set_option", |_, _, call| match call {
        Call::SetOption {
            name: expected,
            value: expected_value,
            index: expected_index,
            returns,
        } => {
            if name != expected {
                return Err(format!("ipasir2_set_option(): unexpected option '{name}', expected '{expected}'"));
            }
            if value != expected_value {
                return Err(format!("ipasir2_set_option(): unexpected value {value}"));
            }
            if index != expected_index {
                return Err(format!("ipasir2_set_option(): unexpected index {index}"));
            }
            Ok(returns)
        }
        other => Err(format!("ipasir2_set_option(): expected {other:?}")),
    })
}

unsafe extern "C" fn mock_set_terminate(
    solver: *mut c_void,
    data: *mut c_void,
    callback: Option<ipasir2_terminate_callback>,
) -> ipasir2_errorcode {
    respond(solver, "ipasir2_set_terminate", |state, id, call| match call {
        Call::SetTerminate { registers, returns } => {
            let mut state = lock(state);
            let instance = state.instance(id)?;
            match (registers, callback) {
                (true, Some(callback)) if !data.is_null() => instance.terminate = Some((callback, data)),
                (true, _) => return Err("ipasir2_set_terminate(): expected a callback, but it was cleared".to_string()),
                (false, None) if data.is_null() => {
                    if returns.is_ok() {
                        instance.terminate = None;
                    }
                }
                (false, _) => return Err("ipasir2_set_terminate(): expected the callback to be cleared".to_string()),
            }
            Ok(returns)
        }
        other => Err(format!("ipasir2_set_terminate(): expected {other:?}")),
    })
}

unsafe extern "C" fn mock_set_export(
    solver: *mut c_void,
    data: *mut c_void,
    max_length: i32,
    callback: Option<ipasir2_export_callback>,
) -> ipasir2_errorcode {
    respond(solver, "ipasir2_set_export", |state, id, call| match call {
        Call::SetExport {
            registers,
            max_length: expected_length,
            returns,
        } => {
            if max_length != expected_length {
                return Err(format!("ipasir2_set_export(): unexpected max length {max_length}"));
            }

            let mut state = lock(state);
            let instance = state.instance(id)?;
            match (registers, callback) {
                (true, Some(callback)) if !data.is_null() => instance.export = Some((callback, data)),
                (true, _) => return Err("ipasir2_set_export(): expected a callback, but it was cleared".to_string()),
                (false, None) if data.is_null() => {
                    if returns.is_ok() {
                        instance.export = None;
                    }
                }
                (false, _) => return Err("ipasir2_set_export(): expected the callback to be cleared".to_string()),
            }
            Ok(returns)
        }
        other => Err(format!("ipasir2_set_export(): expected {other:?}")),
    })
}
