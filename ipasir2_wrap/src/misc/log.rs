/*!
Miscelanous items related to [logging](log).

Calls to the log macro are made throughout the library.
Calls made to the solver are logged at the trace level, registration of callbacks and discovery of options at the debug level.

Note, no log implementation is provided.
For more details, see [log].
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to [loading](crate::symbols) a solver.
    pub const LOADER: &str = "loader";

    /// Logs related to calls made through a [solver](crate::solver).
    pub const SOLVER: &str = "solver";

    /// Logs related to [callbacks](crate::callbacks).
    pub const CALLBACKS: &str = "callbacks";

    /// Logs related to solver [options](crate::options).
    pub const OPTIONS: &str = "options";
}
