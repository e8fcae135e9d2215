//! Tests of the IPASIR-2 wrapper, against a mock solver.
//!
//! The mock is in [mock], and tests are in the `tests` directory.
//! With the `log` feature, logs of a test may be seen through [init_logging] and `RUST_LOG`.

pub mod mock;

/// Initialises a logger for tests, when built with the `log` feature.
pub fn init_logging() {
    #[cfg(feature = "log")]
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Options described by the mock in tests of options.
pub fn test_options() -> Vec<mock::MockOption> {
    use ipasir2_wrap::ffi::ipasir2_state;

    vec![
        mock::MockOption {
            name: "test_option_1",
            min: -1000,
            max: 1000,
            max_state: ipasir2_state::IPASIR2_S_CONFIG,
            tunable: true,
            indexed: false,
        },
        mock::MockOption {
            name: "test_option_2",
            min: 0,
            max: 100,
            max_state: ipasir2_state::IPASIR2_S_SOLVING,
            tunable: false,
            indexed: true,
        },
    ]
}

/// Literal and clause types other than native literals.
pub mod custom {
    use ipasir2_wrap::{Contiguity, Literal, Literals};

    /// A literal as a variable and a polarity.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    pub struct Lit {
        pub var: i32,
        pub positive: bool,
    }

    impl Lit {
        pub fn new(var: i32, positive: bool) -> Self {
            Lit { var, positive }
        }
    }

    impl Literal for Lit {
        fn to_native(self) -> i32 {
            match self.positive {
                true => self.var,
                false => -self.var,
            }
        }

        fn from_native(native: i32) -> Self {
            Lit {
                var: native.abs(),
                positive: native > 0,
            }
        }
    }

    /// A clause with a name, backed by native literals.
    pub struct NamedClause {
        pub name: &'static str,
        pub literals: Vec<i32>,
    }

    impl Literals for NamedClause {
        fn classify(&self) -> Contiguity<'_> {
            self.literals.classify()
        }

        fn extend_native(&self, buffer: &mut Vec<i32>) {
            self.literals.extend_native(buffer)
        }
    }
}
