use ipasir2_tests::{
    custom::Lit,
    mock::{Call, Mock},
};
use ipasir2_wrap::{ffi::ipasir2_errorcode, ErrorKind, OptionalBool};

mod lit_value {

    use super::*;

    #[test]
    fn values() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        mock.expect_call(1, Call::val(13, 13));
        mock.expect_call(1, Call::val(-13, 13));
        mock.expect_call(1, Call::val(14, -14));
        mock.expect_call(1, Call::val(15, 0));

        let solver = api.create_solver().unwrap();
        assert_eq!(solver.lit_value(13), Ok(OptionalBool::TRUE));
        assert_eq!(solver.lit_value(-13), Ok(OptionalBool::FALSE));
        assert_eq!(solver.lit_value(14), Ok(OptionalBool::FALSE));
        assert_eq!(solver.lit_value(15), Ok(OptionalBool::UNKNOWN));

        drop(solver);
        mock.verify();
    }

    #[test]
    fn custom_values() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        mock.expect_call(1, Call::val(13, 13));
        mock.expect_call(1, Call::val(-13, 13));
        mock.expect_call(1, Call::val(14, -14));
        mock.expect_call(1, Call::val(15, 0));

        let solver = api.create_solver().unwrap();
        assert_eq!(solver.lit_value(Lit::new(13, true)), Ok(OptionalBool::TRUE));
        assert_eq!(solver.lit_value(Lit::new(13, false)), Ok(OptionalBool::FALSE));
        assert_eq!(solver.lit_value(Lit::new(14, true)), Ok(OptionalBool::FALSE));
        assert_eq!(solver.lit_value(Lit::new(15, true)), Ok(OptionalBool::UNKNOWN));

        drop(solver);
        mock.verify();
    }

    #[test]
    fn failure_is_returned() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        mock.expect_call(
            1,
            Call::val(2, 2).returning(ipasir2_errorcode::IPASIR2_E_INVALID_ARGUMENT),
        );

        let solver = api.create_solver().unwrap();
        assert_eq!(
            solver.lit_value(2),
            Err(ErrorKind::NativeCallFailed {
                operation: "ipasir2_val",
                code: ipasir2_errorcode::IPASIR2_E_INVALID_ARGUMENT
            })
        );

        drop(solver);
        mock.verify();
    }

    #[test]
    fn invalid_value() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        mock.expect_call(1, Call::val(13, 1));

        let solver = api.create_solver().unwrap();
        assert!(matches!(
            solver.lit_value(13),
            Err(ErrorKind::ProtocolViolation { .. })
        ));

        drop(solver);
        mock.verify();
    }
}

mod assumption_failed {

    use super::*;

    #[test]
    fn values() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        mock.expect_call(1, Call::failed(3, 1));
        mock.expect_call(1, Call::failed(-4, 0));
        mock.expect_call(1, Call::failed(5, 1));

        let solver = api.create_solver().unwrap();
        assert_eq!(solver.assumption_failed(3), Ok(true));
        assert_eq!(solver.assumption_failed(-4), Ok(false));
        assert_eq!(solver.assumption_failed(Lit::new(5, true)), Ok(true));

        drop(solver);
        mock.verify();
    }

    #[test]
    fn failure_is_returned() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        mock.expect_call(
            1,
            Call::failed(2, 1).returning(ipasir2_errorcode::IPASIR2_E_INVALID_STATE),
        );

        let solver = api.create_solver().unwrap();
        assert_eq!(
            solver.assumption_failed(2),
            Err(ErrorKind::NativeCallFailed {
                operation: "ipasir2_failed",
                code: ipasir2_errorcode::IPASIR2_E_INVALID_STATE
            })
        );

        drop(solver);
        mock.verify();
    }

    #[test]
    fn invalid_value() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        mock.expect_call(1, Call::failed(2, -1));

        let solver = api.create_solver().unwrap();
        assert!(matches!(
            solver.assumption_failed(2),
            Err(ErrorKind::ProtocolViolation { .. })
        ));

        drop(solver);
        mock.verify();
    }
}
