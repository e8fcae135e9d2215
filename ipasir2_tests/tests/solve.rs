use ipasir2_tests::{
    custom::Lit,
    mock::{Call, Mock},
};
use ipasir2_wrap::{ffi::ipasir2_errorcode, ErrorKind, OptionalBool, Redundancy};

mod solve {

    use super::*;

    #[test]
    fn results() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::solve([], 10));
        mock.expect_call(1, Call::solve([], 20));
        mock.expect_call(1, Call::solve([], 0));

        assert_eq!(solver.solve(), Ok(OptionalBool::TRUE));
        assert_eq!(solver.solve(), Ok(OptionalBool::FALSE));
        assert_eq!(solver.solve(), Ok(OptionalBool::UNKNOWN));

        drop(solver);
        mock.verify();
    }

    #[test]
    fn assumptions() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::solve([1, -2], 10));
        mock.expect_call(1, Call::solve([3], 20));
        mock.expect_call(1, Call::solve([-4, 5], 10));
        mock.expect_call(1, Call::solve([6, 7], 0));

        assert_eq!(solver.solve_assuming(&vec![1, -2]), Ok(OptionalBool::TRUE));
        assert_eq!(solver.solve_assuming(&[Lit::new(3, true)]), Ok(OptionalBool::FALSE));
        assert_eq!(
            solver.solve_assuming(&std::collections::VecDeque::from([-4, 5])),
            Ok(OptionalBool::TRUE)
        );
        assert_eq!(solver.solve_assuming_iter(6..8), Ok(OptionalBool::UNKNOWN));

        drop(solver);
        mock.verify();
    }

    #[test]
    fn empty_assumptions_are_given_a_buffer() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::solve([], 10));
        mock.expect_call(1, Call::solve([], 10));
        mock.expect_call(1, Call::solve([], 20));
        mock.expect_call(1, Call::solve([], 20));

        assert_eq!(solver.solve(), Ok(OptionalBool::TRUE));
        assert_eq!(solver.solve_assuming(&Vec::<i32>::default()), Ok(OptionalBool::TRUE));
        assert_eq!(solver.solve_assuming(&[] as &[Lit]), Ok(OptionalBool::FALSE));
        assert_eq!(solver.solve_assuming_iter(std::iter::empty::<Lit>()), Ok(OptionalBool::FALSE));

        drop(solver);
        mock.verify();
    }

    #[test]
    fn failure_is_returned() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(
            1,
            Call::solve([1], 10).returning(ipasir2_errorcode::IPASIR2_E_UNSUPPORTED),
        );

        assert_eq!(
            solver.solve_assuming(&[1]),
            Err(ErrorKind::NativeCallFailed {
                operation: "ipasir2_solve",
                code: ipasir2_errorcode::IPASIR2_E_UNSUPPORTED
            })
        );

        drop(solver);
        mock.verify();
    }

    #[test]
    fn small_formula() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::add([1, 2, 3]));
        mock.expect_call(1, Call::add([-1]));
        mock.expect_call(1, Call::add([-2]));
        mock.expect_call(1, Call::solve([], 10));
        mock.expect_call(1, Call::val(3, 3));
        mock.expect_call(1, Call::val(1, -1));
        mock.expect_call(1, Call::val(4, 0));

        for clause in [vec![1, 2, 3], vec![-1], vec![-2]] {
            assert!(solver.add_clause(&clause, Redundancy::None).is_ok());
        }

        let result = solver.solve().unwrap();
        assert_eq!(result.map("SAT", "UNSAT", "UNKNOWN"), "SAT");
        assert_eq!(solver.lit_value(3), Ok(OptionalBool::TRUE));
        assert_eq!(solver.lit_value(1), Ok(OptionalBool::FALSE));
        assert_eq!(solver.lit_value(4), Ok(OptionalBool::UNKNOWN));

        assert!(solver.release().is_ok());
        mock.verify();
    }
}
