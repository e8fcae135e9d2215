use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use ipasir2_tests::{
    custom::Lit,
    mock::{Call, During, Mock},
};
use ipasir2_wrap::{ffi::ipasir2_errorcode, OptionalBool};

type Clauses = Vec<Vec<i32>>;

mod set_export {

    use super::*;

    #[test]
    fn set_and_clear() {
        ipasir2_tests::init_logging();
        let mock = Mock::new();
        let api = mock.api();

        let received: [Mutex<Clauses>; 3] = Default::default();
        let snapshot = || {
            received
                .iter()
                .map(|r| r.lock().unwrap().clone())
                .collect::<Vec<_>>()
        };

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::set_export(true, 1024));
        let result = solver.set_export_callback(
            |clause: &[i32]| received[0].lock().unwrap().push(clause.to_vec()),
            1024,
        );
        assert!(result.is_ok());
        mock.simulate_export(1, &[-1, 2]);
        assert_eq!(snapshot(), vec![vec![vec![-1, 2]], vec![], vec![]]);

        mock.expect_call(1, Call::set_export(true, 512));
        let result = solver.set_export_callback(
            |clause: &[i32]| received[1].lock().unwrap().push(clause.to_vec()),
            512,
        );
        assert!(result.is_ok());
        mock.simulate_export(1, &[]);
        assert_eq!(snapshot(), vec![vec![vec![-1, 2]], vec![vec![]], vec![]]);

        mock.expect_call(1, Call::set_export(false, 0));
        assert!(solver.clear_export_callback().is_ok());

        mock.expect_call(1, Call::set_export(true, 0));
        let result = solver.set_export_callback(
            |clause: &[i32]| received[2].lock().unwrap().push(clause.to_vec()),
            0,
        );
        assert!(result.is_ok());
        mock.simulate_export(1, &[3, 5]);
        assert_eq!(
            snapshot(),
            vec![vec![vec![-1, 2]], vec![vec![]], vec![vec![3, 5]]]
        );

        drop(solver);
        mock.verify();
    }

    #[test]
    fn failed_set_drops_closure() {
        let mock = Mock::new();
        let api = mock.api();

        let called_old = AtomicBool::new(false);

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::set_export(true, 1024));
        let result = solver.set_export_callback(
            |_: &[i32]| called_old.store(true, Ordering::Relaxed),
            1024,
        );
        assert!(result.is_ok());

        mock.expect_call(
            1,
            Call::set_export(true, 1024).returning(ipasir2_errorcode::IPASIR2_E_UNKNOWN),
        );
        assert!(solver.set_export_callback(|_: &[i32]| {}, 1024).is_err());

        mock.simulate_export(1, &[1]);
        assert!(!called_old.load(Ordering::Relaxed));

        drop(solver);
        mock.verify();
    }

    #[test]
    fn failed_clear_drops_closure() {
        let mock = Mock::new();
        let api = mock.api();

        let called_old = AtomicBool::new(false);

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::set_export(true, 1024));
        let result = solver.set_export_callback(
            |_: &[i32]| called_old.store(true, Ordering::Relaxed),
            1024,
        );
        assert!(result.is_ok());

        mock.expect_call(
            1,
            Call::set_export(false, 0).returning(ipasir2_errorcode::IPASIR2_E_UNKNOWN),
        );
        assert!(solver.clear_export_callback().is_err());

        mock.simulate_export(1, &[1]);
        assert!(!called_old.load(Ordering::Relaxed));

        drop(solver);
        mock.verify();
    }

    #[test]
    fn custom_literals() {
        let mock = Mock::new();
        let api = mock.api();

        let received: Mutex<Vec<Lit>> = Mutex::default();

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::set_export(true, 1024));
        let result = solver.set_export_callback(
            |clause: &[Lit]| *received.lock().unwrap() = clause.to_vec(),
            1024,
        );
        assert!(result.is_ok());

        mock.simulate_export(1, &[1, -2, 3]);
        assert_eq!(
            *received.lock().unwrap(),
            vec![Lit::new(1, true), Lit::new(2, false), Lit::new(3, true)]
        );

        mock.simulate_export(1, &[]);
        assert!(received.lock().unwrap().is_empty());

        mock.simulate_export(1, &[2, 3]);
        assert_eq!(
            *received.lock().unwrap(),
            vec![Lit::new(2, true), Lit::new(3, true)]
        );

        drop(solver);
        mock.verify();
    }

    #[test]
    fn exported_during_solve() {
        let mock = Mock::new();
        let api = mock.api();

        let received: Mutex<Clauses> = Mutex::default();

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::set_export(true, 2));
        let result = solver.set_export_callback(
            |clause: &[i32]| received.lock().unwrap().push(clause.to_vec()),
            2,
        );
        assert!(result.is_ok());

        mock.expect_call(
            1,
            Call::solve([3], 20).during([During::Export(vec![-3]), During::Export(vec![1, 2])]),
        );
        assert_eq!(solver.solve_assuming(&[3]), Ok(OptionalBool::FALSE));
        assert_eq!(*received.lock().unwrap(), vec![vec![-3], vec![1, 2]]);

        drop(solver);
        mock.verify();
    }

    #[test]
    fn panic_is_resumed_once() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::set_export(true, 0));
        let result = solver.set_export_callback(|_: &[i32]| panic!("test panic"), 0);
        assert!(result.is_ok());

        // Outside of a solve, so the panic is held until the next solve returns.
        mock.simulate_export(1, &[1, 2, 3]);

        let assumptions = vec![1, 2];

        mock.expect_call(1, Call::solve([1, 2], 10));
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            solver.solve_assuming(&assumptions)
        }));
        let payload = outcome.expect_err("the panic is resumed");
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"test panic"));

        mock.expect_call(1, Call::solve([1, 2], 10));
        assert_eq!(solver.solve_assuming(&assumptions), Ok(OptionalBool::TRUE));

        drop(solver);
        mock.verify();
    }

    #[test]
    fn panic_takes_priority_over_failure() {
        let mock = Mock::new();
        let api = mock.api();

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::set_export(true, 4));
        let result = solver.set_export_callback(|_: &[i32]| panic!("export failure"), 4);
        assert!(result.is_ok());

        mock.expect_call(
            1,
            Call::solve([], 0)
                .returning(ipasir2_errorcode::IPASIR2_E_INVALID_STATE)
                .during([During::Export(vec![-3, 4])]),
        );
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| solver.solve()));
        let payload = outcome.expect_err("the panic is resumed");
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"export failure"));

        drop(solver);
        mock.verify();
    }

    #[test]
    fn panic_suppresses_callbacks() {
        let mock = Mock::new();
        let api = mock.api();

        let exports = AtomicUsize::new(0);
        let polls = AtomicUsize::new(0);

        mock.expect_init(1);
        let mut solver = api.create_solver().unwrap();

        mock.expect_call(1, Call::set_export(true, 8));
        let result = solver.set_export_callback(
            |_: &[i32]| {
                exports.fetch_add(1, Ordering::Relaxed);
                panic!("export failure")
            },
            8,
        );
        assert!(result.is_ok());

        mock.expect_call(1, Call::set_terminate(true));
        let result = solver.set_terminate_callback(|| {
            polls.fetch_add(1, Ordering::Relaxed);
            false
        });
        assert!(result.is_ok());

        mock.expect_call(
            1,
            Call::solve([], 0).during([
                During::Export(vec![1]),
                During::Terminate { expect: true },
                During::Export(vec![2]),
            ]),
        );
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| solver.solve()));
        assert!(outcome.is_err());
        assert_eq!(exports.load(Ordering::Relaxed), 1);
        assert_eq!(polls.load(Ordering::Relaxed), 0);

        drop(solver);
        mock.verify();
    }
}
