use std::sync::atomic::{AtomicBool, Ordering};

use ipasir2_tests::mock::{Call, During, Mock};
use ipasir2_wrap::{OptionalBool, Redundancy};

mod portfolio {

    use super::*;

    #[test]
    fn solvers_on_threads() {
        ipasir2_tests::init_logging();
        let mock = Mock::new();
        let api = mock.api();

        let stop = AtomicBool::new(false);

        let mut solvers = Vec::default();
        for id in 1..=3 {
            mock.expect_init(id);
            let mut solver = api.create_solver().unwrap();

            mock.expect_call(id, Call::add([1, -2]));
            assert!(solver.add_clause(&[1, -2], Redundancy::None).is_ok());

            mock.expect_call(id, Call::set_terminate(true));
            assert!(solver.set_terminate_callback(|| stop.load(Ordering::Relaxed)).is_ok());

            solvers.push(solver);
        }

        mock.expect_call(1, Call::solve([], 10).during([During::Terminate { expect: false }]));

        // The first solver finishes, and the remaining solvers are asked to stop.
        let first = solvers.remove(0);
        let (first, result) = crossbeam::thread::scope(|scope| {
            let handle = scope.spawn(move |_| {
                let mut solver = first;
                let result = solver.solve();
                (solver, result)
            });
            handle.join().unwrap()
        })
        .unwrap();
        assert_eq!(result, Ok(OptionalBool::TRUE));

        stop.store(true, Ordering::Relaxed);

        for id in 2..=3 {
            mock.expect_call(id, Call::solve([], 0).during([During::Terminate { expect: true }]));
        }

        let outcomes = crossbeam::thread::scope(|scope| {
            let handles = solvers
                .into_iter()
                .map(|mut solver| {
                    scope.spawn(move |_| {
                        let result = solver.solve();
                        (solver, result)
                    })
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        })
        .unwrap();

        for (solver, result) in outcomes {
            assert_eq!(result, Ok(OptionalBool::UNKNOWN));
            assert!(solver.release().is_ok());
        }
        assert!(first.release().is_ok());

        mock.verify();
    }
}
