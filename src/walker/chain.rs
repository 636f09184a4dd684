//! Visit function composition
//!
//! `chain` folds an ordered list of visit functions into a single one.
//! Each function receives the flow returned by its predecessor, so an
//! error raised early threads through the rest of the pipeline. The
//! skip signal short-circuits: once a function returns `SkipThis`, no
//! later function runs.

use std::path::Path;

use crate::walker::walk::{EntryInfo, Flow, VisitFn};

/// Combine multiple visit functions into one
///
/// The composition is associative: chaining `[a, chain([b, c])]`,
/// `[chain([a, b]), c]` and `[a, b, c]` produces the same result and
/// the same sequence of invocations.
pub fn chain<'a>(mut visits: Vec<VisitFn<'a>>) -> VisitFn<'a> {
    Box::new(move |path: &Path, info: &EntryInfo, mut flow: Flow| {
        for visit in visits.iter_mut() {
            flow = visit(path, info, flow);
            if flow.is_skip() {
                // terminate early on the skip signal
                return Flow::SkipThis;
            }
        }
        flow
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FindexError;
    use crate::walker::walk::EntryKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn info() -> EntryInfo {
        EntryInfo::new("test", EntryKind::File)
    }

    fn tag(flow: &Flow) -> String {
        match flow {
            Flow::Continue => "continue".to_string(),
            Flow::SkipThis => "skip".to_string(),
            Flow::Failed(e) => format!("failed: {e}"),
        }
    }

    /// What a scripted filter should return when invoked
    #[derive(Clone, Copy)]
    enum Step {
        Pass,
        Skip,
        Fail,
    }

    type CallLog = Rc<RefCell<Vec<(usize, String)>>>;

    fn scripted<'a>(id: usize, step: Step, log: CallLog) -> VisitFn<'a> {
        Box::new(move |_path, _info, flow| {
            log.borrow_mut().push((id, tag(&flow)));
            match step {
                Step::Pass => flow,
                Step::Skip => Flow::SkipThis,
                Step::Fail => Flow::Failed(FindexError::NotOpened),
            }
        })
    }

    fn run(visit: &mut VisitFn<'_>) -> Flow {
        visit(Path::new("/test"), &info(), Flow::Continue)
    }

    #[test]
    fn test_chain_calls_in_order() {
        let log: CallLog = Rc::default();
        let mut chained = chain(vec![
            scripted(1, Step::Pass, log.clone()),
            scripted(2, Step::Pass, log.clone()),
        ]);

        let flow = run(&mut chained);
        assert_eq!(tag(&flow), "continue");
        assert_eq!(
            *log.borrow(),
            vec![(1, "continue".to_string()), (2, "continue".to_string())]
        );
    }

    #[test]
    fn test_chain_short_circuits_on_skip() {
        let log: CallLog = Rc::default();
        let mut chained = chain(vec![
            scripted(1, Step::Skip, log.clone()),
            scripted(2, Step::Pass, log.clone()),
        ]);

        let flow = run(&mut chained);
        assert_eq!(tag(&flow), "skip");
        assert_eq!(*log.borrow(), vec![(1, "continue".to_string())]);
    }

    #[test]
    fn test_chain_threads_errors_through() {
        let log: CallLog = Rc::default();
        let mut chained = chain(vec![
            scripted(1, Step::Fail, log.clone()),
            scripted(2, Step::Pass, log.clone()),
        ]);

        let flow = run(&mut chained);
        assert_eq!(tag(&flow), "failed: index is not opened");
        assert_eq!(
            *log.borrow(),
            vec![
                (1, "continue".to_string()),
                (2, "failed: index is not opened".to_string()),
            ]
        );
    }

    #[test]
    fn test_chain_of_empty_is_identity() {
        let mut chained = chain(vec![]);
        assert_eq!(tag(&run(&mut chained)), "continue");

        let flow = chained(Path::new("/test"), &info(), Flow::SkipThis);
        // an incoming skip passes straight through an empty chain
        assert_eq!(tag(&flow), "skip");
    }

    /// Build the three equivalent groupings of [a, b, c] and assert the
    /// return value and the exact invocation sequence agree.
    fn assert_associative(steps: [Step; 3]) {
        let shapes: Vec<(&str, fn(Vec<VisitFn<'_>>) -> VisitFn<'_>)> = vec![
            ("flat", |mut fns| {
                let c = fns.pop().unwrap();
                let b = fns.pop().unwrap();
                let a = fns.pop().unwrap();
                chain(vec![a, b, c])
            }),
            ("left", |mut fns| {
                let c = fns.pop().unwrap();
                let b = fns.pop().unwrap();
                let a = fns.pop().unwrap();
                chain(vec![chain(vec![a, b]), c])
            }),
            ("right", |mut fns| {
                let c = fns.pop().unwrap();
                let b = fns.pop().unwrap();
                let a = fns.pop().unwrap();
                chain(vec![a, chain(vec![b, c])])
            }),
        ];

        let mut outcomes = Vec::new();
        for (shape, build) in shapes {
            let log: CallLog = Rc::default();
            let fns = vec![
                scripted(1, steps[0], log.clone()),
                scripted(2, steps[1], log.clone()),
                scripted(3, steps[2], log.clone()),
            ];
            let mut chained = build(fns);
            let flow = run(&mut chained);
            outcomes.push((shape, tag(&flow), log.borrow().clone()));
        }

        let (_, first_flow, first_log) = &outcomes[0];
        for (shape, flow, log) in &outcomes[1..] {
            assert_eq!(flow, first_flow, "return value differs for {shape}");
            assert_eq!(log, first_log, "invocation sequence differs for {shape}");
        }
    }

    #[test]
    fn test_chain_is_associative_when_all_pass() {
        assert_associative([Step::Pass, Step::Pass, Step::Pass]);
    }

    #[test]
    fn test_chain_is_associative_with_skip() {
        assert_associative([Step::Pass, Step::Skip, Step::Pass]);
        assert_associative([Step::Skip, Step::Pass, Step::Pass]);
        assert_associative([Step::Pass, Step::Pass, Step::Skip]);
    }

    #[test]
    fn test_chain_is_associative_with_failure() {
        assert_associative([Step::Fail, Step::Pass, Step::Pass]);
        assert_associative([Step::Pass, Step::Fail, Step::Pass]);
    }
}
