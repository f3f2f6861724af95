//! Property-based tests using proptest
//!
//! These tests generate random sequences of operations, apply them to a
//! SkewQueue and to a plain reference model (a `Vec` searched linearly),
//! and check that both agree after every step.

use proptest::prelude::*;
use skew_queue::{from_fn, Greater, QueueError, SkewQueue};
use std::cell::Cell;

#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    Pop,
    Merge(Vec<i32>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (-100i32..100).prop_map(Op::Push),
        3 => Just(Op::Pop),
        1 => prop::collection::vec(-100i32..100, 0..20).prop_map(Op::Merge),
    ]
}

/// Removes and returns the largest value of the model
fn model_pop(model: &mut Vec<i32>) -> Option<i32> {
    let (pos, _) = model.iter().enumerate().max_by_key(|&(_, v)| *v)?;
    Some(model.swap_remove(pos))
}

/// Test that top() always matches the reference maximum
fn test_model_agreement(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut queue = SkewQueue::new();
    let mut model: Vec<i32> = Vec::new();

    for op in ops {
        match op {
            Op::Push(v) => {
                queue.push(v).unwrap();
                model.push(v);
            }
            Op::Pop => {
                let expected = model_pop(&mut model);
                prop_assert_eq!(queue.pop().ok(), expected);
            }
            Op::Merge(values) => {
                let mut other: SkewQueue<i32> = values.iter().copied().collect();
                let before = queue.len();
                queue.merge(&mut other).unwrap();
                prop_assert_eq!(queue.len(), before + values.len());
                prop_assert!(other.is_empty());
                model.extend(values);
            }
        }

        prop_assert_eq!(queue.len(), model.len());
        prop_assert_eq!(queue.is_empty(), model.is_empty());
        prop_assert_eq!(queue.peek().copied(), model.iter().max().copied());
    }

    prop_assert!(queue.verify_structure());
    Ok(())
}

/// Test that popping everything yields a non-increasing sequence
fn test_pop_order(values: Vec<i32>) -> Result<(), TestCaseError> {
    let queue: SkewQueue<i32> = values.iter().copied().collect();
    let popped = queue.into_sorted_vec();

    let mut expected = values;
    expected.sort_unstable_by(|a, b| b.cmp(a));
    prop_assert_eq!(popped, expected);
    Ok(())
}

/// Test that merge conserves every element of both queues
fn test_merge_conserves(left: Vec<i32>, right: Vec<i32>) -> Result<(), TestCaseError> {
    let mut a = SkewQueue::with_comparator(Greater);
    a.extend(left.iter().copied());
    let mut b = SkewQueue::with_comparator(Greater);
    b.extend(right.iter().copied());

    a.merge(&mut b).unwrap();
    prop_assert_eq!(a.len(), left.len() + right.len());
    prop_assert!(b.is_empty());
    prop_assert!(a.verify_structure());

    let mut expected: Vec<i32> = left.into_iter().chain(right).collect();
    expected.sort_unstable();
    prop_assert_eq!(a.into_sorted_vec(), expected);
    Ok(())
}

/// Test that mutating a clone never shows up in the original
fn test_clone_independent(
    values: Vec<i32>,
    extra: Vec<i32>,
    pops: usize,
) -> Result<(), TestCaseError> {
    let original: SkewQueue<i32> = values.iter().copied().collect();
    let mut copy = original.clone();

    copy.extend(extra);
    for _ in 0..pops {
        let _ = copy.pop();
    }

    let mut expected = values;
    expected.sort_unstable_by(|a, b| b.cmp(a));
    prop_assert_eq!(original.len(), expected.len());
    prop_assert_eq!(original.into_sorted_vec(), expected);
    Ok(())
}

/// Test that an operation failing on its `fail_at`-th comparison changes
/// nothing, and that retrying it gives the undisturbed result
fn test_failure_is_invisible(
    base: Vec<i32>,
    donor: Vec<i32>,
    pushed: i32,
    fail_at: usize,
) -> Result<(), TestCaseError> {
    let calls = Cell::new(0usize);
    let armed = Cell::new(false);
    let cmp = from_fn(|a: &i32, b: &i32| {
        if armed.get() {
            calls.set(calls.get() + 1);
            if calls.get() == fail_at {
                return Err(fail_at);
            }
        }
        Ok(a < b)
    });

    let fill = |values: &[i32]| {
        let mut queue = SkewQueue::with_comparator(&cmp);
        for &v in values {
            queue.push(v).unwrap();
        }
        queue
    };
    let drain = |mut queue: SkewQueue<i32, _>| {
        let mut out = Vec::new();
        while let Ok(v) = queue.pop() {
            out.push(v);
        }
        out
    };

    for step in 0..3 {
        let mut queue = fill(&base);
        let mut other = fill(&donor);
        let reference = (queue.clone(), other.clone());

        calls.set(0);
        armed.set(true);
        let result = match step {
            0 => queue.push(pushed),
            1 => queue.pop().map(|_| ()),
            _ => queue.merge(&mut other),
        };
        armed.set(false);

        match result {
            Err(QueueError::Comparison(at)) => {
                prop_assert_eq!(at, fail_at);
                prop_assert_eq!(queue.len(), reference.0.len());
                prop_assert_eq!(other.len(), reference.1.len());
                prop_assert!(queue.verify_structure());
                prop_assert!(other.verify_structure());

                // Retry with a healthy comparator and compare to a clean run
                let (mut clean, mut clean_other) = reference;
                match step {
                    0 => {
                        queue.push(pushed).unwrap();
                        clean.push(pushed).unwrap();
                    }
                    1 => {
                        prop_assert_eq!(queue.pop().ok(), clean.pop().ok());
                    }
                    _ => {
                        queue.merge(&mut other).unwrap();
                        clean.merge(&mut clean_other).unwrap();
                    }
                }
                prop_assert_eq!(drain(other), drain(clean_other));
                prop_assert_eq!(drain(queue), drain(clean));
            }
            Err(QueueError::Empty) => {
                prop_assert!(base.is_empty());
            }
            Ok(()) => {
                prop_assert!(calls.get() < fail_at);
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_queue_matches_model(ops in prop::collection::vec(op_strategy(), 0..150)) {
        test_model_agreement(ops)?;
    }

    #[test]
    fn test_queue_pop_order(values in prop::collection::vec(-1000i32..1000, 0..200)) {
        test_pop_order(values)?;
    }

    #[test]
    fn test_queue_merge_conserves(
        left in prop::collection::vec(-100i32..100, 0..60),
        right in prop::collection::vec(-100i32..100, 0..60)
    ) {
        test_merge_conserves(left, right)?;
    }

    #[test]
    fn test_queue_clone_independent(
        values in prop::collection::vec(-100i32..100, 0..60),
        extra in prop::collection::vec(-100i32..100, 0..20),
        pops in 0usize..40
    ) {
        test_clone_independent(values, extra, pops)?;
    }

    #[test]
    fn test_queue_failure_is_invisible(
        base in prop::collection::vec(-50i32..50, 0..40),
        donor in prop::collection::vec(-50i32..50, 0..40),
        pushed in -50i32..50,
        fail_at in 1usize..30
    ) {
        test_failure_is_invisible(base, donor, pushed, fail_at)?;
    }
}
