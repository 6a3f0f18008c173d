// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Tests for the expression VM

use super::compiler::compile;
use super::program::Program;
use super::vm::VM;
use crate::core::{Error, Value};
use crate::functions::SymbolTable;
use crate::plan::ExprNode;

fn col(index: usize) -> ExprNode {
    ExprNode::column(format!("c{}", index), index)
}

fn lit(value: impl Into<Value>) -> ExprNode {
    ExprNode::literal(value)
}

fn call(name: &str, args: Vec<ExprNode>) -> ExprNode {
    ExprNode::call(name, args)
}

fn build(tree: &ExprNode) -> Program {
    compile(tree, &SymbolTable::with_builtins()).unwrap()
}

#[test]
fn test_literal_and_input() {
    let vm = VM::new();
    let program = build(&call("add", vec![col(1), lit(10)]));

    let row = vec![Value::text("ignored"), Value::integer(5)];
    let result = vm.evaluate(&program, None, &row).unwrap();
    assert!(matches!(result, Value::Integer(15)));
}

#[test]
fn test_input_out_of_bounds() {
    let vm = VM::new();
    let program = build(&col(5));

    let row = vec![Value::integer(1), Value::integer(2)];
    let err = vm.evaluate(&program, None, &row).unwrap_err();
    assert_eq!(err, Error::Index { index: 5, len: 2 });
}

#[test]
fn test_if_evaluates_one_branch() {
    let vm = VM::new();
    // The else branch reads a column that does not exist
    let program = build(&ExprNode::if_then_else(
        call("gt", vec![col(0), lit(0)]),
        col(1),
        col(9),
    ));

    let row = vec![Value::integer(1), Value::text("then")];
    let result = vm.evaluate(&program, None, &row).unwrap();
    assert_eq!(result.as_str(), Some("then"));

    let row = vec![Value::integer(-1), Value::text("then")];
    assert!(matches!(
        vm.evaluate(&program, None, &row),
        Err(Error::Index { index: 9, .. })
    ));
}

#[test]
fn test_if_null_condition_takes_else() {
    let vm = VM::new();
    let program = build(&ExprNode::if_then_else(col(0), lit(1), lit(2)));
    let result = vm.evaluate(&program, None, &[Value::Null]).unwrap();
    assert!(matches!(result, Value::Integer(2)));
}

#[test]
fn test_aggregate_requires_instance() {
    let vm = VM::new();
    let program = build(&call("sum", vec![col(0)]));
    let err = vm.evaluate(&program, None, &[Value::integer(1)]).unwrap_err();
    assert!(matches!(err, Error::State(_)));
}

#[test]
fn test_pure_over_aggregates() {
    let vm = VM::new();
    let program = build(&call("add", vec![call("sum", vec![col(0)]), lit(100)]));
    let mut instance = vm.alloc_instance(&program);

    for v in [1, 2, 3] {
        vm.accumulate(&program, &mut instance, &[Value::integer(v)])
            .unwrap();
    }
    let result = vm.result(&program, &instance).unwrap();
    assert!(matches!(result, Value::Integer(106)));
}

#[test]
fn test_aggregate_arguments_are_expressions() {
    let vm = VM::new();
    // sum(c0 * c1)
    let program = build(&call("sum", vec![call("mul", vec![col(0), col(1)])]));
    let mut instance = vm.alloc_instance(&program);

    vm.accumulate_batch(
        &program,
        &mut instance,
        &[
            vec![Value::integer(2), Value::integer(3)],
            vec![Value::integer(4), Value::integer(5)],
        ],
    )
    .unwrap();
    assert!(matches!(
        vm.result(&program, &instance).unwrap(),
        Value::Integer(26)
    ));
}

#[test]
fn test_conditional_aggregation_literal_condition() {
    let vm = VM::new();
    let program = build(&ExprNode::if_then_else(
        lit(true),
        call("sum", vec![col(0)]),
        call("count", vec![col(0)]),
    ));
    let mut instance = vm.alloc_instance(&program);

    for v in [5, 6] {
        vm.accumulate(&program, &mut instance, &[Value::integer(v)])
            .unwrap();
    }

    // The else branch never saw a row
    let values = vm.aggregate_values(&program, &instance).unwrap();
    assert!(matches!(values[0], Value::Integer(11)));
    assert!(matches!(values[1], Value::Integer(0)));
    assert!(matches!(
        vm.result(&program, &instance).unwrap(),
        Value::Integer(11)
    ));
}

#[test]
fn test_conditional_aggregation_row_condition() {
    let vm = VM::new();
    // if(gt(c0, 0), sum(c0), count(c0)) accumulates per row
    let program = build(&ExprNode::if_then_else(
        call("gt", vec![col(0), lit(0)]),
        call("sum", vec![col(0)]),
        call("count", vec![col(0)]),
    ));
    let mut instance = vm.alloc_instance(&program);

    for v in [3, -1, 4, -5, -9] {
        vm.accumulate(&program, &mut instance, &[Value::integer(v)])
            .unwrap();
    }

    let values = vm.aggregate_values(&program, &instance).unwrap();
    assert!(matches!(values[0], Value::Integer(7)));
    assert!(matches!(values[1], Value::Integer(3)));

    // The condition is re-evaluated against the row given at read time
    let result = vm
        .evaluate(&program, Some(&instance), &[Value::integer(-1)])
        .unwrap();
    assert!(matches!(result, Value::Integer(3)));
}

#[test]
fn test_aggregate_condition_accumulates_both_branches() {
    let vm = VM::new();
    // if(gt(count(), 2), sum(c0), mean(c0))
    let program = build(&ExprNode::if_then_else(
        call("gt", vec![call("count", vec![]), lit(2)]),
        call("sum", vec![col(0)]),
        call("mean", vec![col(0)]),
    ));
    let mut instance = vm.alloc_instance(&program);

    vm.accumulate(&program, &mut instance, &[Value::integer(2)])
        .unwrap();
    vm.accumulate(&program, &mut instance, &[Value::integer(4)])
        .unwrap();
    assert!(matches!(
        vm.result(&program, &instance).unwrap(),
        Value::Float(f) if f == 3.0
    ));

    vm.accumulate(&program, &mut instance, &[Value::integer(6)])
        .unwrap();
    assert!(matches!(
        vm.result(&program, &instance).unwrap(),
        Value::Integer(12)
    ));
}

#[test]
fn test_non_aggregate_instance() {
    let vm = VM::new();
    let program = build(&call("mul", vec![col(0), lit(2)]));
    let mut instance = vm.alloc_instance(&program);
    assert!(!instance.is_aggregate());
    assert!(vm.result(&program, &instance).unwrap().is_null());

    vm.accumulate(&program, &mut instance, &[Value::integer(21)])
        .unwrap();
    assert!(matches!(
        vm.result(&program, &instance).unwrap(),
        Value::Integer(42)
    ));

    // Save/load round-trips the stored value
    let mut buf = Vec::new();
    vm.save_state(&program, &instance, &mut buf).unwrap();
    let mut copy = vm.alloc_instance(&program);
    vm.load_state(&program, &mut copy, &mut buf.as_slice())
        .unwrap();
    assert!(matches!(
        vm.result(&program, &copy).unwrap(),
        Value::Integer(42)
    ));

    // Merge overwrites
    let mut other = vm.alloc_instance(&program);
    vm.accumulate(&program, &mut other, &[Value::integer(1)])
        .unwrap();
    vm.merge(&program, &mut copy, &other).unwrap();
    assert!(matches!(
        vm.result(&program, &copy).unwrap(),
        Value::Integer(2)
    ));

    assert!(vm.aggregate_values(&program, &copy).unwrap().is_empty());
}

#[test]
fn test_instance_bound_to_program() {
    let vm = VM::new();
    let a = build(&call("count", vec![]));
    let b = build(&call("count", vec![]));

    let mut ia = vm.alloc_instance(&a);
    let ib = vm.alloc_instance(&b);
    assert!(matches!(vm.merge(&a, &mut ia, &ib), Err(Error::State(_))));
    assert!(matches!(
        vm.accumulate(&b, &mut ia, &[]),
        Err(Error::State(_))
    ));
    assert!(matches!(
        vm.evaluate(&b, Some(&ia), &[]),
        Err(Error::State(_))
    ));
}

#[test]
fn test_reset_and_free() {
    let vm = VM::new();
    let program = build(&call("count", vec![]));
    let mut instance = vm.alloc_instance(&program);
    assert_eq!(instance.storage_size(), program.dynamic_storage_size());

    vm.accumulate(&program, &mut instance, &[]).unwrap();
    vm.accumulate(&program, &mut instance, &[]).unwrap();
    vm.reset_instance(&program, &mut instance).unwrap();
    assert!(matches!(
        vm.result(&program, &instance).unwrap(),
        Value::Integer(0)
    ));

    vm.accumulate(&program, &mut instance, &[]).unwrap();
    assert!(matches!(
        vm.result(&program, &instance).unwrap(),
        Value::Integer(1)
    ));
    vm.free_instance(&program, instance).unwrap();
}

#[test]
fn test_save_load_aggregates_in_order() {
    let vm = VM::new();
    let program = build(&call(
        "concat",
        vec![
            call("count", vec![col(0)]),
            lit("/"),
            call("sum", vec![col(0)]),
        ],
    ));
    let mut instance = vm.alloc_instance(&program);
    for v in [Value::integer(1), Value::null(), Value::integer(2)] {
        vm.accumulate(&program, &mut instance, &[v]).unwrap();
    }

    let mut buf = Vec::new();
    let written = vm.save_state(&program, &instance, &mut buf).unwrap();
    assert_eq!(written, buf.len());
    // count varint first, then sum tag + double
    assert_eq!(buf[0], 2);
    assert_eq!(buf[1], 0);
    assert_eq!(&buf[2..10], &3.0f64.to_le_bytes());

    let mut loaded = vm.alloc_instance(&program);
    vm.load_state(&program, &mut loaded, &mut buf.as_slice())
        .unwrap();
    let result = vm.result(&program, &loaded).unwrap();
    assert_eq!(result.as_str(), Some("2/3"));
}

#[test]
fn test_load_truncated_state_fails() {
    let vm = VM::new();
    let program = build(&call("mean", vec![col(0)]));
    let mut instance = vm.alloc_instance(&program);
    let mut cursor: &[u8] = &[3, 0, 0];
    assert!(matches!(
        vm.load_state(&program, &mut instance, &mut cursor),
        Err(Error::Io { .. })
    ));
}

#[test]
fn test_failed_load_keeps_previous_state() {
    let vm = VM::new();
    let program = build(&call(
        "add",
        vec![call("count", vec![col(0)]), call("sum", vec![col(0)])],
    ));
    let mut instance = vm.alloc_instance(&program);
    for i in 1..=3 {
        vm.accumulate(&program, &mut instance, &[Value::integer(i)])
            .unwrap();
    }
    let before = vm.aggregate_values(&program, &instance).unwrap();
    assert_eq!(before, vec![Value::integer(3), Value::integer(6)]);

    // count decodes to 100, then the sum double is cut short
    let mut cursor: &[u8] = &[100, 0, 0, 0];
    assert!(matches!(
        vm.load_state(&program, &mut instance, &mut cursor),
        Err(Error::Io { .. })
    ));

    let after = vm.aggregate_values(&program, &instance).unwrap();
    assert_eq!(after, before);
    assert!(matches!(after[0], Value::Integer(3)));
}

#[test]
fn test_evaluate_batch() {
    let vm = VM::new();
    let program = build(&call("neg", vec![col(0)]));
    let rows = vec![vec![Value::integer(1)], vec![Value::float(2.5)]];
    let results = vm.evaluate_batch(&program, &rows).unwrap();
    assert!(matches!(results[0], Value::Integer(-1)));
    assert!(matches!(results[1], Value::Float(f) if f == -2.5));
}

#[test]
fn test_evaluate_predicate_batch() {
    let vm = VM::new();
    let program = build(&call("gte", vec![col(0), lit(10)]));
    let rows = vec![
        vec![Value::integer(5)],
        vec![Value::integer(10)],
        vec![Value::null()],
        vec![Value::integer(11)],
    ];
    let (selection, count) = vm.evaluate_predicate_batch(&program, &rows).unwrap();
    assert_eq!(selection, vec![false, true, false, true]);
    assert_eq!(count, 2);
}

#[test]
fn test_many_arguments_spill() {
    let vm = VM::new();
    let args: Vec<ExprNode> = (0..12).map(|i| lit(i as i64)).collect();
    let program = build(&call("concat", args));
    let result = vm.evaluate(&program, None, &[]).unwrap();
    assert_eq!(result.as_str(), Some("01234567891011"));
}

#[test]
fn test_pure_function_error_propagates() {
    let vm = VM::new();
    let program = build(&call("div", vec![col(0), lit(0)]));
    let err = vm.evaluate(&program, None, &[Value::integer(1)]).unwrap_err();
    assert_eq!(err, Error::DivisionByZero);
}

#[test]
fn test_evaluation_is_deterministic() {
    let vm = VM::new();
    let program = build(&call(
        "round",
        vec![call("div", vec![col(0), col(1)]), lit(3)],
    ));
    let row = vec![Value::integer(10), Value::integer(3)];
    let first = vm.evaluate(&program, None, &row).unwrap();
    for _ in 0..10 {
        assert_eq!(vm.evaluate(&program, None, &row).unwrap(), first);
    }
}
