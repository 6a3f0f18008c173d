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

//! Integration tests for compiling and evaluating expression trees,
//! including user-registered functions

use std::any::Any;
use std::io::{Read, Write};

use sqlvm::core::codec;
use sqlvm::{
    AggregateFunction, AggregateState, Compiler, CompilerConfig, Error, ExprNode, Function,
    FunctionDataType, FunctionInfo, FunctionSignature, FunctionType, Result, ScalarFunction,
    SymbolTable, Value, VM,
};

fn col(index: usize) -> ExprNode {
    ExprNode::column(format!("c{}", index), index)
}

/// Doubles its argument
#[derive(Default)]
struct TwiceFunction;

impl ScalarFunction for TwiceFunction {
    fn name(&self) -> &str {
        "twice"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "twice",
            FunctionType::Scalar,
            "Doubles a number",
            FunctionSignature::new(FunctionDataType::Integer, vec![FunctionDataType::Integer], 1, 1),
        )
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Integer(i) => Ok(Value::Integer(i * 2)),
            Value::Null => Ok(Value::Null),
            other => Err(Error::type_error(format!("twice() got {}", other.data_type()))),
        }
    }
}

/// Product of all non-NULL inputs
#[derive(Default)]
struct ProductFunction;

#[derive(Debug)]
struct ProductState {
    product: f64,
}

impl Default for ProductState {
    fn default() -> Self {
        Self { product: 1.0 }
    }
}

impl AggregateFunction for ProductFunction {
    fn name(&self) -> &str {
        "product"
    }

    fn info(&self) -> FunctionInfo {
        FunctionInfo::new(
            "product",
            FunctionType::Aggregate,
            "Multiplies all non-NULL values",
            FunctionSignature::new(FunctionDataType::Float, vec![FunctionDataType::Numeric], 1, 1),
        )
    }

    fn scratch_size(&self) -> usize {
        std::mem::size_of::<ProductState>()
    }

    fn init(&self) -> Box<dyn AggregateState> {
        Box::new(ProductState::default())
    }
}

impl AggregateState for ProductState {
    fn accumulate(&mut self, args: &[Value]) -> Result<()> {
        if args.len() != 1 {
            return Err(Error::arity("product", 1, args.len()));
        }
        if let Some(v) = args[0].as_float64() {
            self.product *= v;
        }
        Ok(())
    }

    fn get(&self) -> Value {
        Value::Float(self.product)
    }

    fn reset(&mut self) {
        self.product = 1.0;
    }

    fn merge(&mut self, other: &dyn AggregateState) -> Result<()> {
        let other = other
            .as_any()
            .downcast_ref::<ProductState>()
            .ok_or_else(|| Error::state("not a product state"))?;
        self.product *= other.product;
        Ok(())
    }

    fn save_state(&self, sink: &mut dyn Write) -> Result<usize> {
        codec::write_f64(sink, self.product)
    }

    fn load_state(&mut self, source: &mut dyn Read) -> Result<()> {
        self.product = codec::read_f64(source)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn symbols() -> SymbolTable {
    let mut symbols = SymbolTable::with_builtins();
    symbols
        .register_pure::<TwiceFunction>()
        .expect("Failed to register twice");
    symbols
        .register_aggregate::<ProductFunction>()
        .expect("Failed to register product");
    symbols
}

#[test]
fn test_unknown_symbol_fails_at_compile_time() {
    let symbols = SymbolTable::with_builtins();
    let tree = ExprNode::call("frobnicate", vec![col(0)]);
    let err = Compiler::new(&symbols).compile(&tree).unwrap_err();
    assert!(matches!(err, Error::Symbol(ref name) if name == "frobnicate"));
    assert!(err.is_compile_error());
}

#[test]
fn test_duplicate_registration_rejected() {
    let mut symbols = symbols();
    let err = symbols
        .register_function("SUM", Function::pure(TwiceFunction))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(symbols.is_aggregate_function("sum"));
}

#[test]
fn test_custom_scalar_function() {
    let symbols = symbols();
    let tree = ExprNode::call("TWICE", vec![col(0)]);
    let program = Compiler::new(&symbols).compile(&tree).unwrap();

    let vm = VM::new();
    let result = vm.evaluate(&program, None, &[Value::integer(21)]).unwrap();
    assert!(matches!(result, Value::Integer(42)));

    let err = vm
        .evaluate(&program, None, &[Value::text("x")])
        .unwrap_err();
    assert!(matches!(err, Error::Type(_)));
}

#[test]
fn test_custom_aggregate_function() {
    let symbols = symbols();
    let tree = ExprNode::call("product", vec![ExprNode::call("twice", vec![col(0)])]);
    let program = Compiler::new(&symbols).compile(&tree).unwrap();
    assert!(program.has_aggregate());
    assert_eq!(
        program.dynamic_storage_size(),
        std::mem::size_of::<ProductState>()
    );

    let vm = VM::new();
    let mut left = vm.alloc_instance(&program);
    let mut right = vm.alloc_instance(&program);
    vm.accumulate(&program, &mut left, &[Value::integer(1)])
        .unwrap();
    vm.accumulate(&program, &mut right, &[Value::integer(3)])
        .unwrap();

    let mut wire = Vec::new();
    vm.save_state(&program, &right, &mut wire).unwrap();
    let mut shipped = vm.alloc_instance(&program);
    vm.load_state(&program, &mut shipped, &mut wire.as_slice())
        .unwrap();
    vm.merge(&program, &mut left, &shipped).unwrap();

    assert!(matches!(
        vm.result(&program, &left).unwrap(),
        Value::Float(f) if f == 12.0
    ));
}

#[test]
fn test_arity_errors() {
    let symbols = symbols();
    let compiler = Compiler::new(&symbols);

    for (name, argc) in [("sum", 0), ("sum", 2), ("count", 2), ("round", 3), ("twice", 2)] {
        let args = (0..argc).map(col).collect();
        let err = compiler
            .compile(&ExprNode::call(name, args))
            .unwrap_err();
        assert!(
            matches!(err, Error::Arity { got, .. } if got == argc),
            "{} with {} args: {:?}",
            name,
            argc,
            err
        );
    }
}

#[test]
fn test_malformed_trees() {
    let symbols = symbols();
    let compiler = Compiler::new(&symbols);

    let unresolved = ExprNode::call("abs", vec![ExprNode::unresolved_column("ghost")]);
    assert!(matches!(
        compiler.compile(&unresolved),
        Err(Error::Internal { .. })
    ));

    let nested = ExprNode::call("max", vec![ExprNode::call("min", vec![col(0)])]);
    assert!(matches!(
        compiler.compile(&nested),
        Err(Error::Internal { .. })
    ));
}

#[test]
fn test_depth_limit() {
    let symbols = symbols();
    let compiler = Compiler::with_config(&symbols, CompilerConfig::new().with_max_depth(16));

    let mut tree = col(0);
    for _ in 0..16 {
        tree = ExprNode::call("neg", vec![tree]);
    }
    assert!(compiler.compile(&tree).is_ok());

    let tree = ExprNode::call("neg", vec![tree]);
    assert!(matches!(
        compiler.compile(&tree),
        Err(Error::Internal { .. })
    ));
}

#[test]
fn test_scalar_expression_semantics() {
    let symbols = symbols();
    let compiler = Compiler::new(&symbols);
    let vm = VM::new();
    let row = vec![
        Value::integer(7),
        Value::float(2.0),
        Value::null(),
        Value::text("Ab"),
    ];

    let cases: Vec<(ExprNode, Value)> = vec![
        (ExprNode::call("add", vec![col(0), col(1)]), Value::float(9.0)),
        (ExprNode::call("div", vec![col(0), ExprNode::literal(2)]), Value::float(3.5)),
        (ExprNode::call("mod", vec![col(0), ExprNode::literal(4)]), Value::integer(3)),
        (ExprNode::call("add", vec![col(0), col(2)]), Value::null()),
        (ExprNode::call("isnull", vec![col(2)]), Value::boolean(true)),
        (ExprNode::call("upper", vec![col(3)]), Value::text("AB")),
        (ExprNode::call("length", vec![col(3)]), Value::integer(2)),
        (ExprNode::call("ucase", vec![col(3)]), Value::text("AB")),
        (ExprNode::call("lcase", vec![col(3)]), Value::text("ab")),
        (
            ExprNode::call("substring", vec![col(3), ExprNode::literal(2)]),
            Value::text("b"),
        ),
        (ExprNode::call("cmp", vec![col(1), col(0)]), Value::integer(-1)),
        (ExprNode::call("to_int64", vec![col(1)]), Value::integer(2)),
        (ExprNode::call("to_string", vec![col(2)]), Value::text("NULL")),
        (
            ExprNode::call(
                "logical_or",
                vec![
                    ExprNode::call("startswith", vec![col(3), ExprNode::literal("A")]),
                    ExprNode::call("to_nil", vec![col(0)]),
                ],
            ),
            Value::boolean(true),
        ),
        (
            ExprNode::call(
                "logical_and",
                vec![
                    ExprNode::call("endswith", vec![col(3), ExprNode::literal("b")]),
                    ExprNode::call("isnull", vec![col(0)]),
                ],
            ),
            Value::boolean(false),
        ),
        (
            ExprNode::call(
                "and",
                vec![
                    ExprNode::call("gt", vec![col(0), col(1)]),
                    ExprNode::call("not", vec![ExprNode::call("isnull", vec![col(0)])]),
                ],
            ),
            Value::boolean(true),
        ),
    ];

    for (tree, expected) in cases {
        let program = compiler.compile(&tree).unwrap();
        let result = vm.evaluate(&program, None, &row).unwrap();
        assert_eq!(result, expected, "{}", tree);
        assert_eq!(result.data_type(), expected.data_type(), "{}", tree);
    }
}
