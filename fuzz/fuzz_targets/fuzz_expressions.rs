#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sqlvm::{Compiler, ExprNode, SymbolTable, Value, VM};

/// Functions reachable from generated trees
#[derive(Debug, Arbitrary)]
enum Func {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Neg,
    Abs,
    Round,
    Truncate,

    // Comparison and logic
    Eq,
    Lt,
    Gte,
    Cmp,
    And,
    LogicalOr,
    Or,
    Not,
    IsNull,

    // String
    Concat,
    Upper,
    Length,
    Substr,
    Trim,
    StartsWith,
    Fnv32,

    // Conversion
    ToString,
    ToInt64,
    ToNil,

    // Aggregates
    Count,
    Sum,
    Mean,
    Min,
    Max,

    // Not registered
    Unknown,
}

impl Func {
    fn name(&self) -> &'static str {
        match self {
            Func::Add => "add",
            Func::Sub => "sub",
            Func::Mul => "mul",
            Func::Div => "div",
            Func::Mod => "mod",
            Func::Pow => "pow",
            Func::Neg => "neg",
            Func::Abs => "abs",
            Func::Round => "round",
            Func::Truncate => "truncate",
            Func::Eq => "eq",
            Func::Lt => "lt",
            Func::Gte => "gte",
            Func::Cmp => "cmp",
            Func::And => "and",
            Func::LogicalOr => "logical_or",
            Func::Or => "or",
            Func::Not => "not",
            Func::IsNull => "isnull",
            Func::Concat => "concat",
            Func::Upper => "upper",
            Func::Length => "length",
            Func::Substr => "substring",
            Func::Trim => "ltrim",
            Func::StartsWith => "startswith",
            Func::Fnv32 => "fnv32",
            Func::ToString => "to_string",
            Func::ToInt64 => "to_int64",
            Func::ToNil => "to_nil",
            Func::Count => "count",
            Func::Sum => "sum",
            Func::Mean => "mean",
            Func::Min => "min",
            Func::Max => "max",
            Func::Unknown => "frobnicate",
        }
    }
}

/// Literal values
#[derive(Debug, Arbitrary)]
enum Lit {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

impl Lit {
    fn value(&self) -> Value {
        match self {
            Lit::Null => Value::null(),
            Lit::Integer(v) => Value::integer(*v),
            Lit::Float(v) => Value::float(*v),
            Lit::Text(s) => Value::text(s),
            Lit::Boolean(b) => Value::boolean(*b),
        }
    }
}

/// Generated expression tree, possibly malformed
#[derive(Debug, Arbitrary)]
enum Expr {
    Column(u8),
    Unresolved,
    Literal(Lit),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

impl Expr {
    fn to_node(&self) -> ExprNode {
        match self {
            // Index 4 is one past the row width
            Expr::Column(i) => ExprNode::column(format!("c{}", i % 5), (*i % 5) as usize),
            Expr::Unresolved => ExprNode::unresolved_column("ghost"),
            Expr::Literal(lit) => ExprNode::literal(lit.value()),
            Expr::If(c, t, e) => ExprNode::if_then_else(c.to_node(), t.to_node(), e.to_node()),
            Expr::Call(func, args) => {
                ExprNode::call(func.name(), args.iter().map(Expr::to_node).collect())
            }
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    expr: Expr,
    rows: Vec<[Lit; 4]>,
    split: u8,
}

fuzz_target!(|input: Input| {
    let symbols = SymbolTable::with_builtins();
    let Ok(program) = Compiler::new(&symbols).compile(&input.expr.to_node()) else {
        return;
    };

    let rows: Vec<Vec<Value>> = input
        .rows
        .iter()
        .map(|row| row.iter().map(Lit::value).collect())
        .collect();
    let vm = VM::new();

    if !program.has_aggregate() {
        // Errors are fine, panics are not; results must be deterministic
        for row in &rows {
            let first = vm.evaluate(&program, None, row);
            let second = vm.evaluate(&program, None, row);
            assert_eq!(first.is_ok(), second.is_ok());
        }
        return;
    }

    let split = (input.split as usize).min(rows.len());
    let mut left = vm.alloc_instance(&program);
    let mut right = vm.alloc_instance(&program);
    if vm.accumulate_batch(&program, &mut left, &rows[..split]).is_err()
        || vm.accumulate_batch(&program, &mut right, &rows[split..]).is_err()
    {
        return;
    }

    let mut wire = Vec::new();
    vm.save_state(&program, &right, &mut wire)
        .expect("saving accumulated state must succeed");
    let mut shipped = vm.alloc_instance(&program);
    vm.load_state(&program, &mut shipped, &mut wire.as_slice())
        .expect("saved state must load");
    vm.merge(&program, &mut left, &shipped)
        .expect("merging compatible state must succeed");
    let _ = vm.result(&program, &left);
});
