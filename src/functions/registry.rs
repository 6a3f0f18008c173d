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

//! Symbol table
//!
//! Maps case-folded function names to [`Function`]s. The table is populated
//! up front through `&mut self` and then shared read-only with every
//! compiler, so lookups need no locking.

use rustc_hash::FxHashMap;

use crate::core::{Error, Result};

use super::aggregate::{CountFunction, MaxFunction, MeanFunction, MinFunction, SumFunction};
use super::scalar::{
    AbsFunction, AddFunction, AndFunction, CmpFunction, ConcatFunction, DivFunction,
    EndsWithFunction, EqFunction, Fnv32Function, GtFunction, GteFunction, IsNullFunction,
    LengthFunction, LowerFunction, LtFunction, LteFunction, LtrimFunction, ModFunction,
    MulFunction, NegFunction, NeqFunction, NotFunction, OrFunction, PowFunction, RoundFunction,
    RtrimFunction, StartsWithFunction, SubFunction, SubstrFunction, ToInt64Function,
    ToNilFunction, ToStringFunction, TruncateFunction, UpperFunction,
};
use super::{AggregateFunction, Function, ScalarFunction};

/// Registry of functions available to the compiler
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    functions: FxHashMap<String, Function>,
}

impl SymbolTable {
    /// Create an empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a symbol table with every built-in function registered
    pub fn with_builtins() -> Self {
        let mut table = Self::new();

        // Aggregates
        table.builtin(Function::aggregate(CountFunction));
        table.builtin(Function::aggregate(SumFunction));
        table.builtin(Function::aggregate(MinFunction));
        table.builtin(Function::aggregate(MaxFunction));
        table.builtin_with_aliases(Function::aggregate(MeanFunction), &["avg"]);

        // Arithmetic
        table.builtin(Function::pure(AddFunction));
        table.builtin(Function::pure(SubFunction));
        table.builtin(Function::pure(MulFunction));
        table.builtin(Function::pure(DivFunction));
        table.builtin(Function::pure(ModFunction));
        table.builtin(Function::pure(PowFunction));
        table.builtin(Function::pure(NegFunction));
        table.builtin(Function::pure(AbsFunction));
        table.builtin(Function::pure(RoundFunction));
        table.builtin(Function::pure(TruncateFunction));

        // Comparison
        table.builtin(Function::pure(EqFunction));
        table.builtin(Function::pure(NeqFunction));
        table.builtin(Function::pure(LtFunction));
        table.builtin(Function::pure(LteFunction));
        table.builtin(Function::pure(GtFunction));
        table.builtin(Function::pure(GteFunction));
        table.builtin(Function::pure(CmpFunction));

        // Logic
        table.builtin_with_aliases(Function::pure(AndFunction), &["logical_and"]);
        table.builtin_with_aliases(Function::pure(OrFunction), &["logical_or"]);
        table.builtin(Function::pure(NotFunction));
        table.builtin(Function::pure(IsNullFunction));

        // String
        table.builtin(Function::pure(ConcatFunction));
        table.builtin_with_aliases(Function::pure(UpperFunction), &["uppercase", "ucase"]);
        table.builtin_with_aliases(Function::pure(LowerFunction), &["lowercase", "lcase"]);
        table.builtin(Function::pure(LengthFunction));
        table.builtin_with_aliases(Function::pure(SubstrFunction), &["substring"]);
        table.builtin(Function::pure(LtrimFunction));
        table.builtin(Function::pure(RtrimFunction));
        table.builtin(Function::pure(StartsWithFunction));
        table.builtin(Function::pure(EndsWithFunction));
        table.builtin(Function::pure(Fnv32Function));

        // Conversion
        table.builtin(Function::pure(ToStringFunction));
        table.builtin(Function::pure(ToInt64Function));
        table.builtin(Function::pure(ToNilFunction));

        table
    }

    fn builtin(&mut self, function: Function) {
        self.functions
            .insert(function.name().to_lowercase(), function);
    }

    fn builtin_with_aliases(&mut self, function: Function, aliases: &[&str]) {
        for alias in aliases {
            self.functions.insert(alias.to_string(), function.clone());
        }
        self.builtin(function);
    }

    /// Register a function under `name`
    ///
    /// Names are case-insensitive. Registering a name twice is rejected.
    pub fn register_function(&mut self, name: &str, function: Function) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_argument("function name cannot be empty"));
        }
        let key = name.to_lowercase();
        if self.functions.contains_key(&key) {
            return Err(Error::invalid_argument(format!(
                "function '{}' is already registered",
                key
            )));
        }
        self.functions.insert(key, function);
        Ok(())
    }

    /// Register a scalar function under its own name
    pub fn register_pure<F: ScalarFunction + Default + 'static>(&mut self) -> Result<()> {
        let function = F::default();
        let name = function.name().to_string();
        self.register_function(&name, Function::pure(function))
    }

    /// Register an aggregate function under its own name
    pub fn register_aggregate<F: AggregateFunction + Default + 'static>(&mut self) -> Result<()> {
        let function = F::default();
        let name = function.name().to_string();
        self.register_function(&name, Function::aggregate(function))
    }

    /// Look up a function by name
    pub fn lookup(&self, name: &str) -> Result<&Function> {
        // Fast path: names from the planner are usually lower case already
        if let Some(f) = self.functions.get(name) {
            return Ok(f);
        }
        self.functions
            .get(&name.to_lowercase())
            .ok_or_else(|| Error::symbol(name))
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_ok()
    }

    /// Check if a name refers to an aggregate function
    pub fn is_aggregate_function(&self, name: &str) -> bool {
        self.lookup(name).map_or(false, Function::is_aggregate)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::functions::{FunctionDataType, FunctionInfo, FunctionSignature, FunctionType};

    #[derive(Default)]
    struct AnswerFunction;

    impl ScalarFunction for AnswerFunction {
        fn name(&self) -> &str {
            "Answer"
        }

        fn info(&self) -> FunctionInfo {
            FunctionInfo::new(
                "Answer",
                FunctionType::Scalar,
                "Returns 42",
                FunctionSignature::new(FunctionDataType::Integer, vec![], 0, 0),
            )
        }

        fn evaluate(&self, _args: &[Value]) -> Result<Value> {
            Ok(Value::integer(42))
        }
    }

    #[test]
    fn test_builtins_registered() {
        let table = SymbolTable::with_builtins();
        for name in ["count", "sum", "mean", "avg", "min", "max", "add", "eq", "concat"] {
            assert!(table.contains(name), "missing {}", name);
        }
        assert!(table.is_aggregate_function("SUM"));
        assert!(table.is_aggregate_function("avg"));
        assert!(!table.is_aggregate_function("add"));
        assert!(!table.is_aggregate_function("nope"));
    }

    #[test]
    fn test_builtin_aliases() {
        let table = SymbolTable::with_builtins();
        let pairs = [
            ("avg", "mean"),
            ("logical_and", "and"),
            ("logical_or", "or"),
            ("uppercase", "upper"),
            ("ucase", "upper"),
            ("lowercase", "lower"),
            ("lcase", "lower"),
            ("substring", "substr"),
        ];
        for (alias, canonical) in pairs {
            assert_eq!(table.lookup(alias).unwrap().name(), canonical, "{}", alias);
        }

        let logical_and = table.lookup("LOGICAL_AND").unwrap();
        let Function::Pure(f) = logical_and else {
            panic!("logical_and should be pure");
        };
        let result = f.evaluate(&[Value::boolean(true), Value::boolean(false)]).unwrap();
        assert!(matches!(result, Value::Boolean(false)));
    }

    #[test]
    fn test_conversion_and_string_builtins() {
        let table = SymbolTable::with_builtins();
        for name in [
            "cmp", "to_string", "to_int64", "to_nil", "substr", "ltrim", "rtrim",
            "startswith", "endswith", "fnv32",
        ] {
            assert!(table.contains(name), "missing {}", name);
            assert!(!table.is_aggregate_function(name));
        }
        for name in ["now", "usleep", "version"] {
            assert!(!table.contains(name), "unexpected {}", name);
        }
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let table = SymbolTable::with_builtins();
        assert_eq!(table.lookup("CoUnT").unwrap().name(), "count");
    }

    #[test]
    fn test_lookup_unknown() {
        let table = SymbolTable::new();
        assert!(table.is_empty());
        let err = table.lookup("frobnicate").unwrap_err();
        assert!(matches!(err, Error::Symbol(ref name) if name == "frobnicate"));
    }

    #[test]
    fn test_register_custom() {
        let mut table = SymbolTable::new();
        table.register_pure::<AnswerFunction>().unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.contains("answer"));

        let err = table.register_pure::<AnswerFunction>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_register_alias_and_empty_name() {
        let mut table = SymbolTable::new();
        table.register_aggregate::<CountFunction>().unwrap();
        table
            .register_function("tally", Function::aggregate(CountFunction))
            .unwrap();
        assert!(table
            .register_function("", Function::aggregate(CountFunction))
            .is_err());
        assert_eq!(table.names(), vec!["count", "tally"]);
    }
}
