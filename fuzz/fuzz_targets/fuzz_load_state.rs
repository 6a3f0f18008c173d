#![no_main]

use libfuzzer_sys::fuzz_target;
use sqlvm::{Compiler, ExprNode, SymbolTable, VM};

/// Aggregate select lists whose state is fed arbitrary bytes
const AGGREGATES: &[&[&str]] = &[
    &["count"],
    &["sum"],
    &["mean"],
    &["min"],
    &["max"],
    &["sum", "count"],
    &["min", "max", "mean"],
];

fuzz_target!(|data: &[u8]| {
    let symbols = SymbolTable::with_builtins();
    let compiler = Compiler::new(&symbols);
    let vm = VM::new();
    let column = ExprNode::column("x", 0);

    for names in AGGREGATES {
        // add(a, add(b, c)) so several slots share one instance
        let tree = names
            .iter()
            .map(|name| ExprNode::call(*name, vec![column.clone()]))
            .reduce(|acc, call| ExprNode::call("add", vec![call, acc]));
        let Some(tree) = tree else { continue };
        let Ok(program) = compiler.compile(&tree) else {
            continue;
        };

        let mut instance = vm.alloc_instance(&program);
        let mut source = data;
        if vm.load_state(&program, &mut instance, &mut source).is_err() {
            continue;
        }

        // Anything that loaded must produce a result and save again
        let _ = vm.result(&program, &instance);
        let mut wire = Vec::new();
        let written = vm
            .save_state(&program, &instance, &mut wire)
            .expect("saving loaded state must succeed");
        assert_eq!(written, wire.len());

        // Re-loading the re-encoded state yields the same encoding
        let mut reloaded = vm.alloc_instance(&program);
        vm.load_state(&program, &mut reloaded, &mut wire.as_slice())
            .expect("re-encoded state must load");
        let mut again = Vec::new();
        vm.save_state(&program, &reloaded, &mut again)
            .expect("saving reloaded state must succeed");
        assert_eq!(wire, again);

        let mut total = vm.alloc_instance(&program);
        vm.merge(&program, &mut total, &instance)
            .expect("merging loaded state must succeed");
    }
});
