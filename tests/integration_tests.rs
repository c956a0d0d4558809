//! Integration tests for end-to-end compilation.
//!
//! These tests run the complete pipeline from source text through the type
//! checker, IR generation and LLVM emission, then execute the module with
//! the JIT and the print functions mapped to host callbacks.

use std::cell::RefCell;

use inkwell::{
    context::Context,
    targets::{InitializationConfig, Target},
    OptimizationLevel,
};
use pulsec::{
    compiler::{
        compiler::{compile, PRINT_BYTE, PRINT_FLOAT, PRINT_INT},
        runtime::{build_runtime, link_runtime},
    },
    driver::driver::analyze_source,
    ir::builder::{generate_ir, ENTRY_SYMBOL, INIT_FUNCTION},
};

thread_local! {
    static OUTPUT: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

extern "C" fn record_int(value: i32) {
    OUTPUT.with(|output| output.borrow_mut().push(value.to_string()));
}

extern "C" fn record_float(value: f64) {
    OUTPUT.with(|output| output.borrow_mut().push(format!("{:.6}", value)));
}

extern "C" fn record_byte(value: u8) {
    OUTPUT.with(|output| output.borrow_mut().push((value as char).to_string()));
}

struct Run {
    output: Vec<String>,
    /// Result of the entry function, when the program has one
    status: Option<i32>,
}

fn emit_llvm(source: &str) -> String {
    let analysis = analyze_source(source, "test.pulse").unwrap();
    assert!(analysis.is_ok(), "{:?}", analysis.diagnostics.entries());

    let program = generate_ir(&analysis);
    let context = Context::create();
    let compiler = compile(&program, "test", &context).unwrap();

    compiler.print_to_string()
}

fn execute(source: &str) -> Run {
    let analysis = analyze_source(source, "test.pulse").unwrap();
    assert!(analysis.is_ok(), "{:?}", analysis.diagnostics.entries());

    let program = generate_ir(&analysis);
    let context = Context::create();
    let compiler = compile(&program, "test", &context).unwrap();

    Target::initialize_native(&InitializationConfig::default()).unwrap();
    let engine = compiler
        .module
        .create_jit_execution_engine(OptimizationLevel::None)
        .unwrap();

    let hooks = [
        (PRINT_INT, record_int as *const () as usize),
        (PRINT_FLOAT, record_float as *const () as usize),
        (PRINT_BYTE, record_byte as *const () as usize),
    ];
    for (name, address) in hooks {
        let function = compiler.module.get_function(name).unwrap();
        engine.add_global_mapping(&function, address);
    }

    OUTPUT.with(|output| output.borrow_mut().clear());

    let status = unsafe {
        let init = engine
            .get_function::<unsafe extern "C" fn() -> i32>(INIT_FUNCTION)
            .unwrap();
        assert_eq!(init.call(), 0);

        engine
            .get_function::<unsafe extern "C" fn() -> i32>(ENTRY_SYMBOL)
            .ok()
            .map(|entry| entry.call())
    };

    Run {
        output: OUTPUT.with(|output| output.take()),
        status,
    }
}

#[test]
fn test_read_modify_write_prints_three() {
    let run = execute("var x int <- 1; x <- x + 2; print(x);");

    assert_eq!(run.output, vec!["3"]);
    assert_eq!(run.status, None);
}

#[test]
fn test_while_loop() {
    let run = execute(
        "var i int <- 0;
         var sum int <- 0;
         while i < 5 {
             sum <- sum + i;
             i <- i + 1;
         }
         print(sum);
         print(i);",
    );

    assert_eq!(run.output, vec!["10", "5"]);
}

#[test]
fn test_while_false_never_runs() {
    let run = execute("while false { print(1); } print(2);");

    assert_eq!(run.output, vec!["2"]);
}

#[test]
fn test_recursive_factorial() {
    let run = execute(
        "function fact(n int) int {
             if n <= 1 {
                 return 1;
             }
             return n * fact(n - 1);
         }
         print(fact(5));",
    );

    assert_eq!(run.output, vec!["120"]);
}

#[test]
fn test_return_from_both_arms() {
    let run = execute(
        "function sign(x int) int {
             if x < 0 { return -1; } else { return 1; }
         }
         print(sign(-5));
         print(sign(5));",
    );

    assert_eq!(run.output, vec!["-1", "1"]);
}

#[test]
fn test_parameters_are_mutable_slots() {
    let run = execute(
        "function inc(a int) int {
             a <- a + 1;
             return a;
         }
         var a int <- 41;
         print(inc(a));
         print(a);",
    );

    assert_eq!(run.output, vec!["42", "41"]);
}

#[test]
fn test_floats_and_chars() {
    let run = execute("print(1.5 * 2.0); print(-0.25); print('a'); print('\\n');");

    assert_eq!(run.output, vec!["3.000000", "-0.250000", "a", "\n"]);
}

#[test]
fn test_booleans_print_as_ints() {
    let run = execute(
        "print(true && !false);
         print(1 > 2 || 3 = 3);
         print(!(1 < 2));
         print(1.0 != 1.0);",
    );

    assert_eq!(run.output, vec!["1", "1", "0", "0"]);
}

#[test]
fn test_signed_integer_arithmetic() {
    let run = execute("print(-7 / 2); print(7 - 10); print(0x10 * 0b11);");

    assert_eq!(run.output, vec!["-3", "-3", "48"]);
}

#[test]
fn test_byte_comparison_is_unsigned() {
    let run = execute("print('\\xff' > 'a');");

    assert_eq!(run.output, vec!["1"]);
}

#[test]
fn test_flat_scope_after_if() {
    let run = execute("if true { var y int <- 1; } else { } print(y);");

    assert_eq!(run.output, vec!["1"]);
}

#[test]
fn test_uninitialized_storage_is_zero() {
    let run = execute(
        "var g int;
         print(g);
         function f() float {
             var local float;
             return local;
         }
         print(f());",
    );

    assert_eq!(run.output, vec!["0", "0.000000"]);
}

#[test]
fn test_entry_function_runs_after_init() {
    let run = execute(
        "var g int <- 40;
         function main() int {
             print(g + 2);
             return 7;
         }
         print(g);",
    );

    assert_eq!(run.output, vec!["40", "42"]);
    assert_eq!(run.status, Some(7));
}

#[test]
fn test_variable_and_function_share_a_name() {
    let run = execute(
        "var f int <- 1;
         function f() int { return 2; }
         print(f());
         print(f);",
    );

    assert_eq!(run.output, vec!["2", "1"]);
}

#[test]
fn test_globals_named_like_runtime_symbols() {
    let source = "var main int <- 3;
                  var printf int;
                  var _print_int int <- 4;
                  print(main + _print_int + printf);";

    let run = execute(source);
    assert_eq!(run.output, vec!["7"]);

    let analysis = analyze_source(source, "test.pulse").unwrap();
    let program = generate_ir(&analysis);
    let context = Context::create();
    let compiler = compile(&program, "test", &context).unwrap();
    link_runtime(&compiler).unwrap();

    let module = compiler.print_to_string();
    assert!(module.contains("@__pulse_g_main = global i32 0"));
    assert!(module.contains("define i32 @main()"));
}

#[test]
fn test_function_declared_in_control_flow() {
    let run = execute(
        "if true { function f() int { return 1; } }
         while false { function g(x int) int { return x * 2; } }
         print(f());
         print(g(21));",
    );

    assert_eq!(run.output, vec!["1", "42"]);
}

#[test]
fn test_module_structure() {
    let module = emit_llvm("var x int <- 1; var c char; function f(a float) float { return a; }");

    assert!(module.contains("declare void @_print_int(i32)"));
    assert!(module.contains("declare void @_print_float(double)"));
    assert!(module.contains("declare void @_print_byte(i8)"));
    assert!(module.contains("@__pulse_g_x = global i32 0"));
    assert!(module.contains("@__pulse_g_c = global i8 0"));
    assert!(module.contains("define i32 @__pulse_init()"));
    assert!(module.contains("define double @f(double %0)"));
}

#[test]
fn test_linked_module_verifies() {
    let analysis = analyze_source(
        "function main() int { print('!'); return 0; }\nprint(1);",
        "test.pulse",
    )
    .unwrap();
    let program = generate_ir(&analysis);

    let context = Context::create();
    let compiler = compile(&program, "test", &context).unwrap();
    link_runtime(&compiler).unwrap();

    let module = compiler.print_to_string();
    assert!(module.contains("define i32 @main()"));
    assert!(module.contains("define void @_print_int(i32"));
    assert!(module.contains("call i32 @__pulse_main()"));
}

#[test]
fn test_runtime_module_without_entry() {
    let context = Context::create();
    let runtime = build_runtime(&context, false).unwrap();
    runtime.verify().unwrap();

    for name in [PRINT_INT, PRINT_FLOAT, PRINT_BYTE] {
        let function = runtime.get_function(name).unwrap();
        assert_eq!(function.count_params(), 1);
        assert!(function.get_first_basic_block().is_some());
    }

    let module = runtime.print_to_string().to_string();
    assert!(module.contains("call i32 @__pulse_init()"));
    assert!(!module.contains(ENTRY_SYMBOL));
    assert!(module.contains("call i32 @fflush(i8* null)"));
}

#[test]
fn test_semantic_errors_stop_before_ir() {
    let analysis = analyze_source(
        "function f() int { print(1); }\nprint(f());",
        "test.pulse",
    )
    .unwrap();

    assert!(!analysis.is_ok());
    let messages: Vec<String> = analysis
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.to_string())
        .collect();
    assert_eq!(
        messages,
        vec![
            "test.pulse:1: Function 'f' has no return statement",
            "test.pulse:2: Function 'f' is not declared",
        ]
    );
}
