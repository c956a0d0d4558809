//! Unit tests for IR generation.

use std::rc::Rc;

use super::{
    builder::{generate_ir, ENTRY_SYMBOL, INIT_FUNCTION},
    instruction::{Instruction, IrFunction, IrProgram, Label, PhysicalType},
};
use crate::{lexer::lexer::tokenize, parser::parser::parse, type_checker::type_checker::analyze};

fn lower(source: &str) -> IrProgram {
    let file = Rc::new("test.pulse".to_string());
    let tokens = tokenize(source.to_string(), Some("test.pulse".to_string())).unwrap();
    let program = parse(tokens, Rc::clone(&file)).unwrap();
    let analysis = analyze(&program, Some(file));
    assert!(analysis.is_ok(), "{:?}", analysis.diagnostics.entries());
    generate_ir(&analysis)
}

fn listing(function: &IrFunction) -> Vec<String> {
    function
        .instructions
        .iter()
        .map(|instruction| instruction.to_string())
        .collect()
}

#[test]
fn test_global_read_modify_write() {
    let program = lower("var x int <- 1; x <- x + 2; print(x);");

    assert_eq!(program.functions.len(), 1);
    assert_eq!(
        listing(&program.functions[0]),
        vec![
            "MOVI 1 R1",
            "VARI x",
            "STOREI R1 x",
            "LOADI x R2",
            "MOVI 2 R3",
            "ADDI R2 R3 R4",
            "STOREI R4 x",
            "LOADI x R5",
            "PRINTI R5",
            "MOVI 0 R6",
            "RETI R6",
        ]
    );
}

#[test]
fn test_init_function_comes_first() {
    let program = lower("function f() int { return 1; } print(2);");

    assert_eq!(program.functions[0].name, INIT_FUNCTION);
    assert_eq!(program.functions[0].return_type, PhysicalType::Int);
    assert!(program.functions[0].params.is_empty());
    assert_eq!(program.functions[1].name, "f");

    let init = listing(&program.functions[0]);
    assert_eq!(init, vec!["MOVI 2 R1", "PRINTI R1", "MOVI 0 R2", "RETI R2"]);
}

#[test]
fn test_empty_program_init_returns_zero() {
    let program = lower("");

    assert_eq!(listing(&program.functions[0]), vec!["MOVI 0 R1", "RETI R1"]);
}

#[test]
fn test_while_shape() {
    let program = lower("var i int <- 0; while i < 3 { i <- i + 1; }");
    let code = &program.functions[0].instructions;

    let labels: Vec<Label> = code
        .iter()
        .filter_map(|instruction| match instruction {
            Instruction::Label(label) => Some(*label),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec![Label(1), Label(2), Label(3)]);

    let text = listing(&program.functions[0]);
    let test = text.iter().position(|line| line == "LABEL L1").unwrap();
    assert_eq!(text[test - 1], "BRANCH L1");
    assert!(text.iter().any(|line| line.starts_with("CBRANCH") && line.ends_with("L2 L3")));

    let merge = text.iter().position(|line| line == "LABEL L3").unwrap();
    assert_eq!(text[merge - 1], "BRANCH L1");
    assert!(text.iter().position(|line| line == "LABEL L2").unwrap() < merge);
}

#[test]
fn test_while_with_empty_body() {
    let program = lower("while false { }");

    assert_eq!(
        listing(&program.functions[0]),
        vec![
            "BRANCH L1",
            "LABEL L1",
            "MOVI 0 R1",
            "CBRANCH R1 L2 L3",
            "LABEL L2",
            "BRANCH L1",
            "LABEL L3",
            "MOVI 0 R2",
            "RETI R2",
        ]
    );
}

#[test]
fn test_if_without_else() {
    let program = lower("if true { print(1); }");

    assert_eq!(
        listing(&program.functions[0]),
        vec![
            "MOVI 1 R1",
            "CBRANCH R1 L1 L2",
            "LABEL L1",
            "MOVI 1 R2",
            "PRINTI R2",
            "BRANCH L3",
            "LABEL L2",
            "BRANCH L3",
            "LABEL L3",
            "MOVI 0 R3",
            "RETI R3",
        ]
    );
}

#[test]
fn test_if_else_blocks() {
    let program = lower("if 1 < 2 { print('a'); } else { print(2.5); }");
    let text = listing(&program.functions[0]);

    assert_eq!(text[2], "CMPI < R1 R2 R3");
    assert!(text.contains(&"MOVB 97 R4".to_string()));
    assert!(text.contains(&"PRINTB R4".to_string()));
    assert!(text.contains(&"MOVF 2.5 R5".to_string()));
    assert!(text.contains(&"PRINTF R5".to_string()));
}

#[test]
fn test_unary_lowering() {
    let program = lower("print(-2); print(-1.5); print(!true); print(+4);");

    assert_eq!(
        listing(&program.functions[0]),
        vec![
            "MOVI 2 R1",
            "MOVI 0 R2",
            "SUBI R2 R1 R3",
            "PRINTI R3",
            "MOVF 1.5 R4",
            "MOVF 0.0 R5",
            "SUBF R5 R4 R6",
            "PRINTF R6",
            "MOVI 1 R7",
            "MOVI 1 R8",
            "XOR R8 R7 R9",
            "PRINTI R9",
            "MOVI 4 R10",
            "PRINTI R10",
            "MOVI 0 R11",
            "RETI R11",
        ]
    );
}

#[test]
fn test_logical_and_comparison_ops() {
    let program = lower("print(1.0 >= 2.0 || 'a' != 'b');");
    let text = listing(&program.functions[0]);

    assert_eq!(text[2], "CMPF >= R1 R2 R3");
    assert_eq!(text[5], "CMPB != R4 R5 R6");
    assert_eq!(text[6], "OR R3 R6 R7");
}

#[test]
fn test_bool_equality_uses_int_compare() {
    let program = lower("print(true = false);");
    let text = listing(&program.functions[0]);

    assert_eq!(text[2], "CMPI = R1 R2 R3");
}

#[test]
fn test_locals_and_params() {
    let program = lower(
        "var g int <- 1;
         function add(a int, b int) int {
             var sum int <- a + b;
             sum <- sum + g;
             return sum;
         }",
    );
    let add = program.function("add").unwrap();

    assert_eq!(
        add.params,
        vec![
            ("a".to_string(), PhysicalType::Int),
            ("b".to_string(), PhysicalType::Int)
        ]
    );
    assert_eq!(add.to_string().lines().next(), Some("add(a:I, b:I) -> I"));

    let code = &add.instructions;
    assert!(code
        .iter()
        .any(|instruction| matches!(instruction, Instruction::Alloc { name, .. } if name == "sum")));
    assert!(!code
        .iter()
        .any(|instruction| matches!(instruction, Instruction::Global { .. })));

    let globals: Vec<_> = program.globals().collect();
    assert_eq!(globals, vec![("g", PhysicalType::Int)]);

    let text = listing(add);
    // The init function already used R1 and R2
    assert_eq!(text[0], "LOADI a R3");
    assert_eq!(text[1], "LOADI b R4");
    assert_eq!(text[3], "ALLOCI sum");
    assert_eq!(text[4], "STOREI R5 sum");
    assert!(text.contains(&"LOADI g R7".to_string()));
    assert_eq!(text.last().unwrap(), "RETI R9");
}

#[test]
fn test_counters_are_program_wide() {
    let program = lower("function f() int { return 1; } function g() int { return 2; }");

    assert_eq!(listing(&program.functions[0]), vec!["MOVI 0 R1", "RETI R1"]);
    assert_eq!(listing(program.function("f").unwrap()), vec!["MOVI 1 R2", "RETI R2"]);
    assert_eq!(listing(program.function("g").unwrap()), vec!["MOVI 2 R3", "RETI R3"]);
}

#[test]
fn test_call_lowering() {
    let program = lower(
        "function add(a int, b int) int { return a + b; }
         print(add(1, 2));",
    );

    assert_eq!(
        listing(&program.functions[0]),
        vec![
            "MOVI 1 R1",
            "MOVI 2 R2",
            "CALL add R1 R2 R3",
            "PRINTI R3",
            "MOVI 0 R4",
            "RETI R4",
        ]
    );
}

#[test]
fn test_function_declared_in_if_is_hoisted() {
    let program = lower("if true { function f() int { return 1; } } print(f());");

    assert_eq!(program.functions.len(), 2);
    assert_eq!(
        listing(&program.functions[0]),
        vec![
            "MOVI 1 R1",
            "CBRANCH R1 L1 L2",
            "LABEL L1",
            "BRANCH L3",
            "LABEL L2",
            "BRANCH L3",
            "LABEL L3",
            "CALL f R2",
            "PRINTI R2",
            "MOVI 0 R3",
            "RETI R3",
        ]
    );
    assert_eq!(listing(program.function("f").unwrap()), vec!["MOVI 1 R4", "RETI R4"]);
}

#[test]
fn test_function_declared_in_while_is_hoisted() {
    let program = lower(
        "while false {
             function g(x float) float { return x; }
         }
         if true { } else { function h() char { return 'h'; } }
         print(g(1.0));
         print(h());",
    );

    let names: Vec<&str> = program.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec![INIT_FUNCTION, "g", "h"]);

    let init = listing(&program.functions[0]);
    assert!(!init.iter().any(|line| line.starts_with("RETF") || line.starts_with("RETB")));
    assert!(init.iter().any(|line| line.starts_with("CALL g ")));
    assert!(init.iter().any(|line| line.starts_with("CALL h ")));
}

#[test]
fn test_entry_function_renamed() {
    let program = lower("function main() int { return main(); }");

    assert!(program.function("main").is_none());
    let entry = program.function(ENTRY_SYMBOL).unwrap();
    assert_eq!(listing(entry), vec!["CALL __pulse_main R2", "RETI R2"]);
}

#[test]
fn test_var_without_initializer() {
    let program = lower("var f float; function h() char { var c char; return c; }");

    assert_eq!(listing(&program.functions[0])[0], "VARF f");
    assert_eq!(
        listing(program.function("h").unwrap()),
        vec!["ALLOCB c", "LOADB c R2", "RETB R2"]
    );
}

#[test]
fn test_const_lowered_like_var() {
    let program = lower("const pi <- 3.14; print(pi);");

    assert_eq!(
        &listing(&program.functions[0])[..4],
        &["MOVF 3.14 R1", "VARF pi", "STOREF R1 pi", "LOADF pi R2"]
    );
}

#[test]
fn test_program_display() {
    let program = lower("function f() int { return 1; }");

    assert_eq!(
        program.to_string(),
        "__pulse_init() -> I\n    MOVI 0 R1\n    RETI R1\n\nf() -> I\n    MOVI 1 R2\n    RETI R2\n"
    );
}

#[test]
#[should_panic(expected = "semantic error")]
fn test_refuses_failed_analysis() {
    let file = Rc::new("test.pulse".to_string());
    let tokens = tokenize("print(x);".to_string(), None).unwrap();
    let program = parse(tokens, Rc::clone(&file)).unwrap();
    let analysis = analyze(&program, Some(file));

    generate_ir(&analysis);
}
