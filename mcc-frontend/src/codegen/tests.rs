use super::*;
use crate::ast::{BinaryOp, CmpOp, Expr, Function, Stmt};
use crate::symbols::{GlobalScope, LocalScope, Symbol};
use mcc_codegen::RegClass;
use pretty_assertions::assert_eq;

fn lower_program(program: &Program) -> LoweredProgram {
    generate_program(program).unwrap()
}

fn lower(function: Function) -> LoweredFunction {
    let program = Program {
        globals: Vec::new(),
        functions: vec![function],
    };
    lower_program(&program).functions.remove(0)
}

fn text(body: &[Inst]) -> Vec<String> {
    body.iter().map(|i| i.to_string()).collect()
}

/// `main` with int `i` at -4 and float `y` at -8
fn main_scope() -> (LocalScope, Symbol, Symbol) {
    let mut scope = LocalScope::new(&[]);
    let i = scope.add_local("i", Type::Int);
    let y = scope.add_local("y", Type::Float);
    (scope, i, y)
}

#[test]
fn test_literal_store_to_local() {
    let (scope, i, _) = main_scope();
    let main = scope.into_function(
        "main",
        Type::Void,
        vec![Stmt::Assign {
            target: Expr::var(&i),
            value: Expr::int(5),
        }],
    );

    let lowered = lower(main);
    assert_eq!(text(&lowered.body), vec!["sw 5, -4(fp)", "func_ret_main:"]);
    assert_eq!(lowered.int_temps, 0);
    assert_eq!(lowered.num_locals, 2);
}

#[test]
fn test_int_float_promotion_inserts_one_conversion() {
    let (scope, i, y) = main_scope();
    let main = scope.into_function(
        "main",
        Type::Void,
        vec![Stmt::Assign {
            target: Expr::var(&y),
            value: Expr::binary(BinaryOp::Add, Expr::var(&i), Expr::float("1.5")),
        }],
    );

    let lowered = lower(main);
    assert_eq!(
        text(&lowered.body),
        vec![
            "addi $t1, fp, -4",
            "lw $t2, 0($t1)",
            "fcvt.s.w $f1, $t2",
            "fadd.s $f2, $f1, 1.5",
            "fsw $f2, -8(fp)",
            "func_ret_main:",
        ]
    );
    assert_eq!((lowered.int_temps, lowered.float_temps), (2, 2));
}

#[test]
fn test_float_float_needs_no_conversion() {
    let (scope, _, y) = main_scope();
    let main = scope.into_function(
        "main",
        Type::Void,
        vec![Stmt::Assign {
            target: Expr::var(&y),
            value: Expr::binary(BinaryOp::Mul, Expr::var(&y), Expr::float("2.0")),
        }],
    );

    let lowered = lower(main);
    let conversions = lowered
        .body
        .iter()
        .filter(|i| matches!(i, Inst::Imovf(..) | Inst::Fmovi(..)))
        .count();
    assert_eq!(conversions, 0);
    assert!(lowered.body.contains(&Inst::FMul(
        Operand::Temp(RegClass::Float, 2),
        Operand::Temp(RegClass::Float, 1),
        Operand::imm("2.0"),
    )));
}

#[test]
fn test_float_to_int_assignment_truncates() {
    let (scope, i, y) = main_scope();
    let main = scope.into_function(
        "main",
        Type::Void,
        vec![Stmt::Assign {
            target: Expr::var(&i),
            value: Expr::var(&y),
        }],
    );

    assert_eq!(
        text(&lower(main).body),
        vec![
            "addi $t1, fp, -8",
            "flw $f1, 0($t1)",
            "fcvt.w.s $t2, $f1",
            "sw $t2, -4(fp)",
            "func_ret_main:",
        ]
    );
}

#[test]
fn test_global_store_materialises_address() {
    let mut globals = GlobalScope::new();
    let g = globals.add_variable("g", Type::Int);
    let main = LocalScope::new(&[]).into_function(
        "main",
        Type::Void,
        vec![Stmt::Assign {
            target: Expr::var(&g),
            value: Expr::int(7),
        }],
    );
    let program = Program {
        globals: globals.into_globals(),
        functions: vec![main],
    };

    let lowered = lower_program(&program);
    assert_eq!(
        text(&lowered.functions[0].body),
        vec!["la $t1, 0x20000000", "sw 7, 0($t1)", "func_ret_main:"]
    );
    assert_eq!(lowered.globals, vec![g.home()]);
}

#[test]
fn test_int_branch_polarity() {
    let cases = [
        (CmpOp::Lt, "bge $t2, 10, out_1"),
        (CmpOp::Le, "bgt $t2, 10, out_1"),
        (CmpOp::Gt, "ble $t2, 10, out_1"),
        (CmpOp::Ge, "blt $t2, 10, out_1"),
        (CmpOp::Eq, "bne $t2, 10, out_1"),
        (CmpOp::Ne, "beq $t2, 10, out_1"),
    ];

    for (op, expected) in cases {
        let (scope, i, _) = main_scope();
        let main = scope.into_function(
            "main",
            Type::Void,
            vec![Stmt::If {
                cond: Expr::cond(op, Expr::var(&i), Expr::int(10)),
                then_body: vec![Stmt::Write(Expr::int(1))],
                else_body: Vec::new(),
            }],
        );
        let body = text(&lower(main).body);
        assert_eq!(body[2], expected, "operator {}", op);
        assert_eq!(&body[3..], ["puti 1", "out_1:", "func_ret_main:"]);
    }
}

#[test]
fn test_float_branch_polarity() {
    let cases = [
        (CmpOp::Gt, "fle.s $t2, $f1, 1.0", "bne $t2, x0, out_1"),
        (CmpOp::Ge, "flt.s $t2, $f1, 1.0", "bne $t2, x0, out_1"),
        (CmpOp::Lt, "flt.s $t2, $f1, 1.0", "beq $t2, x0, out_1"),
        (CmpOp::Le, "fle.s $t2, $f1, 1.0", "beq $t2, x0, out_1"),
        (CmpOp::Ne, "feq.s $t2, $f1, 1.0", "bne $t2, x0, out_1"),
        (CmpOp::Eq, "feq.s $t2, $f1, 1.0", "beq $t2, x0, out_1"),
    ];

    for (op, compare, branch) in cases {
        let (scope, _, y) = main_scope();
        let main = scope.into_function(
            "main",
            Type::Void,
            vec![Stmt::If {
                cond: Expr::cond(op, Expr::var(&y), Expr::float("1.0")),
                then_body: vec![Stmt::Write(Expr::int(1))],
                else_body: Vec::new(),
            }],
        );
        let body = text(&lower(main).body);
        assert_eq!(&body[..2], ["addi $t1, fp, -8", "flw $f1, 0($t1)"]);
        assert_eq!(body[2], compare, "operator {}", op);
        assert_eq!(body[3], branch, "operator {}", op);
    }
}

/// Value an operand holds when the variable side of a comparison is `var`
fn operand_value<T: std::str::FromStr>(operand: &Operand, var: T) -> T {
    match operand {
        Operand::Imm(text) => text
            .parse()
            .ok()
            .unwrap_or_else(|| panic!("not a number: {}", text)),
        _ => var,
    }
}

/// Whether an integer conditional branch jumps
fn int_branch_taken(branch: &Inst, var: i64) -> bool {
    let (a, b) = match branch {
        Inst::Beq(a, b, _)
        | Inst::Bne(a, b, _)
        | Inst::Blt(a, b, _)
        | Inst::Ble(a, b, _)
        | Inst::Bgt(a, b, _)
        | Inst::Bge(a, b, _) => (operand_value(a, var), operand_value(b, var)),
        other => panic!("not a conditional branch: {}", other),
    };
    match branch {
        Inst::Beq(..) => a == b,
        Inst::Bne(..) => a != b,
        Inst::Blt(..) => a < b,
        Inst::Ble(..) => a <= b,
        Inst::Bgt(..) => a > b,
        _ => a >= b,
    }
}

/// Whether a float compare followed by a test of its flag against zero jumps
fn float_branch_taken(compare: &Inst, branch: &Inst, var: f32) -> bool {
    let flag = match compare {
        Inst::Flt(_, a, b) => operand_value(a, var) < operand_value(b, var),
        Inst::Fle(_, a, b) => operand_value(a, var) <= operand_value(b, var),
        Inst::Feq(_, a, b) => operand_value(a, var) == operand_value(b, var),
        other => panic!("not a float compare: {}", other),
    };
    match branch {
        Inst::Beq(_, Operand::Zero, _) => !flag,
        Inst::Bne(_, Operand::Zero, _) => flag,
        other => panic!("not a flag test: {}", other),
    }
}

const ALL_OPS: [CmpOp; 6] = [CmpOp::Eq, CmpOp::Ne, CmpOp::Lt, CmpOp::Le, CmpOp::Gt, CmpOp::Ge];

#[test]
fn test_int_branch_skips_body_exactly_when_condition_fails() {
    for op in ALL_OPS {
        for (a, b) in [(1, 2), (2, 2), (3, 2)] {
            let (scope, i, _) = main_scope();
            let main = scope.into_function(
                "main",
                Type::Void,
                vec![Stmt::If {
                    cond: Expr::cond(op, Expr::var(&i), Expr::int(b)),
                    then_body: vec![Stmt::Write(Expr::int(1))],
                    else_body: Vec::new(),
                }],
            );
            let body = lower(main).body;
            assert_eq!(
                int_branch_taken(&body[2], a),
                !op.holds(a, b),
                "{} {} {}",
                a,
                op,
                b
            );
        }
    }
}

#[test]
fn test_float_branch_skips_body_exactly_when_condition_fails() {
    for op in ALL_OPS {
        for (a, b) in [(1.0f32, 2.0f32), (2.0, 2.0), (3.0, 2.0)] {
            let (scope, _, y) = main_scope();
            let main = scope.into_function(
                "main",
                Type::Void,
                vec![Stmt::If {
                    cond: Expr::cond(op, Expr::var(&y), Expr::float(format!("{:.1}", b))),
                    then_body: vec![Stmt::Write(Expr::int(1))],
                    else_body: Vec::new(),
                }],
            );
            let body = lower(main).body;
            assert_eq!(
                float_branch_taken(&body[2], &body[3], a),
                !op.holds(a, b),
                "{} {} {}",
                a,
                op,
                b
            );
        }
    }
}

#[test]
fn test_mixed_comparison_is_promoted() {
    let (scope, i, _) = main_scope();
    let main = scope.into_function(
        "main",
        Type::Void,
        vec![Stmt::If {
            cond: Expr::cond(CmpOp::Lt, Expr::var(&i), Expr::float("0.5")),
            then_body: vec![Stmt::Write(Expr::int(1))],
            else_body: Vec::new(),
        }],
    );

    assert_eq!(
        &text(&lower(main).body)[..5],
        [
            "addi $t1, fp, -4",
            "lw $t2, 0($t1)",
            "fcvt.s.w $f1, $t2",
            "flt.s $t3, $f1, 0.5",
            "beq $t3, x0, out_1",
        ]
    );
}

#[test]
fn test_if_else_layout() {
    let (scope, i, _) = main_scope();
    let main = scope.into_function(
        "main",
        Type::Void,
        vec![Stmt::If {
            cond: Expr::cond(CmpOp::Eq, Expr::var(&i), Expr::int(0)),
            then_body: vec![Stmt::Assign {
                target: Expr::var(&i),
                value: Expr::int(1),
            }],
            else_body: vec![Stmt::Assign {
                target: Expr::var(&i),
                value: Expr::int(2),
            }],
        }],
    );

    assert_eq!(
        text(&lower(main).body),
        vec![
            "addi $t1, fp, -4",
            "lw $t2, 0($t1)",
            "bne $t2, 0, else_1",
            "sw 1, -4(fp)",
            "j out_1",
            "else_1:",
            "sw 2, -4(fp)",
            "out_1:",
            "func_ret_main:",
        ]
    );
}

#[test]
fn test_int_value_condition_tests_against_zero() {
    let (scope, i, _) = main_scope();
    let main = scope.into_function(
        "main",
        Type::Void,
        vec![Stmt::While {
            cond: Expr::var(&i),
            body: Vec::new(),
        }],
    );

    assert_eq!(
        text(&lower(main).body),
        vec![
            "loop_1:",
            "addi $t1, fp, -4",
            "lw $t2, 0($t1)",
            "beq $t2, x0, out_1",
            "j loop_1",
            "out_1:",
            "func_ret_main:",
        ]
    );
}

#[test]
fn test_labels_are_unique_across_functions() {
    let make = |name: &str| {
        let (scope, i, _) = main_scope();
        scope.into_function(
            name,
            Type::Void,
            vec![Stmt::While {
                cond: Expr::cond(CmpOp::Gt, Expr::var(&i), Expr::int(0)),
                body: vec![Stmt::If {
                    cond: Expr::cond(CmpOp::Eq, Expr::var(&i), Expr::int(3)),
                    then_body: vec![Stmt::Return(None)],
                    else_body: Vec::new(),
                }],
            }],
        )
    };
    let program = Program {
        globals: Vec::new(),
        functions: vec![make("main"), make("other")],
    };

    let lowered = lower_program(&program);
    let labels = |f: &LoweredFunction| -> Vec<String> {
        f.body.iter().filter_map(|i| i.label_name().map(str::to_string)).collect()
    };

    // The nested if is lowered before the loop claims its labels
    assert_eq!(
        labels(&lowered.functions[0]),
        vec!["loop_1", "out_1", "out_2", "func_ret_main"]
    );
    assert_eq!(
        labels(&lowered.functions[1]),
        vec!["loop_2", "out_3", "out_4", "func_ret_other"]
    );
    // Temporaries restart in every function
    assert!(lowered.functions[1].body.contains(&Inst::Bne(
        Operand::Temp(RegClass::Int, 4),
        Operand::imm(3),
        "out_3".to_string()
    )));
}

#[test]
fn test_return_converts_to_declared_type() {
    let main = LocalScope::new(&[]).into_function(
        "main",
        Type::Int,
        vec![Stmt::Return(Some(Expr::float("2.5")))],
    );

    assert_eq!(
        text(&lower(main).body),
        vec!["fcvt.w.s $t1, 2.5", "sw $t1, 8(fp)", "j func_ret_main", "func_ret_main:"]
    );
}

#[test]
fn test_empty_return_only_jumps() {
    let main = LocalScope::new(&[]).into_function("main", Type::Void, vec![Stmt::Return(None)]);
    assert_eq!(text(&lower(main).body), vec!["j func_ret_main", "func_ret_main:"]);
}

#[test]
fn test_void_call_without_arguments() {
    let main = LocalScope::new(&[]).into_function(
        "main",
        Type::Void,
        vec![Stmt::Expr(Expr::call("tick", Vec::new(), Vec::new(), Type::Void))],
    );

    assert_eq!(
        text(&lower(main).body),
        vec![
            "addi sp, sp, -4",
            "pushint ra",
            "addi sp, sp, -4",
            "jr func_tick",
            "addi sp, sp, 4",
            "popint ra",
            "addi sp, sp, 4",
            "func_ret_main:",
        ]
    );
}

#[test]
fn test_reading_into_locals_and_globals() {
    let mut globals = GlobalScope::new();
    let g = globals.add_variable("g", Type::Float);
    let (scope, i, _) = main_scope();
    let main = scope.into_function(
        "main",
        Type::Void,
        vec![Stmt::Read(Expr::var(&i)), Stmt::Read(Expr::var(&g))],
    );
    let program = Program {
        globals: globals.into_globals(),
        functions: vec![main],
    };

    assert_eq!(
        text(&lower_program(&program).functions[0].body),
        vec![
            "geti $t1",
            "sw $t1, -4(fp)",
            "getf $f1",
            "la $t2, 0x20000000",
            "fsw $f1, 0($t2)",
            "func_ret_main:",
        ]
    );
}

#[test]
fn test_print_string_variable() {
    let mut globals = GlobalScope::new();
    let hello = globals.add_string("hello", "hello");
    let main = LocalScope::new(&[]).into_function(
        "main",
        Type::Void,
        vec![Stmt::Write(Expr::var(&hello))],
    );
    let program = Program {
        globals: globals.into_globals(),
        functions: vec![main],
    };

    let lowered = lower_program(&program);
    assert_eq!(
        text(&lowered.functions[0].body),
        vec!["la $t1, 0x10000000", "puts $t1", "func_ret_main:"]
    );
    // String constants never enter the liveness seed
    assert!(lowered.globals.is_empty());
    assert_eq!(
        lowered.strings,
        vec![StringConstant {
            name: "hello".to_string(),
            address: "0x10000000".to_string(),
            value: "hello".to_string(),
        }]
    );
}

#[test]
fn test_print_string_through_pointer_is_rejected() {
    let mut scope = LocalScope::new(&[]);
    let s = scope.add_local("s", Type::pointer_to(Type::Str));
    let main = scope.into_function(
        "main",
        Type::Void,
        vec![Stmt::Write(Expr::deref(Expr::var(&s)))],
    );
    let program = Program {
        globals: Vec::new(),
        functions: vec![main],
    };

    let err = generate_program(&program).unwrap_err();
    assert_eq!(
        err,
        CompilerError::codegen_error("main", CodegenError::StringWithoutVariable.to_string())
    );
}

#[test]
fn test_address_of_and_cast() {
    let mut scope = LocalScope::new(&[]);
    let x = scope.add_local("x", Type::Int);
    let q = scope.add_local("q", Type::pointer_to(Type::Int));
    let y = scope.add_local("y", Type::Float);
    let main = scope.into_function(
        "main",
        Type::Void,
        vec![
            Stmt::Assign {
                target: Expr::var(&q),
                value: Expr::addr_of(Expr::var(&x)),
            },
            Stmt::Assign {
                target: Expr::var(&x),
                value: Expr::cast(Type::Int, Expr::var(&y)),
            },
        ],
    );

    assert_eq!(
        text(&lower(main).body),
        vec![
            "addi $t1, fp, -4",
            "sw $t1, -8(fp)",
            "addi $t2, fp, -12",
            "flw $f1, 0($t2)",
            "fcvt.w.s $t3, $f1",
            "sw $t3, -4(fp)",
            "func_ret_main:",
        ]
    );
}

#[test]
fn test_address_of_dereference_reuses_temp() {
    let mut scope = LocalScope::new(&[]);
    let p = scope.add_local("p", Type::pointer_to(Type::Int));
    let main = scope.into_function(
        "main",
        Type::Void,
        vec![Stmt::Write(Expr::addr_of(Expr::deref(Expr::var(&p))))],
    );

    assert_eq!(
        text(&lower(main).body),
        vec!["addi $t1, fp, -4", "lw $t2, 0($t1)", "puti $t2", "func_ret_main:"]
    );
}

#[test]
fn test_misuse_errors() {
    let (scope, i, _) = main_scope();
    let cases = vec![
        (
            Stmt::Write(Expr::cond(CmpOp::Lt, Expr::var(&i), Expr::int(1))),
            CodegenError::MisplacedCondition,
        ),
        (
            Stmt::Write(Expr::addr_of(Expr::int(1))),
            CodegenError::InvalidLvalue { context: "address-of" },
        ),
        (
            Stmt::Assign {
                target: Expr::var(&i),
                value: Expr::call("nothing", Vec::new(), Vec::new(), Type::Void),
            },
            CodegenError::VoidValue { context: "assignment" },
        ),
        (
            Stmt::Assign {
                target: Expr::int(3),
                value: Expr::int(4),
            },
            CodegenError::InvalidLvalue { context: "assignment" },
        ),
    ];

    for (stmt, expected) in cases {
        let function = scope.clone().into_function("main", Type::Void, vec![stmt]);
        let program = Program {
            globals: Vec::new(),
            functions: vec![function],
        };
        let err = generate_program(&program).unwrap_err();
        assert_eq!(err, CompilerError::codegen_error("main", expected.to_string()));
    }
}

#[test]
fn test_scope_homes_and_prelude() {
    let scope = LocalScope::new(&[("a", Type::Int), ("b", Type::Float)]);
    let f = scope.into_function("f", Type::Void, Vec::new());
    let main = LocalScope::new(&[]).into_function("main", Type::Void, Vec::new());
    let program = Program {
        globals: Vec::new(),
        functions: vec![f, main],
    };

    let lowered = lower_program(&program);
    assert_eq!(text(&lowered.prelude), vec!["mv fp, sp", "jr func_main", "halt", ""]);
    assert_eq!(
        lowered.function("f").unwrap().scope_homes,
        vec![Operand::Local(16), Operand::Local(12)]
    );
}

#[test]
fn test_program_needs_main() {
    let f = LocalScope::new(&[]).into_function("f", Type::Void, Vec::new());
    let program = Program {
        globals: Vec::new(),
        functions: vec![f],
    };

    let err = generate_program(&program).unwrap_err();
    assert_eq!(
        err,
        CompilerError::codegen_error("main", CodegenError::MissingEntryPoint.to_string())
    );
}
