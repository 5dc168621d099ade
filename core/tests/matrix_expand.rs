use std::collections::HashSet;

use funkytrees_core::analyzers::build_function_table;
use funkytrees_core::analyzers::shape::{VariableShape, element_name};
use funkytrees_core::ast::{Statement, generate_lines_from_source};
use funkytrees_core::ir::{decompose_statements, expand_matrices};
use funkytrees_core::{Diagnostics, FunkyErrorExt, LoweringContext, Script};

fn statements(src: &str) -> Vec<Statement> {
    let script = Script::from_source("m.ft", src);
    build_function_table(generate_lines_from_source(&script)).1
}

fn expand_with(src: &str, ctx: &mut LoweringContext) -> Result<Vec<String>, Diagnostics> {
    let decomposed = decompose_statements(statements(src), ctx);
    expand_matrices(decomposed, ctx).map(|out| out.iter().map(|s| s.to_string()).collect())
}

fn expand(src: &str) -> Vec<String> {
    expand_with(src, &mut LoweringContext::default()).expect("expands")
}

fn expand_err(src: &str) -> String {
    let errors = expand_with(src, &mut LoweringContext::default()).expect_err("fails");
    assert_eq!(errors.len(), 1, "the expander stops at the first error");
    errors[0].message()
}

#[test]
fn zeros_yields_one_assignment_per_element() {
    let mut ctx = LoweringContext::default();
    let out = expand_with("A := zeros(2,3)", &mut ctx).expect("expands");

    assert_eq!(out, vec!["A11 := 0", "A12 := 0", "A13 := 0", "A21 := 0", "A22 := 0", "A23 := 0"]);
    let targets: HashSet<&str> = out.iter().map(|s| s.split(" := ").next().unwrap_or_default()).collect();
    assert_eq!(targets.len(), 6);
    assert_eq!(ctx.shapes.lookup("A"), Some(&VariableShape::matrix(2, 3)));
}

#[test]
fn eye_and_ones() {
    assert_eq!(expand("I := eye(2)"), vec!["I11 := 1", "I12 := 0", "I21 := 0", "I22 := 1"]);
    assert_eq!(expand("J := ones(1,2)"), vec!["J11 := 1", "J12 := 1"]);
    assert_eq!(expand("K := eye(2,3)")[2], "K13 := 0");
}

#[test]
fn matrix_product_sums_row_times_column() {
    let mut ctx = LoweringContext::default();
    let out = expand_with("A := ones(2,2)\nB := ones(2,2)\nR := A*B", &mut ctx).expect("expands");

    assert_eq!(
        out[8..],
        [
            "R11 := A11*B11+A12*B21",
            "R12 := A11*B12+A12*B22",
            "R21 := A21*B11+A22*B21",
            "R22 := A21*B12+A22*B22",
        ]
    );
    assert_eq!(ctx.shapes.lookup("R"), Some(&VariableShape::matrix(2, 2)));
}

#[test]
fn rectangular_product_shapes() {
    let mut ctx = LoweringContext::default();
    let out = expand_with("A := ones(2,3)\nB := ones(3,1)\nR := A*B", &mut ctx).expect("expands");

    assert_eq!(out[9..], ["R11 := A11*B11+A12*B21+A13*B31", "R21 := A21*B11+A22*B21+A23*B31"]);
    assert_eq!(ctx.shapes.lookup("R"), Some(&VariableShape::matrix(2, 1)));
}

#[test]
fn incompatible_product_is_a_shape_mismatch() {
    let message = expand_err("A := ones(2,3)\nB := ones(2,3)\nR := A*B");
    assert!(message.contains("Shape mismatch"), "{}", message);
    assert!(message.contains("2x3"), "{}", message);
}

#[test]
fn copy_inherits_the_shape() {
    let mut ctx = LoweringContext::default();
    let out = expand_with("A := zeros(2,3)\nB := A", &mut ctx).expect("expands");

    assert_eq!(out[6..], ["B11 := A11", "B12 := A12", "B13 := A13", "B21 := A21", "B22 := A22", "B23 := A23"]);
    assert_eq!(ctx.shapes.lookup("B"), Some(&VariableShape::matrix(2, 3)));
}

#[test]
fn scaling_keeps_operand_order() {
    let out = expand("A := ones(2,2)\nS := 3*A\nT := A*k");
    assert_eq!(out[4..8], ["S11 := 3*A11", "S12 := 3*A12", "S21 := 3*A21", "S22 := 3*A22"]);
    assert_eq!(out[8], "T11 := A11*k");
}

#[test]
fn elementwise_operations_pair_positions() {
    let out = expand("A := ones(2,2)\nB := eye(2)\nC := A.*B\nD := A+B");
    assert_eq!(out[8..12], ["C11 := A11*B11", "C12 := A12*B12", "C21 := A21*B21", "C22 := A22*B22"]);
    assert_eq!(out[12], "D11 := A11+B11");
}

#[test]
fn elementwise_operands_must_agree() {
    let message = expand_err("A := ones(2,2)\nB := ones(3,3)\nC := A+B");
    assert!(message.contains("2x2") && message.contains("3x3"), "{}", message);

    let message = expand_err("A := ones(2,2)\nC := A+1");
    assert!(message.contains("scalar"), "{}", message);
}

#[test]
fn slices_are_reindexed_from_one() {
    let mut ctx = LoweringContext::default();
    let src = "A := ones(2,3)\nr := A(2,:)\nc := A(:,3)\nM := eye(3)\nS := M(2:3,1:2)";
    let out = expand_with(src, &mut ctx).expect("expands");

    assert_eq!(out[6..9], ["r11 := A21", "r12 := A22", "r13 := A23"]);
    assert_eq!(out[9..11], ["c11 := A13", "c21 := A23"]);
    assert_eq!(out[20..], ["S11 := M21", "S12 := M22", "S21 := M31", "S22 := M32"]);
    assert_eq!(ctx.shapes.lookup("r"), Some(&VariableShape::matrix(1, 3)));
    assert_eq!(ctx.shapes.lookup("c"), Some(&VariableShape::matrix(2, 1)));
    assert_eq!(ctx.shapes.lookup("S"), Some(&VariableShape::matrix(2, 2)));
}

#[test]
fn indexing_reads_one_element() {
    let mut ctx = LoweringContext::default();
    let out = expand_with("A := zeros(2,2)\nx := A(2,1)", &mut ctx).expect("expands");
    assert_eq!(out[4], "x := A21");
    assert!(ctx.shapes.lookup("x").is_none());
}

#[test]
fn indexing_errors() {
    assert!(expand_err("r := Q(1,:)").contains("'Q'"));
    assert!(expand_err("A := zeros(2,2)\nx := A(3,1)").contains("outside"));
    assert!(expand_err("A := zeros(2,2)\nB := A(1:3,:)").contains("outside"));
    assert!(expand_err("A := zeros(0,2)").contains("empty"));
}

#[test]
fn two_integer_applications_without_a_shape_are_opaque_calls() {
    assert_eq!(expand("y := max(1,2)"), vec!["y := max(1,2)"]);
    assert_eq!(expand("y := max(1,2) + c"), vec!["dummy0 := max(1,2)", "y := dummy0+c"]);

    // a registered matrix is still indexed
    assert_eq!(expand("max := ones(1,2)\ny := max(1,2)")[2], "y := max12");
}

#[test]
fn slicing_a_name_without_a_shape_is_an_error() {
    let message = expand_err("r := Q(2,:)");
    assert!(message.contains("Cannot index or slice 'Q'"), "{}", message);
    assert!(expand_err("c := Q(:,1)").contains("'Q'"));
    assert!(expand_err("S := Q(1:2,1:2)").contains("'Q'"));
}

#[test]
fn constructors_need_literal_dimensions() {
    let message = expand_err("n := 2\nA := zeros(n,n)");
    assert!(message.contains("'zeros(n,n)'"), "{}", message);
    assert!(expand_err("B := eye(k)").contains("eye(k)"));
}

#[test]
fn single_output_call_statements_are_expanded_as_assignments() {
    let out = expand("A := ones(2,2)\n[y] := clamp01(A(2,1)) $ Gear = 1");
    assert_eq!(out[4], "y := clamp01(A21) $ Gear = 1");

    assert!(expand_err("A := ones(2,2)\n[y] := clamp01(A)").contains("scalar"));
    assert_eq!(expand("[p, q] := prim(x)"), vec!["[p, q] := prim(x)"]);
}

#[test]
fn a_scalar_write_drops_the_matrix_shape() {
    let mut ctx = LoweringContext::default();
    expand_with("A := zeros(2,2)\nA := 5", &mut ctx).expect("expands");
    assert!(ctx.shapes.lookup("A").is_none());

    assert!(expand_err("A := zeros(2,2)\nA := 5\nr := A(2,:)").contains("no known matrix shape"));
}

#[test]
fn matrices_cannot_stand_for_scalars() {
    assert!(expand_err("A := zeros(2,2)\nx := sin(A)").contains("scalar"));
    assert!(expand_err("A := zeros(2,2)\nx := (A + A) * 2 + 1").contains("scalar"));
}

#[test]
fn scalar_elementwise_product_becomes_a_product() {
    assert_eq!(expand("x := a.*b"), vec!["x := a*b"]);
}

#[test]
fn expansion_is_idempotent_on_scalar_programs() {
    let src = "x := a*b\ny := x+1 $ Gear = 1\nz := sin(y)";
    let once = expand(src);
    assert_eq!(once, vec!["x := a*b", "y := x+1 $ Gear = 1", "z := sin(y)"]);
    assert_eq!(expand(&once.join("\n")), once);

    let expanded = expand("A := ones(2,2)\nB := A(1,:)");
    assert_eq!(expand(&expanded.join("\n")), expanded);
}

#[test]
fn a_product_into_its_own_operand_goes_through_a_temporary() {
    let out = expand("A := ones(2,2)\nA := A*A");
    assert_eq!(out[4], "dummy0_1_1 := A11*A11+A12*A21");
    assert_eq!(out[8..], ["A11 := dummy0_1_1", "A12 := dummy0_1_2", "A21 := dummy0_2_1", "A22 := dummy0_2_2"]);
}

#[test]
fn decomposed_matrix_expressions_expand_through_temporaries() {
    let out = expand("A := ones(2,2)\nB := ones(2,2)\nC := ones(2,2)\nR := A*B + C");
    assert_eq!(out[12], "dummy0_1_1 := A11*B11+A12*B21");
    assert_eq!(out[16], "R11 := dummy0_1_1+C11");
}

#[test]
fn element_names() {
    assert_eq!(element_name("A", 1, 2), "A12");
    assert_eq!(element_name("A", 10, 2), "A_10_2");
    assert_eq!(element_name("A1", 1, 1), "A1_1_1");
    assert_eq!(expand("A := zeros(10,1)")[9], "A_10_1 := 0");
}

#[test]
fn element_names_never_merge_with_existing_scalars() {
    let message = expand_err("A11 := 5\nA := zeros(2,2)");
    assert!(message.contains("'A11'"), "{}", message);

    // writing an element directly after the matrix exists is fine
    let out = expand("A := zeros(2,2)\nA11 := 5");
    assert_eq!(out[4], "A11 := 5");
}
