//! file: core/src/ir/lower/decompose.rs
//! description: three-address style decomposition of right-hand sides.
//!
//! A compound right-hand side is broken into single-operation assignments
//! to fresh temporaries. Each round hoists one non-root node whose operands
//! are already leaves, preferring index/slice/constructor operands, then
//! `*`, then `.*`, then `+`, leftmost first. The hoisted node is located by
//! its position in the tree, so equal sub-expressions elsewhere are left
//! alone.

use log::{debug, trace};

use crate::ast::{Assignment, BinaryOperator, Expression, Statement};

use super::lowering_context::LoweringContext;

/// Decompose every assignment; other statements pass through.
pub fn decompose_statements(statements: Vec<Statement>, ctx: &mut LoweringContext) -> Vec<Statement> {
    let before = statements.len();
    let mut out = Vec::with_capacity(before);
    for statement in statements {
        match statement {
            Statement::Assignment(assignment) => {
                out.extend(decompose_assignment(assignment, ctx).into_iter().map(Statement::Assignment))
            }
            other => out.push(other),
        }
    }
    debug!("decomposition turned {} statements into {}", before, out.len());
    out
}

/// Split one assignment into single-operation steps. The assignment's own target is
/// written last.
pub fn decompose_assignment(assignment: Assignment, ctx: &mut LoweringContext) -> Vec<Assignment> {
    let mut steps = Vec::new();
    let mut root = assignment.value.clone();

    while !is_single_operation(&root) {
        let Some(path) = select_candidate(&root) else {
            break;
        };
        let Some(node) = node_at_mut(&mut root, &path) else {
            break;
        };
        let temp = ctx.fresh_temp();
        let hoisted = std::mem::replace(node, Expression::identifier(&temp));
        trace!("hoisted '{}' into {}", hoisted, temp);
        steps.push(assignment.derive(&temp, hoisted));
    }

    steps.push(Assignment { value: root, ..assignment });
    steps
}

/// An atom, an opaque call on leaves, a bare matrix form, or one binary
/// operation on leaves.
pub fn is_single_operation(expr: &Expression) -> bool {
    match expr {
        Expression::Binary { left, right, .. } => left.is_leaf() && right.is_leaf(),
        Expression::Verbatim { .. } => true,
        other => other.is_leaf() || other.is_matrix_form(),
    }
}

/// Hoisting class of a candidate node, lower goes first.
fn candidate_class(expr: &Expression) -> Option<u8> {
    match expr {
        e if e.is_matrix_form() => Some(0),
        Expression::Binary { left, op, right } if left.is_leaf() && right.is_leaf() => Some(match op {
            BinaryOperator::Mul => 1,
            BinaryOperator::ElemMul => 2,
            BinaryOperator::Add => 3,
        }),
        _ => None,
    }
}

/// Path (child indices from the root) of the next node to hoist.
fn select_candidate(root: &Expression) -> Option<Vec<usize>> {
    let mut best: Option<(u8, Vec<usize>)> = None;
    let mut path = Vec::new();
    for (i, child) in root.children().into_iter().enumerate() {
        path.push(i);
        visit(child, &mut path, &mut best);
        path.pop();
    }
    best.map(|(_, path)| path)
}

fn visit(expr: &Expression, path: &mut Vec<usize>, best: &mut Option<(u8, Vec<usize>)>) {
    if let Some(class) = candidate_class(expr) {
        // strictly better only, so the leftmost of a class wins
        if best.as_ref().is_none_or(|(current, _)| class < *current) {
            *best = Some((class, path.clone()));
        }
        return;
    }
    for (i, child) in expr.children().into_iter().enumerate() {
        path.push(i);
        visit(child, path, best);
        path.pop();
    }
}

fn node_at_mut<'e>(root: &'e mut Expression, path: &[usize]) -> Option<&'e mut Expression> {
    let mut node = root;
    for &index in path {
        node = node.children_mut().into_iter().nth(index)?;
    }
    Some(node)
}
