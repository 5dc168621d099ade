//! file: core/src/ir/lower/expand.rs
//! description: matrix-to-scalar expansion.
//!
//! Walks decomposed statements strictly in order, consulting the shape table
//! for every read and updating it after every write, and rewrites each
//! matrix-level assignment into one scalar assignment per element in
//! row-major order. Scalar statements pass through. The first shape error
//! stops the pass, since every later statement depends on the shapes the
//! failed one would have recorded.

use log::{debug, trace};

use crate::analyzers::shape::{
    IndexOutOfBoundsError, ShapeMismatchError, UnknownShapeError, VariableShape,
};
use crate::ast::{Assignment, BinaryOperator, Constructor, Expression, SliceRange, Statement};
use crate::error::{Diagnostics, FunkyErrorExt};
use crate::location::Location;

use super::lowering_context::LoweringContext;

const ISSUER: &str = "funkytrees.ir.lower.expand";

type ExpandResult<T> = Result<T, Box<dyn FunkyErrorExt>>;

/// Expand every matrix operation of `statements` into scalar assignments.
pub fn expand_matrices(statements: Vec<Statement>, ctx: &mut LoweringContext) -> Result<Vec<Statement>, Diagnostics> {
    let before = statements.len();
    let mut out = Vec::with_capacity(before);
    for statement in statements {
        match statement {
            Statement::Assignment(assignment) => {
                let expanded = expand_assignment(&assignment, ctx).map_err(|e| vec![e])?;
                out.extend(expanded.into_iter().map(Statement::Assignment));
            }
            Statement::Call(call) => match Assignment::try_from(call) {
                Ok(assignment) => {
                    let expanded = expand_assignment(&assignment, ctx).map_err(|e| vec![e])?;
                    out.extend(expanded.into_iter().map(Statement::Assignment));
                }
                Err(call) => {
                    // outputs of opaque primitives are scalars
                    for output in &call.outputs {
                        ctx.shapes.mark_scalar(output);
                        ctx.names.declare_scalar(output, call.location.as_ref());
                    }
                    out.push(Statement::Call(call));
                }
            },
            unparsed => out.push(unparsed),
        }
    }
    debug!(
        "matrix expansion turned {} statements into {} ({} matrices live)",
        before,
        out.len(),
        ctx.shapes.len()
    );
    Ok(out)
}

/// Expand a single assignment, updating the shape of its target.
pub fn expand_assignment(assignment: &Assignment, ctx: &mut LoweringContext) -> ExpandResult<Vec<Assignment>> {
    let mut expander = Expander { ctx, assignment, out: Vec::new() };
    let target = assignment.target.as_str();

    match &assignment.value {
        Expression::Construct { kind, rows, cols } => expander.construct(target, *kind, *rows, *cols)?,
        Expression::Index { base, row, col } => expander.index(target, base, *row, *col)?,
        Expression::RowSlice { base, row } => {
            let shape = expander.matrix_shape(base)?;
            expander.slice(target, base, shape, SliceRange::Span(*row, *row), SliceRange::All)?
        }
        Expression::ColSlice { base, col } => {
            let shape = expander.matrix_shape(base)?;
            expander.slice(target, base, shape, SliceRange::All, SliceRange::Span(*col, *col))?
        }
        Expression::SubSlice { base, rows, cols } => {
            let shape = expander.matrix_shape(base)?;
            expander.slice(target, base, shape, *rows, *cols)?
        }
        Expression::Identifier { name } if expander.ctx.shapes.is_matrix(name) => {
            let shape = expander.ctx.shapes.shape_of(name);
            expander.copy(target, name, shape)?
        }
        Expression::Binary { left, op, right }
            if expander.operand_shape(left).is_matrix || expander.operand_shape(right).is_matrix =>
        {
            expander.matrix_binary(target, left, *op, right)?
        }
        other => {
            let value = expander.scalar_value(other)?;
            expander.scalar_write(target, value);
        }
    }

    Ok(expander.out)
}

struct Expander<'a> {
    ctx: &'a mut LoweringContext,
    assignment: &'a Assignment,
    out: Vec<Assignment>,
}

impl<'a> Expander<'a> {
    fn location(&self) -> Option<Location> {
        self.assignment.location.clone()
    }

    fn element(&mut self, base: &str, row: usize, col: usize) -> ExpandResult<String> {
        let location = self.assignment.location.as_ref();
        self.ctx.names.name_for(base, row, col, location)
    }

    fn element_expr(&mut self, base: &str, row: usize, col: usize) -> ExpandResult<Expression> {
        Ok(Expression::identifier(&self.element(base, row, col)?))
    }

    fn emit(&mut self, target: &str, value: Expression) {
        trace!("  {} := {}", target, value);
        self.out.push(self.assignment.derive(target, value));
    }

    fn scalar_write(&mut self, target: &str, value: Expression) {
        self.ctx.shapes.mark_scalar(target);
        self.ctx.names.declare_scalar(target, self.assignment.location.as_ref());
        self.emit(target, value);
    }

    /// Shape of a leaf operand; anything other than an identifier is scalar.
    fn operand_shape(&self, expr: &Expression) -> VariableShape {
        match expr {
            Expression::Identifier { name } => self.ctx.shapes.shape_of(name),
            _ => VariableShape::scalar(),
        }
    }

    fn matrix_shape(&self, base: &str) -> ExpandResult<VariableShape> {
        match self.ctx.shapes.lookup(base) {
            Some(shape) => Ok(*shape),
            None => Err(Box::new(UnknownShapeError::new(base, ISSUER.to_string(), self.location()))),
        }
    }

    fn construct(&mut self, target: &str, kind: Constructor, rows: usize, cols: usize) -> ExpandResult<()> {
        if rows == 0 || cols == 0 {
            return Err(Box::new(IndexOutOfBoundsError::with(
                format!("Cannot construct an empty {}x{} matrix for '{}'", rows, cols, target),
                ISSUER.to_string(),
                self.location(),
            )));
        }
        let shape = VariableShape::matrix(rows, cols);
        for (r, c) in shape.positions() {
            let name = self.element(target, r, c)?;
            self.emit(&name, Expression::number(kind.element(r, c)));
        }
        self.ctx.shapes.record(target, shape);
        Ok(())
    }

    fn index(&mut self, target: &str, base: &str, row: usize, col: usize) -> ExpandResult<()> {
        let Some(shape) = self.ctx.shapes.lookup(base).copied() else {
            self.scalar_write(target, opaque_index(base, row, col));
            return Ok(());
        };
        if !shape.contains(row, col) {
            return Err(Box::new(IndexOutOfBoundsError::index(
                base,
                &format!("({},{})", row, col),
                shape,
                ISSUER.to_string(),
                self.location(),
            )));
        }
        let value = self.element_expr(base, row, col)?;
        self.scalar_write(target, value);
        Ok(())
    }

    /// Rows and columns `rows` x `cols` of `base`, re-indexed from (1,1).
    fn slice(
        &mut self,
        target: &str,
        base: &str,
        shape: VariableShape,
        rows: SliceRange,
        cols: SliceRange,
    ) -> ExpandResult<()> {
        let (r1, r2) = rows.bounds(shape.rows);
        let (c1, c2) = cols.bounds(shape.cols);
        if r1 == 0 || c1 == 0 || r1 > r2 || c1 > c2 || r2 > shape.rows || c2 > shape.cols {
            return Err(Box::new(IndexOutOfBoundsError::index(
                base,
                &format!("({},{})", rows, cols),
                shape,
                ISSUER.to_string(),
                self.location(),
            )));
        }

        // Element (i, j) of the result reads (i + r1 - 1, j + c1 - 1), never an
        // element written earlier, so slicing a variable into itself is safe.
        let result = VariableShape::matrix(r2 - r1 + 1, c2 - c1 + 1);
        for (i, j) in result.positions() {
            let value = self.element_expr(base, i + r1 - 1, j + c1 - 1)?;
            let name = self.element(target, i, j)?;
            self.emit(&name, value);
        }
        self.ctx.shapes.record(target, result);
        Ok(())
    }

    fn copy(&mut self, target: &str, source: &str, shape: VariableShape) -> ExpandResult<()> {
        for (i, j) in shape.positions() {
            let value = self.element_expr(source, i, j)?;
            let name = self.element(target, i, j)?;
            self.emit(&name, value);
        }
        self.ctx.shapes.record(target, shape);
        Ok(())
    }

    /// A binary operation on leaves where at least one side is a matrix.
    fn matrix_binary(
        &mut self,
        target: &str,
        left: &Expression,
        op: BinaryOperator,
        right: &Expression,
    ) -> ExpandResult<()> {
        let left_shape = self.operand_shape(left);
        let right_shape = self.operand_shape(right);
        let mismatch = |this: &Self| -> Box<dyn FunkyErrorExt> {
            Box::new(ShapeMismatchError::operands(
                &left.to_string(),
                left_shape,
                op.symbol(),
                &right.to_string(),
                right_shape,
                ISSUER.to_string(),
                this.location(),
            ))
        };

        match (op, left_shape.is_matrix, right_shape.is_matrix) {
            (BinaryOperator::Mul, true, true) => {
                if left_shape.cols != right_shape.rows {
                    return Err(mismatch(self));
                }
                let (Some(l), Some(r)) = (left.as_identifier(), right.as_identifier()) else {
                    return Err(mismatch(self));
                };
                let result = VariableShape::matrix(left_shape.rows, right_shape.cols);
                // Each result element reads a whole row and column, so a target
                // that is also an operand is computed into a temporary first.
                if target == l || target == r {
                    let staging = self.ctx.fresh_temp();
                    self.product(&staging, l, r, left_shape.cols, result)?;
                    self.copy(target, &staging, result)
                } else {
                    self.product(target, l, r, left_shape.cols, result)
                }
            }
            (BinaryOperator::Mul, _, _) => {
                // matrix times scalar, operand order preserved
                let (matrix, shape, scalar, matrix_on_left) = if left_shape.is_matrix {
                    (left, left_shape, right, true)
                } else {
                    (right, right_shape, left, false)
                };
                let Some(matrix) = matrix.as_identifier() else {
                    return Err(mismatch(self));
                };
                let scalar = self.scalar_value(scalar)?;
                let staging = if self.reads_element_of(&scalar, target) {
                    Some(self.ctx.fresh_temp())
                } else {
                    None
                };
                let destination = staging.clone().unwrap_or_else(|| target.to_string());
                for (i, j) in shape.positions() {
                    let element = self.element_expr(matrix, i, j)?;
                    let value = if matrix_on_left {
                        Expression::binary(element, BinaryOperator::Mul, scalar.clone())
                    } else {
                        Expression::binary(scalar.clone(), BinaryOperator::Mul, element)
                    };
                    let name = self.element(&destination, i, j)?;
                    self.emit(&name, value);
                }
                self.ctx.shapes.record(&destination, shape);
                match staging {
                    Some(staging) => self.copy(target, &staging, shape),
                    None => Ok(()),
                }
            }
            (BinaryOperator::ElemMul | BinaryOperator::Add, true, true) if left_shape.same_dims(&right_shape) => {
                let (Some(l), Some(r)) = (left.as_identifier(), right.as_identifier()) else {
                    return Err(mismatch(self));
                };
                let element_op = match op {
                    BinaryOperator::Add => BinaryOperator::Add,
                    _ => BinaryOperator::Mul,
                };
                for (i, j) in left_shape.positions() {
                    let value = Expression::binary(self.element_expr(l, i, j)?, element_op, self.element_expr(r, i, j)?);
                    let name = self.element(target, i, j)?;
                    self.emit(&name, value);
                }
                self.ctx.shapes.record(target, left_shape);
                Ok(())
            }
            _ => Err(mismatch(self)),
        }
    }

    fn product(&mut self, target: &str, left: &str, right: &str, inner: usize, result: VariableShape) -> ExpandResult<()> {
        for (i, j) in result.positions() {
            let mut sum: Option<Expression> = None;
            for k in 1..=inner {
                let term = Expression::binary(
                    self.element_expr(left, i, k)?,
                    BinaryOperator::Mul,
                    self.element_expr(right, k, j)?,
                );
                sum = Some(match sum {
                    Some(acc) => Expression::binary(acc, BinaryOperator::Add, term),
                    None => term,
                });
            }
            if let Some(value) = sum {
                let name = self.element(target, i, j)?;
                self.emit(&name, value);
            }
        }
        self.ctx.shapes.record(target, result);
        Ok(())
    }

    fn reads_element_of(&self, expr: &Expression, base: &str) -> bool {
        expr.referenced_names()
            .iter()
            .any(|name| self.ctx.names.owner_of(name).is_some_and(|key| key.base == base))
    }

    /// Check and rewrite an expression whose value must be a scalar: element
    /// reads become element names, `.*` becomes `*`, and any matrix that
    /// would have to stand for a single value is an error.
    fn scalar_value(&mut self, expr: &Expression) -> ExpandResult<Expression> {
        match expr {
            Expression::Identifier { name } => match self.ctx.shapes.lookup(name) {
                Some(shape) => Err(Box::new(ShapeMismatchError::with(
                    format!("Matrix '{}' ({}) is used where a scalar is required", name, shape),
                    ISSUER.to_string(),
                    self.location(),
                ))),
                None => Ok(expr.clone()),
            },
            Expression::Index { base, row, col } => {
                let Some(shape) = self.ctx.shapes.lookup(base).copied() else {
                    return Ok(opaque_index(base, *row, *col));
                };
                if !shape.contains(*row, *col) {
                    return Err(Box::new(IndexOutOfBoundsError::index(
                        base,
                        &format!("({},{})", row, col),
                        shape,
                        ISSUER.to_string(),
                        self.location(),
                    )));
                }
                self.element_expr(base, *row, *col)
            }
            Expression::Binary { left, op, right } => {
                let op = match op {
                    BinaryOperator::ElemMul => BinaryOperator::Mul,
                    other => *other,
                };
                Ok(Expression::binary(self.scalar_value(left)?, op, self.scalar_value(right)?))
            }
            Expression::Call { name, args } => {
                if Constructor::from_name(name).is_some() {
                    return Err(Box::new(UnknownShapeError::with(
                        name,
                        format!("Cannot determine the shape of '{}': dimensions must be integer literals", expr),
                        ISSUER.to_string(),
                        self.location(),
                    )));
                }
                let args = args.iter().map(|arg| self.scalar_value(arg)).collect::<ExpandResult<Vec<_>>>()?;
                Ok(Expression::Call { name: name.clone(), args })
            }
            Expression::Construct { .. }
            | Expression::RowSlice { .. }
            | Expression::ColSlice { .. }
            | Expression::SubSlice { .. } => Err(Box::new(ShapeMismatchError::with(
                format!("Matrix expression '{}' is used where a scalar is required", expr),
                ISSUER.to_string(),
                self.location(),
            ))),
            Expression::Number { .. } | Expression::Verbatim { .. } => Ok(expr.clone()),
        }
    }
}

/// `name(i,j)` on a name with no matrix shape is a call to an opaque
/// two-argument primitive, not an element read.
fn opaque_index(base: &str, row: usize, col: usize) -> Expression {
    Expression::Call {
        name: base.to_string(),
        args: vec![Expression::number(&row.to_string()), Expression::number(&col.to_string())],
    }
}
