//! file: core/src/ast/kind.rs
//! description: expression tree and operator enums.
//!
//! `Expression` is the typed right-hand side of every statement. It is
//! produced by the parser, rewritten by the inliner and the decomposer, and
//! consumed by the matrix expander. `Display` renders it back to source
//! syntax with the minimum number of parentheses.
//!
use std::fmt;

/// Binary operators of the matrix language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,     // +
    Mul,     // *  (scalar or matrix product)
    ElemMul, // .*
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Mul => "*",
            BinaryOperator::ElemMul => ".*",
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add => 1,
            BinaryOperator::Mul | BinaryOperator::ElemMul => 2,
        }
    }
}

/// Matrix constructor functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constructor {
    Zeros,
    Ones,
    Eye,
}

impl Constructor {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "zeros" => Some(Constructor::Zeros),
            "ones" => Some(Constructor::Ones),
            "eye" => Some(Constructor::Eye),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Constructor::Zeros => "zeros",
            Constructor::Ones => "ones",
            Constructor::Eye => "eye",
        }
    }

    /// Literal value of element (row, col) of a freshly constructed matrix.
    pub fn element(&self, row: usize, col: usize) -> &'static str {
        match self {
            Constructor::Zeros => "0",
            Constructor::Ones => "1",
            Constructor::Eye if row == col => "1",
            Constructor::Eye => "0",
        }
    }
}

/// One axis of a sub-matrix slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceRange {
    /// `:`, the whole axis.
    All,
    /// `first:last`, inclusive and 1-based.
    Span(usize, usize),
}

impl SliceRange {
    /// Resolve against an axis of length `len`.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        match *self {
            SliceRange::All => (1, len),
            SliceRange::Span(first, last) => (first, last),
        }
    }
}

impl fmt::Display for SliceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceRange::All => write!(f, ":"),
            SliceRange::Span(first, last) => write!(f, "{}:{}", first, last),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier { name: String },
    Number { text: String },
    Binary { left: Box<Expression>, op: BinaryOperator, right: Box<Expression> },

    Construct { kind: Constructor, rows: usize, cols: usize },
    Index { base: String, row: usize, col: usize },
    RowSlice { base: String, row: usize },
    ColSlice { base: String, col: usize },
    SubSlice { base: String, rows: SliceRange, cols: SliceRange },

    /// An application that is not an index or slice: either a user function
    /// (resolved by the inliner) or an opaque primitive of the rule engine.
    Call { name: String, args: Vec<Expression> },
    /// Right-hand side text outside the grammar, passed through untouched.
    Verbatim { text: String },
}

impl Expression {
    pub fn identifier(name: &str) -> Self {
        Expression::Identifier { name: name.to_string() }
    }

    pub fn number(text: &str) -> Self {
        Expression::Number { text: text.to_string() }
    }

    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::Binary { left: Box::new(left), op, right: Box::new(right) }
    }

    /// Identifiers and numbers.
    pub fn is_atom(&self) -> bool {
        matches!(self, Expression::Identifier { .. } | Expression::Number { .. })
    }

    /// Operands that need no further decomposition: atoms and opaque calls
    /// whose arguments are themselves leaves.
    pub fn is_leaf(&self) -> bool {
        match self {
            Expression::Identifier { .. } | Expression::Number { .. } => true,
            Expression::Call { args, .. } => args.iter().all(Expression::is_leaf),
            _ => false,
        }
    }

    /// Index, slice and constructor forms.
    pub fn is_matrix_form(&self) -> bool {
        matches!(
            self,
            Expression::Construct { .. }
                | Expression::Index { .. }
                | Expression::RowSlice { .. }
                | Expression::ColSlice { .. }
                | Expression::SubSlice { .. }
        )
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expression::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// View this expression as an application `name(args)`. `f(1,2)` parses
    /// as an index form, so it is converted back into numeric arguments.
    pub fn as_call(&self) -> Option<(String, Vec<Expression>)> {
        match self {
            Expression::Call { name, args } => Some((name.clone(), args.clone())),
            Expression::Index { base, row, col } => Some((
                base.clone(),
                vec![Expression::number(&row.to_string()), Expression::number(&col.to_string())],
            )),
            _ => None,
        }
    }

    /// Direct sub-expressions, left to right.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expression::Call { args, .. } => args.iter().collect(),
            _ => Vec::new(),
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut Expression> {
        match self {
            Expression::Binary { left, right, .. } => vec![left.as_mut(), right.as_mut()],
            Expression::Call { args, .. } => args.iter_mut().collect(),
            _ => Vec::new(),
        }
    }

    /// Every variable name read by this expression, including index and
    /// slice bases, in left-to-right order.
    pub fn referenced_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, names: &mut Vec<String>) {
        match self {
            Expression::Identifier { name } => names.push(name.clone()),
            Expression::Index { base, .. }
            | Expression::RowSlice { base, .. }
            | Expression::ColSlice { base, .. }
            | Expression::SubSlice { base, .. } => names.push(base.clone()),
            _ => {}
        }
        for child in self.children() {
            child.collect_names(names);
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Binary { op, .. } => op.precedence(),
            _ => u8::MAX,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier { name } => write!(f, "{}", name),
            Expression::Number { text } => write!(f, "{}", text),
            Expression::Binary { left, op, right } => {
                // Left associative: a right operand of equal precedence needs parentheses.
                if left.precedence() < op.precedence() {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                write!(f, "{}", op.symbol())?;
                if right.precedence() <= op.precedence() {
                    write!(f, "({})", right)
                } else {
                    write!(f, "{}", right)
                }
            }
            Expression::Construct { kind, rows, cols } => match kind {
                Constructor::Eye if rows == cols => write!(f, "eye({})", rows),
                _ => write!(f, "{}({},{})", kind.name(), rows, cols),
            },
            Expression::Index { base, row, col } => write!(f, "{}({},{})", base, row, col),
            Expression::RowSlice { base, row } => write!(f, "{}({},:)", base, row),
            Expression::ColSlice { base, col } => write!(f, "{}(:,{})", base, col),
            Expression::SubSlice { base, rows, cols } => write!(f, "{}({},{})", base, rows, cols),
            Expression::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::Verbatim { text } => write!(f, "{}", text),
        }
    }
}
