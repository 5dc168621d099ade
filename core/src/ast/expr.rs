//! file: core/src/ast/expr.rs
//! description: expression parsing from `expression_root` pairs.
//!
//! Builds `Expression` trees from the `pest` output. Applications
//! `name(args)` are classified here into constructors, index and slice
//! forms, or plain calls, so later stages dispatch on the variant instead
//! of re-matching text.
//!
use pest::Parser;

use crate::{
    ast::{BinaryOperator, Constructor, Expression, FunkyErrorExt, Rule, RulesParser, SliceRange, rules},
    error::Level,
    location::Location,
};

const ISSUER: &str = "funkytrees.ast.expr";

/// One argument of an application before classification.
enum Argument {
    Expr(Expression),
    Colon,
    Range(usize, usize),
}

impl Argument {
    fn as_integer(&self) -> Option<usize> {
        match self {
            Argument::Expr(Expression::Number { text }) => text.parse::<usize>().ok(),
            _ => None,
        }
    }

    fn as_slice_range(&self) -> Option<SliceRange> {
        match self {
            Argument::Colon => Some(SliceRange::All),
            Argument::Range(first, last) => Some(SliceRange::Span(*first, *last)),
            other => other.as_integer().map(|i| SliceRange::Span(i, i)),
        }
    }
}

/// Parse a right-hand side expression. `base` is the location of the first
/// character of `text` and is only used for diagnostics.
pub fn parse_expression_at(text: &str, base: &Location) -> Result<Expression, Box<dyn FunkyErrorExt>> {
    let mut pairs = RulesParser::parse(Rule::expression_root, text)
        .map_err(|e| rules::syntax_error_from_pest(e, base, ISSUER))?;
    let root = rules::fetch_next_pair(&mut pairs, base, ISSUER)?;
    let mut inner = root.into_inner();
    let expr_pair = rules::fetch_next_pair(&mut inner, base, ISSUER)?;
    parse_expression_rule(expr_pair, base)
}

/// Parse an expression that does not come from a script file.
pub fn parse_expression(text: &str) -> Result<Expression, Box<dyn FunkyErrorExt>> {
    parse_expression_at(text, &Location::new("<expr>".into(), 1, 1))
}

fn parse_expression_rule(
    pair: pest::iterators::Pair<Rule>,
    base: &Location,
) -> Result<Expression, Box<dyn FunkyErrorExt>> {
    let mut inner = pair.into_inner();
    let first = rules::fetch_next_pair(&mut inner, base, ISSUER)?;
    let mut node = parse_term_rule(first, base)?;

    // Zero-or-more (add_op, term) repetitions, folded left.
    while let Some(_add_op) = inner.next() {
        let right_pair = rules::fetch_next_pair(&mut inner, base, ISSUER)?;
        let right = parse_term_rule(right_pair, base)?;
        node = Expression::binary(node, BinaryOperator::Add, right);
    }

    Ok(node)
}

fn parse_term_rule(
    pair: pest::iterators::Pair<Rule>,
    base: &Location,
) -> Result<Expression, Box<dyn FunkyErrorExt>> {
    let mut inner = pair.into_inner();
    let first = rules::fetch_next_pair(&mut inner, base, ISSUER)?;
    let mut node = parse_factor_rule(first, base)?;

    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_str() {
            "*" => BinaryOperator::Mul,
            ".*" => BinaryOperator::ElemMul,
            other => {
                return Err(Box::new(crate::ast::err::SyntaxError::with(
                    Level::Error,
                    format!("Invalid multiplicative operator '{}'.", other),
                    ISSUER.into(),
                    Some(rules::get_location_from_pair(&op_pair, base)),
                    Some(rules::get_span_from_pair(&op_pair, base)),
                )));
            }
        };
        let right_pair = rules::fetch_next_pair(&mut inner, base, ISSUER)?;
        let right = parse_factor_rule(right_pair, base)?;
        node = Expression::binary(node, op, right);
    }

    Ok(node)
}

fn parse_factor_rule(
    pair: pest::iterators::Pair<Rule>,
    base: &Location,
) -> Result<Expression, Box<dyn FunkyErrorExt>> {
    match pair.as_rule() {
        Rule::group => {
            let location = rules::get_location_from_pair(&pair, base);
            let mut inner = pair.into_inner();
            let expr_pair = rules::fetch_next_pair(&mut inner, &location, ISSUER)?;
            parse_expression_rule(expr_pair, base)
        }
        Rule::application => parse_application_rule(pair, base),
        Rule::number => Ok(Expression::number(pair.as_str())),
        Rule::identifier => Ok(Expression::identifier(pair.as_str())),
        other => Err(Box::new(crate::ast::err::SyntaxError::with(
            Level::Error,
            format!("Unexpected factor {:?}.", other),
            ISSUER.into(),
            Some(rules::get_location_from_pair(&pair, base)),
            Some(rules::get_span_from_pair(&pair, base)),
        ))),
    }
}

fn parse_application_rule(
    pair: pest::iterators::Pair<Rule>,
    base: &Location,
) -> Result<Expression, Box<dyn FunkyErrorExt>> {
    let location = rules::get_location_from_pair(&pair, base);
    let span = rules::get_span_from_pair(&pair, base);
    let mut inner = pair.into_inner();
    let name = rules::fetch_next_pair(&mut inner, &location, ISSUER)?.as_str().to_string();

    let mut args = Vec::new();
    for arg_pair in inner {
        let mut arg_inner = arg_pair.into_inner();
        let value = rules::fetch_next_pair(&mut arg_inner, &location, ISSUER)?;
        let arg = match value.as_rule() {
            Rule::colon => Argument::Colon,
            Rule::slice_range => {
                let bounds = value
                    .into_inner()
                    .map(|p| p.as_str().parse::<usize>().unwrap_or(0))
                    .collect::<Vec<_>>();
                Argument::Range(bounds.first().copied().unwrap_or(0), bounds.get(1).copied().unwrap_or(0))
            }
            _ => Argument::Expr(parse_expression_rule(value, base)?),
        };
        args.push(arg);
    }

    classify_application(name, args).ok_or_else(|| {
        Box::new(crate::ast::err::SyntaxError::with(
            Level::Error,
            "Slice arguments must be integer literals, ':' or 'first:last'.".into(),
            ISSUER.into(),
            Some(location),
            Some(span),
        )) as Box<dyn FunkyErrorExt>
    })
}

/// Decide what an application denotes. Returns `None` when slice syntax is
/// mixed with arguments that cannot index a matrix.
fn classify_application(name: String, args: Vec<Argument>) -> Option<Expression> {
    if let Some(kind) = Constructor::from_name(&name) {
        let dims = args.iter().map(Argument::as_integer).collect::<Option<Vec<_>>>();
        match dims.as_deref() {
            Some([n]) => return Some(Expression::Construct { kind, rows: *n, cols: *n }),
            Some([rows, cols]) => return Some(Expression::Construct { kind, rows: *rows, cols: *cols }),
            _ => {}
        }
    }

    if let [first, second] = args.as_slice() {
        match (first, second) {
            (Argument::Colon, Argument::Colon) => {
                return Some(Expression::SubSlice { base: name, rows: SliceRange::All, cols: SliceRange::All });
            }
            (Argument::Colon, col) if col.as_integer().is_some() => {
                return Some(Expression::ColSlice { base: name, col: col.as_integer()? });
            }
            (row, Argument::Colon) if row.as_integer().is_some() => {
                return Some(Expression::RowSlice { base: name, row: row.as_integer()? });
            }
            (row, col) => {
                if let (Some(r), Some(c)) = (row.as_integer(), col.as_integer()) {
                    return Some(Expression::Index { base: name, row: r, col: c });
                }
                let has_slice = matches!(row, Argument::Colon | Argument::Range(..))
                    || matches!(col, Argument::Colon | Argument::Range(..));
                if has_slice {
                    return Some(Expression::SubSlice {
                        base: name,
                        rows: row.as_slice_range()?,
                        cols: col.as_slice_range()?,
                    });
                }
            }
        }
    }

    let mut call_args = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Argument::Expr(expr) => call_args.push(expr),
            Argument::Colon | Argument::Range(..) => return None,
        }
    }
    Some(Expression::Call { name, args: call_args })
}
