//! file: core/src/ast/stmt.rs
//! description: parsing helpers for source lines.
//!
//! Turns one normalized `SourceLine` into a `Line`. Parsing never fails:
//! a line that matches no form becomes `Statement::Unparsed` and a right-hand
//! side outside the expression grammar becomes `Expression::Verbatim`, so one
//! bad line cannot corrupt its neighbours.
//!
use log::trace;
use pest::Parser;

use crate::{
    ast::{
        Assignment, CallStatement, Expression, FunctionHeader, Line, Rule, RulesParser, SourceLine, Statement,
        DEFAULT_ACTIVATOR, DEFAULT_PRIORITY, rules,
    },
    location::Location,
};

/// Parse a single normalized line.
///
/// # Arguments
///
/// - `source`: the normalized line, carrying its physical position.
/// - `file`: the script name used in locations.
pub fn parse_line(source: &SourceLine, file: &str) -> Line {
    let base = Location::new(file.to_string(), source.number, source.column);
    let unparsed = || {
        Line::Statement(Statement::Unparsed {
            text: source.text.clone(),
            location: Some(base.clone()),
        })
    };

    let item = match RulesParser::parse(Rule::line, &source.text) {
        Ok(mut pairs) => match pairs.next().and_then(|line| line.into_inner().next()) {
            Some(item) => item,
            None => return unparsed(),
        },
        Err(e) => {
            trace!("line {} left unparsed: {}", source.number, e.variant.message());
            return unparsed();
        }
    };

    match item.as_rule() {
        Rule::function_header => Line::FunctionHeader(parse_function_header_rule(item, &base)),
        Rule::function_end => Line::FunctionEnd {
            text: source.text.clone(),
            location: Some(base.clone()),
        },
        Rule::assignment => Line::Statement(parse_assignment_rule(item, &base)),
        Rule::call_statement => match parse_call_statement_rule(item, &base) {
            Some(call) => Line::Statement(call),
            None => unparsed(),
        },
        _ => unparsed(),
    }
}

fn identifiers_in(pair: pest::iterators::Pair<Rule>) -> Vec<String> {
    pair.into_inner()
        .flatten()
        .filter(|p| p.as_rule() == Rule::identifier)
        .map(|p| p.as_str().to_string())
        .collect()
}

fn parse_function_header_rule(pair: pest::iterators::Pair<Rule>, base: &Location) -> FunctionHeader {
    let mut header = FunctionHeader {
        name: String::new(),
        outputs: Vec::new(),
        inputs: Vec::new(),
        location: Some(base.clone()),
    };
    for part in pair.into_inner() {
        match part.as_rule() {
            // Either `[a, b]` or the bare `o` of `function o = f(..)`.
            Rule::output_list => header.outputs = identifiers_in(part),
            Rule::identifier => header.name = part.as_str().to_string(),
            Rule::name_list => header.inputs = identifiers_in(part),
            _ => {}
        }
    }
    header
}

/// Pieces shared by assignments and call statements.
struct Trailer {
    rhs: Option<(String, Location)>,
    activator: String,
    priority: String,
}

fn collect_trailer<'a>(
    pairs: impl Iterator<Item = pest::iterators::Pair<'a, Rule>>,
    base: &Location,
) -> (Vec<pest::iterators::Pair<'a, Rule>>, Trailer) {
    let mut rest = Vec::new();
    let mut trailer = Trailer {
        rhs: None,
        activator: DEFAULT_ACTIVATOR.to_string(),
        priority: DEFAULT_PRIORITY.to_string(),
    };
    for pair in pairs {
        match pair.as_rule() {
            Rule::rhs => {
                let raw = pair.as_str();
                let lead = raw.len() - raw.trim_start().len();
                let location = rules::get_location_from_pair(&pair, base).shifted(lead);
                trailer.rhs = Some((raw.trim().to_string(), location));
            }
            Rule::activator => trailer.activator = pair.as_str().trim().to_string(),
            Rule::priority => trailer.priority = pair.as_str().trim().to_string(),
            _ => rest.push(pair),
        }
    }
    (rest, trailer)
}

fn parse_rhs(text: &str, location: &Location) -> Expression {
    match super::expr::parse_expression_at(text, location) {
        Ok(expr) => expr,
        Err(e) => {
            trace!("right-hand side '{}' kept verbatim: {}", text, e.message());
            Expression::Verbatim { text: text.to_string() }
        }
    }
}

fn parse_assignment_rule(pair: pest::iterators::Pair<Rule>, base: &Location) -> Statement {
    let text = pair.as_str().to_string();
    let (rest, trailer) = collect_trailer(pair.into_inner(), base);
    let target = rest.iter().find(|p| p.as_rule() == Rule::identifier).map(|p| p.as_str().to_string());

    match (target, trailer.rhs) {
        (Some(target), Some((rhs, rhs_location))) => Statement::Assignment(Assignment {
            target,
            value: parse_rhs(&rhs, &rhs_location),
            activator: trailer.activator,
            priority: trailer.priority,
            location: Some(base.clone()),
        }),
        _ => Statement::Unparsed { text, location: Some(base.clone()) },
    }
}

/// `[outs] := name(args)`. Returns `None` when the right-hand side is not an
/// application.
fn parse_call_statement_rule(pair: pest::iterators::Pair<Rule>, base: &Location) -> Option<Statement> {
    let (rest, trailer) = collect_trailer(pair.into_inner(), base);
    let outputs = rest
        .into_iter()
        .find(|p| p.as_rule() == Rule::name_list)
        .map(identifiers_in)
        .unwrap_or_default();
    let (rhs, rhs_location) = trailer.rhs?;
    let (callee, args) = parse_rhs(&rhs, &rhs_location).as_call()?;

    Some(Statement::Call(CallStatement {
        outputs,
        callee,
        args,
        activator: trailer.activator,
        priority: trailer.priority,
        location: Some(base.clone()),
    }))
}
