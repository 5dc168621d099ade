use pest_derive::Parser;

use crate::error::{FunkyErrorExt, Level};
use crate::location::{Location, Span};

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct RulesParser;

pub(crate) fn fetch_next_pair<'a>(
    pairs: &mut pest::iterators::Pairs<'a, Rule>,
    location: &Location,
    issuer: &str,
) -> Result<pest::iterators::Pair<'a, Rule>, Box<dyn FunkyErrorExt>> {
    match pairs.next() {
        Some(pair) => Ok(pair),
        None => Err(Box::new(super::err::SyntaxError::with(
            Level::Error,
            "Expected more inner pairs but found none.".into(),
            issuer.into(),
            Some(location.clone()),
            None,
        ))),
    }
}

/// Location of `pair` given the location of the first character of the
/// text it was parsed from.
pub fn get_location_from_pair(pair: &pest::iterators::Pair<Rule>, base: &Location) -> Location {
    base.shifted(pair.as_span().start())
}

pub fn get_span_from_pair(pair: &pest::iterators::Pair<Rule>, base: &Location) -> Span {
    let span = pair.as_span();
    Span::new(base.shifted(span.start()), base.shifted(span.end()))
}

/// Convert a pest failure into a diagnostic anchored at `base`.
pub(crate) fn syntax_error_from_pest(
    error: pest::error::Error<Rule>,
    base: &Location,
    issuer: &str,
) -> Box<dyn FunkyErrorExt> {
    let offset = match error.location {
        pest::error::InputLocation::Pos(pos) => pos,
        pest::error::InputLocation::Span((start, _)) => start,
    };
    Box::new(super::err::SyntaxError::with(
        Level::Error,
        error.variant.message().to_string(),
        issuer.into(),
        Some(base.shifted(offset)),
        None,
    ))
}
