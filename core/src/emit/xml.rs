//! XML rendering of setter records, and the `pest` parser reading it back.

use pest::Parser;
use pest_derive::Parser;

use crate::ast::err::SyntaxError;
use crate::ast::{DEFAULT_ACTIVATOR, DEFAULT_PRIORITY};
use crate::error::{FunkyErrorExt, Level};
use crate::location::Location;

use super::Setter;

const ISSUER: &str = "funkytrees.emit.xml";

#[derive(Parser)]
#[grammar = "emit/records.pest"]
pub struct RecordParser;

pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn unescape_attribute(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// `<Variables>` block with one `<Setter .. />` per record.
pub fn render_xml(setters: &[Setter]) -> String {
    let mut out = String::from("<Variables>\n");
    for setter in setters {
        out.push_str(&format!(
            "    <Setter variable=\"{}\" function=\"{}\" activator=\"{}\" priority=\"{}\" />\n",
            escape_attribute(&setter.variable),
            escape_attribute(&setter.function),
            escape_attribute(&setter.activator),
            escape_attribute(&setter.priority),
        ));
    }
    out.push_str("</Variables>\n");
    out
}

pub fn parse_xml(text: &str) -> Result<Vec<Setter>, Box<dyn FunkyErrorExt>> {
    let document = match RecordParser::parse(Rule::document, text) {
        Ok(mut pairs) => pairs.next(),
        Err(e) => {
            let (line, column) = match e.line_col {
                pest::error::LineColLocation::Pos(pos) => pos,
                pest::error::LineColLocation::Span(start, _) => start,
            };
            return Err(Box::new(SyntaxError::with(
                Level::Error,
                format!("Malformed setter records: {}", e.variant.message()),
                ISSUER.into(),
                Some(Location::new("<records>".into(), line, column)),
                None,
            )));
        }
    };

    let mut setters = Vec::new();
    let Some(document) = document else {
        return Ok(setters);
    };
    for setter in document
        .into_inner()
        .flatten()
        .filter(|p| p.as_rule() == Rule::setter)
    {
        let (line, column) = setter.as_span().start_pos().line_col();
        let location = Location::new("<records>".into(), line, column);
        let mut variable = None;
        let mut function = None;
        let mut activator = DEFAULT_ACTIVATOR.to_string();
        let mut priority = DEFAULT_PRIORITY.to_string();

        for attribute in setter.into_inner() {
            let mut parts = attribute.into_inner();
            let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            let value = unescape_attribute(value.as_str());
            match name.as_str() {
                "variable" => variable = Some(value),
                "function" => function = Some(value),
                "activator" => activator = value,
                "priority" => priority = value,
                _ => {}
            }
        }

        match (variable, function) {
            (Some(variable), Some(function)) => setters.push(Setter { variable, function, activator, priority }),
            _ => {
                return Err(Box::new(SyntaxError::with(
                    Level::Error,
                    "Setter record is missing its 'variable' or 'function' attribute".into(),
                    ISSUER.into(),
                    Some(location),
                    None,
                )));
            }
        }
    }
    Ok(setters)
}
