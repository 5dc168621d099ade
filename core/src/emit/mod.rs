//! Record emitter: scalar assignments to setter records and their textual
//! encodings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ast::err::SyntaxError;
use crate::error::{FunkyErrorExt, Level};
use crate::ir::ScalarProgram;

pub mod xml;

pub use xml::{RecordParser, parse_xml, render_xml};

/// One declarative assignment record of the rule engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Setter {
    pub variable: String,
    pub function: String,
    pub activator: String,
    pub priority: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(OutputFormat::Xml),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}' (expected xml or json)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Xml => write!(f, "xml"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// One setter per scalar assignment, in program order.
pub fn emit_setters(program: &ScalarProgram) -> Vec<Setter> {
    program
        .iter()
        .map(|a| Setter {
            variable: a.target.clone(),
            function: a.value.to_string(),
            activator: a.activator.clone(),
            priority: a.priority.clone(),
        })
        .collect()
}

pub fn render_json(setters: &[Setter]) -> Result<String, Box<dyn FunkyErrorExt>> {
    serde_json::to_string_pretty(setters).map_err(|e| {
        Box::new(SyntaxError::with(
            Level::Error,
            format!("Could not encode setter records: {}", e),
            "funkytrees.emit.json".into(),
            None,
            None,
        )) as Box<dyn FunkyErrorExt>
    })
}

pub fn parse_json(text: &str) -> Result<Vec<Setter>, Box<dyn FunkyErrorExt>> {
    serde_json::from_str(text).map_err(|e| {
        Box::new(SyntaxError::with(
            Level::Error,
            format!("Malformed setter records: {}", e),
            "funkytrees.emit.json".into(),
            Some(crate::location::Location::new("<records>".into(), e.line(), e.column())),
            None,
        )) as Box<dyn FunkyErrorExt>
    })
}

/// Render `setters` in `format`.
pub fn render(setters: &[Setter], format: OutputFormat) -> Result<String, Box<dyn FunkyErrorExt>> {
    match format {
        OutputFormat::Xml => Ok(render_xml(setters)),
        OutputFormat::Json => render_json(setters).map(|mut text| {
            text.push('\n');
            text
        }),
    }
}

/// Read setters back from either rendering.
pub fn parse(text: &str, format: OutputFormat) -> Result<Vec<Setter>, Box<dyn FunkyErrorExt>> {
    match format {
        OutputFormat::Xml => parse_xml(text),
        OutputFormat::Json => parse_json(text),
    }
}
