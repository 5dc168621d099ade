//! Printable views of the intermediate pipeline stages (`--dump`).

use std::fmt;
use std::str::FromStr;

use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use funkytrees_core::ast::{Line, Statement};
use funkytrees_core::Compilation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpStage {
    Lines,
    Functions,
    Inlined,
    Decomposed,
    Shapes,
    Scalar,
}

impl DumpStage {
    pub const NAMES: [&'static str; 6] = ["lines", "functions", "inlined", "decomposed", "shapes", "scalar"];
}

impl FromStr for DumpStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lines" => Ok(DumpStage::Lines),
            "functions" => Ok(DumpStage::Functions),
            "inlined" => Ok(DumpStage::Inlined),
            "decomposed" => Ok(DumpStage::Decomposed),
            "shapes" => Ok(DumpStage::Shapes),
            "scalar" => Ok(DumpStage::Scalar),
            other => Err(format!("unknown dump stage '{}'", other)),
        }
    }
}

impl fmt::Display for DumpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DumpStage::Lines => "lines",
            DumpStage::Functions => "functions",
            DumpStage::Inlined => "inlined",
            DumpStage::Decomposed => "decomposed",
            DumpStage::Shapes => "shapes",
            DumpStage::Scalar => "scalar",
        };
        write!(f, "{}", name)
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_header(header);
    table
}

fn location_cell(statement: &Statement) -> String {
    statement.location().map(|l| format!("{}:{}", l.line, l.column)).unwrap_or_default()
}

fn statements_table(statements: &[Statement]) -> Table {
    let mut table = new_table(vec!["#", "statement", "source"]);
    for (i, statement) in statements.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), statement.to_string(), location_cell(statement)]);
    }
    table
}

/// Render `stage` of a finished compilation.
pub fn render_stage(compilation: &Compilation, stage: DumpStage) -> String {
    match stage {
        DumpStage::Lines => {
            let mut table = new_table(vec!["line", "kind", "text"]);
            for line in &compilation.lines {
                let (kind, text, location) = match line {
                    Line::FunctionHeader(header) => ("function", header.to_string(), header.location.as_ref()),
                    Line::FunctionEnd { text, location } => ("end", text.clone(), location.as_ref()),
                    Line::Statement(statement) => {
                        let kind = match statement {
                            Statement::Assignment(_) => "assignment",
                            Statement::Call(_) => "call",
                            Statement::Unparsed { .. } => "unparsed",
                        };
                        (kind, statement.to_string(), statement.location())
                    }
                };
                let number = location.map(|l| l.line.to_string()).unwrap_or_default();
                table.add_row(vec![number, kind.to_string(), text]);
            }
            table.to_string()
        }
        DumpStage::Functions => {
            let mut table = new_table(vec!["function", "outputs", "inputs", "statements"]);
            for def in compilation.functions.iter() {
                table.add_row(vec![
                    def.name.clone(),
                    def.outputs.join(", "),
                    def.inputs.join(", "),
                    def.body.len().to_string(),
                ]);
            }
            table.to_string()
        }
        DumpStage::Inlined => statements_table(&compilation.inlined).to_string(),
        DumpStage::Decomposed => statements_table(&compilation.decomposed).to_string(),
        DumpStage::Shapes => {
            let mut table = new_table(vec!["variable", "rows", "cols"]);
            for (name, shape) in compilation.shapes.iter() {
                table.add_row(vec![name.clone(), shape.rows.to_string(), shape.cols.to_string()]);
            }
            table.to_string()
        }
        DumpStage::Scalar => compilation.program.to_string(),
    }
}
