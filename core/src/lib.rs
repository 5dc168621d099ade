pub mod analyzers;
pub mod ast;
pub mod emit;
pub mod error;
pub mod ir;
pub mod location;
pub mod options;
pub mod script;

pub use analyzers::{FunctionTable, ShapeTable, VariableShape, analyze_acyclic_functions, build_function_table};
pub use ast::{Line, RulesParser, Statement, generate_lines_from_source};
pub use emit::{OutputFormat, Setter, emit_setters};
pub use error::{Diagnostics, FunkyErrorExt, Level};
pub use ir::{LoweringContext, ScalarProgram};
pub use location::{Location, Span};
pub use options::CompileOptions;
pub use script::Script;

use log::{debug, info};

use crate::ast::Expression;
use crate::ast::err::SyntaxError;

pub fn generate_error_report<E: FunkyErrorExt + ?Sized>(error: &E) -> String {
    let level = error.level();
    let location = match error.location() {
        Some(loc) => loc.to_string(),
        None => "unknown location".to_string(),
    };
    let message = error.message();

    format!("FUNKYTREES | {} | {} | {}", level, location, message)
}

/// Output of every pipeline stage of one successful compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub lines: Vec<Line>,
    pub functions: FunctionTable,
    pub residual: Vec<Statement>,
    pub inlined: Vec<Statement>,
    pub decomposed: Vec<Statement>,
    /// Shapes of the matrices live at the end of the program.
    pub shapes: ShapeTable,
    pub program: ScalarProgram,
    pub setters: Vec<Setter>,
}

/// Run the whole pipeline on `script`. Any error fails the compilation;
/// nothing partial is returned.
pub fn compile_script(script: &Script, options: &CompileOptions) -> Result<Compilation, Diagnostics> {
    options.validate().map_err(|e| vec![e])?;

    let lines = generate_lines_from_source(script);
    debug!("{}: {} significant lines", script.name, lines.len());

    let (functions, residual) = build_function_table(lines.clone());
    debug!("{} functions, {} residual statements", functions.len(), residual.len());

    if options.strict {
        check_strict(&functions, &residual)?;
    }
    analyze_acyclic_functions(&functions).map_err(|e| vec![e])?;
    analyzers::check_reserved_names(&residual, &functions, &options.temp_prefix)?;

    let mut ctx = LoweringContext::new(&options.temp_prefix);
    let inlined = ir::inline_calls(residual.clone(), &functions, &mut ctx)?;
    let decomposed = ir::decompose_statements(inlined.clone(), &mut ctx);
    let expanded = ir::expand_matrices(decomposed.clone(), &mut ctx)?;
    let program = ScalarProgram::from_statements(expanded);
    let setters = emit_setters(&program);

    info!(
        "{}: {} setters ({} temporaries)",
        script.name,
        setters.len(),
        ctx.next_temp()
    );

    Ok(Compilation {
        lines,
        functions,
        residual,
        inlined,
        decomposed,
        shapes: ctx.shapes,
        program,
        setters,
    })
}

/// Strict mode: every line must parse, right-hand sides included.
fn check_strict(functions: &FunctionTable, residual: &[Statement]) -> Result<(), Diagnostics> {
    let mut errors: Diagnostics = Vec::new();
    let bodies = functions.iter().flat_map(|f| f.body.iter());
    for statement in bodies.chain(residual.iter()) {
        let message = match statement {
            Statement::Unparsed { text, .. } => format!("Line does not match any statement form: '{}'", text),
            Statement::Assignment(a) => match &a.value {
                Expression::Verbatim { text } => format!("Cannot parse right-hand side '{}'", text),
                _ => continue,
            },
            Statement::Call(_) => continue,
        };
        errors.push(Box::new(SyntaxError::with(
            Level::Error,
            message,
            "funkytrees.strict".to_string(),
            statement.location().cloned(),
            None,
        )));
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
