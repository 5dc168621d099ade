mod dump;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use funkytrees_core::{CompileOptions, FunkyErrorExt, OutputFormat, Script, compile_script, emit};
use log::{LevelFilter, info};

use dump::DumpStage;
use output::OutputHandler;

/// Compile errors in the program.
const EXIT_COMPILE: u8 = 1;
/// Unreadable input, unwritable output, bad configuration.
const EXIT_IO: u8 = 2;

fn main() -> ExitCode {
    let cli = Command::new("funkytrees")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile matrix assignment programs into Funky Trees setter records");

    let cli = setup_cli(cli);
    let matches = cli.get_matches();
    init_logging(matches.get_count("verbose"));
    run(&matches)
}

/// Sets up the CLI arguments.
fn setup_cli(cli: Command) -> Command {
    cli.arg(
        Arg::new("input")
            .help("The program to compile")
            .required(true)
            .index(1)
            .value_parser(clap::value_parser!(PathBuf)),
    )
    .arg(
        Arg::new("output")
            .help("Where to write the setter records")
            .required(true)
            .index(2)
            .value_parser(clap::value_parser!(PathBuf)),
    )
    .arg(
        Arg::new("format")
            .help("Encoding of the setter records")
            .short('f')
            .long("format")
            .value_parser(["xml", "json"])
            .value_name("FORMAT"),
    )
    .arg(
        Arg::new("dump")
            .help("Print an intermediate stage to stdout")
            .short('d')
            .long("dump")
            .value_parser(DumpStage::NAMES)
            .value_name("STAGE"),
    )
    .arg(
        Arg::new("config")
            .help("JSON file with compile options")
            .short('c')
            .long("config")
            .value_parser(clap::value_parser!(PathBuf))
            .value_name("FILE"),
    )
    .arg(
        Arg::new("strict")
            .help("Treat lines that do not parse as errors")
            .long("strict")
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new("temp-prefix")
            .help("Prefix of generated temporaries")
            .long("temp-prefix")
            .value_name("NAME"),
    )
    .arg(
        Arg::new("verbose")
            .help("Raise the log level (repeatable)")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count),
    )
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn report(diagnostics: &[Box<dyn FunkyErrorExt>], code: u8) -> ExitCode {
    let mut handler = OutputHandler::new(std::io::stderr());
    if let Err(e) = handler.diagnostics(diagnostics) {
        eprintln!("failed to print diagnostics: {}", e);
    }
    ExitCode::from(code)
}

/// Build the compile options: config file first, flags override it.
fn options_from(matches: &ArgMatches) -> Result<CompileOptions, Box<dyn FunkyErrorExt>> {
    let mut options = match matches.get_one::<PathBuf>("config") {
        Some(path) => CompileOptions::load_from_file(path)?,
        None => CompileOptions::default(),
    };
    if matches.get_flag("strict") {
        options.strict = true;
    }
    if let Some(prefix) = matches.get_one::<String>("temp-prefix") {
        options.temp_prefix = prefix.clone();
    }
    if let Some(format) = matches.get_one::<String>("format") {
        // restricted to xml|json by the value parser
        options.format = format.parse::<OutputFormat>().unwrap_or_default();
    }
    options.validate()?;
    Ok(options)
}

fn run(matches: &ArgMatches) -> ExitCode {
    let (Some(input), Some(output)) = (matches.get_one::<PathBuf>("input"), matches.get_one::<PathBuf>("output"))
    else {
        eprintln!("both an input and an output file are required");
        return ExitCode::from(EXIT_IO);
    };

    let options = match options_from(matches) {
        Ok(options) => options,
        Err(e) => return report(&[e], EXIT_IO),
    };

    let script = match Script::new(input.clone()) {
        Ok(script) => script,
        Err(e) => return report(&[e], EXIT_IO),
    };

    let compilation = match compile_script(&script, &options) {
        Ok(compilation) => compilation,
        Err(diagnostics) => return report(&diagnostics, EXIT_COMPILE),
    };

    if let Some(stage) = matches.get_one::<String>("dump").and_then(|s| s.parse::<DumpStage>().ok()) {
        println!("{}", dump::render_stage(&compilation, stage));
    }

    let text = match emit::render(&compilation.setters, options.format) {
        Ok(text) => text,
        Err(e) => return report(&[e], EXIT_IO),
    };
    if let Err(e) = std::fs::write(output, text) {
        eprintln!("error: cannot write {}: {}", output.display(), e);
        return ExitCode::from(EXIT_IO);
    }

    info!("wrote {} setters to {}", compilation.setters.len(), output.display());
    ExitCode::SUCCESS
}
