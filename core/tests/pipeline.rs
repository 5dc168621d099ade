use std::io::Write;

use funkytrees_core::{
    CompileOptions, FunkyErrorExt, OutputFormat, ScalarProgram, Script, VariableShape, build_function_table,
    compile_script, emit, generate_error_report, generate_lines_from_source,
};

const ROTATION: &str = r#"
% rotate a 2-vector and scale it
function [out] = rotate(R, v)
    out := R * v
end

R := eye(2)
v := ones(2,1)
w := rotate(R, v)
s := w(2,1) * 3 $ Gear = 1 @ 2
"#;

fn compile(src: &str) -> funkytrees_core::Compilation {
    compile_script(&Script::from_source("main.ft", src), &CompileOptions::default()).expect("compiles")
}

#[test]
fn end_to_end_produces_setters() {
    let compilation = compile(ROTATION);
    let variables: Vec<&str> = compilation.setters.iter().map(|s| s.variable.as_str()).collect();

    assert_eq!(
        variables,
        vec!["R11", "R12", "R21", "R22", "v11", "v21", "w11", "w21", "dummy0", "s"]
    );
    assert_eq!(compilation.setters[6].function, "R11*v11+R12*v21");
    assert_eq!(compilation.setters[8].function, "w21");
    let last = &compilation.setters[9];
    assert_eq!((last.function.as_str(), last.activator.as_str(), last.priority.as_str()), ("dummy0*3", "Gear = 1", "2"));

    assert_eq!(compilation.shapes.lookup("w"), Some(&VariableShape::matrix(2, 1)));
    let shapes = serde_json::to_value(&compilation.shapes).expect("serializes");
    assert_eq!(shapes["w"]["rows"], 2);
    assert_eq!(shapes.as_object().map(|o| o.len()), Some(3));
    assert_eq!(compilation.functions.len(), 1);
    assert_eq!(compilation.program.len(), compilation.setters.len());
}

#[test]
fn every_setter_is_a_single_line_record() {
    let compilation = compile(ROTATION);
    let xml = emit::render(&compilation.setters, OutputFormat::Xml).expect("renders");

    assert_eq!(xml.lines().count(), compilation.setters.len() + 2);
    assert_eq!(emit::parse(&xml, OutputFormat::Xml).expect("parses"), compilation.setters);
}

#[test]
fn unparsed_lines_are_dropped_unless_strict() {
    let src = "x := 1\nthis is not code\ny := x + 1\n";
    let compilation = compile(src);
    let variables: Vec<&str> = compilation.setters.iter().map(|s| s.variable.as_str()).collect();
    assert_eq!(variables, vec!["x", "y"]);

    let strict = CompileOptions { strict: true, ..CompileOptions::default() };
    let errors = compile_script(&Script::from_source("main.ft", src), &strict).expect_err("strict");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].location().map(|l| l.line), Some(2));
}

#[test]
fn opaque_primitives_become_setters() {
    let src = "[y] := clamp01(x) $ Gear = 1 @ 2\nz := clamp01(x)\nm := max(1,2)\n[p, q] := split(x)\n";
    let compilation = compile(src);
    let records: Vec<(&str, &str, &str, &str)> = compilation
        .setters
        .iter()
        .map(|s| (s.variable.as_str(), s.function.as_str(), s.activator.as_str(), s.priority.as_str()))
        .collect();

    assert_eq!(
        records,
        vec![
            ("y", "clamp01(x)", "Gear = 1", "2"),
            ("z", "clamp01(x)", "1", "0"),
            ("m", "max(1,2)", "1", "0"),
        ]
    );
}

#[test]
fn scalar_program_keeps_single_output_calls() {
    let script = Script::from_source("p.ft", "[y] := clamp01(x) @ 3\n[a, b] := split(x)\n");
    let (_, statements) = build_function_table(generate_lines_from_source(&script));
    let program = ScalarProgram::from_statements(statements);

    assert_eq!(program.len(), 1);
    assert_eq!(program.to_string(), "y := clamp01(x) @ 3\n");
}

#[test]
fn unparseable_right_hand_sides_pass_through_verbatim() {
    let compilation = compile("x := a + \n");
    assert_eq!(compilation.setters[0].function, "a +");

    let strict = CompileOptions { strict: true, ..CompileOptions::default() };
    assert!(compile_script(&Script::from_source("main.ft", "x := a + \n"), &strict).is_err());
}

#[test]
fn error_reports_name_level_location_and_message() {
    let errors = compile_script(
        &Script::from_source("bad.ft", "A := zeros(2,2)\nx := A(3,3)\n"),
        &CompileOptions::default(),
    )
    .expect_err("out of bounds");

    let report = generate_error_report(errors[0].as_ref());
    assert!(report.starts_with("FUNKYTREES | ERROR | bad.ft:2:1 | "), "{}", report);
    assert!(report.contains("outside 'A'"), "{}", report);
}

#[test]
fn recursion_and_reserved_names_fail_before_lowering() {
    let recursive = "function [o] = f(i)\no := f(i)\nend\ny := f(1)\n";
    let errors = compile_script(&Script::from_source("r.ft", recursive), &CompileOptions::default())
        .expect_err("recursive");
    assert!(errors[0].message().contains("f -> f"));

    let reserved = "dummy0 := 1\ny := a*b + c\n";
    let errors = compile_script(&Script::from_source("r.ft", reserved), &CompileOptions::default())
        .expect_err("reserved");
    assert!(errors[0].message().contains("'dummy0'"));

    let renamed = CompileOptions { temp_prefix: "t_".into(), ..CompileOptions::default() };
    let compilation = compile_script(&Script::from_source("r.ft", reserved), &renamed).expect("compiles");
    assert_eq!(compilation.setters[1].variable, "t_0");
}

#[test]
fn options_load_from_json() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, r#"{{ "temp_prefix": "tmp", "strict": true, "format": "json" }}"#).expect("write");

    let options = CompileOptions::load_from_file(file.path()).expect("loads");
    assert_eq!(options.temp_prefix, "tmp");
    assert!(options.strict);
    assert_eq!(options.format, OutputFormat::Json);

    let mut partial = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(partial, r#"{{ "strict": true }}"#).expect("write");
    let options = CompileOptions::load_from_file(partial.path()).expect("loads");
    assert_eq!(options.temp_prefix, "dummy");
}

#[test]
fn invalid_options_are_rejected() {
    let mut unknown = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(unknown, r#"{{ "prefix": "tmp" }}"#).expect("write");
    let err = CompileOptions::load_from_file(unknown.path()).expect_err("unknown field");
    assert!(err.message().starts_with("Invalid config file"), "{}", err.message());

    let bad_prefix = CompileOptions { temp_prefix: "9x".into(), ..CompileOptions::default() };
    assert!(bad_prefix.validate().is_err());
    assert!(compile_script(&Script::from_source("a.ft", "x := 1"), &bad_prefix).is_err());
}
