use funkytrees_core::analyzers::{analyze_acyclic_functions, build_function_table, check_reserved_names};
use funkytrees_core::ast::{Statement, generate_lines_from_source};
use funkytrees_core::{FunctionTable, FunkyErrorExt, Script};

fn build(src: &str) -> (FunctionTable, Vec<Statement>) {
    let script = Script::from_source("t.ft", src);
    build_function_table(generate_lines_from_source(&script))
}

#[test]
fn definitions_are_split_from_residual_statements() {
    let src = r#"
function [o] = f(i)
    o := i + 1
end
x := 1
end
function [p] = g(a)
    p := a * 2
"#;
    let (functions, residual) = build(src);

    assert_eq!(functions.len(), 2);
    let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["f", "g"]);

    let f = functions.lookup("f").expect("f registered");
    assert_eq!(f.outputs, vec!["o"]);
    assert_eq!(f.inputs, vec!["i"]);
    assert_eq!(f.body.len(), 1);
    assert_eq!(f.body[0].to_string(), "o := i+1");

    // unterminated definitions are registered with what they accumulated
    assert_eq!(functions.lookup("g").expect("g registered").body.len(), 1);

    // the stray terminator stays in place
    assert_eq!(residual.len(), 2);
    assert_eq!(residual[0].to_string(), "x := 1");
    assert!(matches!(&residual[1], Statement::Unparsed { text, .. } if text == "end"));
}

#[test]
fn a_new_header_closes_the_open_definition() {
    let src = "function [o] = f(i)\no := i\nfunction [p] = g(a)\np := a\nend\n";
    let (functions, residual) = build(src);

    assert!(residual.is_empty());
    assert_eq!(functions.lookup("f").expect("f").body.len(), 1);
    assert_eq!(functions.lookup("g").expect("g").body.len(), 1);
}

#[test]
fn later_definitions_replace_earlier_ones() {
    let src = "function [o] = f(i)\no := i\nend\nfunction [o] = f(i)\no := i * 3\nend\n";
    let (functions, _) = build(src);

    assert_eq!(functions.len(), 1);
    assert_eq!(functions.lookup("f").expect("f").body[0].to_string(), "o := i*3");
}

#[test]
fn mutual_recursion_is_rejected() {
    let src = "function [o] = f(i)\no := g(i)\nend\nfunction [o] = g(i)\n[o] := f(i)\nend\n";
    let (functions, _) = build(src);

    let err = analyze_acyclic_functions(&functions).expect_err("cycle");
    assert!(err.message().contains("f -> g -> f"), "{}", err.message());
}

#[test]
fn self_recursion_is_rejected() {
    let (functions, _) = build("function [o] = f(i)\no := f(i) + 1\nend\n");
    let err = analyze_acyclic_functions(&functions).expect_err("cycle");
    assert!(err.message().contains("f -> f"));
}

#[test]
fn call_chains_without_cycles_pass() {
    let src = "function [o] = f(i)\no := g(i) + h(i)\nend\nfunction [o] = g(i)\no := h(i)\nend\nfunction [o] = h(i)\no := i\nend\n";
    let (functions, _) = build(src);
    assert!(analyze_acyclic_functions(&functions).is_ok());
}

#[test]
fn identifiers_shaped_like_temporaries_are_rejected() {
    let src = "function [o] = f(dummy2)\no := dummy2\nend\nx := dummy7 + 1\ndummy := 3\ndummyx := 4\n";
    let (functions, residual) = build(src);

    let errors = check_reserved_names(&residual, &functions, "dummy").expect_err("reserved names");
    let mut names: Vec<String> = errors.iter().map(|e| e.message()).collect();
    names.sort();
    assert_eq!(errors.len(), 2);
    assert!(names[0].contains("'dummy2'"));
    assert!(names[1].contains("'dummy7'"));

    // another prefix frees the names
    assert!(check_reserved_names(&residual, &functions, "tmp").is_ok());
}
