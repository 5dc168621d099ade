use funkytrees_core::ast::{
    self, BinaryOperator, Constructor, Expression, Line, SliceRange, SourceLine, Statement, normalize_source,
    parse_expression, parse_line,
};
use funkytrees_core::script::Script;

fn line(text: &str) -> Line {
    parse_line(&SourceLine { number: 1, column: 1, text: text.to_string() }, "t.ft")
}

fn statement(text: &str) -> Statement {
    match line(text) {
        Line::Statement(s) => s,
        other => panic!("expected a statement for '{}', got {:?}", text, other),
    }
}

#[test]
fn normalizer_strips_comments_and_blank_lines() {
    let src = "  x := 1 % trailing\n\n% whole line\n\ty := 2\r\n   \n";
    let lines = normalize_source(src);

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], SourceLine { number: 1, column: 3, text: "x := 1".into() });
    assert_eq!(lines[1], SourceLine { number: 4, column: 2, text: "y := 2".into() });
}

#[test]
fn assignment_carries_activator_and_priority() {
    let Statement::Assignment(a) = statement("x := a*b + 1 $ Throttle > 0 @ 2") else {
        panic!("not an assignment");
    };
    assert_eq!(a.target, "x");
    assert_eq!(a.value.to_string(), "a*b+1");
    assert_eq!(a.activator, "Throttle > 0");
    assert_eq!(a.priority, "2");
    assert_eq!(a.to_string(), "x := a*b+1 $ Throttle > 0 @ 2");
}

#[test]
fn assignment_defaults_to_always_active() {
    let Statement::Assignment(a) = statement("y := 3") else {
        panic!("not an assignment");
    };
    assert_eq!(a.activator, "1");
    assert_eq!(a.priority, "0");
    assert_eq!(a.to_string(), "y := 3");
}

#[test]
fn function_headers_and_terminators() {
    match line("function [a, b] = f(x, y)") {
        Line::FunctionHeader(h) => {
            assert_eq!(h.name, "f");
            assert_eq!(h.outputs, vec!["a", "b"]);
            assert_eq!(h.inputs, vec!["x", "y"]);
        }
        other => panic!("expected header, got {:?}", other),
    }
    match line("function o = g(i)") {
        Line::FunctionHeader(h) => {
            assert_eq!(h.name, "g");
            assert_eq!(h.outputs, vec!["o"]);
            assert_eq!(h.inputs, vec!["i"]);
        }
        other => panic!("expected header, got {:?}", other),
    }
    assert!(matches!(line("end"), Line::FunctionEnd { .. }));
    assert!(matches!(line("endfunction"), Line::FunctionEnd { .. }));
}

#[test]
fn keywords_need_a_word_boundary() {
    assert!(matches!(statement("functionality := 3"), Statement::Assignment(_)));
    let Statement::Assignment(a) = statement("end := 3") else {
        panic!("not an assignment");
    };
    assert_eq!(a.target, "end");
}

#[test]
fn call_statements() {
    let Statement::Call(c) = statement("[p, q] := f(x, 2)") else {
        panic!("not a call");
    };
    assert_eq!(c.outputs, vec!["p", "q"]);
    assert_eq!(c.callee, "f");
    assert_eq!(c.args, vec![Expression::identifier("x"), Expression::number("2")]);

    // an output list needs an application on the right
    assert!(matches!(statement("[p] := 3"), Statement::Unparsed { .. }));
}

#[test]
fn unparseable_input_is_kept() {
    match statement("this is not code") {
        Statement::Unparsed { text, .. } => assert_eq!(text, "this is not code"),
        other => panic!("expected unparsed, got {:?}", other),
    }
    let Statement::Assignment(a) = statement("x := a + ") else {
        panic!("not an assignment");
    };
    assert_eq!(a.value, Expression::Verbatim { text: "a +".into() });
}

#[test]
fn applications_are_classified() {
    let cases = [
        ("A(2,3)", Expression::Index { base: "A".into(), row: 2, col: 3 }),
        ("A(1,:)", Expression::RowSlice { base: "A".into(), row: 1 }),
        ("A(:,2)", Expression::ColSlice { base: "A".into(), col: 2 }),
        (
            "A(1:2,2:3)",
            Expression::SubSlice { base: "A".into(), rows: SliceRange::Span(1, 2), cols: SliceRange::Span(2, 3) },
        ),
        ("A(:,:)", Expression::SubSlice { base: "A".into(), rows: SliceRange::All, cols: SliceRange::All }),
        ("zeros(2,3)", Expression::Construct { kind: Constructor::Zeros, rows: 2, cols: 3 }),
        ("eye(3)", Expression::Construct { kind: Constructor::Eye, rows: 3, cols: 3 }),
    ];
    for (text, expected) in cases {
        assert_eq!(parse_expression(text).expect("parses"), expected, "{}", text);
    }

    match parse_expression("f(x+1, y)").expect("parses") {
        Expression::Call { name, args } => {
            assert_eq!(name, "f");
            assert_eq!(args.len(), 2);
            assert_eq!(args[0].to_string(), "x+1");
        }
        other => panic!("expected call, got {:?}", other),
    }

    assert!(parse_expression("f(x, :)").is_err());
}

#[test]
fn precedence_and_rendering() {
    let e = parse_expression("a + b * c").expect("parses");
    match &e {
        Expression::Binary { op: BinaryOperator::Add, right, .. } => {
            assert!(matches!(right.as_ref(), Expression::Binary { op: BinaryOperator::Mul, .. }));
        }
        other => panic!("unexpected tree {:?}", other),
    }

    let render = |text: &str| parse_expression(text).expect("parses").to_string();
    assert_eq!(render("a*(b+c)"), "a*(b+c)");
    assert_eq!(render("(a+b)+c"), "a+b+c");
    assert_eq!(render("a+(b+c)"), "a+(b+c)");
    assert_eq!(render("2.*A"), "2.*A");
    assert_eq!(render("A(1:2, :)"), "A(1:2,:)");
    assert_eq!(render("1.5 * x"), "1.5*x");
}

#[test]
fn script_lines_keep_physical_positions() {
    let script = Script::from_source("p.ft", "% header\n\nx := 1\n   y := x + 2\n");
    let lines = ast::generate_lines_from_source(&script);
    assert_eq!(lines.len(), 2);

    let Line::Statement(second) = &lines[1] else {
        panic!("expected statement");
    };
    let loc = second.location().expect("location");
    assert_eq!((loc.file.as_str(), loc.line, loc.column), ("p.ft", 4, 4));
}
