use funkytrees_core::emit::{self, OutputFormat, Setter, parse_xml, render_xml};
use funkytrees_core::{FunkyErrorExt, Level};

fn setter(variable: &str, function: &str, activator: &str, priority: &str) -> Setter {
    Setter {
        variable: variable.into(),
        function: function.into(),
        activator: activator.into(),
        priority: priority.into(),
    }
}

#[test]
fn xml_layout_is_one_setter_per_line() {
    let setters = vec![setter("A11", "0", "1", "0"), setter("x", "a*b", "Gear = 1", "2")];
    let expected = "<Variables>\n\
                    \x20   <Setter variable=\"A11\" function=\"0\" activator=\"1\" priority=\"0\" />\n\
                    \x20   <Setter variable=\"x\" function=\"a*b\" activator=\"Gear = 1\" priority=\"2\" />\n\
                    </Variables>\n";
    assert_eq!(render_xml(&setters), expected);
}

#[test]
fn special_characters_survive_the_xml_round_trip() {
    let setters = vec![setter("y", "a<b & c>\"d\"", "Throttle > 0 & Gear < 2", "0")];
    let text = render_xml(&setters);

    assert!(text.contains("a&lt;b &amp; c&gt;&quot;d&quot;"), "{}", text);
    assert_eq!(parse_xml(&text).expect("parses"), setters);
}

#[test]
fn json_round_trip() {
    let setters = vec![setter("A11", "1", "1", "0"), setter("A12", "A11*2", "x > 0", "1")];
    let text = emit::render(&setters, OutputFormat::Json).expect("renders");

    assert!(text.ends_with('\n'));
    assert!(text.contains("\"variable\": \"A12\""), "{}", text);
    assert_eq!(emit::parse(&text, OutputFormat::Json).expect("parses"), setters);
}

#[test]
fn empty_documents() {
    assert_eq!(render_xml(&[]), "<Variables>\n</Variables>\n");
    assert!(parse_xml("<Variables>\n</Variables>\n").expect("parses").is_empty());
    assert!(parse_xml("<?xml version=\"1.0\"?>\n<Variables/>").expect("parses").is_empty());
}

#[test]
fn omitted_activator_and_priority_take_defaults() {
    let parsed = parse_xml("<Variables><Setter variable=\"x\" function=\"1\" /></Variables>").expect("parses");
    assert_eq!(parsed, vec![setter("x", "1", "1", "0")]);
}

#[test]
fn malformed_records_are_rejected() {
    let err = parse_xml("<Variables><Setter variable=\"x\" </Variables>").expect_err("malformed");
    assert_eq!(err.level(), Level::Error);
    assert!(err.message().starts_with("Malformed setter records"), "{}", err.message());

    let err = parse_xml("<Variables><Setter variable=\"x\" /></Variables>").expect_err("no function");
    assert!(err.message().contains("'function'"), "{}", err.message());
    assert_eq!(err.location().map(|l| (l.line, l.column)), Some((1, 12)));

    assert!(emit::parse("[{\"variable\": \"x\"}]", OutputFormat::Json).is_err());
}

#[test]
fn output_formats_parse_case_insensitively() {
    assert_eq!("xml".parse::<OutputFormat>(), Ok(OutputFormat::Xml));
    assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
    assert!("yaml".parse::<OutputFormat>().is_err());
    assert_eq!(OutputFormat::default(), OutputFormat::Xml);
    assert_eq!(OutputFormat::Json.to_string(), "json");
}
