mod common;

use common::TextCompiler;
use graphql_envelope::{parse, ErrorKind, ParserOptions, Value, ValueMap};

fn parse_variables(variables_json: &str) -> graphql_envelope::Result<ValueMap> {
    let payload = format!(r#"{{"query":"{{a}}","variables":{variables_json}}}"#);
    let mut results = parse(payload.as_bytes(), &ParserOptions::default(), &TextCompiler)?;
    Ok(results.remove(0).variables.unwrap())
}

#[rstest::rstest]
fn decodes_every_scalar_shape() {
    let variables =
        parse_variables(r#"{"t":true,"f":false,"n":null,"i":7,"neg":-7,"d":0.25,"s":"str"}"#)
            .unwrap();
    assert_eq!(variables.get("t"), Some(&Value::Bool(true)));
    assert_eq!(variables.get("f"), Some(&Value::Bool(false)));
    assert_eq!(variables.get("n"), Some(&Value::Null));
    assert_eq!(variables.get("i"), Some(&Value::Int(7)));
    assert_eq!(variables.get("neg"), Some(&Value::Int(-7)));
    assert_eq!(variables.get("s"), Some(&Value::String("str".into())));

    let Some(Value::Float(decimal)) = variables.get("d") else {
        panic!("expected a float");
    };
    assert_eq!(decimal.as_str(), "0.25");
}

#[rstest::rstest]
fn float_text_survives_decoding_verbatim() {
    let variables = parse_variables(r#"{"precise":0.10000000000000000555}"#).unwrap();
    let Some(Value::Float(decimal)) = variables.get("precise") else {
        panic!("expected a float");
    };
    assert_eq!(decimal.as_str(), "0.10000000000000000555");
}

#[rstest::rstest]
fn preserves_object_key_order() {
    let variables = parse_variables(r#"{"z":1,"a":2,"m":3}"#).unwrap();
    let keys: Vec<&str> = variables.keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[rstest::rstest]
fn lists_allow_mixed_shapes_and_duplicates() {
    let variables = parse_variables(r#"{"l":[1,1,"x",[true],{"k":null}]}"#).unwrap();
    let list = variables.get("l").unwrap().as_array().unwrap();
    assert_eq!(list.len(), 5);
    assert_eq!(list[0], list[1]);
    assert_eq!(list[3].as_array().unwrap()[0], Value::Bool(true));
    assert!(list[4].get("k").unwrap().is_null());
}

#[rstest::rstest]
fn integer_bounds_are_respected() {
    let variables = parse_variables(r#"{"max":9223372036854775807,"min":-9223372036854775808}"#)
        .unwrap();
    assert_eq!(variables.get("max"), Some(&Value::Int(i64::MAX)));
    assert_eq!(variables.get("min"), Some(&Value::Int(i64::MIN)));
}

#[rstest::rstest]
fn integer_overflow_is_rejected() {
    let err = parse_variables(r#"{"big":9223372036854775808}"#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedNumber);
}

#[rstest::rstest]
#[case(r#"{"bad":1e}"#)]
#[case(r#"{"bad":1.}"#)]
#[case(r#"{"bad":-}"#)]
fn malformed_literals_are_rejected(#[case] variables_json: &str) {
    let err = parse_variables(variables_json).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedNumber);
}

#[rstest::rstest]
fn unknown_bare_name_is_rejected() {
    let err = parse_variables(r#"{"bad":truthy}"#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert!(err.message.contains("truthy"));
}

#[rstest::rstest]
fn keywords_are_case_sensitive() {
    let err = parse_variables(r#"{"bad":True}"#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[rstest::rstest]
fn nested_duplicate_keys_are_rejected() {
    let err = parse_variables(r#"{"outer":{"x":1,"x":2}}"#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateKey);
}

#[rstest::rstest]
fn escaped_keys_are_decoded_before_duplicate_checks() {
    // `x\/y` and `x/y` decode to the same key.
    let err = parse_variables(r#"{"x\/y":1,"x/y":2}"#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateKey);
}

#[rstest::rstest]
fn nesting_depth_is_bounded() {
    let options = ParserOptions::default().with_max_nesting_depth(4);
    let payload = br#"{"query":"{a}","variables":{"a":[[[[1]]]]}}"#;
    let err = parse(payload, &options, &TextCompiler).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert!(err.message.contains("nesting"));

    let payload = br#"{"query":"{a}","variables":{"a":[[[1]]]}}"#;
    assert!(parse(payload, &options, &TextCompiler).is_ok());
}
