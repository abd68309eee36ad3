mod common;

use common::TextCompiler;
use graphql_envelope::{parse, ErrorKind, ParserOptions};

fn parse_batch(payload: &[u8]) -> graphql_envelope::Result<Vec<graphql_envelope::RequestResult<String>>> {
    parse(payload, &ParserOptions::default(), &TextCompiler)
}

#[rstest::rstest]
fn batch_preserves_input_order() {
    let results = parse_batch(br#"[{"query":"{a}"},{"query":"{b}"}]"#).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(*results[0].document, "{a}");
    assert_eq!(*results[1].document, "{b}");
}

#[rstest::rstest]
fn empty_batch_yields_empty_list() {
    let results = parse_batch(b"[]").unwrap();
    assert!(results.is_empty());
}

#[rstest::rstest]
fn single_element_batch() {
    let results = parse_batch(br#"[{"query":"{ solo }","operationName":"Solo"}]"#).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].operation_name.as_deref(), Some("Solo"));
}

#[rstest::rstest]
fn larger_batch_keeps_every_envelope_distinct() {
    let payload: String = {
        let envelopes: Vec<String> = (0..8)
            .map(|idx| format!(r#"{{"query":"{{ field{idx} }}"}}"#))
            .collect();
        format!("[{}]", envelopes.join(","))
    };
    let results = parse_batch(payload.as_bytes()).unwrap();
    assert_eq!(results.len(), 8);
    for (idx, request) in results.iter().enumerate() {
        assert_eq!(*request.document, format!("{{ field{idx} }}"));
    }
}

#[rstest::rstest]
fn one_malformed_element_fails_the_whole_batch() {
    let err = parse_batch(br#"[{"query":"{a}"},{"bogus":1}]"#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnrecognizedField);
}

#[rstest::rstest]
fn missing_query_in_second_element_fails_the_batch() {
    let err = parse_batch(br#"[{"query":"{a}"},{}]"#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingQuery);
}

#[rstest::rstest]
fn non_object_batch_element_is_a_syntax_error() {
    let err = parse_batch(br#"[{"query":"{a}"},42]"#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[rstest::rstest]
fn unterminated_batch_is_a_syntax_error() {
    let err = parse_batch(br#"[{"query":"{a}"}"#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert!(err.message.contains("end of input"));
}
