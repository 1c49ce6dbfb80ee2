use super::*;
use proptest::prelude::*;

/// Key or value text the writer can emit without escaping.
fn text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 _#./{}-]{0,8}").unwrap()
}

fn node() -> impl Strategy<Value = KeyValue> {
    let leaf = (text(), text()).prop_map(|(k, v)| KeyValue::leaf(k, v));
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            (text(), text()).prop_map(|(k, v)| KeyValue::leaf(k, v)),
            (text(), prop::collection::vec(inner, 0..4))
                .prop_map(|(k, children)| KeyValue::block(k, children)),
        ]
    })
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::vec(node(), 0..4).prop_map(Document::new)
}

fn whitespace() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ \t\r\n]{0,3}").unwrap()
}

/// The document as a flat token list, every string quoted.
fn tokens(nodes: &[KeyValue], out: &mut Vec<String>) {
    for kv in nodes {
        out.push(format!("\"{}\"", kv.key));
        match &kv.payload {
            Payload::Value(value) => out.push(format!("\"{}\"", value)),
            Payload::Block(children) => {
                out.push("{".to_string());
                tokens(children, out);
                out.push("}".to_string());
            }
        }
    }
}

/// A document and a rendering of it with arbitrary whitespace between tokens.
fn spaced_document() -> impl Strategy<Value = (Document, String)> {
    document().prop_flat_map(|doc| {
        let mut toks = Vec::new();
        tokens(&doc.entries, &mut toks);
        let gaps = prop::collection::vec(whitespace(), toks.len() + 1);
        (Just(doc), gaps).prop_map(|(doc, gaps)| {
            let mut toks = Vec::new();
            tokens(&doc.entries, &mut toks);
            let mut source = String::new();
            for (gap, tok) in gaps.iter().zip(&toks) {
                source.push_str(gap);
                source.push_str(tok);
            }
            if let Some(last) = gaps.last() {
                source.push_str(last);
            }
            (doc, source)
        })
    })
}

fn escape(s: &str) -> String {
    let mut out = String::new();
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

proptest! {
    /// Serialized output parses back to the same tree.
    #[test]
    fn serialized_documents_read_back(doc in document()) {
        let text = doc.to_string();
        let reparsed = parse_str(&text);
        prop_assert!(reparsed.is_ok(), "failed to parse:\n{}\n{:?}", text, reparsed);
        prop_assert_eq!(reparsed.unwrap(), doc, "source:\n{}", text);
    }

    /// Whitespace between tokens never changes the tree.
    #[test]
    fn whitespace_between_tokens_is_insignificant((doc, source) in spaced_document()) {
        let parsed = parse_with(source.as_bytes(), &ParseOptions::new().inline(), None);
        prop_assert!(parsed.is_ok(), "failed to parse {:?}: {:?}", source, parsed);
        prop_assert_eq!(parsed.unwrap(), doc, "source: {:?}", source);
    }

    /// Escaped quoted values decode to the original text.
    #[test]
    fn escaped_values_decode(value in "[a-z\"\\\\\n\t ]{0,16}") {
        let source = format!("\"k\" \"{}\"", escape(&value));
        let doc = parse_str(&source);
        prop_assert!(doc.is_ok(), "failed to parse {:?}: {:?}", source, doc);
        let doc = doc.unwrap();
        prop_assert_eq!(doc.root().and_then(|kv| kv.value()), Some(value.as_str()));
    }

    /// Arbitrary bytes either parse or fail cleanly, the same way in both pipelines.
    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let inline = parse_with(&bytes[..], &ParseOptions::new().inline(), None);
        let threaded = parse_with(&bytes[..], &ParseOptions::new().threaded(2), None);
        match (inline, threaded) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => {
                prop_assert_eq!(a.kind, b.kind);
                prop_assert_eq!(a.position, b.position);
            }
            (a, b) => prop_assert!(false, "pipelines disagree: {:?} vs {:?}", a, b),
        }
    }
}
