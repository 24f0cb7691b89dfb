//! Property-based tests for the template engine using proptest.

use proptest::prelude::*;
use serde_json::json;
use standout_mustache::{compile, escape_html, render, Value};

// Text that can never contain a tag opener.
fn plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,;:!?\n\t<>&'\"}-]{0,80}".prop_filter("no open delimiter", |s| !s.contains("{{"))
}

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

proptest! {
    /// Source without tags renders unchanged.
    #[test]
    fn tag_free_text_is_verbatim(text in plain_text()) {
        prop_assert_eq!(render(&text, &[]).unwrap(), text);
    }

    /// Rendering is a pure function of template and context.
    #[test]
    fn rendering_is_deterministic(
        before in plain_text(),
        key in name(),
        value in "[ -~]{0,20}",
        after in plain_text(),
    ) {
        let template = compile(&format!("{before}{{{{{key}}}}}{after}")).unwrap();
        let ctx = [Value::from(json!({ key.clone(): value.clone() }))];
        let first = template.render(&ctx).unwrap();
        prop_assert_eq!(&first, &template.render(&ctx).unwrap());
        prop_assert_eq!(first, format!("{before}{}{after}", escape_html(&value)));
    }

    /// Triple braces never escape.
    #[test]
    fn raw_variable_is_identity(key in name(), value in "[ -~]{0,30}") {
        let ctx = [Value::from(json!({ key.clone(): value.clone() }))];
        prop_assert_eq!(render(&format!("{{{{{{{key}}}}}}}"), &ctx).unwrap(), value);
    }

    /// A list section repeats its body once per item.
    #[test]
    fn section_repeats_per_item(items in prop::collection::vec("[a-z]{1,5}", 0..10)) {
        let ctx = [Value::from(json!({ "items": items.clone() }))];
        let out = render("{{#items}}[{{.}}]{{/items}}", &ctx).unwrap();
        let expected: String = items.iter().map(|item| format!("[{item}]")).collect();
        prop_assert_eq!(out, expected);
    }

    /// Exactly one of a section and its inverse renders.
    #[test]
    fn section_and_inverse_are_exclusive(flag in any::<bool>(), n in any::<i64>()) {
        let ctx = [Value::from(json!({ "flag": flag, "n": n }))];
        let out = render("{{#flag}}A{{/flag}}{{^flag}}B{{/flag}}{{#n}}C{{/n}}{{^n}}D{{/n}}", &ctx).unwrap();
        let expected = format!(
            "{}{}",
            if flag { "A" } else { "B" },
            if n != 0 { "C" } else { "D" }
        );
        prop_assert_eq!(out, expected);
    }

    /// Escaped output never contains raw markup characters.
    #[test]
    fn escaped_output_has_no_markup(value in "\\PC{0,40}") {
        let ctx = [Value::from(json!({ "v": value }))];
        let out = render("{{v}}", &ctx).unwrap();
        prop_assert!(!out.contains('<'));
        prop_assert!(!out.contains('>'));
        prop_assert!(!out.contains('"'));
        prop_assert!(!out.contains('\''));
    }
}
