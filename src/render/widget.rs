//! Block-level custom tags.
//!
//! A widget is written as a capitalized HTML-like tag on its own:
//!
//! ```text
//! <Callout kind="warning" title="Careful" />
//! <YouTube id="dQw4w9WgXcQ" autoplay />
//! <Figure caption="Layout">Optional inner text</Figure>
//! ```
//!
//! Quoted attributes become string props, bare attributes become `true`,
//! and inner text (if any) becomes the `children` prop. Whether the tag is
//! a widget at all is decided by the renderer's registry.

use serde_json::{Map, Value};

/// Parse a single custom tag into its name and props.
///
/// Returns `None` unless the whole input is one self-closing tag or one
/// open/close pair with the same name.
pub fn parse_widget(html: &str) -> Option<(String, Map<String, Value>)> {
    let rest = html.trim().strip_prefix('<')?;
    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
        .unwrap_or(rest.len());
    let name = &rest[..name_len];
    if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let (props, tail) = parse_attributes(&rest[name_len..])?;
    let mut props = props;
    if let Some(after) = tail.strip_prefix("/>") {
        return after.trim().is_empty().then(|| (name.to_string(), props));
    }

    let body = tail.strip_prefix('>')?;
    let closing = format!("</{name}>");
    let inner = body.trim_end().strip_suffix(closing.as_str())?;
    let inner = inner.trim();
    if !inner.is_empty() {
        props.insert("children".to_string(), Value::String(inner.to_string()));
    }
    Some((name.to_string(), props))
}

/// Parse attributes up to `>` or `/>`, returning them and the unparsed tail.
fn parse_attributes(mut input: &str) -> Option<(Map<String, Value>, &str)> {
    let mut props = Map::new();
    loop {
        input = input.trim_start();
        if input.is_empty() {
            return None;
        }
        if input.starts_with("/>") || input.starts_with('>') {
            return Some((props, input));
        }

        let key_len = input
            .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/'))
            .unwrap_or(input.len());
        if key_len == 0 {
            return None;
        }
        let key = &input[..key_len];
        input = input[key_len..].trim_start();

        let Some(after_eq) = input.strip_prefix('=') else {
            props.insert(key.to_string(), Value::Bool(true));
            continue;
        };
        let after_eq = after_eq.trim_start();
        let quote = after_eq.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value_start = &after_eq[1..];
        let end = value_start.find(quote)?;
        props.insert(
            key.to_string(),
            Value::String(value_start[..end].to_string()),
        );
        input = &value_start[end + 1..];
    }
}
