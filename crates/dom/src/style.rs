//! Inline `style="..."` attribute handling and pixel lengths.
//!
//! The parser is small and resilient: declarations are split on `;`, then on
//! the first `:`. Property names are ASCII-lowercased and invalid items are
//! skipped. Writing a property keeps source order and replaces earlier
//! occurrences, so the serialized attribute never carries duplicates.

/// A single CSS declaration parsed from a style attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name normalized to ASCII lowercase.
    pub property: String,
    /// Raw value trimmed of surrounding ASCII whitespace.
    pub value: String,
}

/// Parse the value of a `style` attribute into a list of declarations.
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    let mut out = Vec::new();
    for raw_item in input.split(';') {
        let item = raw_item.trim_matches(is_ascii_whitespace);
        let Some((raw_prop, raw_value)) = item.split_once(':') else {
            continue;
        };
        let property = raw_prop.trim_matches(is_ascii_whitespace);
        let value = raw_value.trim_matches(is_ascii_whitespace);
        if property.is_empty() || value.is_empty() {
            continue;
        }
        out.push(Declaration {
            property: property.to_ascii_lowercase(),
            value: value.to_owned(),
        });
    }
    out
}

/// Look up the last declared value for `property` in a style attribute.
pub fn style_value(input: &str, property: &str) -> Option<String> {
    parse_style_attribute(input)
        .into_iter()
        .rev()
        .find(|decl| decl.property.eq_ignore_ascii_case(property))
        .map(|decl| decl.value)
}

/// Return a new style attribute with `property` set to `value`.
///
/// The first occurrence keeps its position; later duplicates are dropped.
/// An empty `value` removes the property entirely.
pub fn set_style_value(input: &str, property: &str, value: &str) -> String {
    let property = property.to_ascii_lowercase();
    let value = value.trim_matches(is_ascii_whitespace);
    let mut declarations = Vec::new();
    let mut written = false;
    for decl in parse_style_attribute(input) {
        if decl.property != property {
            declarations.push(decl);
        } else if !written && !value.is_empty() {
            declarations.push(Declaration {
                property: property.clone(),
                value: value.to_owned(),
            });
            written = true;
        }
    }
    if !written && !value.is_empty() {
        declarations.push(Declaration {
            property,
            value: value.to_owned(),
        });
    }
    serialize_declarations(&declarations)
}

/// Serialize declarations back into attribute text (`a: b; c: d;`).
pub fn serialize_declarations(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|decl| format!("{}: {};", decl.property, decl.value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a pixel length (`12px`, `12.5PX`, or unitless `0`).
pub fn parse_px(input: &str) -> Option<f64> {
    let text = input.trim_matches(is_ascii_whitespace);
    if text == "0" {
        return Some(0.0);
    }
    let split = text.len().checked_sub(2)?;
    let (number, unit) = (text.get(..split)?, text.get(split..)?);
    if !unit.eq_ignore_ascii_case("px") {
        return None;
    }
    number.parse::<f64>().ok().filter(|px| px.is_finite())
}

/// Format a pixel length with the shortest round-trip decimal (`100px`, `366.3px`).
pub fn format_px(value: f64) -> String {
    format!("{value}px")
}

/// ASCII whitespace per CSS Syntax (TAB, LF, FF, CR, SPACE).
const fn is_ascii_whitespace(character: char) -> bool {
    matches!(
        character,
        '\u{0009}' | '\u{000A}' | '\u{000C}' | '\u{000D}' | '\u{0020}'
    )
}
