//! Minimal placeholder templates
//!
//! `{name}` is replaced by a value, `[...]` is an optional section that is
//! dropped when any placeholder inside it has no value, `\` escapes the next
//! character. A missing placeholder outside of a section renders as nothing.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

/// Render `template` with `values`
pub fn render(template: &str, values: &HashMap<&str, String>) -> String {
    let mut chars = template.chars().peekable();
    render_section(&mut chars, values, false).0
}

/// Render until the end of input or the closing `]` of a nested section.
/// Returns the text and whether every placeholder had a value.
fn render_section(
    chars: &mut Peekable<Chars<'_>>,
    values: &HashMap<&str, String>,
    nested: bool,
) -> (String, bool) {
    let mut out = String::new();
    let mut complete = true;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '[' => {
                let (inner, inner_complete) = render_section(chars, values, true);
                if inner_complete {
                    out.push_str(&inner);
                }
            }
            ']' if nested => return (out, complete),
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }

                if !closed {
                    out.push('{');
                    out.push_str(&name);
                    continue;
                }

                match values.get(name.as_str()) {
                    Some(value) => out.push_str(value),
                    None => complete = false,
                }
            }
            c => out.push(c),
        }
    }

    (out, complete)
}
