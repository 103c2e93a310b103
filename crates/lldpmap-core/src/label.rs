//! Node label templates.
//!
//! Templates use shell-style placeholders: `$model` or `${model}` are
//! replaced with the inventory attribute of that name, `$$` is a literal
//! dollar sign. The reserved `${hostname}` is the device's display name.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use lldpmap_error::{Error, Result};

/// Placeholder bound to the device's display name rather than the inventory.
pub const HOSTNAME_TOKEN: &str = "hostname";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:(?P<escaped>\$)|\{(?P<braced>[A-Za-z_][A-Za-z0-9_]*)\}|(?P<named>[A-Za-z_][A-Za-z0-9_]*)|(?P<invalid>))")
        .expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Token(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTemplate {
    segments: Vec<Segment>,
}

impl LabelTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            text.push_str(&template[last..whole.start()]);
            last = whole.end();

            if caps.name("escaped").is_some() {
                text.push('$');
            } else if let Some(token) = caps.name("braced").or_else(|| caps.name("named")) {
                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Token(token.as_str().to_string()));
            } else {
                return Err(Error::config_invalid(format!(
                    "invalid placeholder in label template at byte {}",
                    whole.start()
                ))
                .with_context("template", template));
            }
        }

        text.push_str(&template[last..]);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Ok(Self { segments })
    }

    /// Names of all placeholders, in template order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Token(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Render the label. Unknown placeholders expand to nothing.
    pub fn render(&self, display_name: &str, inventory: &BTreeMap<String, String>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Token(name) if name == HOSTNAME_TOKEN => out.push_str(display_name),
                Segment::Token(name) => {
                    if let Some(value) = inventory.get(name) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }
}
