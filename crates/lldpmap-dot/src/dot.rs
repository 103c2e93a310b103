//! DOT format utilities.

use std::fmt::Write;

/// Escape special characters for quoted DOT strings.
pub fn escape_label(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Quote an arbitrary string as a DOT identifier.
pub fn quote_id(input: &str) -> String {
    format!("\"{}\"", escape_label(input))
}

/// Write indentation to output.
pub fn write_indent(output: &mut String, level: usize) {
    for _ in 0..level {
        output.push_str("  ");
    }
}

fn write_attrs(output: &mut String, attrs: &[(&str, String)]) {
    output.push('[');
    for (i, (key, value)) in attrs.iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        let _ = write!(output, "{}=\"{}\"", key, escape_label(value));
    }
    output.push(']');
}

/// Builder for undirected DOT documents.
///
/// Node ids are always quoted, so system names with dots, dashes or spaces
/// can be used as-is.
pub struct DotBuilder {
    output: String,
    indent: usize,
}

impl DotBuilder {
    /// Start an undirected graph with the given name.
    pub fn new(name: &str) -> Self {
        let mut output = String::with_capacity(4096);
        let _ = writeln!(output, "graph {} {{", quote_id(name));
        Self { output, indent: 1 }
    }

    /// Add a graph attribute.
    pub fn attr(&mut self, key: &str, value: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "{}=\"{}\";", key, escape_label(value));
        self
    }

    /// Default attributes for every node.
    pub fn node_defaults(&mut self, attrs: &[(&str, String)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        self.output.push_str("node ");
        write_attrs(&mut self.output, attrs);
        self.output.push_str(";\n");
        self
    }

    /// Add a blank line for readability.
    pub fn blank(&mut self) -> &mut Self {
        self.output.push('\n');
        self
    }

    pub fn node(&mut self, id: &str, attrs: &[(&str, String)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        self.output.push_str(&quote_id(id));
        if !attrs.is_empty() {
            self.output.push(' ');
            write_attrs(&mut self.output, attrs);
        }
        self.output.push_str(";\n");
        self
    }

    pub fn edge(&mut self, from: &str, to: &str, attrs: &[(&str, String)]) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = write!(self.output, "{} -- {}", quote_id(from), quote_id(to));
        if !attrs.is_empty() {
            self.output.push(' ');
            write_attrs(&mut self.output, attrs);
        }
        self.output.push_str(";\n");
        self
    }

    /// Finish building and return the DOT string.
    pub fn build(mut self) -> String {
        self.output.push_str("}\n");
        self.output
    }
}
