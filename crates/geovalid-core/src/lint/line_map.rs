//! Line positions for JSON pointer paths
//!
//! Geometry libraries quietly repair documents (closing rings, dropping extra
//! members) before anyone looks at them, so diagnostics are reported against a
//! canonical rendering of the original document instead.

use serde_json::Value;
use std::collections::HashMap;

const INDENT: &str = "  ";

/// Canonical two-space indented text of a document plus the line every
/// JSON pointer path starts on
#[derive(Debug, Clone)]
pub struct LineMap {
    text: String,
    lines: HashMap<String, usize>,
}

impl LineMap {
    /// Render the document and record the 1-based line of every path.
    ///
    /// The root path `""` is always on line 1.
    pub fn build(document: &Value) -> Self {
        let mut renderer = Renderer { text: String::new(), line: 1, lines: HashMap::new() };
        renderer.lines.insert(String::new(), 1);
        renderer.write_value(document, "", 0);
        Self { text: renderer.text, lines: renderer.lines }
    }

    /// Line of a JSON pointer path, or `None` if the path is not in the document
    pub fn line(&self, path: &str) -> Option<usize> {
        self.lines.get(path).copied()
    }

    /// The canonical text the line numbers refer to
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Escape a member name as a JSON pointer reference token (RFC 6901)
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

struct Renderer {
    text: String,
    line: usize,
    lines: HashMap<String, usize>,
}

impl Renderer {
    fn newline(&mut self) {
        self.text.push('\n');
        self.line += 1;
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.text.push_str(INDENT);
        }
    }

    fn write_value(&mut self, value: &Value, path: &str, level: usize) {
        match value {
            Value::Object(map) if !map.is_empty() => {
                self.text.push('{');
                self.newline();
                let count = map.len();
                for (i, (key, member)) in map.iter().enumerate() {
                    let member_path = format!("{}/{}", path, escape_pointer_token(key));
                    self.indent(level + 1);
                    self.lines.insert(member_path.clone(), self.line);
                    self.text.push_str(&Value::String(key.clone()).to_string());
                    self.text.push_str(": ");
                    self.write_value(member, &member_path, level + 1);
                    if i + 1 < count {
                        self.text.push(',');
                    }
                    self.newline();
                }
                self.indent(level);
                self.text.push('}');
            }
            Value::Array(items) if !items.is_empty() => {
                self.text.push('[');
                self.newline();
                let count = items.len();
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}/{}", path, i);
                    self.indent(level + 1);
                    self.lines.insert(item_path.clone(), self.line);
                    self.write_value(item, &item_path, level + 1);
                    if i + 1 < count {
                        self.text.push(',');
                    }
                    self.newline();
                }
                self.indent(level);
                self.text.push(']');
            }
            // Scalars and empty containers stay on the current line
            scalar => self.text.push_str(&scalar.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matches_pretty_printer_layout() {
        let document = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        });
        let map = LineMap::build(&document);
        assert_eq!(map.text(), serde_json::to_string_pretty(&document).unwrap());
    }

    #[test]
    fn test_paths_resolve_to_lines() {
        let document = json!({
            "geometry": {"coordinates": [1, 2], "type": "Point"},
            "properties": null,
            "type": "Feature"
        });
        let map = LineMap::build(&document);

        assert_eq!(map.line(""), Some(1));
        assert_eq!(map.line("/geometry"), Some(2));
        assert_eq!(map.line("/geometry/coordinates"), Some(3));
        assert_eq!(map.line("/geometry/coordinates/0"), Some(4));
        assert_eq!(map.line("/geometry/coordinates/1"), Some(5));
        assert_eq!(map.line("/geometry/type"), Some(7));
        assert_eq!(map.line("/properties"), Some(9));
        assert_eq!(map.line("/type"), Some(10));
    }

    #[test]
    fn test_unknown_path_has_no_line() {
        let map = LineMap::build(&json!({"type": "Point"}));
        assert_eq!(map.line("/coordinates"), None);
        assert_eq!(map.line("/type/0"), None);
    }

    #[test]
    fn test_pointer_escaping() {
        let map = LineMap::build(&json!({"a/b": 1, "c~d": 2}));
        assert_eq!(map.line("/a~1b"), Some(2));
        assert_eq!(map.line("/c~0d"), Some(3));
    }
}
