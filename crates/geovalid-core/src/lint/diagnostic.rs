use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A structural problem found by the linter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    /// JSON pointer to the offending member
    pub path: String,
    /// Line of `path` in the canonical rendering of the document
    pub line: Option<usize>,
    /// Index of the feature the problem was found in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<usize>,
}

/// Every occurrence of one diagnostic message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub paths: Vec<String>,
    pub lines: Vec<Option<usize>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<usize>,
}

/// Diagnostics grouped by message, in order of first occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    entries: Vec<(String, DiagnosticRecord)>,
}

impl LintReport {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut report = LintReport::default();
        for diagnostic in diagnostics {
            report.push(diagnostic);
        }
        report
    }

    fn push(&mut self, diagnostic: &Diagnostic) {
        let position = self.entries.iter().position(|(message, _)| *message == diagnostic.message);
        let record = match position {
            Some(i) => &mut self.entries[i].1,
            None => {
                self.entries.push((diagnostic.message.clone(), DiagnosticRecord::default()));
                let last = self.entries.len() - 1;
                &mut self.entries[last].1
            }
        };
        record.paths.push(diagnostic.path.clone());
        record.lines.push(diagnostic.line);
        if let Some(feature) = diagnostic.feature {
            record.features.push(feature);
        }
    }

    pub fn get(&self, message: &str) -> Option<&DiagnosticRecord> {
        self.entries.iter().find(|(m, _)| m == message).map(|(_, record)| record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DiagnosticRecord)> {
        self.entries.iter().map(|(m, record)| (m.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for LintReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (message, record) in &self.entries {
            map.serialize_entry(message, record)?;
        }
        map.end()
    }
}
