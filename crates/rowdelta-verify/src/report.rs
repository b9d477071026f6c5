//! Diagnostic payload of a failed delta check.

use std::fmt;

use rowdelta_types::{Column, Row};
use serde::{Deserialize, Serialize};

/// Mismatches on one side of a delta (removed or added).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchGroup {
    /// Actual changes that no declaration accounted for, one entry per
    /// occurrence.
    pub unclaimed: Vec<Row>,
    /// Declared rows that matched no actual change, in declaration order.
    pub unsatisfied: Vec<Row>,
}

impl MismatchGroup {
    pub fn is_empty(&self) -> bool {
        self.unclaimed.is_empty() && self.unsatisfied.is_empty()
    }

    pub fn len(&self) -> usize {
        self.unclaimed.len() + self.unsatisfied.len()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "unclaimed": self.unclaimed.iter().map(Row::to_json).collect::<Vec<_>>(),
            "unsatisfied": self.unsatisfied.iter().map(Row::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Everything a failed `end()` knows about the disagreement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchReport {
    /// Column descriptors of the observed source; empty when unknown.
    pub columns: Vec<Column>,
    /// Rows in the old snapshot.
    pub removed: MismatchGroup,
    /// Rows in the new snapshot.
    pub added: MismatchGroup,
}

impl MismatchReport {
    /// Returns `true` when claims and changes agree.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Total number of mismatched rows.
    pub fn len(&self) -> usize {
        self.removed.len() + self.added.len()
    }

    /// Plain JSON rendering with scalar column values, one array per row.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "columns": self.columns.iter().map(Column::name).collect::<Vec<_>>(),
            "removed": self.removed.to_json(),
            "added": self.added.to_json(),
        })
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, label: &str, rows: &[Row]) -> fmt::Result {
    writeln!(f, "  {label} ({}):", rows.len())?;
    for row in rows {
        writeln!(f, "    {row}")?;
    }
    Ok(())
}

fn write_group(f: &mut fmt::Formatter<'_>, title: &str, group: &MismatchGroup) -> fmt::Result {
    writeln!(f, "{title}")?;
    write_rows(f, "unclaimed", &group.unclaimed)?;
    write_rows(f, "unsatisfied", &group.unsatisfied)
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delta assertion failed: {} mismatched row(s)", self.len())?;
        if !self.columns.is_empty() {
            let names: Vec<&str> = self.columns.iter().map(Column::name).collect();
            write!(f, " [columns: {}]", names.join(", "))?;
        }
        writeln!(f)?;
        write_group(f, "REMOVED", &self.removed)?;
        write_group(f, "ADDED", &self.added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowdelta_types::{columns, row};

    fn sample() -> MismatchReport {
        MismatchReport {
            columns: columns(["name", "n"]),
            removed: MismatchGroup {
                unclaimed: vec![row!["b", 2]],
                unsatisfied: vec![],
            },
            added: MismatchGroup {
                unclaimed: vec![row!["b", 3]],
                unsatisfied: vec![row!["z", 0]],
            },
        }
    }

    #[test]
    fn empty_report() {
        assert!(MismatchReport::default().is_empty());
        assert_eq!(MismatchReport::default().len(), 0);
    }

    #[test]
    fn display_groups_sections() {
        let text = sample().to_string();
        assert!(text.starts_with("delta assertion failed: 3 mismatched row(s) [columns: name, n]"));
        let removed_at = text.find("REMOVED").unwrap();
        let added_at = text.find("ADDED").unwrap();
        assert!(removed_at < added_at);
        assert!(text.contains("    [\"b\", 2]"));
        assert!(text.contains("  unsatisfied (1):\n    [\"z\", 0]"));
    }

    #[test]
    fn json_uses_plain_scalars() {
        let json = sample().to_json();
        assert_eq!(json["columns"], serde_json::json!(["name", "n"]));
        assert_eq!(json["removed"]["unclaimed"], serde_json::json!([["b", 2]]));
        assert_eq!(json["added"]["unsatisfied"], serde_json::json!([["z", 0]]));
    }
}
