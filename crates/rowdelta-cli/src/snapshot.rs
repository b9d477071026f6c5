//! Snapshot files: `{"columns": ["a", "b"], "rows": [[1, "x"], ...]}`.

use std::path::Path;

use anyhow::Context;
use rowdelta_types::{Column, DataSet, Row, Value};
use serde::Deserialize;

#[derive(Deserialize)]
struct SnapshotFile {
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
}

pub fn parse(text: &str) -> anyhow::Result<DataSet> {
    let file: SnapshotFile = serde_json::from_str(text)?;
    let mut data = DataSet::for_columns(file.columns);
    for (i, values) in file.rows.iter().enumerate() {
        let values = values
            .iter()
            .map(Value::from_json)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("row {i}"))?;
        data.push(Row::new(values)).with_context(|| format!("row {i}"))?;
    }
    Ok(data)
}

pub fn load(path: &Path) -> anyhow::Result<DataSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing {}", path.display()))
}
