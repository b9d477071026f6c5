use anyhow::{bail, Context};
use colored::Colorize;
use rowdelta_diff::{diff_row_sets, RowChange, RowSet};
use rowdelta_sdk::HarnessConfig;
use rowdelta_types::{Column, DataSet};
use rowdelta_verify::{Delta, MismatchReport, VerifyError};

use crate::cli::*;
use crate::snapshot;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let config = match &cli.config {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    match cli.command {
        Command::Diff(args) => cmd_diff(args, format),
        Command::Verify(args) => cmd_verify(args, format, &config),
        Command::Show(args) => cmd_show(args, format),
    }
}

fn load_pair(old: &std::path::Path, new: &std::path::Path) -> anyhow::Result<(DataSet, DataSet)> {
    let old = snapshot::load(old)?;
    let new = snapshot::load(new)?;
    if old.columns() != new.columns() {
        bail!(
            "snapshots have different columns: [{}] vs [{}]",
            names(old.columns()),
            names(new.columns())
        );
    }
    Ok((old, new))
}

/// Claim files must name the same columns as the snapshots they describe.
fn load_claims(path: &std::path::Path, expected: Option<&[Column]>) -> anyhow::Result<DataSet> {
    let claims = snapshot::load(path)?;
    if claims.columns() != expected {
        bail!(
            "{} has different columns than the snapshots: [{}] vs [{}]",
            path.display(),
            names(claims.columns()),
            names(expected)
        );
    }
    Ok(claims)
}

fn names(columns: Option<&[Column]>) -> String {
    columns
        .unwrap_or_default()
        .iter()
        .map(Column::name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (old, new) = load_pair(&args.old, &args.new)?;
    let diff = diff_row_sets(&RowSet::from(&old), &RowSet::from(&new))?;

    match format {
        OutputFormat::Json => {
            let changes: Vec<_> = diff
                .changes()
                .iter()
                .map(|c| match c {
                    RowChange::Removed { row, count } => serde_json::json!({
                        "change": "removed", "row": row.to_json(), "count": count,
                    }),
                    RowChange::Added { row, count } => serde_json::json!({
                        "change": "added", "row": row.to_json(), "count": count,
                    }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&changes)?);
        }
        OutputFormat::Text => {
            if diff.is_empty() {
                println!("No changes.");
                return Ok(());
            }
            for change in diff.changes() {
                match change {
                    RowChange::Removed { row, count } => {
                        println!("{} {row}{}", "-".red().bold(), times(count))
                    }
                    RowChange::Added { row, count } => {
                        println!("{} {row}{}", "+".green().bold(), times(count))
                    }
                }
            }
            println!(
                "{} removed, {} added",
                diff.removals().to_string().red(),
                diff.additions().to_string().green()
            );
        }
    }
    Ok(())
}

fn times(count: usize) -> String {
    if count > 1 {
        format!(" (x{count})").dimmed().to_string()
    } else {
        String::new()
    }
}

fn cmd_verify(args: VerifyArgs, format: OutputFormat, config: &HarnessConfig) -> anyhow::Result<()> {
    let (old, new) = load_pair(&args.old, &args.new)?;
    let columns = old.columns().map(<[Column]>::to_vec).unwrap_or_default();

    let mut delta = Delta::new(&RowSet::from(&old), &RowSet::from(&new))?.with_columns(columns);
    delta.set_error_log(config.build_log()?);

    // An empty claim file means "nothing on this side", not an empty declaration.
    if let Some(path) = &args.removed {
        let claims = load_claims(path, old.columns())?;
        if !claims.is_empty() {
            delta.before(&claims)?;
        }
    }
    if let Some(path) = &args.added {
        let claims = load_claims(path, old.columns())?;
        if !claims.is_empty() {
            delta.after(&claims)?;
        }
    }

    match delta.end() {
        Ok(summary) => {
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "ok": true, "removed": summary.removed, "added": summary.added,
                    })
                ),
                OutputFormat::Text => println!(
                    "{} Delta verified: {} removed, {} added",
                    "✓".green().bold(),
                    summary.removed,
                    summary.added
                ),
            }
            Ok(())
        }
        Err(VerifyError::Assertion(e)) => {
            print_report(e.report(), format)?;
            bail!("delta verification failed")
        }
        Err(e) => Err(e.into()),
    }
}

fn print_report(report: &MismatchReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let mut json = report.to_json();
            json["ok"] = serde_json::Value::Bool(false);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("{} {} mismatched row(s)", "✗".red().bold(), report.len());
            let sides = [("REMOVED", &report.removed), ("ADDED", &report.added)];
            for (title, group) in sides {
                if group.is_empty() {
                    continue;
                }
                println!("{}", title.bold());
                for row in &group.unclaimed {
                    println!("  {} {row}", "unclaimed  ".yellow());
                }
                for row in &group.unsatisfied {
                    println!("  {} {row}", "unsatisfied".red());
                }
            }
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let data = snapshot::load(&args.file)?;
    let set = RowSet::from(&data);
    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = set
                .iter()
                .map(|(row, count)| {
                    serde_json::json!({
                        "row": row.to_json(),
                        "count": count,
                        "fingerprint": row.fingerprint_hex(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            println!("Columns: {}", names(data.columns()).cyan());
            for (row, count) in set.iter() {
                println!("  {} {row}{}", row.fingerprint_hex().dimmed(), times(count));
            }
            println!("{} row(s), {} distinct", set.len(), set.distinct());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn fixtures() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let old = write(&dir, "old.json", r#"{"columns": ["k", "v"], "rows": [["x", 1], ["y", 2]]}"#);
        let new = write(&dir, "new.json", r#"{"columns": ["k", "v"], "rows": [["x", 1], ["y", 3]]}"#);
        (dir, old, new)
    }

    #[test]
    fn verify_accepts_exact_claims() {
        let (dir, old, new) = fixtures();
        let removed = write(&dir, "rm.json", r#"{"columns": ["k", "v"], "rows": [["y", 2]]}"#);
        let added = write(&dir, "add.json", r#"{"columns": ["k", "v"], "rows": [["y", 3]]}"#);
        let args = VerifyArgs { old, new, removed: Some(removed), added: Some(added) };
        cmd_verify(args, OutputFormat::Text, &HarnessConfig::default()).unwrap();
    }

    #[test]
    fn verify_fails_on_missing_claims() {
        let (_dir, old, new) = fixtures();
        let args = VerifyArgs { old, new, removed: None, added: None };
        let err = cmd_verify(args, OutputFormat::Json, &HarnessConfig::default()).unwrap_err();
        assert!(err.to_string().contains("verification failed"));
    }

    #[test]
    fn verify_writes_configured_log() {
        let (dir, old, new) = fixtures();
        let log = dir.path().join("errors.log");
        let config = HarnessConfig {
            error_log: Some(rowdelta_sdk::LogTarget::File { path: log.clone() }),
            ..Default::default()
        };
        let args = VerifyArgs { old, new, removed: None, added: None };
        assert!(cmd_verify(args, OutputFormat::Text, &config).is_err());
        assert!(std::fs::read_to_string(log).unwrap().contains("REMOVED"));
    }

    #[test]
    fn verify_rejects_claims_with_other_columns() {
        let (dir, old, new) = fixtures();
        let removed = write(&dir, "rm.json", r#"{"columns": ["k", "w"], "rows": [["y", 2]]}"#);
        let added = write(&dir, "add.json", r#"{"columns": ["k", "v"], "rows": [["y", 3]]}"#);
        let args = VerifyArgs { old, new, removed: Some(removed), added: Some(added) };
        let err = cmd_verify(args, OutputFormat::Text, &HarnessConfig::default()).unwrap_err();
        assert!(err.to_string().contains("different columns"), "{err}");
    }

    #[test]
    fn diff_rejects_column_mismatch() {
        let (dir, old, _) = fixtures();
        let other = write(&dir, "other.json", r#"{"columns": ["k"], "rows": []}"#);
        let args = DiffArgs { old, new: other };
        assert!(cmd_diff(args, OutputFormat::Text).is_err());
    }

    #[test]
    fn diff_and_show_succeed() {
        let (_dir, old, new) = fixtures();
        cmd_diff(DiffArgs { old: old.clone(), new }, OutputFormat::Json).unwrap();
        cmd_show(ShowArgs { file: old }, OutputFormat::Text).unwrap();
    }
}
