use anyhow::{Context, Result, bail};

use crate::args::Cli;
use mailprobe_lib::{ProbeOutcome, ProbeReport};

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
pub struct OutputRow {
    pub exists: bool,
    #[cfg_attr(feature = "with-serde", serde(flatten))]
    pub report: ProbeReport,
}

impl OutputRow {
    pub fn new(report: ProbeReport) -> Self {
        Self {
            exists: report.exists(),
            report,
        }
    }
}

pub fn write_reports(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => write_human(rows, cli),
        "json" => write_json(rows, cli),
        "ndjson" => write_ndjson(rows, cli),
        "csv" => write_csv(rows, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn any_missing(rows: &[OutputRow]) -> bool {
    rows.iter().any(|row| !row.exists)
}

pub fn human_line(row: &OutputRow) -> String {
    let tag = if row.exists { "[EXISTS] " } else { "[UNKNOWN]" };
    format!("{tag} {} :: {}", row.report.email, row.report.outcome)
}

fn write_human(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    let text = render_human(rows, cli.transcript);
    if let Some(path) = &cli.out {
        write_all_atomically(path, text.as_bytes())?;
    } else {
        print!("{text}");
    }
    Ok(())
}

pub fn render_human(rows: &[OutputRow], transcript: bool) -> String {
    let mut text = String::new();
    for row in rows {
        text.push_str(&human_line(row));
        text.push('\n');
        if transcript {
            for line in row.report.transcript() {
                text.push_str("          ");
                text.push_str(&line);
                text.push('\n');
            }
        }
    }
    text
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-csv")]
const CSV_HEADER: [&str; 5] = ["email", "exists", "outcome", "rcpt_code", "hosts_tried"];

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[OutputRow], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        let data = wtr.into_inner().context("flush csv buffer")?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv(_: &[OutputRow], _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

#[cfg(feature = "with-csv")]
fn csv_record(row: &OutputRow) -> Vec<String> {
    let report = &row.report;
    vec![
        report.email.clone(),
        row.exists.to_string(),
        outcome_kind(&report.outcome).to_string(),
        report
            .rcpt_code()
            .map(|code| code.to_string())
            .unwrap_or_default(),
        report.hosts_tried().join(";"),
    ]
}

#[cfg(any(feature = "with-csv", test))]
pub fn outcome_kind(outcome: &ProbeOutcome) -> &'static str {
    match outcome {
        ProbeOutcome::InvalidSyntax => "invalid_syntax",
        ProbeOutcome::NoHostReachable => "no_host_reachable",
        ProbeOutcome::Completed { .. } => "completed",
    }
}

pub fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;
    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes).with_context(|| format!("write {tmp}"))?;
        f.sync_all().with_context(|| format!("sync {tmp}"))?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailprobe_lib::StatusCode;

    fn row(outcome: ProbeOutcome) -> OutputRow {
        OutputRow::new(ProbeReport {
            email: "someone@example.com".to_string(),
            outcome,
            attempts: Vec::new(),
        })
    }

    #[test]
    fn human_line_for_accepted_recipient() {
        let row = row(ProbeOutcome::Completed {
            exchange: "mx1.example.com".to_string(),
            rcpt: StatusCode::new(250),
        });
        insta::assert_snapshot!(
            human_line(&row),
            @"[EXISTS]  someone@example.com :: mx1.example.com answered 250 to RCPT TO"
        );
    }

    #[test]
    fn human_line_for_unreachable_domain() {
        let row = row(ProbeOutcome::NoHostReachable);
        assert!(!row.exists);
        insta::assert_snapshot!(
            human_line(&row),
            @"[UNKNOWN] someone@example.com :: no mail server reachable"
        );
    }

    #[test]
    fn human_report_goes_to_out_file() {
        let rows = vec![row(ProbeOutcome::InvalidSyntax)];
        let path =
            std::env::temp_dir().join(format!("mailprobe-human-{}.txt", std::process::id()));
        let path = path.to_str().expect("utf8 temp path").to_string();
        write_all_atomically(&path, render_human(&rows, false).as_bytes()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(
            written,
            "[UNKNOWN] someone@example.com :: invalid address syntax\n"
        );
        assert!(!std::path::Path::new(&format!("{path}.tmp")).exists());
    }

    #[test]
    fn any_missing_flags_negative_rows() {
        let rows = vec![
            row(ProbeOutcome::Completed {
                exchange: "mx".to_string(),
                rcpt: StatusCode::new(451),
            }),
            row(ProbeOutcome::InvalidSyntax),
        ];
        assert!(any_missing(&rows));
        assert!(!any_missing(&rows[..1]));
    }

    #[test]
    fn outcome_kinds_are_stable() {
        assert_eq!(outcome_kind(&ProbeOutcome::InvalidSyntax), "invalid_syntax");
        assert_eq!(
            outcome_kind(&ProbeOutcome::NoHostReachable),
            "no_host_reachable"
        );
    }
}
