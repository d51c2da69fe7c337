use anyhow::{Context, Result};
use mailprobe_lib::{MxCandidateList, MxStatus, check_mx, normalize_domain};

/// Prints the MX records of `domain` and the order in which hosts would be
/// tried, implicit fallback included.
pub fn run(domain: &str) -> Result<()> {
    let ascii = normalize_domain(domain).with_context(|| format!("invalid domain '{domain}'"))?;
    let status = check_mx(&ascii).with_context(|| format!("MX lookup for '{domain}'"))?;
    for line in describe(&ascii, &status) {
        println!("{line}");
    }
    Ok(())
}

/// `ascii_domain` must already be normalized, as the prober sees it.
pub fn describe(ascii_domain: &str, status: &MxStatus) -> Vec<String> {
    let mut lines = Vec::new();
    match status {
        MxStatus::Records(records) => {
            for r in records {
                lines.push(format!("MX {:>5} {}", r.preference, r.exchange));
            }
        }
        MxStatus::NoRecords => lines.push("no MX records".to_string()),
    }
    let candidates = MxCandidateList::from_records(ascii_domain, status.records());
    for (i, host) in candidates.iter().enumerate() {
        lines.push(format!("try {} {host}", i + 1));
    }
    lines
}
