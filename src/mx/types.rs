/// One MX answer: lower `preference` is tried first.
///
/// `exchange` is stored without its trailing dot.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Outcome of an MX lookup, before the implicit-MX fallback is appended.
///
/// `NoRecords` is an answer, not a failure: the domain itself then becomes
/// the only candidate.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MxStatus {
    Records(Vec<MxRecord>),
    NoRecords,
}

impl MxStatus {
    /// Orders and deduplicates raw lookup answers, see [`by_preference`].
    pub fn from_lookup(records: Vec<MxRecord>) -> Self {
        let records = by_preference(records);
        if records.is_empty() {
            Self::NoRecords
        } else {
            Self::Records(records)
        }
    }

    pub fn records(&self) -> &[MxRecord] {
        match self {
            Self::Records(records) => records.as_slice(),
            Self::NoRecords => &[],
        }
    }
}

/// Stable sort on preference (ties keep lookup order), trailing dots
/// stripped, empty and repeated exchanges dropped. Repeats are compared
/// case-insensitively; the first spelling wins.
pub(crate) fn by_preference(records: impl IntoIterator<Item = MxRecord>) -> Vec<MxRecord> {
    let mut sorted: Vec<MxRecord> = records.into_iter().collect();
    sorted.sort_by_key(|record| record.preference);

    let mut unique: Vec<MxRecord> = Vec::with_capacity(sorted.len());
    for mut record in sorted {
        let trimmed = record.exchange.trim_end_matches('.').len();
        record.exchange.truncate(trimmed);
        if record.exchange.is_empty() || same_host_listed(&unique, &record.exchange) {
            continue;
        }
        unique.push(record);
    }
    unique
}

fn same_host_listed(records: &[MxRecord], exchange: &str) -> bool {
    records
        .iter()
        .any(|known| known.exchange.eq_ignore_ascii_case(exchange))
}
