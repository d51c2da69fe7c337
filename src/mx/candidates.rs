use std::slice;

use super::MxRecord;
use super::types::by_preference;

/// Hosts to try, in order: MX exchanges by ascending preference, then the
/// bare domain as a last resort (implicit MX).
///
/// Never empty: every constructor ends with the fallback.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxCandidateList {
    hosts: Vec<String>,
}

impl MxCandidateList {
    pub fn fallback_only(domain: &str) -> Self {
        Self::from_records(domain, &[])
    }

    /// Orders `records` by preference (ties keep their lookup order), drops
    /// repeated exchanges and appends `domain` unless it is already listed.
    pub fn from_records(domain: &str, records: &[MxRecord]) -> Self {
        let mut hosts: Vec<String> = by_preference(records.iter().cloned())
            .into_iter()
            .map(|record| record.exchange)
            .collect();

        let fallback = domain.trim().trim_end_matches('.');
        if !hosts.iter().any(|known| known.eq_ignore_ascii_case(fallback)) {
            hosts.push(fallback.to_string());
        }
        Self { hosts }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, String> {
        self.hosts.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.hosts
    }

    /// The bare-domain entry, always last.
    pub fn fallback(&self) -> &str {
        self.hosts.last().map(String::as_str).unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a MxCandidateList {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Source of candidate hosts for a domain.
///
/// Implementations swallow lookup failures: the result always holds at
/// least the fallback entry.
pub trait MxResolver {
    fn resolve(&self, domain: &str) -> MxCandidateList;
}

impl<T: MxResolver + ?Sized> MxResolver for &T {
    fn resolve(&self, domain: &str) -> MxCandidateList {
        (**self).resolve(domain)
    }
}

/// Resolver that never queries DNS and only yields the bare domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackOnly;

impl MxResolver for FallbackOnly {
    fn resolve(&self, domain: &str) -> MxCandidateList {
        MxCandidateList::fallback_only(domain)
    }
}
