use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
};

use super::{Error, MxCandidateList, MxRecord, MxResolver, MxStatus};

/// Lookup MX records for `domain` using the system resolver.
///
/// The domain is normalized via IDNA before querying DNS. The resulting
/// [`MxStatus`] lists the records by ascending preference; records sharing
/// a preference keep the order the resolver returned them in.
pub fn check_mx(domain: &str) -> Result<MxStatus, Error> {
    let ascii = normalize_domain(domain)?;
    let resolver = Resolver::from_system_conf().map_err(Error::resolver_init)?;
    resolve_with(&resolver, &ascii)
}

pub(crate) fn resolve_with<R>(resolver: &R, ascii_domain: &str) -> Result<MxStatus, Error>
where
    R: LookupMx,
{
    let records = resolver
        .lookup_mx(ascii_domain)
        .map_err(|err| Error::lookup(ascii_domain, err))?;
    Ok(MxStatus::from_lookup(records))
}

/// Trimmed, trailing dot removed, IDNA-converted: the form every lookup
/// and the implicit-MX fallback use.
pub fn normalize_domain(domain: &str) -> Result<String, Error> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(Error::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(|err| Error::idna(trimmed, err))
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

/// Raw MX lookup, split out so the resolver can be stubbed.
pub trait LookupMx {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = match Resolver::mx_lookup(self, domain) {
            Ok(lookup) => lookup,
            Err(err) if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }
}

/// [`MxResolver`] backed by DNS MX lookups.
///
/// Lookup failures are not fatal: the candidate list degrades to the
/// bare domain, which is then tried through its A/AAAA records.
pub struct DnsMxResolver<L = Resolver> {
    lookup: L,
}

impl DnsMxResolver<Resolver> {
    pub fn from_system_conf() -> Result<Self, Error> {
        let resolver = Resolver::from_system_conf().map_err(Error::resolver_init)?;
        Ok(Self { lookup: resolver })
    }
}

impl<L: LookupMx> DnsMxResolver<L> {
    pub fn with_lookup(lookup: L) -> Self {
        Self { lookup }
    }
}

impl<L: LookupMx> MxResolver for DnsMxResolver<L> {
    fn resolve(&self, domain: &str) -> MxCandidateList {
        let ascii = match normalize_domain(domain) {
            Ok(ascii) => ascii,
            Err(_err) => {
                #[cfg(feature = "with-tracing")]
                tracing::debug!(domain, error = %_err, "domain not normalisable, using it verbatim");
                return MxCandidateList::fallback_only(domain);
            }
        };
        match resolve_with(&self.lookup, &ascii) {
            Ok(status) => MxCandidateList::from_records(&ascii, status.records()),
            Err(_err) => {
                #[cfg(feature = "with-tracing")]
                tracing::warn!(domain = %ascii, error = %_err, "MX lookup failed, falling back to the domain");
                MxCandidateList::fallback_only(&ascii)
            }
        }
    }
}
