use thiserror::Error;

/// Failures of the DNS side. Only [`check_mx`](super::check_mx) and
/// resolver construction return these; candidate resolution swallows them.
#[derive(Debug, Error)]
pub enum MxError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain {domain:?} cannot be converted to ASCII")]
    IdnaConversion {
        domain: String,
        #[source]
        source: idna::Errors,
    },
    #[error("system resolver unavailable: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("MX lookup for {domain} failed: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
}

impl MxError {
    pub(crate) fn idna(domain: &str, source: idna::Errors) -> Self {
        Self::IdnaConversion {
            domain: domain.to_string(),
            source,
        }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(domain: &str, source: trust_dns_resolver::error::ResolveError) -> Self {
        Self::Lookup {
            domain: domain.to_string(),
            source,
        }
    }
}
