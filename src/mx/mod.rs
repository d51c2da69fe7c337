//! Candidate mail-exchange hosts for a domain.
//!
//! [`MxCandidateList`] and the [`MxResolver`] seam are always available;
//! the DNS-backed pieces ([`check_mx`], [`DnsMxResolver`]) need the
//! `with-mx` feature.

mod candidates;
#[cfg(feature = "with-mx")]
mod error;
#[cfg(feature = "with-mx")]
mod resolver;
mod types;

pub use candidates::{FallbackOnly, MxCandidateList, MxResolver};
#[cfg(feature = "with-mx")]
pub use error::MxError as Error;
#[cfg(feature = "with-mx")]
pub use resolver::{DnsMxResolver, LookupMx, check_mx, normalize_domain};
pub use types::{MxRecord, MxStatus};
