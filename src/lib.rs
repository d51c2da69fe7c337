#![forbid(unsafe_code)]
//! mailprobe_lib: does this mailbox probably exist? Asked over SMTP,
//! without sending anything.

pub mod validator;
pub use validator::{
    EmailAddress, EmailError, SyntaxCheck, ValidationMode, ValidationReport, is_valid,
    validate_email,
};

pub mod mx;
#[cfg(feature = "with-mx")]
pub use mx::{DnsMxResolver, Error as MxError, check_mx, normalize_domain};
pub use mx::{FallbackOnly, MxCandidateList, MxRecord, MxResolver, MxStatus};

pub mod smtp_verify;
#[cfg(feature = "with-mx")]
pub use smtp_verify::check_mailaddress_exists;
pub use smtp_verify::{
    AttemptOutcome, Connector, HostAttempt, ProbeError, ProbeOptions, ProbeOutcome, ProbeReport,
    Prober, SenderIdentity, SmtpEvent, StatusCode, TcpConnector, TimeoutBudget, classify_rcpt,
};
