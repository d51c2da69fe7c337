//! SMTP mailbox existence probing.
//!
//! The entry point is [`Prober::check`]: the address is checked for
//! syntax, its candidate hosts are tried in order under a shared connection
//! budget, and the first host greeting with 220 is walked through
//! `HELO` / `MAIL FROM` / `RCPT TO`. The RCPT TO reply decides the verdict;
//! no message is ever sent.

mod connector;
mod error;
mod options;
mod probe;
mod reply;
mod session;
mod types;

pub use connector::{Connector, TcpConnector};
pub use error::ProbeError;
pub use options::{ProbeOptions, SenderIdentity, TimeoutBudget};
#[cfg(feature = "with-mx")]
pub use probe::check_mailaddress_exists;
pub use probe::Prober;
pub use reply::parse_status_code;
pub use session::SmtpSession;
pub use types::{
    AttemptOutcome, HostAttempt, ProbeOutcome, ProbeReport, SmtpEvent, SmtpReply, Stage,
    StatusCode, classify_rcpt,
};
