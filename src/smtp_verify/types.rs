use std::fmt;
use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Three-digit SMTP reply code. Enhanced status codes are not modelled.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize), serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const SERVICE_READY: Self = Self(220);
    pub const OK: Self = Self(250);

    pub fn new(code: u16) -> Option<Self> {
        (100..1000).contains(&code).then_some(Self(code))
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// 450, 451 and 452: mailbox busy, local error, insufficient storage.
    /// Greylisting servers answer with one of these.
    pub fn is_temporary_failure(self) -> bool {
        matches!(self.0, 450..=452)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps the RCPT TO reply onto the "probably exists" verdict.
///
/// 250 and the 450–452 temporary failures count as existing; any other
/// code, or no parseable code at all, does not.
pub fn classify_rcpt(code: Option<StatusCode>) -> bool {
    match code {
        Some(StatusCode::OK) => true,
        Some(code) => code.is_temporary_failure(),
        None => false,
    }
}

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connect,
    Greeting,
    Helo,
    MailFrom,
    RcptTo,
    Rset,
    Quit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Greeting => "greeting",
            Self::Helo => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Rset => "RSET",
            Self::Quit => "QUIT",
        })
    }
}

/// A raw server reply together with its parsed code.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SmtpReply {
    pub code: Option<StatusCode>,
    pub raw: String,
}

impl SmtpReply {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is(&self, code: StatusCode) -> bool {
        self.code == Some(code)
    }
}

/// A recorded transcript event used for diagnostics.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpEvent {
    Sent { stage: Stage, command: String },
    Received { stage: Stage, reply: SmtpReply },
    Error { stage: Stage, message: String },
}

impl fmt::Display for SmtpEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent { command, .. } => write!(f, "C: {command}"),
            Self::Received { stage, reply } => match reply.code {
                Some(_) => write!(f, "S: {}", first_line(&reply.raw)),
                None if reply.raw.is_empty() => write!(f, "S: <no reply to {stage}>"),
                None => write!(f, "S: <unparseable> {}", first_line(&reply.raw)),
            },
            Self::Error { stage, message } => write!(f, "!  {stage}: {message}"),
        }
    }
}

fn first_line(raw: &str) -> &str {
    raw.lines().next().unwrap_or_default().trim_end()
}

/// What happened with a single candidate host.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The TCP connection could not be established.
    Unreachable { message: String },
    /// Connected, but the greeting was not 220.
    GreetingRejected { code: Option<StatusCode> },
    /// The transaction ran; `rcpt` is the RCPT TO reply code.
    Transacted { rcpt: Option<StatusCode> },
}

/// Detailed record of one candidate host interrogation.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAttempt {
    pub exchange: String,
    pub connect_timeout: Option<Duration>,
    pub events: Vec<SmtpEvent>,
    pub outcome: AttemptOutcome,
}

impl HostAttempt {
    pub(crate) fn new(
        exchange: impl Into<String>,
        connect_timeout: Option<Duration>,
        events: Vec<SmtpEvent>,
        outcome: AttemptOutcome,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            connect_timeout,
            events,
            outcome,
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Rejected by the syntax check; no network activity took place.
    InvalidSyntax,
    /// No candidate host accepted a connection and greeted with 220.
    NoHostReachable,
    /// A transaction ran against `exchange`.
    Completed {
        exchange: String,
        rcpt: Option<StatusCode>,
    },
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSyntax => f.write_str("invalid address syntax"),
            Self::NoHostReachable => f.write_str("no mail server reachable"),
            Self::Completed {
                exchange,
                rcpt: Some(code),
            } => write!(f, "{exchange} answered {code} to RCPT TO"),
            Self::Completed {
                exchange,
                rcpt: None,
            } => write!(f, "{exchange} gave no usable reply to RCPT TO"),
        }
    }
}

/// Full result of a probe; [`ProbeReport::exists`] is the boolean verdict.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub email: String,
    pub outcome: ProbeOutcome,
    pub attempts: Vec<HostAttempt>,
}

impl ProbeReport {
    pub(crate) fn new(email: &str, outcome: ProbeOutcome, attempts: Vec<HostAttempt>) -> Self {
        Self {
            email: email.to_string(),
            outcome,
            attempts,
        }
    }

    pub fn exists(&self) -> bool {
        match &self.outcome {
            ProbeOutcome::Completed { rcpt, .. } => classify_rcpt(*rcpt),
            ProbeOutcome::InvalidSyntax | ProbeOutcome::NoHostReachable => false,
        }
    }

    pub fn rcpt_code(&self) -> Option<StatusCode> {
        match &self.outcome {
            ProbeOutcome::Completed { rcpt, .. } => *rcpt,
            _ => None,
        }
    }

    pub fn hosts_tried(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.exchange.as_str()).collect()
    }

    /// Transcript lines prefixed with their host, in attempt order.
    pub fn transcript(&self) -> Vec<String> {
        self.attempts
            .iter()
            .flat_map(|attempt| {
                attempt
                    .events
                    .iter()
                    .map(move |event| format!("[{}] {event}", attempt.exchange))
            })
            .collect()
    }
}
