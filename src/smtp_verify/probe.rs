use std::time::Duration;

use crate::mx::{MxCandidateList, MxResolver};
use crate::smtp_verify::connector::{Connector, TcpConnector};
use crate::smtp_verify::options::ProbeOptions;
use crate::smtp_verify::session::SmtpSession;
use crate::smtp_verify::types::{
    AttemptOutcome, HostAttempt, ProbeOutcome, ProbeReport, SmtpEvent, Stage, StatusCode,
};
use crate::validator::{EmailAddress, SyntaxCheck, ValidationMode};

/// Mailbox existence probe.
///
/// Holds configuration and collaborators only; every call to
/// [`check`](Self::check) or [`probe`](Self::probe) starts from scratch,
/// so a single `Prober` can be shared between threads when its parts are
/// `Sync`.
#[derive(Debug, Clone)]
pub struct Prober<R, C = TcpConnector, V = ValidationMode> {
    options: ProbeOptions,
    resolver: R,
    connector: C,
    syntax: V,
}

impl<R: MxResolver> Prober<R> {
    pub fn new(options: ProbeOptions, resolver: R) -> Self {
        let syntax = options.validation_mode;
        Self {
            options,
            resolver,
            connector: TcpConnector,
            syntax,
        }
    }
}

#[cfg(feature = "with-mx")]
impl Prober<crate::mx::DnsMxResolver> {
    /// Prober backed by the system DNS configuration and plain TCP.
    pub fn system(options: ProbeOptions) -> Result<Self, crate::mx::Error> {
        let resolver = crate::mx::DnsMxResolver::from_system_conf()?;
        Ok(Self::new(options, resolver))
    }
}

impl<R, C, V> Prober<R, C, V> {
    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    pub fn with_connector<C2: Connector>(self, connector: C2) -> Prober<R, C2, V> {
        Prober {
            options: self.options,
            resolver: self.resolver,
            connector,
            syntax: self.syntax,
        }
    }

    pub fn with_syntax_check<V2: SyntaxCheck>(self, syntax: V2) -> Prober<R, C, V2> {
        Prober {
            options: self.options,
            resolver: self.resolver,
            connector: self.connector,
            syntax,
        }
    }
}

impl<R, C, V> Prober<R, C, V>
where
    R: MxResolver,
    C: Connector,
    V: SyntaxCheck,
{
    /// `true` when the address probably exists: the RCPT TO reply was 250,
    /// or a temporary 450/451/452. Every failure yields `false`.
    pub fn check(&self, email: &str) -> bool {
        self.probe(email).exists()
    }

    /// Runs the probe and keeps the per-host detail.
    pub fn probe(&self, email: &str) -> ProbeReport {
        if !self.syntax.is_valid(email) {
            #[cfg(feature = "with-tracing")]
            tracing::debug!(email, "address rejected by syntax check");
            return ProbeReport::new(email, ProbeOutcome::InvalidSyntax, Vec::new());
        }
        let address = match EmailAddress::parse(email) {
            Ok(address) => address,
            Err(_err) => {
                #[cfg(feature = "with-tracing")]
                tracing::debug!(email, error = %_err, "address cannot be split");
                return ProbeReport::new(email, ProbeOutcome::InvalidSyntax, Vec::new());
            }
        };

        let candidates = self.resolver.resolve(address.domain());
        let timeouts = &self.options.timeouts;
        let connect_timeout = timeouts.per_attempt_timeout(candidates.len());
        #[cfg(feature = "with-tracing")]
        tracing::debug!(
            domain = address.domain(),
            candidates = candidates.len(),
            connect_timeout_secs = timeouts.per_attempt_secs(candidates.len()),
            "probing candidate hosts"
        );

        let mut attempts = Vec::with_capacity(candidates.len());
        let Some(mut session) = self.open_first_ready(&candidates, connect_timeout, &mut attempts)
        else {
            #[cfg(feature = "with-tracing")]
            tracing::info!(email, "no candidate host greeted with 220");
            return ProbeReport::new(email, ProbeOutcome::NoHostReachable, attempts);
        };

        let rcpt = self.run_transaction(&mut session, &address);
        let exchange = session.host().to_string();
        let events = session.close();
        attempts.push(HostAttempt::new(
            exchange.clone(),
            connect_timeout,
            events,
            AttemptOutcome::Transacted { rcpt },
        ));

        let report = ProbeReport::new(email, ProbeOutcome::Completed { exchange, rcpt }, attempts);
        #[cfg(feature = "with-tracing")]
        tracing::info!(email, outcome = %report.outcome, exists = report.exists(), "probe finished");
        report
    }

    /// Tries candidates in order and returns the first session greeted
    /// with 220. Sessions that fail the greeting are closed before moving on.
    fn open_first_ready(
        &self,
        candidates: &MxCandidateList,
        connect_timeout: Option<Duration>,
        attempts: &mut Vec<HostAttempt>,
    ) -> Option<SmtpSession<C::Stream>> {
        let read_timeout = self.options.timeouts.read_timeout();
        for host in candidates {
            let mut session = match SmtpSession::open(
                &self.connector,
                host,
                self.options.port,
                connect_timeout,
                read_timeout,
            ) {
                Ok(session) => session,
                Err(err) => {
                    #[cfg(feature = "with-tracing")]
                    tracing::debug!(host = %host, error = %err, "connection failed");
                    let message = err.to_string();
                    attempts.push(HostAttempt::new(
                        host.as_str(),
                        connect_timeout,
                        vec![SmtpEvent::Error {
                            stage: Stage::Connect,
                            message: message.clone(),
                        }],
                        AttemptOutcome::Unreachable { message },
                    ));
                    continue;
                }
            };

            let greeting = session.greet();
            if greeting.is(StatusCode::SERVICE_READY) {
                return Some(session);
            }
            #[cfg(feature = "with-tracing")]
            tracing::debug!(host = %host, code = greeting.code.map(|c| c.as_u16()), "greeting rejected");
            attempts.push(HostAttempt::new(
                host.as_str(),
                connect_timeout,
                session.close(),
                AttemptOutcome::GreetingRejected {
                    code: greeting.code,
                },
            ));
        }
        None
    }

    /// HELO, MAIL FROM, RCPT TO, then RSET and QUIT regardless of the
    /// outcome. Only the RCPT TO code is kept.
    fn run_transaction(
        &self,
        session: &mut SmtpSession<C::Stream>,
        address: &EmailAddress,
    ) -> Option<StatusCode> {
        let sender = &self.options.sender;
        session.send(Stage::Helo, &sender.helo_command());
        session.send(Stage::MailFrom, &sender.mail_from_command());
        let rcpt = session.send(Stage::RcptTo, &format!("RCPT TO: <{address}>"));
        session.send(Stage::Rset, "RSET");
        session.send(Stage::Quit, "QUIT");
        rcpt.code
    }
}

/// One-shot check against the system resolver.
///
/// Only resolver setup can fail; the probe itself always yields a verdict.
#[cfg(feature = "with-mx")]
pub fn check_mailaddress_exists(
    email: &str,
    options: &ProbeOptions,
) -> Result<bool, crate::mx::Error> {
    Ok(Prober::system(options.clone())?.check(email))
}
