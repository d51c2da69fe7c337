use std::io::{BufReader, Read, Write};
use std::time::Duration;

use crate::smtp_verify::connector::Connector;
use crate::smtp_verify::error::ProbeError;
use crate::smtp_verify::reply::read_reply;
use crate::smtp_verify::types::{SmtpEvent, SmtpReply, Stage};

/// One connection to one candidate host.
///
/// The stream is owned by the session and released when the session is
/// dropped or [`close`](Self::close)d, whichever comes first.
pub struct SmtpSession<S: Read + Write> {
    host: String,
    reader: BufReader<S>,
    events: Vec<SmtpEvent>,
}

impl<S: Read + Write> SmtpSession<S> {
    pub fn open<C>(
        connector: &C,
        host: &str,
        port: u16,
        connect_timeout: Option<Duration>,
        read_timeout: Option<Duration>,
    ) -> Result<Self, ProbeError>
    where
        C: Connector<Stream = S> + ?Sized,
    {
        let stream = connector
            .connect(host, port, connect_timeout, read_timeout)
            .map_err(|err| ProbeError::connect(host, err))?;
        Ok(Self::from_stream(host, stream))
    }

    pub(crate) fn from_stream(host: &str, stream: S) -> Self {
        Self {
            host: host.to_string(),
            reader: BufReader::new(stream),
            events: Vec::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Reads the unsolicited greeting; nothing is sent.
    pub fn greet(&mut self) -> SmtpReply {
        let reply = read_reply(&mut self.reader);
        self.record_reply(Stage::Greeting, &reply);
        reply
    }

    /// Writes `command` followed by CRLF and reads the reply.
    ///
    /// A failed write is recorded and reported as an absent reply; nothing
    /// is read in that case. Commands holding CR or LF are never written.
    pub fn send(&mut self, stage: Stage, command: &str) -> SmtpReply {
        #[cfg(feature = "with-tracing")]
        tracing::debug!(host = %self.host, command, "sending SMTP command");
        self.events.push(SmtpEvent::Sent {
            stage,
            command: command.to_string(),
        });
        if let Err(err) = self.write_line(command) {
            #[cfg(feature = "with-tracing")]
            tracing::debug!(host = %self.host, %stage, error = %err, "write failed");
            self.events.push(SmtpEvent::Error {
                stage,
                message: err.to_string(),
            });
            return SmtpReply::absent();
        }
        let reply = read_reply(&mut self.reader);
        self.record_reply(stage, &reply);
        reply
    }

    /// Releases the connection and hands back the transcript.
    pub fn close(self) -> Vec<SmtpEvent> {
        let Self { reader, events, .. } = self;
        drop(reader);
        events
    }

    fn write_line(&mut self, command: &str) -> Result<(), ProbeError> {
        if command.contains(['\r', '\n']) {
            return Err(ProbeError::line_break(&self.host));
        }
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        let stream = self.reader.get_mut();
        stream
            .write_all(&line)
            .and_then(|()| stream.flush())
            .map_err(|err| ProbeError::io(&self.host, err))
    }

    fn record_reply(&mut self, stage: Stage, reply: &SmtpReply) {
        #[cfg(feature = "with-tracing")]
        tracing::debug!(
            host = %self.host,
            %stage,
            code = reply.code.map(|c| c.as_u16()),
            "received SMTP reply"
        );
        self.events.push(SmtpEvent::Received {
            stage,
            reply: reply.clone(),
        });
    }
}
