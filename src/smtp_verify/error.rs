use thiserror::Error;

/// Session-level failures.
///
/// These never escape [`Prober::check`](super::Prober::check): they end up
/// in the transcript and turn into a failed host or a missing reply code.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("refusing to send a command with an embedded line break to {host}")]
    LineBreak { host: String },
    #[error("I/O error with {host}: {source}")]
    Io {
        host: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    pub(crate) fn connect(host: &str, source: std::io::Error) -> Self {
        Self::Connect {
            host: host.to_string(),
            source,
        }
    }

    pub(crate) fn line_break(host: &str) -> Self {
        Self::LineBreak {
            host: host.to_string(),
        }
    }

    pub(crate) fn io(host: &str, source: std::io::Error) -> Self {
        Self::Io {
            host: host.to_string(),
            source,
        }
    }
}
