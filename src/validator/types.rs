use thiserror::Error;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Strict,
    Relaxed,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub ok: bool,
    pub reasons: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("missing '@' in {0:?}")]
    MissingAt(String),
    #[error("empty local part")]
    EmptyLocalPart,
    #[error("empty domain")]
    EmptyDomain,
}
