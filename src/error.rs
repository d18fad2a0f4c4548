//! Errors surfaced by the generator. Recoverable draft problems never become errors.

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config: {0}")]
    Config(String),
    #[error("Grammar: {0}")]
    Grammar(String),
    /// Strict policy rejected the run; one entry per offending finding.
    #[error("Strict mode: {} finding(s) rejected the run: {}", .0.len(), .0.join("; "))]
    Strict(Vec<String>),
}

impl From<toml::de::Error> for GenError {
    fn from(e: toml::de::Error) -> Self {
        GenError::Config(e.to_string())
    }
}
