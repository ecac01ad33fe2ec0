use serde::Serialize;
use thiserror::Error;

/// A structured error suitable for printing as JSON on stdout.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    pub code: &'static str,
    pub message: String,
}

impl CliError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Grammar violations found while parsing a derivation path.
///
/// Offsets are byte offsets into the raw path string.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathError {
    #[error("junction at byte {offset} is missing its '/' or '//' introducer")]
    MissingSeparator { offset: usize },

    #[error("path ends with a separator that introduces no junction")]
    UnterminatedSeparator,

    #[error("empty junction at byte {offset}")]
    EmptyJunction { offset: usize },

    #[error("more than one '///' password segment")]
    DuplicatePassword,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("cannot construct a SURI from an empty phrase")]
    EmptyPhrase,

    #[error("phrase must be words separated by single spaces and must not contain '/'")]
    MalformedPhrase,

    #[error("invalid derivation path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("derivation path and password argument carry different passwords")]
    ConflictingPassword,

    #[error("password must not start with '/' or contain '///'")]
    MalformedPassword,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("SURI must begin with a phrase")]
    MissingPhrase,

    #[error("SURI phrase must be words separated by single spaces")]
    MalformedPhrase,

    #[error("invalid SURI derivation path: {0}")]
    InvalidPath(#[from] PathError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}

#[derive(Debug, Error, Clone)]
pub enum SeedsmithError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid derivation path: {0}")]
    Path(#[from] PathError),
}

impl From<SeedsmithError> for CliError {
    fn from(e: SeedsmithError) -> Self {
        match e {
            SeedsmithError::Lookup(inner) => Self::new("unknown_network", inner.to_string()),
            SeedsmithError::Encode(inner) => Self::new("encode_failed", inner.to_string()),
            SeedsmithError::Decode(inner) => Self::new("decode_failed", inner.to_string()),
            SeedsmithError::Path(inner) => Self::new("invalid_path", inner.to_string()),
        }
    }
}
