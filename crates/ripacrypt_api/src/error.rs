/// The workflow step an error surfaced from.
///
/// Write operations pass through up to three independent failure points
/// (challenge fetch, challenge decrypt, submit), so errors reported to the
/// user always say which one failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RcStep {
    /// Submitting a public key for a new account.
    Register,
    /// Requesting an encrypted challenge from the service.
    ChallengeFetch,
    /// Decrypting the challenge with the local private key.
    ChallengeDecrypt,
    /// Encrypting a crypt payload to the account public key.
    Encrypt,
    /// Sending the proven write request.
    Submit,
    /// Plain retrieval, no proof involved.
    Fetch,
}

impl std::fmt::Display for RcStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Register => "register",
            Self::ChallengeFetch => "challenge fetch",
            Self::ChallengeDecrypt => "challenge decrypt",
            Self::Encrypt => "encrypt",
            Self::Submit => "submit",
            Self::Fetch => "fetch",
        })
    }
}

/// RIPACrypt client error type.
#[derive(Debug, thiserror::Error)]
pub enum RcError {
    /// Could not reach the service (connection, tls or proxy failure).
    #[error("TransportError: {0}")]
    Transport(String),

    /// The service answered with a non-success status envelope.
    #[error("APIError {status_code}: {message}")]
    Api {
        /// status code reported in the envelope.
        status_code: i64,
        /// human readable status message from the service.
        message: String,
    },

    /// The service answered, but not with the json we expected.
    #[error("APIError: malformed response: {0}")]
    MalformedResponse(String),

    /// Supplied or stored key material could not be parsed.
    #[error("KeyParseError: {0}")]
    KeyParse(String),

    /// A new key pair could not be produced.
    #[error("KeyGenerationError: {0}")]
    KeyGeneration(String),

    /// Encrypting to the account public key failed.
    #[error("EncryptionError: {0}")]
    Encryption(String),

    /// Decrypting with the account private key failed.
    #[error("DecryptionError: {0}")]
    Decryption(String),

    /// The local account record is missing, unreadable or unparseable.
    #[error("ConfigError: {0}")]
    Config(String),

    /// An argument was rejected before anything was sent.
    #[error("InvalidInput: {0}")]
    InvalidInput(String),

    /// Registration would orphan the key material of an existing account.
    #[error("an account is already registered with user id {0}, refusing to overwrite it")]
    AlreadyRegistered(u64),

    /// Write operations need a registered account.
    #[error("no user id is registered, run 'ripacrypt register' first")]
    NotRegistered,

    /// Payout address rotation was not explicitly acknowledged.
    #[error("requesting a new bitcoin address discards the current one and must be acknowledged")]
    Unacknowledged,

    /// Another error, tagged with the workflow step it came from.
    #[error("{step} failed: {source}")]
    Step {
        /// the step that failed.
        step: RcStep,
        /// what went wrong.
        #[source]
        source: Box<RcError>,
    },

    /// Unspecified error.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl RcError {
    /// Build an "Other" type RcError.
    pub fn other(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        RcError::Other(e.into())
    }

    /// Tag this error with the step it surfaced from.
    /// Already tagged errors keep their innermost step.
    pub fn in_step(self, step: RcStep) -> Self {
        match self {
            e @ RcError::Step { .. } => e,
            e => RcError::Step {
                step,
                source: Box::new(e),
            },
        }
    }

    /// The step this error was tagged with, if any.
    pub fn step(&self) -> Option<RcStep> {
        match self {
            RcError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The underlying error with any step tags removed.
    pub fn root(&self) -> &RcError {
        match self {
            RcError::Step { source, .. } => source.root(),
            e => e,
        }
    }

    /// True if the service could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self.root(), RcError::Transport(_))
    }

    /// True if the service answered but rejected the request,
    /// or answered with something other than the expected json.
    pub fn is_api(&self) -> bool {
        matches!(
            self.root(),
            RcError::Api { .. } | RcError::MalformedResponse(_)
        )
    }
}

impl From<reqwest::Error> for RcError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<serde_yaml::Error> for RcError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<std::io::Error> for RcError {
    fn from(error: std::io::Error) -> Self {
        Self::other(error)
    }
}

impl From<String> for RcError {
    fn from(s: String) -> Self {
        #[derive(Debug, thiserror::Error)]
        #[error("{0}")]
        struct OtherError(String);

        RcError::other(OtherError(s))
    }
}

impl From<&str> for RcError {
    fn from(s: &str) -> Self {
        s.to_string().into()
    }
}

/// RIPACrypt Result Type.
pub type RcResult<T> = Result<T, RcError>;

/// Extension for tagging results with a workflow step.
pub trait RcResultExt<T> {
    /// Tag the error case with the given step.
    fn step(self, step: RcStep) -> RcResult<T>;
}

impl<T> RcResultExt<T> for RcResult<T> {
    fn step(self, step: RcStep) -> RcResult<T> {
        self.map_err(|e| e.in_step(step))
    }
}
