//! Unified error types for the orchestrator.

use std::fmt;

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// Errors produced while validating a function call's argument payload.
///
/// The argument decoder is the one place untrusted model output enters the
/// system, so every rejection carries enough detail to be reported back to
/// the model for a corrected retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload is not valid JSON, not a JSON object, or carries an
    /// undeclared property.
    Malformed(String),
    /// A property listed as required in the schema is absent.
    MissingRequired(String),
    /// An enumerated property received a value outside its allowed set.
    InvalidEnum {
        property: String,
        value: String,
        allowed: Vec<String>,
    },
    /// A property value does not match its declared type.
    TypeMismatch {
        property: String,
        expected: &'static str,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed arguments: {msg}"),
            Self::MissingRequired(name) => write!(f, "missing required argument `{name}`"),
            Self::InvalidEnum {
                property,
                value,
                allowed,
            } => write!(
                f,
                "invalid value `{value}` for `{property}` (allowed: {})",
                allowed.join(", ")
            ),
            Self::TypeMismatch { property, expected } => {
                write!(f, "argument `{property}` must be a {expected}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Errors from function registration and dispatch.
#[derive(Debug)]
pub enum RegistryError {
    /// A function with this name is already registered.
    Duplicate(String),
    /// Dispatch referenced a name that was never registered.
    Unknown(String),
    /// Arguments failed schema validation before the handler ran.
    Decode(DecodeError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(name) => write!(f, "function `{name}` is already registered"),
            Self::Unknown(name) => write!(f, "unknown function: {name}"),
            Self::Decode(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<DecodeError> for RegistryError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// InvariantViolation
// ---------------------------------------------------------------------------

/// A message failed transcript shape checks.
///
/// These indicate programming errors in the caller, not recoverable runtime
/// conditions, and are never silently normalized away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation(pub String);

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transcript invariant violated: {}", self.0)
    }
}

impl std::error::Error for InvariantViolation {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the HTTP API layer.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// The endpoint rejected the request with 429.
    RateLimited {
        /// Parsed `Retry-After` header, when the endpoint sent one.
        retry_after_secs: Option<u64>,
        body: String,
    },
    /// Any other non-2xx status from the API.
    Status { code: u16, body: String },
    /// The response body did not parse as a chat completion.
    InvalidResponse(String),
}

impl ApiError {
    /// Build the error for a non-success status line.
    pub(crate) fn status(code: u16, body: String, retry_after_secs: Option<u64>) -> Self {
        if code == 429 {
            Self::RateLimited {
                retry_after_secs,
                body,
            }
        } else {
            Self::Status { code, body }
        }
    }

    /// HTTP status code, when this error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Server-requested retry delay, when present.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::RateLimited {
                retry_after_secs,
                body,
            } => match retry_after_secs {
                Some(secs) => write!(f, "rate limited (retry after {secs}s): {body}"),
                None => write!(f, "rate limited: {body}"),
            },
            Self::Status { code, body } => write!(f, "status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// OrchestratorError — top-level
// ---------------------------------------------------------------------------

/// Top-level error type for the orchestration loop.
#[derive(Debug)]
pub enum OrchestratorError {
    Config(ConfigError),
    Api(ApiError),
    Invariant(InvariantViolation),
    /// Model returned no choices in the response.
    EmptyResponse,
    /// The function-call loop exceeded the configured turn cap.
    TurnLimitReached,
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Api(e) => write!(f, "api: {e}"),
            Self::Invariant(e) => write!(f, "{e}"),
            Self::EmptyResponse => write!(f, "model returned empty response"),
            Self::TurnLimitReached => write!(f, "function-call turn limit reached"),
        }
    }
}

impl std::error::Error for OrchestratorError {}

impl From<ConfigError> for OrchestratorError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ApiError> for OrchestratorError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

impl From<InvariantViolation> for OrchestratorError {
    fn from(e: InvariantViolation) -> Self {
        Self::Invariant(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_display() {
        assert_eq!(
            DecodeError::Malformed("not an object".into()).to_string(),
            "malformed arguments: not an object"
        );
        assert_eq!(
            DecodeError::MissingRequired("unit".into()).to_string(),
            "missing required argument `unit`"
        );
        assert_eq!(
            DecodeError::InvalidEnum {
                property: "unit".into(),
                value: "kelvin".into(),
                allowed: vec!["fahrenheit".into(), "celsius".into()],
            }
            .to_string(),
            "invalid value `kelvin` for `unit` (allowed: fahrenheit, celsius)"
        );
        assert_eq!(
            DecodeError::TypeMismatch {
                property: "location".into(),
                expected: "string",
            }
            .to_string(),
            "argument `location` must be a string"
        );
    }

    #[test]
    fn registry_error_display() {
        assert_eq!(
            RegistryError::Duplicate("get_current_weather".into()).to_string(),
            "function `get_current_weather` is already registered"
        );
        assert_eq!(
            RegistryError::Unknown("get_stock_price".into()).to_string(),
            "unknown function: get_stock_price"
        );
    }

    #[test]
    fn api_error_classifies_429_as_rate_limited() {
        let e = ApiError::status(429, "slow down".into(), Some(3));
        assert!(matches!(e, ApiError::RateLimited { .. }));
        assert_eq!(e.status_code(), Some(429));
        assert_eq!(e.retry_after_secs(), Some(3));
        assert_eq!(e.to_string(), "rate limited (retry after 3s): slow down");
    }

    #[test]
    fn api_error_keeps_other_statuses() {
        let e = ApiError::status(500, "boom".into(), None);
        assert!(matches!(e, ApiError::Status { code: 500, .. }));
        assert_eq!(e.retry_after_secs(), None);
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let e = ConfigError::from(io_err);
        let s = e.to_string();
        assert!(s.starts_with("io:"), "got: {s}");
        assert!(s.contains("file not found"));
    }

    #[test]
    fn orchestrator_error_display_variants() {
        assert_eq!(
            OrchestratorError::EmptyResponse.to_string(),
            "model returned empty response"
        );
        assert_eq!(
            OrchestratorError::TurnLimitReached.to_string(),
            "function-call turn limit reached"
        );
    }

    #[test]
    fn orchestrator_error_from_invariant() {
        let e = OrchestratorError::from(InvariantViolation("content must be null".into()));
        assert!(e.to_string().contains("content must be null"), "got: {e}");
    }
}
