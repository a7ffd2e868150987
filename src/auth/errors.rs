use std::error::Error;
use std::fmt;

/// Opaque failure raised by the native bridge.
///
/// The native layer exposes no structured codes, so only the message survives
/// the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    message: String,
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wraps an error raised by the binding itself, keeping only its message.
    pub fn from_error(err: impl Error) -> Self {
        Self::new(err.to_string())
    }

    pub(crate) fn completion_dropped(call: &str) -> Self {
        Self::new(format!("{call} completion callback dropped without a result"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for NativeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicKitError {
    AuthorizationFailed { cause: NativeError },
    DeveloperTokenFailed { cause: NativeError },
    MusicUserTokenFailed { cause: NativeError },
    /// Only ever logged: the subscription check degrades to the all-false record.
    SubscriptionCheckFailed { cause: NativeError },
}

pub type MusicKitResult<T> = Result<T, MusicKitError>;

impl MusicKitError {
    pub fn cause(&self) -> &NativeError {
        match self {
            MusicKitError::AuthorizationFailed { cause }
            | MusicKitError::DeveloperTokenFailed { cause }
            | MusicKitError::MusicUserTokenFailed { cause }
            | MusicKitError::SubscriptionCheckFailed { cause } => cause,
        }
    }

    /// Short label used as the log line prefix.
    pub(crate) fn summary(&self) -> &'static str {
        match self {
            MusicKitError::AuthorizationFailed { .. } => "Authorize failed.",
            MusicKitError::DeveloperTokenFailed { .. } => "Get developer token failed.",
            MusicKitError::MusicUserTokenFailed { .. } => "Get music user token failed.",
            MusicKitError::SubscriptionCheckFailed { .. } => "Check subscription failed.",
        }
    }
}

impl fmt::Display for MusicKitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MusicKitError::AuthorizationFailed { cause } => {
                write!(f, "Apple Music authorization failed: {cause}")
            }
            MusicKitError::DeveloperTokenFailed { cause } => {
                write!(f, "Failed to fetch developer token: {cause}")
            }
            MusicKitError::MusicUserTokenFailed { cause } => {
                write!(f, "Failed to fetch music user token: {cause}")
            }
            MusicKitError::SubscriptionCheckFailed { cause } => {
                write!(f, "Subscription check failed: {cause}")
            }
        }
    }
}

impl Error for MusicKitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause())
    }
}
