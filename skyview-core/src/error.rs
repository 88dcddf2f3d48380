use std::path::PathBuf;

/// Message shown for any primary failure that is not the provider rejecting the location.
pub const GENERIC_FAILURE: &str = "Something went wrong.";

/// Failure of a provider request.
///
/// Only the primary current-conditions fetch surfaces these to the user; side
/// channels log them and degrade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The provider answered with a non-success code for the requested location.
    #[error("{0}")]
    NotFound(String),

    /// The provider answered, but the body could not be understood.
    #[error("Provider response could not be read: {0}")]
    Provider(String),

    /// Transport failure: DNS, connection refused, timeout, offline.
    #[error("Network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Text to put in front of the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::NotFound(message) => message.clone(),
            FetchError::Provider(_) | FetchError::Network(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Failure to resolve the current position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

impl LocationError {
    /// Non-fatal advisory shown while falling back to the default city.
    pub fn advisory(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => "Geolocation permission denied. Please enter a city.",
            LocationError::Unavailable(_) => "Geolocation not supported. Please enter a city.",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to write storage file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize storage: {0}")]
    Serialize(#[from] serde_json::Error),
}
