//! Error types raised by controllers

use thiserror::Error;

/// Failure kinds surfaced by a [`Controller`](crate::Controller) update
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The controller has no vehicle with this id
    #[error("vehicle {vehicle_id} not found")]
    VehicleNotFound { vehicle_id: u64 },

    /// The vehicle is asleep and waking it was not requested or failed
    #[error("vehicle {vehicle_id} is asleep")]
    VehicleAsleep { vehicle_id: u64 },

    /// Transport failure talking to the vehicle API
    #[error("network error: {message}")]
    Network { message: String },

    /// Token rejected or expired
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// The vehicle API asked us to back off
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

impl Error {
    /// Create network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::VehicleNotFound { vehicle_id: 7 }.to_string(),
            "vehicle 7 not found"
        );
        assert_eq!(
            Error::network("connection reset").to_string(),
            "network error: connection reset"
        );
        assert_eq!(
            Error::RateLimited {
                retry_after_secs: 30
            }
            .to_string(),
            "rate limited, retry after 30s"
        );
    }
}
