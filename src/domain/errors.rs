use thiserror::Error;

/// Errors raised when registering or parsing alerts
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlertError {
    #[error("Invalid threshold {value}: must be a finite number greater than zero")]
    InvalidThreshold { value: f64 },

    #[error("Invalid direction '{value}': valid options are 'above' or 'below'")]
    InvalidDirection { value: String },
}

/// Errors raised while fetching data from the price source
///
/// Variants carry string reasons instead of source errors so they stay
/// cloneable and can ride on broadcast events.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeedError {
    #[error("Network error for '{coin_id}': {reason}")]
    Network { coin_id: String, reason: String },

    #[error("Unknown coin: '{coin_id}'")]
    NotFound { coin_id: String },

    #[error("Request for '{coin_id}' timed out")]
    Timeout { coin_id: String },

    #[error("Invalid data for '{coin_id}': {reason}")]
    InvalidData { coin_id: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_error_formatting() {
        let err = AlertError::InvalidThreshold { value: -5.0 };

        let msg = err.to_string();
        assert!(msg.contains("-5"));
        assert!(msg.contains("greater than zero"));
    }

    #[test]
    fn test_invalid_direction_formatting() {
        let err = AlertError::InvalidDirection {
            value: "sideways".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("sideways"));
        assert!(msg.contains("above"));
    }

    #[test]
    fn test_feed_error_formatting() {
        let err = FeedError::NotFound {
            coin_id: "dogecoin2".to_string(),
        };
        assert!(err.to_string().contains("dogecoin2"));

        let err = FeedError::Network {
            coin_id: "bitcoin".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));
    }
}
