use thiserror::Error;

/// Failures that reach the request boundary. Upstream (geocoding, place
/// search, NLU) failures are recovered inside the agent and never show up here.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("session memory failure: {0}")]
    Persistence(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn bad_request(message: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into(), correlation_id: correlation_id.into() }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "I couldn't read that. Send a JSON body like {\"message\": \"pizza in Paris\"}."
            }
            Self::Internal { .. } => {
                "Sorry, something went wrong while looking for food nearby. Please try again."
            }
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. } | Self::Internal { correlation_id, .. } => {
                correlation_id
            }
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let message = match value {
            ApplicationError::Persistence(message)
            | ApplicationError::Internal(message) => message,
        };
        Self::Internal { message, correlation_id: "unassigned".to_owned() }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, InterfaceError};

    #[test]
    fn persistence_error_maps_to_internal_with_correlation_id() {
        let interface = ApplicationError::Persistence("database is locked".to_owned())
            .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::Internal { ref correlation_id, .. } if correlation_id == "req-1"
        ));
        assert_eq!(interface.correlation_id(), "req-1");
    }

    #[test]
    fn internal_message_does_not_leak_details() {
        let interface =
            ApplicationError::Internal("stack overflow in mapper".to_owned()).into_interface("req-2");

        assert!(!interface.user_message().contains("mapper"));
        assert!(interface.user_message().starts_with("Sorry"));
    }

    #[test]
    fn bad_request_has_explanatory_message() {
        let interface = InterfaceError::bad_request("missing message", "req-3");

        assert!(interface.user_message().contains("message"));
        assert_eq!(interface.correlation_id(), "req-3");
    }
}
