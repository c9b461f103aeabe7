use thiserror::Error;

use crate::signature::SignatureError;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),
    #[error("webhook verification failed: {0}")]
    Verification(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("unauthorized: {message}")]
    Unauthorized { message: String, correlation_id: String },
    #[error("forbidden: {message}")]
    Forbidden { message: String, correlation_id: String },
}

impl InterfaceError {
    /// Plain-text body returned to the provider. Never includes internal detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "Error processing message",
            Self::Unauthorized { .. } => "Invalid payload signature",
            Self::Forbidden { .. } => "Error verifying token",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Unauthorized { correlation_id, .. }
            | Self::Forbidden { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Unauthorized { correlation_id: id, .. }
            | InterfaceError::Forbidden { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::MalformedPayload(message) => {
                Self::BadRequest { message, correlation_id }
            }
            ApplicationError::Signature(error) => {
                Self::Unauthorized { message: error.to_string(), correlation_id }
            }
            ApplicationError::Verification(message) => Self::Forbidden { message, correlation_id },
        }
    }
}
