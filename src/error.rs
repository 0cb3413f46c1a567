use serde::Serialize;

use crate::catalog::PartId;

/// Precondition violations raised synchronously by the session controller.
///
/// None of these are fatal: the requested transition simply does not happen
/// and the session is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Unknown vehicle: {0}")]
    UnknownVehicle(String),

    #[error("Unknown part: {0}")]
    UnknownPart(PartId),

    #[error("No part is selected")]
    NoActivePart,

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("A request for part {0} is already in flight")]
    RequestInFlight(PartId),
}

// Renderers receive errors over JSON, so they travel as their display string.
impl Serialize for SessionError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Everything that can go wrong talking to the question-answering service.
#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service responded with HTTP {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Service error: {0}")]
    Service(String),
}

/// Errors from configuration, catalog loading and other IO outside the session.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid catalog: {0}")]
    Catalog(String),

    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
