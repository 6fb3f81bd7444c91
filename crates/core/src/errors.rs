use thiserror::Error;

use crate::domain::product::ProductId;

pub const CATALOG_UNAVAILABLE_MESSAGE: &str =
    "Unable to load furniture items. Please try again later.";
pub const ITEM_NOT_FOUND_MESSAGE: &str = "Item not found";

/// A catalog payload that decoded structurally but failed validation, or did
/// not decode at all (`field == "body"`).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid catalog record{}: field `{field}` {reason}", product_label(.product_id))]
pub struct DecodeError {
    pub product_id: Option<String>,
    pub field: &'static str,
    pub reason: String,
}

impl DecodeError {
    pub fn field(product_id: Option<&str>, field: &'static str, reason: impl Into<String>) -> Self {
        Self { product_id: product_id.map(str::to_owned), field, reason: reason.into() }
    }

    pub fn body(source: serde_json::Error) -> Self {
        Self { product_id: None, field: "body", reason: format!("could not be decoded: {source}") }
    }
}

fn product_label(product_id: &Option<String>) -> String {
    product_id.as_ref().map(|id| format!(" `{id}`")).unwrap_or_default()
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("catalog item `{id}` was not found")]
    NotFound { id: ProductId },
    #[error("catalog service responded with status {status}")]
    Status { status: u16 },
    #[error("catalog service unreachable: {message}")]
    Transport { message: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("request cancelled before completion")]
    Cancelled,
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Text for the error banner. Never empty.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => ITEM_NOT_FOUND_MESSAGE,
            Self::Status { .. } | Self::Transport { .. } | Self::Decode(_) | Self::Cancelled => {
                CATALOG_UNAVAILABLE_MESSAGE
            }
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Status { .. } => "status",
            Self::Transport { .. } => "transport",
            Self::Decode(_) => "decode",
            Self::Cancelled => "cancelled",
        }
    }
}
