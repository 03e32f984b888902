//! Shared HTTP building blocks: error bodies and extractors.

mod api_error;
mod validated_json;

pub use api_error::{ApiError, ErrorResponse};
pub use validated_json::ValidatedJson;
