//! JSON-to-model mapping and vendor error detection.

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Error text the vendor returns when the per-second quota is exhausted.
pub const QUERY_LIMIT_MESSAGE: &str = "Account Over Queries Per Second Limit";

/// Response shapes that carry the vendor's `error` field.
pub trait VendorError {
    /// The raw `error` field.
    fn error(&self) -> Option<&str>;

    /// `true` when the `error` field is absent or blank.
    fn is_valid(&self) -> bool {
        self.error().is_none_or(|e| e.trim().is_empty())
    }

    /// Names of JSON properties the model does not know about.
    fn unknown_fields(&self) -> Vec<&str> {
        Vec::new()
    }
}

/// Returns `true` if `message` is the vendor's query-limit error.
#[must_use]
pub fn is_query_limit_error(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case(QUERY_LIMIT_MESSAGE)
}

/// Deserializes a response body.
///
/// Unknown properties are logged at trace level and otherwise ignored.
///
/// # Errors
///
/// Returns [`Error::MappingFailed`] if the body is not valid JSON for `T`.
pub fn map_response<T>(body: &str, path: &str) -> Result<T>
where
    T: DeserializeOwned + VendorError,
{
    let parsed: T = serde_json::from_str(body).map_err(|source| Error::MappingFailed {
        path: String::from(path),
        source,
    })?;

    let unknown = parsed.unknown_fields();
    if !unknown.is_empty() {
        tracing::trace!(%path, fields = ?unknown, "Unknown response properties");
    }

    Ok(parsed)
}

/// Converts a non-blank vendor error into [`Error::Api`].
///
/// # Errors
///
/// Returns [`Error::Api`] carrying the vendor message.
pub fn ensure_valid<T: VendorError>(response: T) -> Result<T> {
    if let Some(message) = response.error().filter(|m| !m.trim().is_empty()) {
        return Err(Error::Api(String::from(message)));
    }
    Ok(response)
}
