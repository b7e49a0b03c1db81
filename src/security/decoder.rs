//! Embedded data-URI payload decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::security::blocklist::DATA_URI_MARKER;

/// Why a payload could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("base64 format error: {0}")]
    Format(&'static str),
    #[error("invalid base64 payload: {0}")]
    Encoding(#[from] base64::DecodeError),
}

/// Decode the base64 HTML document that follows the data-URI marker.
///
/// The marker is matched case-insensitively. The payload runs from the end of
/// the first marker up to the next marker, if any, and keeps its original case.
pub fn decode(input: &str) -> Result<String, DecodeError> {
    // ASCII lowercasing keeps byte offsets aligned with `input`.
    let lowered = input.to_ascii_lowercase();
    let start = lowered
        .find(DATA_URI_MARKER)
        .ok_or(DecodeError::Format("marker not found"))?
        + DATA_URI_MARKER.len();

    let end = lowered[start..]
        .find(DATA_URI_MARKER)
        .map_or(input.len(), |offset| start + offset);

    let payload = &input[start..end];
    if payload.is_empty() {
        return Err(DecodeError::Format("no payload after marker"));
    }

    let bytes = STANDARD.decode(payload)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        STANDARD.encode(text)
    }

    #[test]
    fn test_missing_marker_is_format_error() {
        assert!(matches!(decode("hello world"), Err(DecodeError::Format(_))));
    }

    #[test]
    fn test_empty_payload_is_format_error() {
        assert!(matches!(decode("data:text/html;base64,"), Err(DecodeError::Format(_))));
    }

    #[test]
    fn test_invalid_base64_is_encoding_error() {
        assert!(matches!(
            decode("data:text/html;base64,!!not base64!!"),
            Err(DecodeError::Encoding(_))
        ));
    }

    #[test]
    fn test_decodes_payload() {
        let input = format!("data:text/html;base64,{}", encode("<script>alert(1)</script>"));
        assert_eq!(decode(&input).unwrap(), "<script>alert(1)</script>");
    }

    #[test]
    fn test_marker_is_case_insensitive_and_payload_keeps_case() {
        let input = format!("DATA:TEXT/HTML;BASE64,{}", encode("<b>Hi</b>"));
        assert_eq!(decode(&input).unwrap(), "<b>Hi</b>");
    }

    #[test]
    fn test_payload_stops_at_next_marker() {
        let input = format!(
            "x data:text/html;base64,{}data:text/html;base64,{}",
            encode("first"),
            encode("second")
        );
        assert_eq!(decode(&input).unwrap(), "first");
    }
}
