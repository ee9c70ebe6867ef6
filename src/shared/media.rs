//! Embedded image payloads
//!
//! Images travel inside JSON bodies as `data:<mime>;base64,<payload>` strings
//! (`image` on messages, `profilePic` on users). The client builds them from
//! raw bytes, the backend validates them before storing.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::shared::error::SharedError;

/// Largest decoded image accepted. Base64 inflates by 4/3, which keeps the
/// encoded form under the 10 MiB request body limit.
pub const MAX_IMAGE_BYTES: usize = 7 * 1024 * 1024;

/// Raw image bytes plus their MIME type, ready to be embedded in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Wrap raw bytes. The content type must be an `image/*` type and the
    /// payload must be non-empty and no larger than [`MAX_IMAGE_BYTES`].
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self, SharedError> {
        let content_type = content_type.into();
        if !content_type.starts_with("image/") {
            return Err(SharedError::media(format!(
                "unsupported content type '{}'",
                content_type
            )));
        }
        check_size(bytes.len())?;
        Ok(Self { content_type, bytes })
    }

    /// MIME type of the image
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Decoded size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Encode as a `data:` URI
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Summary of a validated image data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub content_type: String,
    pub size: usize,
}

/// Validate an image data URI and report its type and decoded size.
pub fn parse_image_data_uri(uri: &str) -> Result<ImageInfo, SharedError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| SharedError::media("expected a data URI"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SharedError::media("missing data URI payload"))?;
    let content_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| SharedError::media("data URI must be base64 encoded"))?;
    if !content_type.starts_with("image/") {
        return Err(SharedError::media(format!(
            "unsupported content type '{}'",
            content_type
        )));
    }

    let decoded = STANDARD
        .decode(payload.trim())
        .map_err(|e| SharedError::media(format!("payload is not valid base64: {}", e)))?;
    check_size(decoded.len())?;

    Ok(ImageInfo {
        content_type: content_type.to_string(),
        size: decoded.len(),
    })
}

/// Guess an image MIME type from a file extension.
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

fn check_size(len: usize) -> Result<(), SharedError> {
    if len == 0 {
        return Err(SharedError::media("image is empty"));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(SharedError::media(format!(
            "image is {} bytes, limit is {}",
            len, MAX_IMAGE_BYTES
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_attachment_encodes_data_uri() {
        let image = ImageAttachment::new("image/png", PNG_HEADER.to_vec()).unwrap();
        let uri = image.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));

        let info = parse_image_data_uri(&uri).unwrap();
        assert_eq!(info.content_type, "image/png");
        assert_eq!(info.size, PNG_HEADER.len());
    }

    #[test]
    fn test_attachment_rejects_non_image_type() {
        let result = ImageAttachment::new("text/plain", b"hello".to_vec());
        assert_matches!(result, Err(SharedError::MediaError { .. }));
    }

    #[test]
    fn test_attachment_rejects_empty_bytes() {
        assert!(ImageAttachment::new("image/png", Vec::new()).is_err());
    }

    #[test]
    fn test_parse_rejects_plain_url() {
        assert!(parse_image_data_uri("https://example.com/cat.png").is_err());
    }

    #[test]
    fn test_parse_rejects_non_base64_payload() {
        assert!(parse_image_data_uri("data:image/png;base64,@@@@").is_err());
    }

    #[test]
    fn test_parse_rejects_unencoded_uri() {
        assert!(parse_image_data_uri("data:image/svg+xml,<svg/>").is_err());
    }

    #[test]
    fn test_parse_rejects_non_image_type() {
        assert!(parse_image_data_uri("data:application/pdf;base64,aGVsbG8=").is_err());
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type_for_extension("JPG"), Some("image/jpeg"));
        assert_eq!(content_type_for_extension("png"), Some("image/png"));
        assert_eq!(content_type_for_extension("txt"), None);
    }
}
