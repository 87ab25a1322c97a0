use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use thiserror::Error;

pub const COVER_IMAGE_BASE_PATH: &str = "uploads/bookCovers";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMimeType {
    Jpeg,
    Png,
    Gif,
}

impl ImageMimeType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

impl std::fmt::Display for ImageMimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct EncodedCover {
    #[serde(rename = "type")]
    mime: String,
    data: String,
}

#[derive(Error, Debug)]
pub enum CoverDecodeError {
    #[error("cover payload is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("cover type \"{0}\" is not an accepted image type")]
    UnsupportedType(String),
    #[error("cover data is not valid base64")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    mime: ImageMimeType,
    bytes: Vec<u8>,
}

impl CoverImage {
    pub const fn new(mime: ImageMimeType, bytes: Vec<u8>) -> Self {
        Self { mime, bytes }
    }

    pub fn decode(payload: &str) -> Result<Self, CoverDecodeError> {
        let encoded: EncodedCover = serde_json::from_str(payload)?;
        let mime = ImageMimeType::parse(&encoded.mime)
            .ok_or(CoverDecodeError::UnsupportedType(encoded.mime))?;
        let bytes = STANDARD.decode(encoded.data.as_bytes())?;
        Ok(Self { mime, bytes })
    }

    pub const fn mime(&self) -> ImageMimeType {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredCover {
    Inline { mime: ImageMimeType, bytes: Vec<u8> },
    File { filename: String },
}

impl StoredCover {
    pub fn display_path(&self) -> String {
        match self {
            Self::Inline { mime, bytes } => format!(
                "data:{mime};charset=utf-8;base64,{}",
                STANDARD.encode(bytes)
            ),
            Self::File { filename } => format!("/{COVER_IMAGE_BASE_PATH}/{filename}"),
        }
    }

    /// Rebuilds a cover from nullable record columns. A half-populated inline
    /// cover, or one with an unknown MIME type, yields no cover.
    pub fn from_columns(
        bytes: Option<Vec<u8>>,
        mime: Option<&str>,
        filename: Option<String>,
    ) -> Option<Self> {
        match (bytes, mime.and_then(ImageMimeType::parse), filename) {
            (Some(bytes), Some(mime), _) => Some(Self::Inline { mime, bytes }),
            (_, _, Some(filename)) if !filename.is_empty() => Some(Self::File { filename }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &str = "R0lGODlhAQABAAAAACw=";

    #[test]
    fn decodes_accepted_image_types() {
        for mime in ["image/jpeg", "image/png", "image/gif"] {
            let payload = format!(r#"{{"type":"{mime}","data":"{PIXEL}"}}"#);
            let cover = CoverImage::decode(&payload).unwrap();
            assert_eq!(cover.mime().as_str(), mime);
            assert!(!cover.bytes().is_empty());
        }
    }

    #[test]
    fn rejects_other_types() {
        let payload = format!(r#"{{"type":"image/webp","data":"{PIXEL}"}}"#);
        assert!(matches!(
            CoverImage::decode(&payload),
            Err(CoverDecodeError::UnsupportedType(mime)) if mime == "image/webp"
        ));
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(matches!(
            CoverImage::decode("not json"),
            Err(CoverDecodeError::Json(_))
        ));
        assert!(matches!(
            CoverImage::decode(r#"{"type":"image/png","data":"%%%"}"#),
            Err(CoverDecodeError::Base64(_))
        ));
    }

    #[test]
    fn inline_cover_renders_data_uri() {
        let cover = StoredCover::Inline {
            mime: ImageMimeType::Png,
            bytes: vec![1, 2, 3],
        };
        assert_eq!(
            cover.display_path(),
            "data:image/png;charset=utf-8;base64,AQID"
        );
    }

    #[test]
    fn file_cover_renders_upload_path() {
        let cover = StoredCover::File {
            filename: "abc.jpg".into(),
        };
        assert_eq!(cover.display_path(), "/uploads/bookCovers/abc.jpg");
    }

    #[test]
    fn incomplete_columns_yield_no_cover() {
        assert_eq!(StoredCover::from_columns(Some(vec![1]), None, None), None);
        assert_eq!(StoredCover::from_columns(None, Some("image/png"), None), None);
        assert_eq!(
            StoredCover::from_columns(Some(vec![1]), Some("text/plain"), None),
            None
        );
        assert_eq!(StoredCover::from_columns(None, None, None), None);
    }
}
