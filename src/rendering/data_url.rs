//! `data:` URL decoding and the built-in image decoder.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures::future::{BoxFuture, FutureExt};
use image::DynamicImage;

use crate::rendering::ImageDecoder;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub data: Vec<u8>,
}

/// Split a `data:[<mime>][;base64],<payload>` URL into its MIME type and bytes.
pub fn decode(url: &str) -> Result<DataUrl> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| Error::Decode("not a data URL".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Decode("data URL has no payload separator".into()))?;

    let mut params = header.split(';');
    let mime = params
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or("text/plain")
        .to_string();
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let data = if is_base64 {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::Decode(format!("invalid base64 payload: {}", e)))?
    } else {
        payload.as_bytes().to_vec()
    };
    Ok(DataUrl { mime, data })
}

/// Encode bytes as a base64 data URL.
pub fn encode(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

/// Decodes `data:` URLs and local file paths (`file://` or bare).
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlDecoder;

impl ImageDecoder for DataUrlDecoder {
    fn decode<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<DynamicImage>> {
        async move {
            let bytes = if url.trim_start().starts_with("data:") {
                decode(url)?.data
            } else if url.contains("://") && !url.starts_with("file://") {
                return Err(Error::Decode(format!("unsupported image URL: {}", url)));
            } else {
                let path = url.strip_prefix("file://").unwrap_or(url);
                tokio::fs::read(path).await?
            };
            image::load_from_memory(&bytes).map_err(|e| Error::Decode(e.to_string()))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_payload() {
        let url = encode("image/png", b"\x89PNG");
        let d = decode(&url).unwrap();
        assert_eq!(d.mime, "image/png");
        assert_eq!(d.data, b"\x89PNG");
    }

    #[test]
    fn plain_payload_and_default_mime() {
        let d = decode("data:,hello").unwrap();
        assert_eq!(d.mime, "text/plain");
        assert_eq!(d.data, b"hello");
    }

    #[test]
    fn rejects_non_data_urls() {
        assert!(matches!(decode("https://x/y.png"), Err(Error::Decode(_))));
        assert!(matches!(decode("data:image/png;base64"), Err(Error::Decode(_))));
        assert!(matches!(decode("data:image/png;base64,@@@"), Err(Error::Decode(_))));
    }

    #[tokio::test]
    async fn decoder_reads_png_data_urls() {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let decoded = DataUrlDecoder.decode(&encode("image/png", &png)).await.unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[tokio::test]
    async fn decoder_rejects_remote_urls() {
        let err = DataUrlDecoder.decode("https://cdn.example/bg.png").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
