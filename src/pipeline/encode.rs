//! Image encoding for the HTML display surface: bytes → base64 data URI.
//!
//! The HTML report is a single self-contained file, so the diagram PNG is
//! embedded rather than linked. A PNG that does not decode is refused here so
//! a broken `<img>` never reaches the page.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Encode PNG bytes as a `data:image/png;base64,…` URI.
pub fn png_data_uri(png: &[u8]) -> Result<String, image::ImageError> {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)?;
    let b64 = STANDARD.encode(png);
    debug!("Encoded PNG → {} bytes base64", b64.len());
    Ok(format!("data:image/png;base64,{b64}"))
}

/// Encode an SVG document as a `data:image/svg+xml;base64,…` URI.
pub fn svg_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("encode should succeed");
        buf
    }

    #[test]
    fn encode_small_png() {
        let png = tiny_png();
        let uri = png_data_uri(&png).expect("valid png");
        let b64 = uri.strip_prefix("data:image/png;base64,").unwrap();
        let decoded = STANDARD.decode(b64).expect("valid base64");
        assert_eq!(decoded, png);
    }

    #[test]
    fn rejects_non_png() {
        assert!(png_data_uri(b"GIF89a....").is_err());
    }

    #[test]
    fn svg_uri_prefix() {
        let uri = svg_data_uri("<svg></svg>");
        assert!(uri.starts_with("data:image/svg+xml;base64,"));
    }
}
