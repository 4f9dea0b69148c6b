//! Image normalization ahead of OCR
//!
//! Every upload is decoded and re-encoded as PNG so the model always sees a
//! single transport format regardless of what the browser sent.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use std::io::Cursor;

use super::client::OcrError;

/// MIME type of the payload sent to the model
pub const OCR_MIME_TYPE: &str = "image/png";

/// Decode any supported image and re-encode it as PNG
pub fn to_png(bytes: &[u8]) -> Result<Vec<u8>, OcrError> {
    let image = image::load_from_memory(bytes).map_err(|e| OcrError::InvalidImage(e.to_string()))?;
    encode_png(&image)
}

/// PNG-encode and base64-wrap an image for the request body
pub fn to_png_base64(bytes: &[u8]) -> Result<String, OcrError> {
    let png = to_png(bytes)?;
    Ok(STANDARD.encode(png))
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, OcrError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| OcrError::InvalidImage(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Build a PNG from raw 8-bit samples as stored in an unfiltered PDF image stream.
///
/// Returns `None` for colour spaces and depths that cannot be mapped directly.
pub fn png_from_raw_samples(
    samples: Vec<u8>,
    width: u32,
    height: u32,
    color_space: &str,
) -> Option<Vec<u8>> {
    let image = match color_space {
        "DeviceRGB" => DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, samples)?),
        "DeviceGray" => DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, samples)?),
        _ => return None,
    };
    encode_png(&image).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bmp() -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, image::Rgb([200, 10, 10])));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Bmp).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_bmp_is_reencoded_as_png() {
        let png = to_png(&sample_bmp()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[test]
    fn test_garbage_is_invalid_image() {
        let result = to_png(b"definitely not an image");
        assert!(matches!(result, Err(OcrError::InvalidImage(_))));
    }

    #[test]
    fn test_base64_payload() {
        let encoded = to_png_base64(&sample_bmp()).unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(&decoded[..4], b"\x89PNG");
    }

    #[test]
    fn test_raw_samples() {
        let gray = png_from_raw_samples(vec![0u8; 4 * 4], 4, 4, "DeviceGray");
        assert!(gray.is_some());

        let rgb = png_from_raw_samples(vec![255u8; 2 * 2 * 3], 2, 2, "DeviceRGB");
        assert!(rgb.is_some());

        // Short buffer
        assert!(png_from_raw_samples(vec![0u8; 3], 2, 2, "DeviceRGB").is_none());
        assert!(png_from_raw_samples(vec![0u8; 16], 2, 2, "DeviceCMYK").is_none());
    }
}
