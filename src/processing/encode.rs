//! WebP encoding policy and metadata attachment.

use image::DynamicImage;
use img_parts::{Bytes, ImageEXIF, ImageICC};
use webp::{Encoder, WebPConfig};

use crate::utils::{ConvertError, ConvertResult};

use super::metadata::SourceMetadata;

/// Maximum encoder effort (libwebp `method`). Fixed policy: every derivative
/// trades CPU time for output size, regardless of lossy/lossless mode.
const ENCODE_METHOD: i32 = 6;

/// Encodes a normalized image as WebP.
///
/// `lossless` wins over `quality`; in lossy mode `quality` is the libwebp
/// quality factor. Expects the pipeline's normalized RGB8/RGBA8 representation.
pub fn encode_webp(image: &DynamicImage, lossless: bool, quality: u8) -> ConvertResult<Vec<u8>> {
    let encoder = match image {
        DynamicImage::ImageRgba8(buf) => Encoder::from_rgba(buf.as_raw(), buf.width(), buf.height()),
        DynamicImage::ImageRgb8(buf) => Encoder::from_rgb(buf.as_raw(), buf.width(), buf.height()),
        _ => {
            return Err(ConvertError::encode(
                "image was not normalized to RGB8/RGBA8 before encoding",
            ))
        }
    };

    let mut config = WebPConfig::new()
        .map_err(|_| ConvertError::encode("failed to initialize WebP encoder configuration"))?;
    config.method = ENCODE_METHOD;
    if lossless {
        config.lossless = 1;
        // In lossless mode `quality` steers effort, not fidelity.
        config.quality = 100.0;
    } else {
        config.lossless = 0;
        config.quality = quality as f32;
    }

    let memory = encoder
        .encode_advanced(&config)
        .map_err(|e| ConvertError::encode(format!("WebP encoding failed: {e:?}")))?;
    Ok(memory.to_vec())
}

/// Splices the source's EXIF and ICC chunks into an encoded WebP buffer.
/// Returns the buffer unchanged when there is nothing to attach.
pub fn attach_metadata(encoded: Vec<u8>, metadata: &SourceMetadata) -> ConvertResult<Vec<u8>> {
    if metadata.is_empty() {
        return Ok(encoded);
    }

    let mut container = img_parts::webp::WebP::from_bytes(encoded.into())
        .map_err(|e| ConvertError::encode(format!("cannot parse encoded WebP container: {e}")))?;
    if let Some(exif) = &metadata.exif {
        container.set_exif(Some(Bytes::copy_from_slice(exif)));
    }
    if let Some(icc) = &metadata.icc {
        container.set_icc_profile(Some(Bytes::copy_from_slice(icc)));
    }

    let mut out = Vec::new();
    for chunk in container.encoder() {
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn gradient_rgba(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128, (x % 256) as u8])
        }))
    }

    #[test]
    fn lossless_encoding_round_trips_pixels() {
        let image = gradient_rgba(16, 16);
        let encoded = encode_webp(&image, true, 80).unwrap();
        let decoded = image::load_from_memory(&encoded).unwrap().into_rgba8();
        assert_eq!(decoded.as_raw(), image.to_rgba8().as_raw());
    }

    #[test]
    fn lossy_encoding_is_rejected_for_unnormalized_input() {
        let image = DynamicImage::new_luma8(8, 8);
        assert!(matches!(
            encode_webp(&image, false, 80),
            Err(ConvertError::Encode(_))
        ));
    }

    #[test]
    fn metadata_attachment_survives_a_reparse() {
        let image = gradient_rgba(8, 8);
        let encoded = encode_webp(&image, true, 80).unwrap();
        let metadata = SourceMetadata {
            exif: Some(vec![0x49, 0x49, 0x2a, 0x00, 8, 0, 0, 0, 0, 0]),
            icc: Some(vec![1, 2, 3, 4]),
        };
        let with_meta = attach_metadata(encoded, &metadata).unwrap();

        let container = img_parts::webp::WebP::from_bytes(with_meta.into()).unwrap();
        assert_eq!(
            container.exif().as_deref(),
            metadata.exif.as_deref()
        );
        assert_eq!(
            container.icc_profile().as_deref(),
            metadata.icc.as_deref()
        );
    }

    #[test]
    fn empty_metadata_leaves_buffer_untouched() {
        let image = gradient_rgba(8, 8);
        let encoded = encode_webp(&image, true, 80).unwrap();
        let unchanged = attach_metadata(encoded.clone(), &SourceMetadata::default()).unwrap();
        assert_eq!(unchanged, encoded);
    }
}
