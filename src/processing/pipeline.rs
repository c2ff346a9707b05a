//! Single-image conversion pipeline.
//!
//! Runs synchronously on a blocking thread (the worker pool dispatches it via
//! `tokio::task::spawn_blocking`). Decode, orientation normalization, and
//! color-mode normalization happen exactly once per source; every width
//! variant shares that cost.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use tracing::debug;

use crate::core::ConversionOptions;
use crate::utils::{ConvertError, ConvertResult};

use super::encode::{attach_metadata, encode_webp};
use super::metadata::{neutralize_orientation, SourceMetadata};
use super::resize::{resize_to_width, target_widths};

/// Decoded source plus everything captured before normalization.
struct DecodedSource {
    image: DynamicImage,
    metadata: SourceMetadata,
    has_alpha: bool,
}

/// Converts one source image into width-variant WebP derivatives under
/// `out_dir`, returning the written paths ascending by width.
///
/// Any failure aborts only this source. A partially written file may remain
/// on disk after a failure; it is never reported as a successful output
/// (writes are not atomic, and the last writer wins on name collisions).
pub fn convert_single(
    source: &Path,
    out_dir: &Path,
    options: &ConversionOptions,
) -> ConvertResult<Vec<PathBuf>> {
    let decoded = decode_source(source, options.keep_metadata)?;
    let image = decoded.image;
    let source_width = image.width();
    let lossless = decoded.has_alpha && options.lossless_for_alpha;

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            ConvertError::decode(format!("source has no usable file stem: {}", source.display()))
        })?;

    let widths = target_widths(&options.widths, source_width, options.skip_upscale);
    debug!(
        source = %source.display(),
        alpha = decoded.has_alpha,
        lossless,
        ?widths,
        "converting"
    );

    let mut written = Vec::with_capacity(widths.len());
    for width in widths {
        // Native width passes through without resampling.
        let variant: Cow<'_, DynamicImage> = if width == source_width {
            Cow::Borrowed(&image)
        } else {
            Cow::Owned(resize_to_width(&image, width))
        };

        let out_path = out_dir.join(options.render_name(stem, width));
        if let Some(parent) = out_path.parent() {
            // Workers may race here; create_dir_all is idempotent.
            fs::create_dir_all(parent).map_err(|e| {
                ConvertError::encode(format!("cannot create output directory: {e}"))
            })?;
        }

        let encoded = encode_webp(&variant, lossless, options.quality)?;
        let encoded = attach_metadata(encoded, &decoded.metadata)?;
        fs::write(&out_path, &encoded)
            .map_err(|e| ConvertError::encode(format!("cannot write {}: {e}", out_path.display())))?;
        written.push(out_path);
    }

    Ok(written)
}

/// Decodes the source, captures EXIF/ICC before any transformation, bakes the
/// EXIF orientation into the pixels, and normalizes the color mode to RGBA8
/// (alpha present) or RGB8 (opaque).
fn decode_source(source: &Path, keep_metadata: bool) -> ConvertResult<DecodedSource> {
    let reader = ImageReader::open(source)
        .map_err(|e| ConvertError::decode(format!("cannot open {}: {e}", source.display())))?
        .with_guessed_format()
        .map_err(|e| ConvertError::decode(format!("cannot probe {}: {e}", source.display())))?;

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| ConvertError::decode(format!("cannot decode {}: {e}", source.display())))?;

    // A source without (or with unreadable) orientation metadata is upright.
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let metadata = if keep_metadata {
        let mut exif = decoder.exif_metadata().unwrap_or(None);
        if let Some(bytes) = exif.as_mut() {
            // The rotation is baked into the pixels below; the tag must not
            // be re-applied by downstream viewers.
            neutralize_orientation(bytes);
        }
        let icc = decoder.icc_profile().unwrap_or(None);
        SourceMetadata { exif, icc }
    } else {
        SourceMetadata::default()
    };

    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|e| ConvertError::decode(format!("cannot decode {}: {e}", source.display())))?;
    image.apply_orientation(orientation);

    // Paletted sources with a transparency table decode to an alpha-bearing
    // pixel format, so the color-type check covers indexed transparency too.
    let has_alpha = image.color().has_alpha();
    let image = if has_alpha {
        DynamicImage::ImageRgba8(image.into_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.into_rgb8())
    };

    Ok(DecodedSource {
        image,
        metadata,
        has_alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn write_rgb_png(path: &Path, width: u32, height: u32) {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 64])
        })
        .save(path)
        .unwrap();
    }

    fn write_rgba_png(path: &Path, width: u32, height: u32) {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 64, ((x + y) % 256) as u8])
        })
        .save(path)
        .unwrap();
    }

    #[test]
    fn produces_one_file_per_effective_width() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.png");
        write_rgb_png(&source, 100, 50);

        let options = ConversionOptions {
            widths: vec![40, 100, 200],
            skip_upscale: true,
            ..Default::default()
        }
        .normalized()
        .unwrap();

        // 200 clamps to 100 and merges with the explicit 100.
        let outputs = convert_single(&source, dir.path(), &options).unwrap();
        let names: Vec<_> = outputs
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["photo-40w.webp", "photo-100w.webp"]);
        for path in &outputs {
            assert!(path.exists());
        }
    }

    #[test]
    fn native_width_output_matches_source_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("exact.png");
        write_rgb_png(&source, 64, 32);

        let options = ConversionOptions {
            widths: vec![64],
            ..Default::default()
        }
        .normalized()
        .unwrap();

        let outputs = convert_single(&source, dir.path(), &options).unwrap();
        let decoded = image::open(&outputs[0]).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }

    #[test]
    fn alpha_source_with_lossless_option_round_trips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("sprite.png");
        write_rgba_png(&source, 32, 32);

        let options = ConversionOptions {
            widths: vec![32],
            lossless_for_alpha: true,
            quality: 10,
            ..Default::default()
        }
        .normalized()
        .unwrap();

        let outputs = convert_single(&source, dir.path(), &options).unwrap();
        let decoded = image::open(&outputs[0]).unwrap().into_rgba8();
        let original = image::open(&source).unwrap().into_rgba8();
        assert_eq!(decoded.as_raw(), original.as_raw());
    }

    #[test]
    fn opaque_source_is_encoded_lossy_even_with_lossless_option() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("opaque.png");
        write_rgb_png(&source, 64, 64);

        let options = ConversionOptions {
            widths: vec![64],
            lossless_for_alpha: true,
            quality: 20,
            ..Default::default()
        }
        .normalized()
        .unwrap();

        let outputs = convert_single(&source, dir.path(), &options).unwrap();
        // A low-quality lossy encode of a gradient cannot reproduce the
        // source exactly; a lossless encode would.
        let decoded = image::open(&outputs[0]).unwrap().into_rgb8();
        let original = image::open(&source).unwrap().into_rgb8();
        assert_ne!(decoded.as_raw(), original.as_raw());
    }

    #[test]
    fn corrupt_source_fails_with_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.jpg");
        std::fs::write(&source, b"definitely not a jpeg").unwrap();

        let options = ConversionOptions::default().normalized().unwrap();
        assert!(matches!(
            convert_single(&source, dir.path(), &options),
            Err(ConvertError::Decode(_))
        ));
    }
}
