//! Target width computation and resampling.

use image::imageops::FilterType;
use image::DynamicImage;

/// Computes the effective target widths for one source.
///
/// Starts from the normalized option widths; with `skip_upscale` every width
/// is clamped down to the source width. Widths of 0 or 1 px are dropped, the
/// set is deduplicated and ascending, and an empty result falls back to the
/// source's native width so every source yields at least one derivative.
pub fn target_widths(widths: &[u32], source_width: u32, skip_upscale: bool) -> Vec<u32> {
    let mut targets: Vec<u32> = widths
        .iter()
        .map(|&w| if skip_upscale { w.min(source_width) } else { w })
        .filter(|&w| w > 1)
        .collect();
    targets.sort_unstable();
    targets.dedup();
    if targets.is_empty() {
        targets.push(source_width);
    }
    targets
}

/// Aspect-preserving height for a resize to `width`.
///
/// Rounding rule: half-away-from-zero (`f64::round`), e.g. 187.5 → 188.
pub fn target_height(source_width: u32, source_height: u32, width: u32) -> u32 {
    let scaled = source_height as f64 * width as f64 / source_width as f64;
    (scaled.round() as u32).max(1)
}

/// Resamples `image` to `width` with Lanczos3, which holds up for both
/// down- and up-sampling. Callers skip this entirely when the width already
/// matches the source.
pub fn resize_to_width(image: &DynamicImage, width: u32) -> DynamicImage {
    let height = target_height(image.width(), image.height(), width);
    image.resize_exact(width, height, FilterType::Lanczos3)
}
