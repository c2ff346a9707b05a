//! Conversion options: the immutable per-batch configuration value.

use serde::{Deserialize, Serialize};

use crate::utils::{ConvertError, ConvertResult};

/// Responsive width preset matching common layout breakpoints.
pub const DEFAULT_WIDTHS: [u32; 6] = [640, 768, 1024, 1280, 1536, 1920];

/// Default derivative name template, e.g. `photo-640w.webp`.
pub const DEFAULT_NAME_PATTERN: &str = "{name}-{width}w.webp";

/// Configuration for one batch run, shared read-only by all workers.
///
/// Construct, then call [`ConversionOptions::normalized`] once before
/// scheduling; the engine rejects the whole batch on invalid options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Target widths in pixels. Normalized to positive, deduplicated, ascending.
    pub widths: Vec<u32>,
    /// Lossy encoding quality in 0..=100.
    pub quality: u8,
    /// Copy source EXIF and ICC bytes verbatim to every derivative.
    pub keep_metadata: bool,
    /// Never produce a derivative wider than the source.
    pub skip_upscale: bool,
    /// Encode sources carrying an alpha channel losslessly, ignoring `quality`.
    pub lossless_for_alpha: bool,
    /// Derivative name template containing `{name}` and `{width}`.
    pub name_pattern: String,
    /// Upper bound on simultaneous in-flight pipeline invocations.
    pub concurrency: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            widths: DEFAULT_WIDTHS.to_vec(),
            quality: 80,
            keep_metadata: false,
            skip_upscale: true,
            lossless_for_alpha: true,
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
            concurrency: default_concurrency(),
        }
    }
}

/// Default worker count: host CPU count clamped to 2..=32.
///
/// An explicit field rather than ambient global state, so a driver can always
/// see and override the value it is running with.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .clamp(2, 32)
}

impl ConversionOptions {
    /// Normalizes widths and validates every field, returning the canonical
    /// options for a batch run or a `Config` error that rejects the batch.
    pub fn normalized(mut self) -> ConvertResult<Self> {
        self.widths.retain(|&w| w > 0);
        self.widths.sort_unstable();
        self.widths.dedup();
        if self.widths.is_empty() {
            return Err(ConvertError::config("at least one positive target width is required"));
        }
        if self.quality > 100 {
            return Err(ConvertError::config(format!(
                "quality must be in 0..=100, got {}",
                self.quality
            )));
        }
        if self.concurrency == 0 {
            return Err(ConvertError::config("concurrency must be at least 1"));
        }
        validate_name_pattern(&self.name_pattern)?;
        Ok(self)
    }

    /// Renders the derivative file name for one (source stem, width) pair.
    pub fn render_name(&self, stem: &str, width: u32) -> String {
        self.name_pattern
            .replace("{name}", stem)
            .replace("{width}", &width.to_string())
    }
}

/// Parses a width list like `"640, 768; 1024"`. Non-numeric and non-positive
/// entries are dropped; the result is deduplicated and ascending.
pub fn parse_widths(text: &str) -> Vec<u32> {
    let mut widths: Vec<u32> = text
        .replace(';', ",")
        .split(',')
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .filter(|&w| w > 0)
        .collect();
    widths.sort_unstable();
    widths.dedup();
    widths
}

fn validate_name_pattern(pattern: &str) -> ConvertResult<()> {
    if !pattern.contains("{name}") || !pattern.contains("{width}") {
        return Err(ConvertError::config(
            "name pattern must contain both {name} and {width} placeholders",
        ));
    }

    // Probe-render: the result must be a single, non-empty path component.
    let probe = pattern.replace("{name}", "probe").replace("{width}", "1");
    if probe.is_empty()
        || probe == "."
        || probe == ".."
        || probe.contains(['/', '\\', '\0'])
    {
        return Err(ConvertError::config(format!(
            "name pattern renders to an unsafe file name: {probe:?}"
        )));
    }
    Ok(())
}
