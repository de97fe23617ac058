// realism-gate-critics/src/pixel_stats.rs
// ============================================================================
// Module: Pixel Statistics
// Description: Foreground ratio, aspect, entropy, magenta ratio, clipping,
//              and noise estimate computed directly from rendered pixels.
// Purpose: Share one closed-form image-statistics pass between the
//          Category and Realism/Quality critics.
// Dependencies: image
// ============================================================================

//! Image statistics shared by the Category and Realism/Quality critics
//! (§4.3.1, §4.3.3): all derived directly from rendered pixels, not from a
//! trained model, matching the closed-form-estimator posture described for
//! every critic in this stack.

use image::Rgb;
use image::RgbImage;

/// The number of luminance histogram bins used to estimate entropy.
const ENTROPY_BINS: usize = 16;

/// A "default-missing-texture" magenta the reference renderer paints when
/// an asset's material declares a dangling texture reference.
const MAGENTA: Rgb<u8> = Rgb([230, 20, 220]);
/// Euclidean distance (in the 0..=255 per-channel cube) below which a pixel
/// is treated as a match for [`MAGENTA`].
const MAGENTA_TOLERANCE: f64 = 40.0;

/// Closed-form statistics computed directly from one rendered image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStats {
    /// Fraction of pixels classified as foreground (the rendered asset,
    /// rather than background/backdrop).
    pub foreground_area_ratio: f64,
    /// Width-over-height ratio of the foreground pixels' bounding box.
    /// `1.0` when no foreground pixels were found.
    pub foreground_aspect_ratio: f64,
    /// Shannon entropy of the luminance histogram, normalized to `[0, 1]`.
    pub entropy: f64,
    /// Fraction of pixels within [`MAGENTA_TOLERANCE`] of [`MAGENTA`].
    pub magenta_ratio: f64,
    /// Fraction of pixels at or near full black or full white.
    pub clipping_ratio: f64,
    /// Mean absolute luminance difference between horizontally adjacent
    /// foreground pixels, a proxy for high-frequency render noise.
    pub noise_estimate: f64,
}

/// Computes [`ImageStats`] for `image`, treating the pixel at `(0, 0)` as
/// the background reference (valid for every view this renderer produces:
/// see `reference::silhouette_semi_axes`'s clamp, which keeps the
/// silhouette away from every image corner).
#[must_use]
pub fn compute(image: &RgbImage) -> ImageStats {
    let background = *image.get_pixel(0, 0);
    let background_luminance = luminance(background);

    let mut foreground_count: u64 = 0;
    let mut magenta_count: u64 = 0;
    let mut clipped_count: u64 = 0;
    let mut histogram = [0u64; ENTROPY_BINS];
    let mut min_x = image.width();
    let mut max_x = 0u32;
    let mut min_y = image.height();
    let mut max_y = 0u32;
    let mut noise_sum = 0.0;
    let mut noise_samples: u64 = 0;
    let mut previous_luminance: Option<f64> = None;

    for y in 0..image.height() {
        previous_luminance = None;
        for x in 0..image.width() {
            let pixel = *image.get_pixel(x, y);
            let pixel_luminance = luminance(pixel);
            let is_foreground = channel_distance(pixel, background) > 0.08 || (pixel_luminance - background_luminance).abs() > 0.05;

            if is_foreground {
                foreground_count += 1;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
                if channel_distance(pixel, MAGENTA) < MAGENTA_TOLERANCE {
                    magenta_count += 1;
                }
                if let Some(previous) = previous_luminance {
                    noise_sum += (pixel_luminance - previous).abs();
                    noise_samples += 1;
                }
            }
            previous_luminance = Some(pixel_luminance);

            if pixel_luminance <= 0.01 || pixel_luminance >= 0.99 {
                clipped_count += 1;
            }

            let bin = ((pixel_luminance * f64_from_usize(ENTROPY_BINS)) as usize).min(ENTROPY_BINS - 1);
            histogram[bin] += 1;
        }
    }

    let total_pixels = u64::from(image.width()) * u64::from(image.height());
    let total = f64_from_u64(total_pixels.max(1));

    let foreground_aspect_ratio = if foreground_count == 0 {
        1.0
    } else {
        let width = f64_from_u64(u64::from(max_x.saturating_sub(min_x)) + 1);
        let height = f64_from_u64(u64::from(max_y.saturating_sub(min_y)) + 1);
        width / height.max(1.0)
    };

    ImageStats {
        foreground_area_ratio: f64_from_u64(foreground_count) / total,
        foreground_aspect_ratio,
        entropy: histogram_entropy(&histogram),
        magenta_ratio: f64_from_u64(magenta_count) / total,
        clipping_ratio: f64_from_u64(clipped_count) / total,
        noise_estimate: if noise_samples == 0 { 0.0 } else { noise_sum / f64_from_u64(noise_samples) },
    }
}

/// Rec. 601 luma, normalized to `[0, 1]`.
fn luminance(pixel: Rgb<u8>) -> f64 {
    let [r, g, b] = pixel.0;
    (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0
}

/// Euclidean distance between two pixels in the 0..=255 per-channel cube.
fn channel_distance(a: Rgb<u8>, b: Rgb<u8>) -> f64 {
    let [ar, ag, ab] = a.0;
    let [br, bg, bb] = b.0;
    let dr = f64::from(ar) - f64::from(br);
    let dg = f64::from(ag) - f64::from(bg);
    let db = f64::from(ab) - f64::from(bb);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Shannon entropy of a histogram, normalized by `log2(bin count)` so the
/// result lands in `[0, 1]`.
fn histogram_entropy(histogram: &[u64; ENTROPY_BINS]) -> f64 {
    let total = f64_from_u64(histogram.iter().sum::<u64>().max(1));
    let raw_entropy: f64 = histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let probability = f64_from_u64(count) / total;
            -probability * probability.log2()
        })
        .sum();
    let max_entropy = f64_from_usize(ENTROPY_BINS).log2();
    (raw_entropy / max_entropy).clamp(0.0, 1.0)
}

#[allow(clippy::cast_precision_loss, reason = "pixel counts stay far below f64's exact-integer range")]
fn f64_from_u64(value: u64) -> f64 {
    value as f64
}

#[allow(clippy::cast_precision_loss, reason = "bin counts are tiny constants")]
fn f64_from_usize(value: usize) -> f64 {
    value as f64
}

#[cfg(test)]
mod tests {
    use image::Rgb;
    use image::RgbImage;

    use super::compute;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
        let mut image = RgbImage::new(width, height);
        for pixel in image.pixels_mut() {
            *pixel = Rgb(color);
        }
        image
    }

    #[test]
    fn uniform_background_has_no_foreground() {
        let image = solid(16, 16, [240, 240, 240]);
        let stats = compute(&image);
        assert_eq!(stats.foreground_area_ratio, 0.0);
    }

    #[test]
    fn a_centered_block_is_detected_as_foreground() {
        let mut image = solid(20, 20, [240, 240, 240]);
        for y in 5..15 {
            for x in 5..15 {
                image.put_pixel(x, y, Rgb([30, 30, 30]));
            }
        }
        let stats = compute(&image);
        assert!(stats.foreground_area_ratio > 0.2);
        assert!((stats.foreground_aspect_ratio - 1.0).abs() < 0.2);
    }

    #[test]
    fn magenta_pixels_are_counted() {
        let mut image = solid(10, 10, [240, 240, 240]);
        for y in 2..8 {
            for x in 2..8 {
                image.put_pixel(x, y, Rgb([230, 20, 220]));
            }
        }
        let stats = compute(&image);
        assert!(stats.magenta_ratio > 0.3);
    }

    #[test]
    fn a_flat_image_has_zero_entropy() {
        let image = solid(8, 8, [128, 128, 128]);
        let stats = compute(&image);
        assert_eq!(stats.entropy, 0.0);
    }
}
