//! Metrics engine: sharpness (variance of Laplacian) and brightness (mean luma).
//!
//! Both are computed over the resized grayscale grid, so absolute values
//! depend on `resize_max_dim`. Tune thresholds with the same value you serve with.

use image::GrayImage;

use super::types::Metrics;

/// Compute both metrics for a grayscale grid.
pub fn compute_metrics(gray: &GrayImage) -> Metrics {
    Metrics {
        blur_score: laplacian_variance(gray),
        brightness: mean_brightness(gray),
    }
}

/// Arithmetic mean of all samples, 0..=255. Empty grids score 0.
pub fn mean_brightness(gray: &GrayImage) -> f64 {
    let samples = gray.as_raw();
    if samples.is_empty() {
        return 0.0;
    }
    let sum: u64 = samples.iter().map(|&v| u64::from(v)).sum();
    sum as f64 / samples.len() as f64
}

/// Population variance of the 4-neighbour Laplacian response.
///
/// Kernel `[0,1,0; 1,-4,1; 0,1,0]` applied at every pixel, borders included.
/// Out-of-range neighbours use reflect-101 (`dcb|abcd|cba`): the edge pixel
/// itself is not repeated. Sums are accumulated in integers and the variance
/// is formed once as `(N·Σx² − (Σx)²) / N²`, so the result is reproducible
/// bit for bit.
///
/// Higher = more high-frequency edge content = sharper.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    let n = u64::from(w) * u64::from(h);
    if n == 0 {
        return 0.0;
    }

    let (w, h) = (i64::from(w), i64::from(h));
    let samples = gray.as_raw();
    let at = |x: i64, y: i64| i64::from(samples[(y * w + x) as usize]);

    let mut sum: i128 = 0;
    let mut sum_sq: i128 = 0;

    for y in 0..h {
        let up = reflect_101(y - 1, h);
        let down = reflect_101(y + 1, h);
        for x in 0..w {
            let left = reflect_101(x - 1, w);
            let right = reflect_101(x + 1, w);

            let response = at(x, up) + at(x, down) + at(left, y) + at(right, y) - 4 * at(x, y);
            sum += i128::from(response);
            sum_sq += i128::from(response * response);
        }
    }

    let n = i128::from(n);
    let numerator = n * sum_sq - sum * sum;
    numerator as f64 / (n as f64 * n as f64)
}

/// Reflect an index that is at most one step outside `0..len`.
/// A length-1 axis clamps to its only sample.
fn reflect_101(i: i64, len: i64) -> i64 {
    if len == 1 {
        0
    } else if i < 0 {
        -i
    } else if i >= len {
        2 * len - 2 - i
    } else {
        i
    }
}
