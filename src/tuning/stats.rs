//! Distribution summaries and threshold suggestions.

use std::fmt;

use serde::Serialize;

use super::scan::ImageRecord;

/// Histogram bins for Otsu's method over `log10(blur_score)`.
pub const OTSU_BINS: usize = 128;

/// Central share of brightness values kept by the suggested bounds.
const BRIGHTNESS_TAIL_PERCENT: f64 = 2.5;

/// Linear-interpolated percentile of ascending `sorted` values, `q` in 0..=100.
/// Empty input yields 0.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (q.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Otsu's threshold over `log10` of the positive values, mapped back to linear.
///
/// Blur scores are heavy-tailed, so sharp and soft populations separate far
/// better on a log axis. Fewer than three positive values fall back to their
/// mean (0 when there are none).
pub fn otsu_log_threshold(values: &[f64], bins: usize) -> f64 {
    let positive: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    if positive.len() < 3 {
        if positive.is_empty() {
            return 0.0;
        }
        return positive.iter().sum::<f64>() / positive.len() as f64;
    }

    let bins = bins.max(2);
    let logs: Vec<f64> = positive.iter().map(|v| v.log10()).collect();
    let (mut lo, mut hi) = logs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let span = hi - lo;
    let edge = |i: usize| lo + span * i as f64 / bins as f64;

    let mut hist = vec![0u64; bins];
    for v in &logs {
        let idx = (((v - lo) / span) * bins as f64) as usize;
        hist[idx.min(bins - 1)] += 1;
    }

    let total = logs.len() as f64;
    let centers: Vec<f64> = (0..bins).map(|i| (edge(i) + edge(i + 1)) / 2.0).collect();
    let mu_total: f64 = hist
        .iter()
        .zip(&centers)
        .map(|(&count, &c)| count as f64 / total * c)
        .sum();

    let mut omega = 0.0;
    let mut mu = 0.0;
    let mut best_k = 0;
    let mut best_sigma = f64::NEG_INFINITY;
    for (k, (&count, &center)) in hist.iter().zip(&centers).enumerate() {
        let p = count as f64 / total;
        omega += p;
        mu += p * center;
        let denom = (omega * (1.0 - omega)).max(1e-12);
        let sigma = (mu_total * omega - mu).powi(2) / denom;
        if sigma > best_sigma {
            best_sigma = sigma;
            best_k = k;
        }
    }

    10f64.powf(centers[best_k])
}

/// Five-number-plus summary of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub min: f64,
    pub p10: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub p90: f64,
    pub max: f64,
}

impl Distribution {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sorted = sorted_copy(values);
        Some(Self {
            min: sorted[0],
            p10: percentile(&sorted, 10.0),
            p25: percentile(&sorted, 25.0),
            median: percentile(&sorted, 50.0),
            p75: percentile(&sorted, 75.0),
            p90: percentile(&sorted, 90.0),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Suggested environment values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Suggestions {
    pub blur_min: f64,
    pub bright_min: u8,
    pub bright_max: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningSummary {
    pub count: usize,
    pub blur: Distribution,
    pub brightness: Distribution,
    pub suggested: Suggestions,
}

/// Summarise scored images. `None` when nothing was scored.
pub fn summarize(records: &[ImageRecord]) -> Option<TuningSummary> {
    let blur: Vec<f64> = records.iter().map(|r| r.blur_score).collect();
    let brightness: Vec<f64> = records.iter().map(|r| r.brightness).collect();

    let blur_dist = Distribution::from_values(&blur)?;
    let brightness_dist = Distribution::from_values(&brightness)?;

    let sorted_brightness = sorted_copy(&brightness);
    let low = percentile(&sorted_brightness, BRIGHTNESS_TAIL_PERCENT);
    let high = percentile(&sorted_brightness, 100.0 - BRIGHTNESS_TAIL_PERCENT);

    Some(TuningSummary {
        count: records.len(),
        blur: blur_dist,
        brightness: brightness_dist,
        suggested: Suggestions {
            blur_min: otsu_log_threshold(&blur, OTSU_BINS),
            bright_min: low.round_ties_even().clamp(0.0, 255.0) as u8,
            bright_max: high.round_ties_even().clamp(0.0, 255.0) as u8,
        },
    })
}

impl TuningSummary {
    /// Human-readable report. `current` is the brightness range in use today.
    pub fn report(&self, current: (u8, u8)) -> SummaryReport<'_> {
        SummaryReport {
            summary: self,
            current,
        }
    }
}

/// Display adapter returned by [`TuningSummary::report`].
pub struct SummaryReport<'a> {
    summary: &'a TuningSummary,
    current: (u8, u8),
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let TuningSummary {
            count,
            blur: b,
            brightness: br,
            suggested: s,
        } = self.summary;
        let (cur_min, cur_max) = self.current;

        write!(
            f,
            "Analyzed {count} images.\n\
             Blur score (variance of Laplacian):\n  \
             min={:.2}  p10={:.2}  p25={:.2}  median={:.2}  p75={:.2}  p90={:.2}  max={:.2}\n\
             Brightness (0..255):\n  \
             min={:.1}  p10={:.1}  p25={:.1}  median={:.1}  p75={:.1}  p90={:.1}  max={:.1}\n\
             \n\
             Suggested thresholds:\n  \
             BLUR_MIN (log-Otsu) ~ {:.1}\n  \
             BRIGHT_MIN..BRIGHT_MAX ~ {}..{}  (current: {cur_min}..{cur_max})",
            b.min, b.p10, b.p25, b.median, b.p75, b.p90, b.max,
            br.min, br.p10, br.p25, br.median, br.p75, br.p90, br.max,
            s.blur_min, s.bright_min, s.bright_max,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(blur_score: f64, brightness: f64) -> ImageRecord {
        ImageRecord {
            path: PathBuf::from("x.jpg"),
            width: 100,
            height: 100,
            blur_score,
            brightness,
        }
    }

    // ── percentile ──

    #[test]
    fn percentile_interpolates_linearly() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&sorted, 0.0), 10.0);
        assert_eq!(percentile(&sorted, 100.0), 40.0);
        assert_eq!(percentile(&sorted, 50.0), 25.0);
        // rank 0.1 * 3 = 0.3
        assert!((percentile(&sorted, 10.0) - 13.0).abs() < 1e-12);
    }

    #[test]
    fn percentile_of_tiny_inputs() {
        assert_eq!(percentile(&[], 50.0), 0.0);
        assert_eq!(percentile(&[7.0], 90.0), 7.0);
    }

    // ── otsu ──

    #[test]
    fn otsu_falls_back_to_mean_for_few_values() {
        assert_eq!(otsu_log_threshold(&[], OTSU_BINS), 0.0);
        assert_eq!(otsu_log_threshold(&[0.0, -3.0], OTSU_BINS), 0.0);
        assert_eq!(otsu_log_threshold(&[10.0, 30.0], OTSU_BINS), 20.0);
        // Non-positive values are ignored before counting.
        assert_eq!(otsu_log_threshold(&[0.0, 10.0, 30.0], OTSU_BINS), 20.0);
    }

    #[test]
    fn otsu_separates_two_populations() {
        // Soft photos around 20, sharp around 2000: two decades apart.
        let mut values = Vec::new();
        for i in 0..20 {
            values.push(15.0 + i as f64 * 0.5);
            values.push(1500.0 + i as f64 * 50.0);
        }
        let t = otsu_log_threshold(&values, OTSU_BINS);
        assert!(t > 20.0 && t < 1500.0, "threshold = {t}");
    }

    #[test]
    fn otsu_handles_identical_values() {
        let t = otsu_log_threshold(&[100.0, 100.0, 100.0], OTSU_BINS);
        assert!(t.is_finite() && t > 0.0);
    }

    // ── summary ──

    #[test]
    fn empty_records_have_no_summary() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn summary_reports_distributions_and_suggestions() {
        let records: Vec<ImageRecord> = (0..=100)
            .map(|i| record(10.0 + i as f64 * 10.0, i as f64 * 2.0))
            .collect();
        let summary = summarize(&records).unwrap();

        assert_eq!(summary.count, 101);
        assert_eq!(summary.blur.min, 10.0);
        assert_eq!(summary.blur.max, 1010.0);
        assert_eq!(summary.blur.median, 510.0);
        assert_eq!(summary.brightness.p25, 50.0);
        // p2.5 = 5.0, p97.5 = 195.0
        assert_eq!(summary.suggested.bright_min, 5);
        assert_eq!(summary.suggested.bright_max, 195);
        assert!(summary.suggested.blur_min > 10.0 && summary.suggested.blur_min < 1010.0);
    }

    #[test]
    fn brightness_suggestions_round_half_to_even() {
        // Two records: p2.5 = 10 + 0.025 * 2 = 10.05, p97.5 = 11.95.
        let summary = summarize(&[record(1.0, 10.0), record(1.0, 12.0)]).unwrap();
        assert_eq!(summary.suggested.bright_min, 10);
        assert_eq!(summary.suggested.bright_max, 12);

        // Single value on an exact .5 rounds to even.
        let summary = summarize(&[record(1.0, 12.5)]).unwrap();
        assert_eq!(summary.suggested.bright_min, 12);
        assert_eq!(summary.suggested.bright_max, 12);
    }

    #[test]
    fn report_lists_every_section_in_order() {
        let summary = summarize(&[record(100.0, 80.0), record(200.0, 120.0), record(300.0, 160.0)])
            .unwrap();
        let report = summary.report((20, 235)).to_string();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "Analyzed 3 images.");
        assert_eq!(lines[1], "Blur score (variance of Laplacian):");
        assert!(lines[2].starts_with("  min=100.00  p10=120.00"), "{}", lines[2]);
        assert_eq!(lines[3], "Brightness (0..255):");
        assert!(lines[4].starts_with("  min=80.0"), "{}", lines[4]);
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Suggested thresholds:");
        assert!(lines[7].starts_with("  BLUR_MIN (log-Otsu) ~ "));
        assert!(lines[8].ends_with("(current: 20..235)"), "{}", lines[8]);
    }
}
