//! Decision policy: inclusive threshold comparison.

use serde::Serialize;

use super::types::Metrics;

/// The bounds a decision was made against. Echoed back in every result so a
/// caller can tell why an image was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub blur_min: f64,
    pub bright_min: f64,
    pub bright_max: f64,
}

impl Thresholds {
    pub fn is_sharp_enough(&self, blur_score: f64) -> bool {
        blur_score >= self.blur_min
    }

    pub fn is_well_exposed(&self, brightness: f64) -> bool {
        self.bright_min <= brightness && brightness <= self.bright_max
    }
}

/// `blur_score >= blur_min` and `bright_min <= brightness <= bright_max`.
///
/// All bounds inclusive. NaN metrics never pass.
pub fn is_acceptable(metrics: &Metrics, thresholds: &Thresholds) -> bool {
    thresholds.is_sharp_enough(metrics.blur_score) && thresholds.is_well_exposed(metrics.brightness)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: Thresholds = Thresholds {
        blur_min: 160.0,
        bright_min: 40.0,
        bright_max: 180.0,
    };

    fn metrics(blur_score: f64, brightness: f64) -> Metrics {
        Metrics {
            blur_score,
            brightness,
        }
    }

    #[test]
    fn sharp_well_lit_photo_is_accepted() {
        assert!(is_acceptable(&metrics(300.0, 110.0), &THRESHOLDS));
    }

    #[test]
    fn blurry_photo_is_rejected() {
        assert!(!is_acceptable(&metrics(40.0, 110.0), &THRESHOLDS));
    }

    #[test]
    fn black_frame_is_rejected_however_sharp() {
        assert!(!is_acceptable(&metrics(1.0e9, 0.0), &THRESHOLDS));
    }

    #[test]
    fn overexposed_frame_is_rejected() {
        assert!(!is_acceptable(&metrics(300.0, 181.0), &THRESHOLDS));
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert!(is_acceptable(&metrics(160.0, 110.0), &THRESHOLDS));
        assert!(is_acceptable(&metrics(300.0, 40.0), &THRESHOLDS));
        assert!(is_acceptable(&metrics(300.0, 180.0), &THRESHOLDS));
        assert!(is_acceptable(&metrics(160.0, 40.0), &THRESHOLDS));
    }

    #[test]
    fn just_outside_boundaries_is_rejected() {
        let below_blur = f64::from_bits(160.0f64.to_bits() - 1);
        assert!(!is_acceptable(&metrics(below_blur, 110.0), &THRESHOLDS));
        assert!(!is_acceptable(&metrics(300.0, 39.999), &THRESHOLDS));
        assert!(!is_acceptable(&metrics(300.0, 180.001), &THRESHOLDS));
    }

    #[test]
    fn nan_metrics_never_pass() {
        assert!(!is_acceptable(&metrics(f64::NAN, 110.0), &THRESHOLDS));
        assert!(!is_acceptable(&metrics(300.0, f64::NAN), &THRESHOLDS));
    }

    #[test]
    fn decision_is_exactly_the_conjunction() {
        let blurs = [0.0, 159.0, 160.0, 161.0, 1000.0];
        let brights = [0.0, 39.0, 40.0, 100.0, 180.0, 181.0, 255.0];
        for &b in &blurs {
            for &br in &brights {
                let expected = b >= 160.0 && (40.0..=180.0).contains(&br);
                assert_eq!(is_acceptable(&metrics(b, br), &THRESHOLDS), expected, "{b} {br}");
            }
        }
    }
}
