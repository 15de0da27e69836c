//! Percentage normalization of the supply distribution.

use tracing::debug;

use crate::model::{DEFAULT_DISTRIBUTION, DistributionSegment};

/// Returns the built-in distribution with percentages left for normalization.
pub fn default_segments() -> Vec<DistributionSegment> {
    DEFAULT_DISTRIBUTION
        .iter()
        .map(|(category, amount, color)| DistributionSegment::new(*category, *amount, *color))
        .collect()
}

/// Recomputes segment percentages so they total 100 and orders the segments
/// from largest to smallest amount.
///
/// Supplied positive percentages are kept before rescaling; others are
/// derived from the amount over `reference_total`, or over the sum of amounts
/// when the reference is not positive. Ties in amount keep input order.
pub fn normalize(segments: Vec<DistributionSegment>, reference_total: f64) -> Vec<DistributionSegment> {
    if segments.is_empty() {
        return segments;
    }

    let mut denominator = if reference_total > 0.0 {
        reference_total
    } else {
        segments.iter().map(|segment| segment.amount_btc).sum()
    };
    if denominator <= 0.0 {
        denominator = 1.0;
    }

    let mut normalized: Vec<DistributionSegment> = segments
        .into_iter()
        .map(|mut segment| {
            if segment.percent <= 0.0 {
                segment.percent = segment.amount_btc / denominator * 100.0;
            }
            segment
        })
        .collect();

    let total: f64 = normalized.iter().map(|segment| segment.percent).sum();
    if total > 0.0 {
        for segment in &mut normalized {
            segment.percent = segment.percent / total * 100.0;
        }
    }

    normalized.sort_by(|lhs, rhs| rhs.amount_btc.total_cmp(&lhs.amount_btc));
    debug!(segments = normalized.len(), denominator, "distribution normalized");
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percent_total(segments: &[DistributionSegment]) -> f64 {
        segments.iter().map(|segment| segment.percent).sum()
    }

    fn segment(category: &str, amount: f64, percent: f64) -> DistributionSegment {
        DistributionSegment {
            percent,
            ..DistributionSegment::new(category, amount, "#000")
        }
    }

    #[test]
    fn defaults_normalize_to_one_hundred() {
        let normalized = normalize(default_segments(), 21_000_000.0);

        assert!((percent_total(&normalized) - 100.0).abs() < 1e-6);
        assert_eq!(normalized[0].category, "Individuals");
        assert!(
            normalized
                .windows(2)
                .all(|pair| pair[0].amount_btc >= pair[1].amount_btc)
        );
    }

    #[test]
    fn amounts_are_rescaled_against_reference_total() {
        let normalized = normalize(vec![segment("a", 25.0, 0.0), segment("b", 25.0, 0.0)], 100.0);

        assert!((normalized[0].percent - 50.0).abs() < 1e-9);
        assert!((normalized[1].percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_percentages_are_rescaled_too() {
        let normalized = normalize(
            vec![segment("small", 10.0, 30.0), segment("large", 90.0, 0.0)],
            0.0,
        );

        // large derives 90 over a sum of 100, then both shares rescale by 120.
        assert_eq!(normalized[0].category, "large");
        assert!((normalized[0].percent - 75.0).abs() < 1e-9);
        assert!((normalized[1].percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn equal_amounts_keep_encounter_order() {
        let normalized = normalize(
            vec![segment("first", 5.0, 0.0), segment("second", 5.0, 0.0), segment("big", 9.0, 0.0)],
            0.0,
        );
        let order: Vec<_> = normalized.iter().map(|s| s.category.as_str()).collect();

        assert_eq!(order, vec!["big", "first", "second"]);
    }

    #[test]
    fn zero_amounts_do_not_divide_by_zero() {
        let normalized = normalize(vec![segment("a", 0.0, 0.0), segment("b", 0.0, 0.0)], 0.0);

        assert!(normalized.iter().all(|segment| segment.percent == 0.0));
        assert!(normalize(Vec::new(), 100.0).is_empty());
    }
}
