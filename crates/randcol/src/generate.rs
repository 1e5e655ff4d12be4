//! Random replacement values

use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::config::ValueRange;

/// Draw a uniformly distributed value from `range`, rounded to the range's
/// number of fractional digits.
///
/// The rounded value never leaves `[min, max]`.
pub fn generate_value<R: Rng + ?Sized>(range: &ValueRange, rng: &mut R) -> f64 {
    let raw = rng.gen_range(range.min()..=range.max());
    round_to(raw, range.decimals()).clamp(range.min(), range.max())
}

/// Round half-to-even to `decimals` fractional digits.
///
/// The rounded decimal is parsed back from its text form, which yields the
/// nearest `f64`; its shortest printed form then has at most `decimals`
/// fractional digits. Values `rust_decimal` cannot represent are returned
/// unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(decimals).normalize())
        .and_then(|d| d.to_string().parse::<f64>().ok())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fractional_digits(value: f64) -> usize {
        let text = value.to_string();
        text.split_once('.').map_or(0, |(_, frac)| frac.len())
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(21.123456789012345, 13), 21.1234567890123);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(-1.25, 1), -1.2);
    }

    #[test]
    fn test_round_to_unrepresentable_is_identity() {
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(1e300, 2), 1e300);
    }

    #[test]
    fn test_default_range_values() {
        let range = ValueRange::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1_000 {
            let value = generate_value(&range, &mut rng);
            assert!(range.contains(value), "{} out of range", value);
            assert!(fractional_digits(value) <= 13, "{} has too many digits", value);
        }
    }

    #[test]
    fn test_draws_are_independent() {
        let range = ValueRange::default();
        let mut rng = StdRng::seed_from_u64(42);

        let values: Vec<f64> = (0..100).map(|_| generate_value(&range, &mut rng)).collect();
        let mut distinct = values.clone();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();
        assert_eq!(distinct.len(), values.len());
    }

    #[test]
    fn test_degenerate_range() {
        let range = ValueRange::new(5.5, 5.5, 13).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generate_value(&range, &mut rng), 5.5);
    }

    #[test]
    fn test_widest_accepted_range() {
        let range = ValueRange::new(-1e307, 1e307, 13).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            assert!(range.contains(generate_value(&range, &mut rng)));
        }
    }

    proptest! {
        #[test]
        fn prop_value_within_range(
            min in -1_000.0f64..1_000.0,
            width in 0.0f64..500.0,
            decimals in 0u32..=13,
            seed in any::<u64>(),
        ) {
            let range = ValueRange::new(min, min + width, decimals).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let value = generate_value(&range, &mut rng);
            prop_assert!(range.contains(value));
        }
    }
}
