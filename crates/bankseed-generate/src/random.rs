use chrono::{Duration, NaiveDateTime};
use rand::Rng;

/// Rounds to two decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Uniform currency amount in `[min, max)`, drawn at cent granularity.
pub fn uniform_cents<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    let low = (min * 100.0).round() as i64;
    let high = (max * 100.0).round() as i64;
    if low >= high {
        return round_cents(min);
    }
    rng.random_range(low..high) as f64 / 100.0
}

/// `now` minus a uniform number of whole days in `[min_days, max_days]`.
pub fn days_before<R: Rng + ?Sized>(
    rng: &mut R,
    now: NaiveDateTime,
    min_days: i64,
    max_days: i64,
) -> NaiveDateTime {
    now - Duration::days(rng.random_range(min_days..=max_days))
}

/// Uniform draw from a non-empty slice.
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, values: &'a [T]) -> Option<&'a T> {
    if values.is_empty() {
        return None;
    }
    Some(&values[rng.random_range(0..values.len())])
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn uniform_cents_stays_in_half_open_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..5_000 {
            let value = uniform_cents(&mut rng, 5.0, 3000.0);
            assert!((5.0..3000.0).contains(&value), "{value} out of range");
            assert_eq!(round_cents(value), value);
        }
    }

    #[test]
    fn days_before_respects_bounds() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..1_000 {
            let at = days_before(&mut rng, now, 1, 730);
            let age = (now - at).num_days();
            assert!((1..=730).contains(&age));
        }
    }

    #[test]
    fn pick_handles_empty_slice() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let empty: [u8; 0] = [];
        assert!(pick(&mut rng, &empty).is_none());
        assert_eq!(pick(&mut rng, &[3]), Some(&3));
    }
}
