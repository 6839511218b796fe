//! Price quoting for a stay.
//!
//! Pure decimal arithmetic — no persistence, no side effects. The
//! quote is recomputed on every input change, so this has to stay
//! cheap enough to run per keystroke in the calling layer.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// Platform commission applied to the subtotal (10%).
pub const SERVICE_FEE_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Price breakdown for a prospective stay.
///
/// Values are exact decimals; display rounding is the caller's
/// concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub nights: u32,
    pub subtotal: Decimal,
    pub service_fee: Decimal,
    pub total: Decimal,
}

/// Compute the price breakdown for a stay.
///
/// Pricing is per guest per night: `subtotal = rate × nights ×
/// guests`, plus a 10% service fee.
///
/// Fails with [`BookingError::InvalidDateRange`] unless check-out is
/// strictly after check-in, and with
/// [`BookingError::GuestCountOutOfRange`] unless
/// `1 <= guests <= max_guests`.
pub fn compute_quote(
    nightly_rate: Decimal,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: u32,
    max_guests: u32,
) -> Result<Quote, BookingError> {
    if nightly_rate <= Decimal::ZERO {
        return Err(BookingError::InvalidRate);
    }
    if check_out <= check_in {
        return Err(BookingError::InvalidDateRange);
    }
    if guests < 1 || guests > max_guests {
        return Err(BookingError::GuestCountOutOfRange { guests, max_guests });
    }

    let nights = (check_out - check_in).num_days().max(1) as u32;

    let subtotal = nightly_rate * Decimal::from(nights) * Decimal::from(guests);
    let service_fee = subtotal * SERVICE_FEE_RATE;
    let total = subtotal + service_fee;

    Ok(Quote {
        nights,
        subtotal,
        service_fee,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn three_nights_two_guests() {
        // 100/night, 3 nights, 2 guests -> 600 + 60 fee = 660.
        let quote = compute_quote(
            Decimal::from(100),
            date("2024-06-01"),
            date("2024-06-04"),
            2,
            4,
        )
        .unwrap();

        assert_eq!(quote.nights, 3);
        assert_eq!(quote.subtotal, Decimal::from(600));
        assert_eq!(quote.service_fee, Decimal::from(60));
        assert_eq!(quote.total, Decimal::from(660));
    }

    #[test]
    fn total_is_subtotal_plus_ten_percent() {
        for (rate, nights, guests) in [(1u32, 1u32, 1u32), (75, 2, 3), (12345, 14, 6)] {
            let check_in = date("2024-03-01");
            let check_out = check_in + chrono::Days::new(nights as u64);
            let quote =
                compute_quote(Decimal::from(rate), check_in, check_out, guests, guests).unwrap();

            let expected_subtotal = Decimal::from(rate * nights * guests);
            assert_eq!(quote.nights, nights);
            assert_eq!(quote.subtotal, expected_subtotal);
            assert_eq!(quote.total, expected_subtotal + quote.service_fee);
            assert_eq!(quote.service_fee, expected_subtotal * SERVICE_FEE_RATE);
        }
    }

    #[test]
    fn fractional_rates_stay_exact() {
        let quote = compute_quote(
            "99.99".parse().unwrap(),
            date("2024-06-01"),
            date("2024-06-02"),
            1,
            2,
        )
        .unwrap();

        assert_eq!(quote.subtotal, "99.99".parse::<Decimal>().unwrap());
        assert_eq!(quote.service_fee, "9.999".parse::<Decimal>().unwrap());
        assert_eq!(quote.total, "109.989".parse::<Decimal>().unwrap());
    }

    #[test]
    fn checkout_on_or_before_checkin_is_rejected() {
        for check_out in ["2024-06-01", "2024-05-20"] {
            let err = compute_quote(
                Decimal::from(100),
                date("2024-06-01"),
                date(check_out),
                2,
                4,
            )
            .unwrap_err();
            assert!(matches!(err, BookingError::InvalidDateRange));
        }
    }

    #[test]
    fn guest_count_bounds() {
        let err = compute_quote(
            Decimal::from(100),
            date("2024-06-01"),
            date("2024-06-04"),
            0,
            4,
        )
        .unwrap_err();
        assert!(matches!(err, BookingError::GuestCountOutOfRange { .. }));

        let err = compute_quote(
            Decimal::from(100),
            date("2024-06-01"),
            date("2024-06-04"),
            5,
            4,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BookingError::GuestCountOutOfRange {
                guests: 5,
                max_guests: 4
            }
        ));
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        for rate in [Decimal::ZERO, Decimal::from(-10)] {
            let err = compute_quote(rate, date("2024-06-01"), date("2024-06-04"), 2, 4)
                .unwrap_err();
            assert!(matches!(err, BookingError::InvalidRate));
        }
    }
}
