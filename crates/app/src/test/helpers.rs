//! Test Helpers

use jiff::{SignedDuration, Timestamp, ToSpan, tz::TimeZone};
use rust_decimal::Decimal;

use crate::domain::vouchers::records::Voucher;

pub(crate) fn days(n: i64) -> SignedDuration {
    SignedDuration::from_hours(24 * n)
}

/// `now` moved back by `n` calendar years, in UTC.
pub(crate) fn years_before(now: Timestamp, n: i64) -> Timestamp {
    now.to_zoned(TimeZone::UTC)
        .checked_sub(n.years())
        .expect("date out of range")
        .timestamp()
}

/// A fresh, unredeemed, never-expiring voucher.
pub(crate) fn voucher(code: &str, issuing_store_id: u16, creation_date: Timestamp) -> Voucher {
    Voucher {
        code: code.to_string(),
        amount: Decimal::new(10_000, 2),
        creation_date,
        issuing_store_id,
        expiration_date: None,
        issuing_sale_id: None,
        redemption_date: None,
        redemption_sale_id: None,
        in_use: false,
    }
}

pub(crate) fn expiring(mut voucher: Voucher, expiration_date: Timestamp) -> Voucher {
    voucher.expiration_date = Some(expiration_date);
    voucher
}

pub(crate) fn redeemed(mut voucher: Voucher, redemption_date: Timestamp) -> Voucher {
    voucher.redemption_date = Some(redemption_date);
    voucher
}

pub(crate) fn in_use(mut voucher: Voucher) -> Voucher {
    voucher.in_use = true;
    voucher
}
