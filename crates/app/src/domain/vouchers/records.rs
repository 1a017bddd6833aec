//! Voucher Records

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::vouchers::{filters::DateType, status::VoucherStatus};

/// Highest issuing store id that fits the four digit code prefix.
pub const MAX_STORE_ID: u16 = 9_999;

/// Maximum length of the free-form sale references.
pub const MAX_SALE_ID_LENGTH: usize = 128;

/// Voucher Record
///
/// Rows carry no identity of their own; several rows may share a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voucher {
    pub code: String,
    pub amount: Decimal,
    pub creation_date: Timestamp,
    pub issuing_store_id: u16,
    pub expiration_date: Option<Timestamp>,
    pub issuing_sale_id: Option<String>,
    pub redemption_date: Option<Timestamp>,
    pub redemption_sale_id: Option<String>,
    pub in_use: bool,
}

impl Voucher {
    /// Status of the voucher as observed at `now`.
    #[must_use]
    pub fn status(&self, now: Timestamp) -> VoucherStatus {
        VoucherStatus::derive(self, now)
    }

    #[must_use]
    pub fn is_redeemed(&self) -> bool {
        self.redemption_date.is_some()
    }

    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expiration_date
            .is_some_and(|expiration_date| expiration_date < now)
    }

    /// Neither redeemed nor expired. The in-use flag is not considered.
    #[must_use]
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.is_redeemed() && !self.is_expired(now)
    }

    /// The date column selected by `date_type`.
    #[must_use]
    pub fn date(&self, date_type: DateType) -> Option<Timestamp> {
        match date_type {
            DateType::Creation => Some(self.creation_date),
            DateType::Redemption => self.redemption_date,
            DateType::Expiration => self.expiration_date,
        }
    }
}
