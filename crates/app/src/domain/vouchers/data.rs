//! Voucher Data

use jiff::Timestamp;
use rust_decimal::Decimal;

/// New Voucher Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVoucher {
    pub amount: Decimal,
    pub issuing_store_id: u16,
    pub expiration_date: Option<Timestamp>,
    pub issuing_sale_id: Option<String>,
}

/// Redemption Data
///
/// When `date` is absent the redemption is stamped with the current time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redemption {
    pub sale_id: Option<String>,
    pub date: Option<Timestamp>,
}
