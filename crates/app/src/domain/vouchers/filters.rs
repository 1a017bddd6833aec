//! Voucher Filters
//!
//! Translates optional filter criteria into a conjunction of [`Predicate`]s
//! over stored columns. Status is not stored, so each status maps to an
//! explicit predicate on the dates evaluated at a single instant.
//!
//! The repository renders predicates to SQL, which is what queries run.
//! [`Predicate::matches`] mirrors that SQL for in-memory records.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::vouchers::{records::Voucher, status::VoucherStatus};

/// Date column a date range applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateType {
    #[default]
    Creation,
    Redemption,
    Expiration,
}

impl DateType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creation => "creation",
            Self::Redemption => "redemption",
            Self::Expiration => "expiration",
        }
    }

    /// Backing column name.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Creation => "creation_date",
            Self::Redemption => "redemption_date",
            Self::Expiration => "expiration_date",
        }
    }
}

impl Display for DateType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown date type `{0}`")]
pub struct ParseDateTypeError(String);

impl FromStr for DateType {
    type Err = ParseDateTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "creation" => Ok(Self::Creation),
            "redemption" => Ok(Self::Redemption),
            "expiration" => Ok(Self::Expiration),
            _ => Err(ParseDateTypeError(value.to_owned())),
        }
    }
}

/// Filter criteria. Absent fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoucherFilter {
    pub status: Option<VoucherStatus>,
    pub issuing_store_id: Option<u16>,
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
    pub date_type: DateType,
}

/// A single stored-column condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// `redemption_date` is set.
    Redeemed,

    /// `redemption_date` is not set.
    NotRedeemed,

    /// `expiration_date` is set and strictly before the instant.
    ExpiredBefore(Timestamp),

    /// `expiration_date` is not set, or on or after the instant.
    UnexpiredAt(Timestamp),

    /// The in-use flag is set.
    InUse,

    IssuingStore(u16),

    /// The selected date is set and on or after the instant.
    OnOrAfter(DateType, Timestamp),

    /// The selected date is set and on or before the instant.
    OnOrBefore(DateType, Timestamp),
}

impl Predicate {
    /// Evaluate the predicate against an in-memory record.
    #[must_use]
    pub fn matches(&self, voucher: &Voucher) -> bool {
        match *self {
            Self::Redeemed => voucher.redemption_date.is_some(),
            Self::NotRedeemed => voucher.redemption_date.is_none(),
            Self::ExpiredBefore(at) => voucher.expiration_date.is_some_and(|date| date < at),
            Self::UnexpiredAt(at) => voucher.expiration_date.is_none_or(|date| date >= at),
            Self::InUse => voucher.in_use,
            Self::IssuingStore(store) => voucher.issuing_store_id == store,
            Self::OnOrAfter(date_type, at) => voucher.date(date_type).is_some_and(|date| date >= at),
            Self::OnOrBefore(date_type, at) => voucher.date(date_type).is_some_and(|date| date <= at),
        }
    }
}

impl VoucherFilter {
    /// Predicates equivalent to this filter, with status evaluated at `now`.
    ///
    /// The Active status predicate does not exclude vouchers flagged in use,
    /// even though such vouchers derive to `InUse` when read.
    #[must_use]
    pub fn predicates(&self, now: Timestamp) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        match self.status {
            Some(VoucherStatus::Redeemed) => predicates.push(Predicate::Redeemed),
            Some(VoucherStatus::Expired) => {
                predicates.extend([Predicate::NotRedeemed, Predicate::ExpiredBefore(now)]);
            }
            Some(VoucherStatus::Active) => {
                predicates.extend([Predicate::NotRedeemed, Predicate::UnexpiredAt(now)]);
            }
            Some(VoucherStatus::InUse) => predicates.extend([
                Predicate::NotRedeemed,
                Predicate::UnexpiredAt(now),
                Predicate::InUse,
            ]),
            None => {}
        }

        if let Some(store) = self.issuing_store_id {
            predicates.push(Predicate::IssuingStore(store));
        }

        if let Some(from) = self.date_from {
            predicates.push(Predicate::OnOrAfter(self.date_type, from));
        }

        if let Some(to) = self.date_to {
            predicates.push(Predicate::OnOrBefore(self.date_type, to));
        }

        predicates
    }

    /// Evaluate the whole filter against an in-memory record.
    #[must_use]
    pub fn matches(&self, voucher: &Voucher, now: Timestamp) -> bool {
        self.predicates(now)
            .iter()
            .all(|predicate| predicate.matches(voucher))
    }
}

/// Predicates for the "only active" lookup: not redeemed and not expired at
/// `now`, regardless of the in-use flag.
#[must_use]
pub fn active_at(now: Timestamp) -> [Predicate; 2] {
    [Predicate::NotRedeemed, Predicate::UnexpiredAt(now)]
}
