//! Voucher Status

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::vouchers::records::Voucher;

/// Derived voucher state. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    Active,
    InUse,
    Redeemed,
    Expired,
}

impl VoucherStatus {
    /// Derive the status of `voucher` at `now`.
    ///
    /// Precedence is Redeemed, then Expired, then `InUse`, then Active: a
    /// voucher redeemed after its expiration date reports Redeemed, and an
    /// expired voucher reports Expired even while flagged in use.
    #[must_use]
    pub fn derive(voucher: &Voucher, now: Timestamp) -> Self {
        if voucher.is_redeemed() {
            return Self::Redeemed;
        }

        if !voucher.is_active(now) {
            return Self::Expired;
        }

        if voucher.in_use {
            return Self::InUse;
        }

        Self::Active
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InUse => "in_use",
            Self::Redeemed => "redeemed",
            Self::Expired => "expired",
        }
    }
}

impl Display for VoucherStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown voucher status `{0}`")]
pub struct ParseStatusError(String);

impl FromStr for VoucherStatus {
    type Err = ParseStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().replace('-', "_").as_str() {
            "active" => Ok(Self::Active),
            "in_use" | "inuse" => Ok(Self::InUse),
            "redeemed" => Ok(Self::Redeemed),
            "expired" => Ok(Self::Expired),
            _ => Err(ParseStatusError(value.to_owned())),
        }
    }
}
