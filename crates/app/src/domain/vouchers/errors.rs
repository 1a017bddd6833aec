//! Vouchers service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::vouchers::records::MAX_STORE_ID;

#[derive(Debug, Error)]
pub enum VouchersServiceError {
    #[error("issuing store id {0} exceeds {MAX_STORE_ID}")]
    InvalidStoreId(u16),

    #[error("no free voucher code found after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("timestamp out of range")]
    Timestamp(#[from] jiff::Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for VouchersServiceError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(_) | None => Self::Sql(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_stay_storage_errors() {
        let error = VouchersServiceError::from(Error::PoolTimedOut);

        assert!(
            matches!(error, VouchersServiceError::Sql(Error::PoolTimedOut)),
            "expected Sql, got {error:?}"
        );
    }
}
