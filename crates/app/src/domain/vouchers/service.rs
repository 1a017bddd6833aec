//! Vouchers service.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::vouchers::{
        codes::{CodeGenerator, VoucherCode},
        data::{NewVoucher, Redemption},
        errors::VouchersServiceError,
        filters::VoucherFilter,
        records::{MAX_SALE_ID_LENGTH, MAX_STORE_ID, Voucher},
        repository::PgVouchersRepository,
        retention::retention_cutoff,
    },
};

/// Attempts at finding an unoccupied code before generation gives up.
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 1_000;

/// Days a code stays reserved after its voucher is redeemed or expires.
pub const CODE_REUSE_DAYS: i64 = 30;

type SharedCodeGenerator = Arc<Mutex<CodeGenerator<Box<dyn RngCore + Send>>>>;

#[derive(Debug, Clone)]
pub struct PgVouchersService {
    db: Db,
    repository: PgVouchersRepository,
    codes: SharedCodeGenerator,
    max_code_attempts: u32,
}

impl PgVouchersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self::with_rng(db, StdRng::from_entropy())
    }

    /// Build a service whose codes are drawn from `rng`.
    #[must_use]
    pub fn with_rng<R>(db: Db, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        let rng: Box<dyn RngCore + Send> = Box::new(rng);

        Self {
            db,
            repository: PgVouchersRepository::new(),
            codes: Arc::new(Mutex::new(CodeGenerator::new(rng))),
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_max_code_attempts(mut self, max_code_attempts: u32) -> Self {
        self.max_code_attempts = max_code_attempts;
        self
    }

    fn next_code(&self, issuing_store_id: u16) -> VoucherCode {
        self.codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate(issuing_store_id)
    }
}

#[async_trait]
impl VouchersService for PgVouchersService {
    async fn generate_voucher(&self, voucher: NewVoucher) -> Result<Voucher, VouchersServiceError> {
        if voucher.issuing_store_id > MAX_STORE_ID {
            return Err(VouchersServiceError::InvalidStoreId(voucher.issuing_store_id));
        }

        check_sale_id(voucher.issuing_sale_id.as_deref())?;

        let now = Timestamp::now();
        let reuse_horizon = now.checked_sub(SignedDuration::from_hours(24 * CODE_REUSE_DAYS))?;

        let mut tx = self.db.begin_transaction().await?;

        let mut attempts = 0;

        let code = loop {
            if attempts >= self.max_code_attempts {
                return Err(VouchersServiceError::CodeSpaceExhausted { attempts });
            }

            attempts += 1;

            let candidate = self.next_code(voucher.issuing_store_id);

            if !self
                .repository
                .code_is_occupied(&mut tx, candidate.as_str(), reuse_horizon)
                .await?
            {
                break candidate;
            }

            debug!(code = %candidate, attempts, "voucher code collision, retrying");
        };

        let created = self
            .repository
            .create_voucher(
                &mut tx,
                &Voucher {
                    code: code.into_string(),
                    amount: voucher.amount,
                    creation_date: now,
                    issuing_store_id: voucher.issuing_store_id,
                    expiration_date: voucher.expiration_date,
                    issuing_sale_id: voucher.issuing_sale_id,
                    redemption_date: None,
                    redemption_sale_id: None,
                    in_use: false,
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            code = %created.code,
            issuing_store_id = created.issuing_store_id,
            amount = %created.amount,
            "generated voucher"
        );

        Ok(created)
    }

    async fn get_by_code(
        &self,
        code: &str,
        only_active: bool,
    ) -> Result<Vec<Voucher>, VouchersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let vouchers = if only_active {
            self.repository
                .get_active_vouchers_by_code(&mut tx, code, Timestamp::now())
                .await?
        } else {
            self.repository.get_vouchers_by_code(&mut tx, code).await?
        };

        tx.commit().await?;

        Ok(vouchers)
    }

    async fn get_filtered(
        &self,
        filter: VoucherFilter,
    ) -> Result<Vec<Voucher>, VouchersServiceError> {
        let predicates = filter.predicates(Timestamp::now());

        let mut tx = self.db.begin_transaction().await?;

        let vouchers = self.repository.list_vouchers(&mut tx, &predicates).await?;

        tx.commit().await?;

        Ok(vouchers)
    }

    async fn redeem_voucher(
        &self,
        code: &str,
        redemption: Redemption,
    ) -> Result<Vec<Voucher>, VouchersServiceError> {
        check_sale_id(redemption.sale_id.as_deref())?;

        let now = Timestamp::now();

        let mut tx = self.db.begin_transaction().await?;

        let redemption_date = redemption.date.unwrap_or(now);

        let redeemed = self
            .repository
            .redeem_active_vouchers(
                &mut tx,
                code,
                now,
                redemption_date,
                redemption.sale_id.as_deref(),
            )
            .await?;

        tx.commit().await?;

        if redeemed.is_empty() {
            debug!(code, "no active vouchers to redeem");

            return Ok(redeemed);
        }

        info!(code, redeemed = redeemed.len(), "redeemed vouchers");

        Ok(redeemed)
    }

    async fn set_in_use(
        &self,
        code: &str,
        in_use: bool,
    ) -> Result<Vec<Voucher>, VouchersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = if in_use {
            self.repository
                .set_active_vouchers_in_use(&mut tx, code, Timestamp::now())
                .await?
        } else {
            self.repository.release_vouchers(&mut tx, code).await?
        };

        let vouchers = self.repository.get_vouchers_by_code(&mut tx, code).await?;

        tx.commit().await?;

        debug!(code, in_use, rows_affected, "updated in-use flag");

        Ok(vouchers)
    }

    async fn delete_old_vouchers(&self) -> Result<u64, VouchersServiceError> {
        let cutoff = retention_cutoff(Timestamp::now())?;

        let mut tx = self.db.begin_transaction().await?;

        let deleted = self.repository.delete_old_vouchers(&mut tx, cutoff).await?;

        tx.commit().await?;

        Ok(deleted)
    }

    async fn delete_all_vouchers(&self) -> Result<u64, VouchersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let deleted = self.repository.delete_all_vouchers(&mut tx).await?;

        tx.commit().await?;

        info!(deleted, "deleted all vouchers");

        Ok(deleted)
    }
}

fn check_sale_id(sale_id: Option<&str>) -> Result<(), VouchersServiceError> {
    match sale_id {
        Some(sale_id) if sale_id.chars().count() > MAX_SALE_ID_LENGTH => {
            Err(VouchersServiceError::InvalidData)
        }
        _ => Ok(()),
    }
}

#[automock]
#[async_trait]
pub trait VouchersService: Send + Sync {
    /// Issues a voucher under a freshly generated, unoccupied code.
    async fn generate_voucher(&self, voucher: NewVoucher) -> Result<Voucher, VouchersServiceError>;

    /// Retrieve the vouchers sharing a code, optionally only the active ones.
    async fn get_by_code(
        &self,
        code: &str,
        only_active: bool,
    ) -> Result<Vec<Voucher>, VouchersServiceError>;

    /// Retrieve the vouchers matching every criterion of the filter.
    async fn get_filtered(&self, filter: VoucherFilter)
    -> Result<Vec<Voucher>, VouchersServiceError>;

    /// Redeems every active voucher with the given code.
    ///
    /// An empty result means nothing was active under that code.
    async fn redeem_voucher(
        &self,
        code: &str,
        redemption: Redemption,
    ) -> Result<Vec<Voucher>, VouchersServiceError>;

    /// Sets or clears the in-use flag and returns every voucher with the code.
    ///
    /// Setting only touches active vouchers; clearing touches all of them.
    async fn set_in_use(
        &self,
        code: &str,
        in_use: bool,
    ) -> Result<Vec<Voucher>, VouchersServiceError>;

    /// Deletes vouchers redeemed or expired more than a year ago.
    async fn delete_old_vouchers(&self) -> Result<u64, VouchersServiceError>;

    /// Deletes every voucher.
    async fn delete_all_vouchers(&self) -> Result<u64, VouchersServiceError>;
}
