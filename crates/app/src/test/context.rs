//! Test context for service-level integration tests.

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    database::Db,
    domain::vouchers::{
        PgVouchersService, VouchersService, filters::VoucherFilter, records::Voucher,
        repository::PgVouchersRepository,
    },
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub vouchers: PgVouchersService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;

        Self {
            vouchers: PgVouchersService::with_rng(
                Db::new(test_db.pool().clone()),
                StdRng::seed_from_u64(0x5EED),
            ),
            db: test_db,
        }
    }

    pub fn database(&self) -> Db {
        Db::new(self.db.pool().clone())
    }

    /// Insert a voucher row as-is, bypassing code generation.
    pub async fn seed(&self, voucher: &Voucher) -> Voucher {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .expect("Failed to begin seed transaction");

        let seeded = PgVouchersRepository::new()
            .create_voucher(&mut tx, voucher)
            .await
            .expect("Failed to seed voucher");

        tx.commit().await.expect("Failed to commit seeded voucher");

        seeded
    }

    /// Every stored voucher, regardless of status.
    pub async fn all_vouchers(&self) -> Vec<Voucher> {
        self.vouchers
            .get_filtered(VoucherFilter::default())
            .await
            .expect("Failed to list vouchers")
    }

    /// Current stored state of the rows sharing `code`.
    pub async fn vouchers_with_code(&self, code: &str) -> Vec<Voucher> {
        self.vouchers
            .get_by_code(code, false)
            .await
            .expect("Failed to look up vouchers")
    }
}
