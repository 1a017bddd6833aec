//! Vouchers Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{
    FromRow, Postgres, QueryBuilder, Row, Transaction, postgres::PgRow, query, query_as,
    query_scalar,
};
use tracing::debug;

use crate::domain::vouchers::{
    filters::{Predicate, active_at},
    records::Voucher,
};

const GET_VOUCHERS_BY_CODE_SQL: &str = include_str!("sql/get_vouchers_by_code.sql");
const LIST_VOUCHERS_SQL: &str = include_str!("sql/list_vouchers.sql");
const CODE_IS_OCCUPIED_SQL: &str = include_str!("sql/code_is_occupied.sql");
const CREATE_VOUCHER_SQL: &str = include_str!("sql/create_voucher.sql");
const REDEEM_ACTIVE_VOUCHERS_SQL: &str = include_str!("sql/redeem_active_vouchers.sql");
const SET_ACTIVE_VOUCHERS_IN_USE_SQL: &str = include_str!("sql/set_active_vouchers_in_use.sql");
const RELEASE_VOUCHERS_SQL: &str = include_str!("sql/release_vouchers.sql");
const DELETE_OLD_VOUCHERS_SQL: &str = include_str!("sql/delete_old_vouchers.sql");
const DELETE_ALL_VOUCHERS_SQL: &str = include_str!("sql/delete_all_vouchers.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVouchersRepository;

impl PgVouchersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    #[tracing::instrument(
        name = "vouchers.repository.get_vouchers_by_code",
        skip(self, tx),
        err
    )]
    pub(crate) async fn get_vouchers_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Vec<Voucher>, sqlx::Error> {
        query_as::<Postgres, Voucher>(GET_VOUCHERS_BY_CODE_SQL)
            .bind(code)
            .fetch_all(&mut **tx)
            .await
    }

    #[tracing::instrument(
        name = "vouchers.repository.get_active_vouchers_by_code",
        skip(self, tx),
        err
    )]
    pub(crate) async fn get_active_vouchers_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        now: Timestamp,
    ) -> Result<Vec<Voucher>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(LIST_VOUCHERS_SQL);

        builder.push(" AND code = ").push_bind(code);

        for predicate in active_at(now) {
            builder.push(" AND ");
            push_predicate(&mut builder, predicate);
        }

        builder.push(" ORDER BY creation_date, issuing_store_id");

        builder
            .build_query_as::<Voucher>()
            .fetch_all(&mut **tx)
            .await
    }

    #[tracing::instrument(
        name = "vouchers.repository.list_vouchers",
        skip(self, tx, predicates),
        fields(
            predicate_count = predicates.len(),
            voucher_count = tracing::field::Empty
        ),
        err
    )]
    pub(crate) async fn list_vouchers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        predicates: &[Predicate],
    ) -> Result<Vec<Voucher>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(LIST_VOUCHERS_SQL);

        for predicate in predicates {
            builder.push(" AND ");
            push_predicate(&mut builder, *predicate);
        }

        builder.push(" ORDER BY creation_date, code");

        let vouchers = builder
            .build_query_as::<Voucher>()
            .fetch_all(&mut **tx)
            .await?;

        tracing::Span::current().record("voucher_count", vouchers.len());

        Ok(vouchers)
    }

    /// Whether `code` is still held by a row that is live, or that was
    /// redeemed or expired on or after `reuse_horizon`.
    #[tracing::instrument(
        name = "vouchers.repository.code_is_occupied",
        skip(self, tx),
        err
    )]
    pub(crate) async fn code_is_occupied(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        reuse_horizon: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(CODE_IS_OCCUPIED_SQL)
            .bind(code)
            .bind(SqlxTimestamp::from(reuse_horizon))
            .fetch_one(&mut **tx)
            .await
    }

    #[tracing::instrument(
        name = "vouchers.repository.create_voucher",
        skip(self, tx, voucher),
        fields(code = %voucher.code),
        err
    )]
    pub(crate) async fn create_voucher(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        voucher: &Voucher,
    ) -> Result<Voucher, sqlx::Error> {
        query_as::<Postgres, Voucher>(CREATE_VOUCHER_SQL)
            .bind(&voucher.code)
            .bind(voucher.amount)
            .bind(SqlxTimestamp::from(voucher.creation_date))
            .bind(i32::from(voucher.issuing_store_id))
            .bind(voucher.expiration_date.map(SqlxTimestamp::from))
            .bind(voucher.issuing_sale_id.as_deref())
            .bind(voucher.redemption_date.map(SqlxTimestamp::from))
            .bind(voucher.redemption_sale_id.as_deref())
            .bind(voucher.in_use)
            .fetch_one(&mut **tx)
            .await
    }

    /// Redeem every row for `code` that is active at `now`, in one statement.
    #[tracing::instrument(
        name = "vouchers.repository.redeem_active_vouchers",
        skip(self, tx),
        fields(redeemed_count = tracing::field::Empty),
        err
    )]
    pub(crate) async fn redeem_active_vouchers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        now: Timestamp,
        redemption_date: Timestamp,
        redemption_sale_id: Option<&str>,
    ) -> Result<Vec<Voucher>, sqlx::Error> {
        let redeemed = query_as::<Postgres, Voucher>(REDEEM_ACTIVE_VOUCHERS_SQL)
            .bind(code)
            .bind(SqlxTimestamp::from(now))
            .bind(SqlxTimestamp::from(redemption_date))
            .bind(redemption_sale_id)
            .fetch_all(&mut **tx)
            .await?;

        tracing::Span::current().record("redeemed_count", redeemed.len());

        Ok(redeemed)
    }

    #[tracing::instrument(
        name = "vouchers.repository.set_active_vouchers_in_use",
        skip(self, tx),
        err
    )]
    pub(crate) async fn set_active_vouchers_in_use(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_ACTIVE_VOUCHERS_IN_USE_SQL)
            .bind(code)
            .bind(SqlxTimestamp::from(now))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    #[tracing::instrument(name = "vouchers.repository.release_vouchers", skip(self, tx), err)]
    pub(crate) async fn release_vouchers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(RELEASE_VOUCHERS_SQL)
            .bind(code)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    #[tracing::instrument(
        name = "vouchers.repository.delete_old_vouchers",
        skip(self, tx),
        err
    )]
    pub(crate) async fn delete_old_vouchers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_OLD_VOUCHERS_SQL)
            .bind(SqlxTimestamp::from(cutoff))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        debug!(rows_affected, "deleted old vouchers");

        Ok(rows_affected)
    }

    #[tracing::instrument(
        name = "vouchers.repository.delete_all_vouchers",
        skip(self, tx),
        err
    )]
    pub(crate) async fn delete_all_vouchers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ALL_VOUCHERS_SQL)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: Predicate) {
    match predicate {
        Predicate::Redeemed => {
            builder.push("redemption_date IS NOT NULL");
        }
        Predicate::NotRedeemed => {
            builder.push("redemption_date IS NULL");
        }
        Predicate::ExpiredBefore(at) => {
            builder
                .push("(expiration_date IS NOT NULL AND expiration_date < ")
                .push_bind(SqlxTimestamp::from(at))
                .push(")");
        }
        Predicate::UnexpiredAt(at) => {
            builder
                .push("(expiration_date IS NULL OR expiration_date >= ")
                .push_bind(SqlxTimestamp::from(at))
                .push(")");
        }
        Predicate::InUse => {
            builder.push("in_use");
        }
        Predicate::IssuingStore(store) => {
            builder
                .push("issuing_store_id = ")
                .push_bind(i32::from(store));
        }
        Predicate::OnOrAfter(date_type, at) => {
            let column = date_type.column();

            builder
                .push(format_args!("({column} IS NOT NULL AND {column} >= "))
                .push_bind(SqlxTimestamp::from(at))
                .push(")");
        }
        Predicate::OnOrBefore(date_type, at) => {
            let column = date_type.column();

            builder
                .push(format_args!("({column} IS NOT NULL AND {column} <= "))
                .push_bind(SqlxTimestamp::from(at))
                .push(")");
        }
    }
}

impl<'r> FromRow<'r, PgRow> for Voucher {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let store_i32: i32 = row.try_get("issuing_store_id")?;

        let issuing_store_id = u16::try_from(store_i32).map_err(|e| sqlx::Error::ColumnDecode {
            index: "issuing_store_id".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            code: row.try_get("code")?,
            amount: row.try_get::<Decimal, _>("amount")?,
            creation_date: row.try_get::<SqlxTimestamp, _>("creation_date")?.to_jiff(),
            issuing_store_id,
            expiration_date: row
                .try_get::<Option<SqlxTimestamp>, _>("expiration_date")?
                .map(SqlxTimestamp::to_jiff),
            issuing_sale_id: row.try_get("issuing_sale_id")?,
            redemption_date: row
                .try_get::<Option<SqlxTimestamp>, _>("redemption_date")?
                .map(SqlxTimestamp::to_jiff),
            redemption_sale_id: row.try_get("redemption_sale_id")?,
            in_use: row.try_get("in_use")?,
        })
    }
}
