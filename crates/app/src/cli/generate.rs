use clap::Args;
use jiff::Timestamp;
use rust_decimal::Decimal;
use vouchers_app::domain::vouchers::data::NewVoucher;

use super::{ServiceArgs, output};

#[derive(Debug, Args)]
pub(crate) struct GenerateArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Voucher amount, e.g. 100.50
    #[arg(long)]
    amount: Decimal,

    /// Issuing store, 0 to 9999
    #[arg(long)]
    store: u16,

    /// Expiration instant (RFC 3339); the voucher never expires when omitted
    #[arg(long)]
    expires_at: Option<Timestamp>,

    /// Sale that issued the voucher
    #[arg(long)]
    sale_id: Option<String>,
}

pub(crate) async fn run(args: GenerateArgs) -> Result<(), String> {
    let context = args.service.context().await?;

    let voucher = context
        .vouchers
        .generate_voucher(NewVoucher {
            amount: args.amount,
            issuing_store_id: args.store,
            expiration_date: args.expires_at,
            issuing_sale_id: args.sale_id,
        })
        .await
        .map_err(|error| format!("failed to generate voucher: {error}"))?;

    output::print_voucher(&voucher)
}
