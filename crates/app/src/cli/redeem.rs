use clap::Args;
use jiff::Timestamp;
use vouchers_app::domain::vouchers::data::Redemption;

use super::{ServiceArgs, output};

#[derive(Debug, Args)]
pub(crate) struct RedeemArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Voucher code
    code: String,

    /// Sale that redeemed the voucher
    #[arg(long)]
    sale_id: Option<String>,

    /// Redemption instant (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<Timestamp>,
}

pub(crate) async fn run(args: RedeemArgs) -> Result<(), String> {
    output::warn_on_malformed_code(&args.code);

    let context = args.service.context().await?;

    let redeemed = context
        .vouchers
        .redeem_voucher(
            &args.code,
            Redemption {
                sale_id: args.sale_id,
                date: args.at,
            },
        )
        .await
        .map_err(|error| format!("failed to redeem voucher: {error}"))?;

    if redeemed.is_empty() {
        return Err(format!("no active voucher found for code {}", args.code));
    }

    output::print_vouchers(&redeemed)
}
