use clap::Args;

use super::{ServiceArgs, output};

#[derive(Debug, Args)]
pub(crate) struct LookupArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Voucher code
    code: String,

    /// Include redeemed and expired vouchers
    #[arg(long)]
    all: bool,
}

pub(crate) async fn run(args: LookupArgs) -> Result<(), String> {
    output::warn_on_malformed_code(&args.code);

    let context = args.service.context().await?;

    let vouchers = context
        .vouchers
        .get_by_code(&args.code, !args.all)
        .await
        .map_err(|error| format!("failed to look up vouchers: {error}"))?;

    output::print_vouchers(&vouchers)
}
