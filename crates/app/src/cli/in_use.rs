use clap::Args;

use super::{ServiceArgs, output};

#[derive(Debug, Args)]
pub(crate) struct InUseArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Voucher code
    code: String,

    /// Clear the flag instead of setting it
    #[arg(long)]
    release: bool,
}

pub(crate) async fn run(args: InUseArgs) -> Result<(), String> {
    output::warn_on_malformed_code(&args.code);

    let context = args.service.context().await?;

    let vouchers = context
        .vouchers
        .set_in_use(&args.code, !args.release)
        .await
        .map_err(|error| format!("failed to update in-use flag: {error}"))?;

    if vouchers.is_empty() {
        return Err(format!("no voucher found for code {}", args.code));
    }

    output::print_vouchers(&vouchers)
}
