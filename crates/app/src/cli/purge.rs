use clap::Args;
use serde_json::json;

use super::{ServiceArgs, output};

#[derive(Debug, Args)]
pub(crate) struct PurgeArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Confirm deleting every voucher, regardless of status
    #[arg(long)]
    yes: bool,
}

pub(crate) async fn run(args: PurgeArgs) -> Result<(), String> {
    if !args.yes {
        return Err("refusing to delete every voucher without --yes".to_string());
    }

    let context = args.service.context().await?;

    let deleted = context
        .vouchers
        .delete_all_vouchers()
        .await
        .map_err(|error| format!("failed to delete vouchers: {error}"))?;

    output::print_json(&json!({ "deleted": deleted }))
}
