use clap::Args;
use serde_json::json;

use super::{ServiceArgs, output};

#[derive(Debug, Args)]
pub(crate) struct CleanupArgs {
    #[command(flatten)]
    service: ServiceArgs,
}

pub(crate) async fn run(args: CleanupArgs) -> Result<(), String> {
    let context = args.service.context().await?;

    let deleted = context
        .vouchers
        .delete_old_vouchers()
        .await
        .map_err(|error| format!("failed to delete old vouchers: {error}"))?;

    output::print_json(&json!({ "deleted": deleted }))
}
