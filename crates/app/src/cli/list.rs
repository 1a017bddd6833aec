use clap::Args;
use jiff::Timestamp;
use vouchers_app::domain::vouchers::{
    filters::{DateType, VoucherFilter},
    status::VoucherStatus,
};

use super::{ServiceArgs, output};

#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Only vouchers in this status (active, in_use, redeemed, expired)
    #[arg(long)]
    status: Option<VoucherStatus>,

    /// Only vouchers issued by this store
    #[arg(long)]
    store: Option<u16>,

    /// Inclusive lower bound on the selected date (RFC 3339)
    #[arg(long)]
    from: Option<Timestamp>,

    /// Inclusive upper bound on the selected date (RFC 3339)
    #[arg(long)]
    to: Option<Timestamp>,

    /// Date the range applies to (creation, redemption, expiration)
    #[arg(long, default_value_t = DateType::Creation)]
    date_type: DateType,
}

pub(crate) async fn run(args: ListArgs) -> Result<(), String> {
    let context = args.service.context().await?;

    let vouchers = context
        .vouchers
        .get_filtered(VoucherFilter {
            status: args.status,
            issuing_store_id: args.store,
            date_from: args.from,
            date_to: args.to,
            date_type: args.date_type,
        })
        .await
        .map_err(|error| format!("failed to list vouchers: {error}"))?;

    output::print_vouchers(&vouchers)
}
