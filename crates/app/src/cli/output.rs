use jiff::Timestamp;
use serde::Serialize;
use vouchers_app::domain::vouchers::{
    codes::VoucherCode, records::Voucher, status::VoucherStatus,
};

#[derive(Debug, Serialize)]
struct VoucherView<'a> {
    #[serde(flatten)]
    voucher: &'a Voucher,
    status: VoucherStatus,
}

pub(crate) fn print_vouchers(vouchers: &[Voucher]) -> Result<(), String> {
    let now = Timestamp::now();

    let views: Vec<VoucherView<'_>> = vouchers
        .iter()
        .map(|voucher| VoucherView {
            voucher,
            status: voucher.status(now),
        })
        .collect();

    print_json(&views)
}

pub(crate) fn print_voucher(voucher: &Voucher) -> Result<(), String> {
    print_json(&VoucherView {
        voucher,
        status: voucher.status(Timestamp::now()),
    })
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to render output: {error}"))?;

    println!("{rendered}");

    Ok(())
}

/// Warn about codes that could never have been generated here.
///
/// The lookup still runs: stored codes are matched verbatim.
pub(crate) fn warn_on_malformed_code(code: &str) {
    if let Err(error) = VoucherCode::parse(code) {
        eprintln!("warning: `{code}` is not a well-formed voucher code: {error}");
    }
}
