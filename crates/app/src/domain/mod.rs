//! Voucher Domain Concerns

pub mod vouchers;
