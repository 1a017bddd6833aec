//! Vouchers

pub mod codes;
pub mod data;
pub mod errors;
pub mod filters;
pub mod records;
pub(crate) mod repository;
pub mod retention;
pub mod service;
pub mod status;

pub use errors::VouchersServiceError;
pub use service::*;
