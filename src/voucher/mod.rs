// Voucher module - payer-issued payment claims

mod builder;
mod model;

pub use builder::*;
pub use model::*;
