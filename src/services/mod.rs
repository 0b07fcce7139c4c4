pub mod qr;
pub mod totp;

pub use totp::{GeneratedOtp, TotpService};
