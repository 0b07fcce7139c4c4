pub mod health;
pub mod otp;
pub mod qr_secret;

pub use health::health_check;
pub use otp::generate_otp;
pub use qr_secret::qr_secret;
