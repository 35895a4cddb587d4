pub mod hash;
pub mod jwt;
pub mod otp;
pub mod sms;
pub mod upload;
