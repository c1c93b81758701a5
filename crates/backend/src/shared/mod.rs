pub mod account;
pub mod config;
pub mod mirror;
pub mod session;
pub mod voice_platform;
