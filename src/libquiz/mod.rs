pub mod cache;
pub mod fetch;
pub mod question;
pub mod session;
