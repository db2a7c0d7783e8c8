pub mod auth;
pub mod response;

pub use auth::Caller;
pub use response::{internal_error_on_panic, respond};
