pub mod error;
pub mod handlers;
pub mod types;
pub mod upload;

pub use handlers::*;
pub use types::*;
