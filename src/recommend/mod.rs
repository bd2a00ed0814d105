pub mod error;
pub mod extract;
pub mod fallback;
pub mod normalize;
pub mod request;
pub mod service;

pub use error::*;
pub use extract::extract_items;
pub use fallback::FallbackStrategy;
pub use normalize::normalize;
pub use request::*;
pub use service::{ImageSearch, Recommender};
