pub mod config;
pub mod error;
pub mod job;
pub mod linker;
pub mod markdown;
pub mod pipeline;
pub mod quality;
pub mod seo;
pub mod store;
pub mod types;

pub use error::{BlogError, Result};
