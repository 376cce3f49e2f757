//! Formatting helpers shared by views and syndication

mod date;
mod url;

pub use date::*;
pub use url::*;
