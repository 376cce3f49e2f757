//! Configuration module

mod site;

pub use site::AuthorConfig;
pub use site::FeedConfig;
pub use site::PaginationConfig;
pub use site::PostConfig;
pub use site::SidebarConfig;
pub use site::SiteConfig;
pub use site::SortOrder;
