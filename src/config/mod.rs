//! Configuration module

mod site;

pub use site::FrontMatterPolicy;
pub use site::HighlightConfig;
pub use site::HomeConfig;
pub use site::SiteConfig;
