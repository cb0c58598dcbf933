//! Configuration module

mod site;

pub use site::ConverterConfig;
pub use site::ConverterKind;
pub use site::DuplicateSlugPolicy;
pub use site::HydrationConfig;
pub use site::SiteConfig;
