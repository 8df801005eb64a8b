pub mod fields;
pub mod generic;
pub mod model;
pub mod registry;
pub mod sites;

pub use generic::GenericExtractor;
pub use model::{ExtractedContent, ReviewSections};
pub use registry::{ExtractorRegistry, SiteExtractor};
