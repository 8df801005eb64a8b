//! Site-specific extractors for supported source domains.

mod greatandhra;
mod gulte;
mod telugu123;

pub use greatandhra::GreatAndhraExtractor;
pub use gulte::GulteExtractor;
pub use telugu123::Telugu123Extractor;
