pub mod cache;
pub mod extractor;
pub mod options;
pub mod parser;
pub mod project;
#[cfg(feature = "node")]
pub mod bridge;
pub mod analyzer {
    pub mod extract;
    pub mod filter;
    pub mod locale;
    pub mod metadata;
}

// Re-export selected API for consumers
pub use analyzer::extract::SwcPropParser;
pub use analyzer::metadata::{DocumentationSchema, ExportEntry, LocalizedText, PropertyDescriptor};
pub use cache::{FileCache, Freshness, SchemaCache, SchemaStore};
pub use extractor::Extractor;
pub use options::{ConfigError, ExtractionOptions, OptionsFile};
pub use parser::{ComponentRecord, ParseError, ParserConfig, PropParser, RawProp};
