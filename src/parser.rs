use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Symbol names that TypeScript reports for default-exported or wrapped
/// components. Exports resolving to one of these take the configured
/// component name as their display name.
pub const DEFAULT_EXPORTS: &[&str] = &[
    "default",
    "__function",
    "Stateless",
    "StyledComponentClass",
    "StyledComponent",
    "FunctionComponent",
    "StatelessComponent",
    "ForwardRefExoticComponent",
];

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in {}: {message}", path.display())]
    Syntax { path: PathBuf, message: String },

    #[error("unsupported source file: {}", path.display())]
    Unsupported { path: PathBuf },
}

/// Type information as reported by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropType {
    /// Symbolic type name, e.g. `enum` or `string`.
    pub name: String,
    /// Source text of the type, when the parser kept it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultValue {
    pub value: Option<String>,
}

/// A file in which a prop is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub file_name: String,
}

/// Raw metadata of one prop, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProp {
    pub name: String,
    pub type_info: PropType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_value: Option<DefaultValue>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

/// One component found in a source file, props in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub display_name: String,
    pub props: Vec<RawProp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsxEmit {
    Preserve,
    React,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    pub es_module_interop: bool,
    pub jsx: JsxEmit,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self { es_module_interop: true, jsx: JsxEmit::Preserve }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    pub save_prop_value_as_string: bool,
    pub should_extract_literal_values_from_enum: bool,
    pub should_remove_undefined_from_optional: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            save_prop_value_as_string: true,
            should_extract_literal_values_from_enum: true,
            should_remove_undefined_from_optional: true,
        }
    }
}

/// Assigns the configured component name to exports whose symbol name is
/// one of [`DEFAULT_EXPORTS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameResolver {
    component_name: Option<String>,
}

impl NameResolver {
    pub fn new(component_name: Option<String>) -> Self {
        Self { component_name }
    }

    /// Display name override for `symbol_name`, if any.
    pub fn resolve(&self, symbol_name: &str) -> Option<&str> {
        if DEFAULT_EXPORTS.contains(&symbol_name) {
            self.component_name.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    pub compiler: CompilerOptions,
    pub parser: ParserOptions,
    pub resolver: NameResolver,
}

/// A TypeScript-aware property parser.
pub trait PropParser: Send + Sync {
    /// Parse `path` and report the components it exports.
    fn parse(&self, path: &Path, config: &ParserConfig) -> Result<Vec<ComponentRecord>, ParseError>;
}

impl<P: PropParser + ?Sized> PropParser for std::sync::Arc<P> {
    fn parse(&self, path: &Path, config: &ParserConfig) -> Result<Vec<ComponentRecord>, ParseError> {
        (**self).parse(path, config)
    }
}
