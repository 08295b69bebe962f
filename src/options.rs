use crate::analyzer::filter::{FilterRule, PropFilter, PropPredicate};
use crate::parser::{NameResolver, ParserConfig, RawProp};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid exclude pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Options controlling how one file is turned into a schema.
#[derive(Clone, Default)]
pub struct ExtractionOptions {
    pub component_name: Option<String>,
    pub exclude_patterns: Vec<Regex>,
    pub ignore_node_modules_only_props: bool,
    pub skip_props_without_description: bool,
    pub prop_filter: Option<Arc<PropPredicate>>,
}

impl ExtractionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn component_name(mut self, name: impl Into<String>) -> Self {
        self.component_name = Some(name.into());
        self
    }

    pub fn exclude(mut self, pattern: Regex) -> Self {
        self.exclude_patterns.push(pattern);
        self
    }

    pub fn ignore_node_modules_only_props(mut self, on: bool) -> Self {
        self.ignore_node_modules_only_props = on;
        self
    }

    pub fn skip_props_without_description(mut self, on: bool) -> Self {
        self.skip_props_without_description = on;
        self
    }

    pub fn prop_filter(
        mut self,
        predicate: impl Fn(&RawProp, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.prop_filter = Some(Arc::new(predicate));
        self
    }

    /// The filter props are checked against.
    pub fn filter(&self) -> PropFilter {
        if let Some(predicate) = &self.prop_filter {
            return PropFilter::Custom(Arc::clone(predicate));
        }
        let mut rules = Vec::new();
        if self.ignore_node_modules_only_props {
            rules.push(FilterRule::NodeModulesOnly);
        }
        if self.skip_props_without_description {
            rules.push(FilterRule::RequireDescription);
        }
        if !self.exclude_patterns.is_empty() {
            rules.push(FilterRule::ExcludePatterns(self.exclude_patterns.clone()));
        }
        PropFilter::Rules(rules)
    }

    /// Configuration handed to the prop parser.
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            resolver: NameResolver::new(self.component_name.clone()),
            ..ParserConfig::default()
        }
    }

    /// Whether `display_name` names the default export.
    pub fn is_default_export(&self, display_name: &str) -> bool {
        let name = self.component_name.as_deref().unwrap_or("");
        display_name.to_lowercase() == name.to_lowercase()
    }
}

impl fmt::Debug for ExtractionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionOptions")
            .field("component_name", &self.component_name)
            .field("exclude_patterns", &self.exclude_patterns)
            .field("ignore_node_modules_only_props", &self.ignore_node_modules_only_props)
            .field("skip_props_without_description", &self.skip_props_without_description)
            .field("prop_filter", &self.prop_filter.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Serialized form of [`ExtractionOptions`], as found in JSON config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsFile {
    pub component_name: Option<String>,
    pub excludes: Vec<String>,
    pub ignore_node_modules: bool,
    pub skip_props_without_doc: bool,
}

impl OptionsFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn into_options(self) -> Result<ExtractionOptions, ConfigError> {
        let exclude_patterns = self
            .excludes
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern { pattern, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ExtractionOptions {
            component_name: self.component_name,
            exclude_patterns,
            ignore_node_modules_only_props: self.ignore_node_modules,
            skip_props_without_description: self.skip_props_without_doc,
            prop_filter: None,
        })
    }
}
