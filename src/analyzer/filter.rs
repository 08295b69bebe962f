use crate::parser::RawProp;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Directory name that marks third-party declarations.
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Custom prop predicate: receives the prop and its component's display name.
pub type PropPredicate = dyn Fn(&RawProp, &str) -> bool + Send + Sync;

#[derive(Debug, Clone)]
pub enum FilterRule {
    /// Drop props whose name matches any pattern.
    ExcludePatterns(Vec<Regex>),
    /// Drop props declared only inside dependency directories.
    NodeModulesOnly,
    /// Drop props without a description.
    RequireDescription,
}

impl FilterRule {
    pub fn accepts(&self, prop: &RawProp) -> bool {
        match self {
            Self::ExcludePatterns(patterns) => !patterns.iter().any(|re| re.is_match(&prop.name)),
            Self::NodeModulesOnly => {
                prop.declarations.is_empty()
                    || prop
                        .declarations
                        .iter()
                        .any(|decl| !decl.file_name.contains(DEPENDENCY_DIR))
            }
            Self::RequireDescription => !prop.description.is_empty(),
        }
    }
}

/// Decides which props make it into the schema. Built-in rules all have to
/// accept a prop; a custom predicate replaces them.
#[derive(Clone)]
pub enum PropFilter {
    Rules(Vec<FilterRule>),
    Custom(Arc<PropPredicate>),
}

impl PropFilter {
    pub fn custom(predicate: impl Fn(&RawProp, &str) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(predicate))
    }

    pub fn accepts(&self, prop: &RawProp, component: &str) -> bool {
        match self {
            Self::Rules(rules) => rules.iter().all(|rule| rule.accepts(prop)),
            Self::Custom(predicate) => predicate(prop, component),
        }
    }
}

impl Default for PropFilter {
    fn default() -> Self {
        Self::Rules(Vec::new())
    }
}

impl fmt::Debug for PropFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rules(rules) => f.debug_tuple("Rules").field(rules).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Declaration;

    fn prop(name: &str, description: &str, files: &[&str]) -> RawProp {
        RawProp {
            name: name.into(),
            description: description.into(),
            declarations: files.iter().map(|f| Declaration { file_name: (*f).into() }).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn exclude_patterns() {
        let rule = FilterRule::ExcludePatterns(vec![Regex::new("^internal").unwrap()]);
        assert!(!rule.accepts(&prop("internalFlag", "", &[])));
        assert!(rule.accepts(&prop("label", "", &[])));
    }

    #[test]
    fn node_modules_only() {
        let rule = FilterRule::NodeModulesOnly;
        assert!(!rule.accepts(&prop("onClick", "", &["/app/node_modules/@types/react/index.d.ts"])));
        assert!(rule.accepts(&prop(
            "onClick",
            "",
            &["/app/node_modules/@types/react/index.d.ts", "/app/src/Button.tsx"]
        )));
        assert!(rule.accepts(&prop("onClick", "", &[])));
    }

    #[test]
    fn rules_combine_with_and() {
        let filter = PropFilter::Rules(vec![
            FilterRule::NodeModulesOnly,
            FilterRule::RequireDescription,
            FilterRule::ExcludePatterns(vec![Regex::new("^_").unwrap()]),
        ]);
        assert!(filter.accepts(&prop("size", "doc", &["/app/src/a.tsx"]), "A"));
        assert!(!filter.accepts(&prop("size", "", &["/app/src/a.tsx"]), "A"));
        assert!(!filter.accepts(&prop("_size", "doc", &["/app/src/a.tsx"]), "A"));
    }

    #[test]
    fn custom_filter_replaces_rules() {
        let filter = PropFilter::custom(|p, component| component == "A" && p.name.starts_with("internal"));
        assert!(filter.accepts(&prop("internalFlag", "", &[]), "A"));
        assert!(!filter.accepts(&prop("label", "doc", &[]), "A"));
        assert!(!filter.accepts(&prop("internalFlag", "", &[]), "B"));
    }
}
