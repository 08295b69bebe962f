//! Turns parser output into documentation schemas, memoized per file.

use crate::analyzer::locale::split_description;
use crate::analyzer::metadata::{DocumentationSchema, ExportEntry, PropertyDescriptor, DEFAULT_EXPORT_KEY};
use crate::cache::SchemaStore;
use crate::options::ExtractionOptions;
use crate::parser::{ComponentRecord, ParseError, PropParser, RawProp};
use dashmap::DashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, trace};

pub struct Extractor<P> {
    parser: P,
    cache: Arc<dyn SchemaStore>,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl<P: PropParser> Extractor<P> {
    pub fn new(parser: P, cache: Arc<dyn SchemaStore>) -> Self {
        Self { parser, cache, in_flight: DashMap::new() }
    }

    pub fn cache(&self) -> &Arc<dyn SchemaStore> {
        &self.cache
    }

    /// Schema for `path`, from cache when possible.
    ///
    /// Two concurrent calls for the same unseen path both parse; the later
    /// result replaces the earlier one in the cache. Use
    /// [`extract_exclusive`](Self::extract_exclusive) to parse once.
    pub fn extract(
        &self,
        path: impl AsRef<Path>,
        options: &ExtractionOptions,
    ) -> Result<Arc<DocumentationSchema>, ParseError> {
        let path = path.as_ref();
        let key = path.to_string_lossy();
        if let Some(schema) = self.cache.get(&key) {
            debug!(file = %key, "cache hit");
            return Ok(schema);
        }

        debug!(file = %key, "cache miss");
        let started = Instant::now();
        let records = self.parser.parse(path, &options.parser_config())?;
        let schema = Arc::new(normalize(records, options));
        debug!(
            file = %key,
            exports = schema.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "extracted"
        );

        self.cache.add(&key, Arc::clone(&schema));
        Ok(schema)
    }

    /// Like [`extract`](Self::extract), but concurrent callers for the same
    /// path wait for a single parse.
    pub fn extract_exclusive(
        &self,
        path: impl AsRef<Path>,
        options: &ExtractionOptions,
    ) -> Result<Arc<DocumentationSchema>, ParseError> {
        let path = path.as_ref();
        let lock = Arc::clone(
            self.in_flight
                .entry(path.to_string_lossy().into_owned())
                .or_default()
                .value(),
        );
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.extract(path, options)
    }
}

/// Reshape parser records into a schema, default export first.
pub fn normalize(records: Vec<ComponentRecord>, options: &ExtractionOptions) -> DocumentationSchema {
    let filter = options.filter();
    let mut schema = DocumentationSchema::new();
    let mut default_entry: Option<ExportEntry> = None;

    for record in records {
        let entry: ExportEntry = record
            .props
            .iter()
            .filter(|prop| {
                let keep = filter.accepts(prop, &record.display_name);
                if !keep {
                    trace!(component = %record.display_name, prop = %prop.name, "prop filtered out");
                }
                keep
            })
            .map(describe)
            .collect();

        if options.is_default_export(&record.display_name) || record.display_name == DEFAULT_EXPORT_KEY {
            default_entry = Some(entry);
        } else {
            schema.insert(record.display_name, entry);
        }
    }

    match default_entry {
        Some(entry) => schema.with_default_first(entry),
        None => schema,
    }
}

fn describe(prop: &RawProp) -> PropertyDescriptor {
    let ty = match prop.type_info.raw.as_deref() {
        Some(raw) if !raw.is_empty() => raw.to_string(),
        _ => prop.type_info.name.clone(),
    };
    PropertyDescriptor {
        identifier: prop.name.clone(),
        ty,
        descriptions: split_description(&prop.description),
        default: prop.default_value.as_ref().and_then(|d| d.value.clone()),
        required: prop.required == Some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SchemaCache;
    use crate::parser::{DefaultValue, ParserConfig, PropType};
    use regex::Regex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubParser {
        records: Vec<ComponentRecord>,
        calls: AtomicUsize,
    }

    impl StubParser {
        fn new(records: Vec<ComponentRecord>) -> Self {
            Self { records, calls: AtomicUsize::new(0) }
        }
    }

    impl PropParser for StubParser {
        fn parse(&self, _path: &Path, _config: &ParserConfig) -> Result<Vec<ComponentRecord>, ParseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    fn prop(name: &str, ty: &str) -> RawProp {
        RawProp {
            name: name.into(),
            type_info: PropType { name: ty.into(), raw: None },
            ..Default::default()
        }
    }

    fn record(name: &str, props: Vec<RawProp>) -> ComponentRecord {
        ComponentRecord { display_name: name.into(), props }
    }

    #[test]
    fn second_extract_is_served_from_cache() {
        let parser = Arc::new(StubParser::new(vec![record("Button", vec![prop("label", "string")])]));
        let extractor = Extractor::new(Arc::clone(&parser), Arc::new(SchemaCache::new()));
        let opts = ExtractionOptions::new().component_name("Button");

        let first = extractor.extract("Button.tsx", &opts).unwrap();
        let second = extractor.extract("Button.tsx", &opts).unwrap();
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(parser.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_export_comes_first() {
        let records = vec![
            record("ButtonGroup", vec![]),
            record("button", vec![prop("size", "number")]),
            record("ButtonIcon", vec![]),
        ];
        let schema = normalize(records, &ExtractionOptions::new().component_name("Button"));
        assert_eq!(schema.keys().collect::<Vec<_>>(), ["default", "ButtonGroup", "ButtonIcon"]);
        assert_eq!(schema.default_export().unwrap()[0].identifier, "size");
    }

    #[test]
    fn later_duplicate_overwrites() {
        let records = vec![
            record("Tab", vec![prop("a", "string")]),
            record("Tabs", vec![]),
            record("Tab", vec![prop("b", "string")]),
        ];
        let schema = normalize(records, &ExtractionOptions::new());
        assert_eq!(schema.keys().collect::<Vec<_>>(), ["Tab", "Tabs"]);
        assert_eq!(schema.get("Tab").unwrap()[0].identifier, "b");
    }

    #[test]
    fn descriptor_fields() {
        let mut size = prop("size", "enum");
        size.type_info.raw = Some("'small' | 'large'".into());
        size.description = "@description Size\n@description.zh-CN 尺寸".into();
        size.default_value = Some(DefaultValue { value: Some("'small'".into()) });
        size.required = Some(false);

        let mut empty_raw = prop("count", "number");
        empty_raw.type_info.raw = Some(String::new());
        empty_raw.required = Some(true);

        let schema = normalize(vec![record("Button", vec![size, empty_raw])], &ExtractionOptions::new());
        let entry = schema.get("Button").unwrap();

        assert_eq!(entry[0].ty, "'small' | 'large'");
        assert_eq!(entry[0].description(), Some("Size"));
        assert_eq!(entry[0].localized_description(Some("zh-CN")), Some("尺寸"));
        assert_eq!(entry[0].default.as_deref(), Some("'small'"));
        assert!(!entry[0].required);

        assert_eq!(entry[1].ty, "number");
        assert!(entry[1].descriptions.is_empty());
        assert!(entry[1].required);
    }

    #[test]
    fn exclude_pattern_drops_props() {
        let records = vec![record("Button", vec![prop("internalFlag", "boolean"), prop("label", "string")])];
        let opts = ExtractionOptions::new().exclude(Regex::new("^internal").unwrap());
        let schema = normalize(records, &opts);
        let names: Vec<_> = schema.get("Button").unwrap().iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(names, ["label"]);
    }

    #[test]
    fn skip_undocumented_drops_props() {
        let mut label = prop("label", "string");
        label.description = "Button text".into();
        let records = vec![record("Button", vec![prop("internalFlag", "boolean"), label])];

        let kept = normalize(records.clone(), &ExtractionOptions::new());
        assert_eq!(kept.get("Button").unwrap().len(), 2);

        let opts = ExtractionOptions::new().skip_props_without_description(true);
        let schema = normalize(records, &opts);
        let props = schema.get("Button").unwrap();
        let names: Vec<_> = props.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(names, ["label"]);
        assert_eq!(props[0].description(), Some("Button text"));
    }

    #[test]
    fn custom_filter_bypasses_builtin_rules() {
        let records = vec![record("Button", vec![prop("internalFlag", "boolean"), prop("label", "string")])];
        let opts = ExtractionOptions::new()
            .exclude(Regex::new("^internal").unwrap())
            .skip_props_without_description(true)
            .prop_filter(|p, _| p.name != "label");
        let schema = normalize(records, &opts);
        let names: Vec<_> = schema.get("Button").unwrap().iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(names, ["internalFlag"]);
    }

    #[test]
    fn no_component_name_means_no_default() {
        let schema = normalize(vec![record("Button", vec![])], &ExtractionOptions::new());
        assert!(schema.default_export().is_none());
    }

    #[test]
    fn parse_errors_are_not_cached() {
        struct Failing;
        impl PropParser for Failing {
            fn parse(&self, path: &Path, _: &ParserConfig) -> Result<Vec<ComponentRecord>, ParseError> {
                Err(ParseError::Unsupported { path: path.to_path_buf() })
            }
        }
        let cache = Arc::new(SchemaCache::new());
        let extractor = Extractor::new(Failing, cache.clone());
        let err = extractor.extract("styles.css", &ExtractionOptions::new()).unwrap_err();
        assert!(matches!(err, ParseError::Unsupported { .. }));
        assert!(cache.is_empty());
    }
}
