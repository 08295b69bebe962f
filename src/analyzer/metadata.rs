use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key reserved for a file's default export.
pub const DEFAULT_EXPORT_KEY: &str = "default";

/// Description text for one locale; `locale` is `None` for the base text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedText {
    pub locale: Option<String>,
    pub text: String,
}

impl LocalizedText {
    /// Field name this text is stored under, e.g. `description.zh-CN`.
    pub fn key(&self) -> String {
        match &self.locale {
            Some(locale) => format!("description.{locale}"),
            None => "description".to_string(),
        }
    }
}

/// One documented prop of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub identifier: String,
    pub ty: String,
    pub descriptions: Vec<LocalizedText>,
    pub default: Option<String>,
    pub required: bool,
}

impl PropertyDescriptor {
    pub fn new(identifier: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { identifier: identifier.into(), ty: ty.into(), ..Default::default() }
    }

    /// Unlocalized description.
    pub fn description(&self) -> Option<&str> {
        self.localized_description(None)
    }

    pub fn localized_description(&self, locale: Option<&str>) -> Option<&str> {
        self.descriptions
            .iter()
            .find(|d| d.locale.as_deref() == locale)
            .map(|d| d.text.as_str())
    }
}

impl Serialize for PropertyDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("identifier", &self.identifier)?;
        for desc in &self.descriptions {
            map.serialize_entry(&desc.key(), &desc.text)?;
        }
        map.serialize_entry("type", &self.ty)?;
        if let Some(default) = &self.default {
            map.serialize_entry("default", default)?;
        }
        if self.required {
            map.serialize_entry("required", &true)?;
        }
        map.end()
    }
}

/// Props of one exported component, in declaration order.
pub type ExportEntry = Vec<PropertyDescriptor>;

/// Export name to props for one source file. Iteration follows insertion
/// order, with the default export always first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentationSchema {
    entries: Vec<(String, ExportEntry)>,
}

impl DocumentationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`. An overwritten key keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, entry: ExportEntry) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((name, entry)),
        }
    }

    /// Put `default` in front of the existing exports.
    pub fn with_default_first(self, default: ExportEntry) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push((DEFAULT_EXPORT_KEY.to_string(), default));
        entries.extend(self.entries.into_iter().filter(|(k, _)| k != DEFAULT_EXPORT_KEY));
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&ExportEntry> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn default_export(&self) -> Option<&ExportEntry> {
        self.get(DEFAULT_EXPORT_KEY)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExportEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for DocumentationSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, props) in &self.entries {
            map.serialize_entry(name, props)?;
        }
        map.end()
    }
}
