use crate::analyzer::extract::SwcPropParser;
use crate::cache::SchemaCache;
use crate::extractor::Extractor;
use crate::options::OptionsFile;
use napi::bindgen_prelude::*;
use napi_derive::napi;
use std::sync::{Arc, OnceLock};

struct Engine {
    cache: Arc<SchemaCache>,
    extractor: Extractor<SwcPropParser>,
}

// One cache per Node process, shared by every call.
fn engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(|| {
        let cache = Arc::new(SchemaCache::new());
        let extractor = Extractor::new(SwcPropParser, cache.clone());
        Engine { cache, extractor }
    })
}

/// Extract the API schema of `file_path` as a JSON string.
#[napi]
pub fn extract_api(file_path: String, options_json: Option<String>) -> Result<String> {
    let file = match options_json {
        Some(raw) => OptionsFile::from_json(&raw)
            .map_err(|e| Error::from_reason(format!("invalid options: {}", e)))?,
        None => OptionsFile::default(),
    };
    let options = file
        .into_options()
        .map_err(|e| Error::from_reason(format!("invalid options: {}", e)))?;
    let schema = engine()
        .extractor
        .extract(&file_path, &options)
        .map_err(|e| Error::from_reason(format!("parse error: {}", e)))?;
    serde_json::to_string(&*schema)
        .map_err(|e| Error::from_reason(format!("serialize schema failed: {}", e)))
}

#[napi(object)]
pub struct CacheStatsJs {
    pub entries: u32,
    pub hits: u32,
    pub misses: u32,
}

#[napi]
pub fn cache_stats() -> CacheStatsJs {
    let stats = engine().cache.stats();
    CacheStatsJs {
        entries: stats.entries as u32,
        hits: stats.hits as u32,
        misses: stats.misses as u32,
    }
}
