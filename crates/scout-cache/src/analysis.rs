//! Flyer analysis cache facade
//!
//! Local files are keyed by `<path>:<mtime>:<size>` so editing or replacing
//! the image invalidates the entry without any explicit call. Anything that is
//! not an existing local file (URLs in practice) is keyed by the reference
//! string itself.

use std::fs;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::key::Category;
use crate::manager::CacheManager;
use crate::store::{EntryStore, FileEntryStore};

/// Vision-analysis view over a [`CacheManager`].
pub struct AnalysisCache<'a, S: EntryStore = FileEntryStore> {
    cache: &'a CacheManager<S>,
}

impl<'a, S: EntryStore> AnalysisCache<'a, S> {
    /// Default TTL for analysis results (24 hours).
    pub const DEFAULT_TTL_SECS: u64 = 86400;

    pub fn new(cache: &'a CacheManager<S>) -> Self {
        Self { cache }
    }

    /// Cached analysis for `source`, or `None`.
    ///
    /// A source whose fingerprint cannot be taken is a miss.
    pub fn get_analysis<T: DeserializeOwned>(&self, source: &str) -> Option<T> {
        match analysis_key(source) {
            Ok(key) => self.cache.get(&key, &Category::VisionAnalysis),
            Err(e) => {
                debug!(source, error = %e, "Cannot fingerprint analysis source, treating as miss");
                None
            }
        }
    }

    /// Cache an analysis result. Skipped if the source cannot be fingerprinted.
    pub fn set_analysis<T: Serialize + ?Sized>(&self, source: &str, result: &T, ttl: Option<u64>) {
        match analysis_key(source) {
            Ok(key) => self.cache.set(
                &key,
                result,
                &Category::VisionAnalysis,
                Some(ttl.unwrap_or(Self::DEFAULT_TTL_SECS)),
            ),
            Err(e) => {
                debug!(source, error = %e, "Cannot fingerprint analysis source, not caching");
            }
        }
    }
}

/// Logical cache key for an analysis source.
///
/// Existing local files: `<path>:<mtime secs since epoch>:<byte size>`.
/// Everything else: the reference unchanged.
pub fn analysis_key(source: &str) -> io::Result<String> {
    if is_remote(source) {
        return Ok(source.to_string());
    }

    let path = Path::new(source);
    if !path.exists() {
        return Ok(source.to_string());
    }

    let metadata = fs::metadata(path)?;
    let mtime = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok(format!("{}:{}:{}", source, mtime.as_secs_f64(), metadata.len()))
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use serde_json::{json, Value};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_url_key_is_reference() {
        let url = "https://example.com/flyers/306240.jpeg";
        assert_eq!(analysis_key(url).unwrap(), url);
    }

    #[test]
    fn test_missing_path_key_is_reference() {
        assert_eq!(analysis_key("/no/such/flyer.png").unwrap(), "/no/such/flyer.png");
    }

    #[test]
    fn test_local_file_key_includes_fingerprint() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flyer.png");
        fs::write(&path, b"12345").unwrap();
        let source = path.to_string_lossy().to_string();

        let key = analysis_key(&source).unwrap();
        assert!(key.starts_with(&format!("{}:", source)));
        assert!(key.ends_with(":5"));
    }

    #[test]
    fn test_round_trip_for_url() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CacheManager::open(&CacheConfig::new(temp_dir.path().join("cache"))).unwrap();
        let analyses = AnalysisCache::new(&cache);
        let url = "https://example.com/a.jpg";

        analyses.set_analysis(url, &json!({"is_event_flyer": true, "events": []}), None);
        assert_eq!(
            analyses.get_analysis::<Value>(url),
            Some(json!({"is_event_flyer": true, "events": []}))
        );
        assert!(cache.contains_record(url, &Category::VisionAnalysis));
    }

    #[test]
    fn test_modified_file_invalidates_entry() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CacheManager::open(&CacheConfig::new(temp_dir.path().join("cache"))).unwrap();
        let analyses = AnalysisCache::new(&cache);

        let path = temp_dir.path().join("flyer.png");
        fs::write(&path, b"original").unwrap();
        let source = path.to_string_lossy().to_string();

        analyses.set_analysis(&source, &json!({"events": ["a"]}), None);
        assert!(analyses.get_analysis::<Value>(&source).is_some());

        fs::write(&path, b"replaced with a longer image").unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60)).unwrap();

        assert!(analyses.get_analysis::<Value>(&source).is_none());
    }

    #[test]
    fn test_unfingerprintable_source_is_never_cached() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CacheManager::open(&CacheConfig::new(temp_dir.path().join("cache"))).unwrap();
        let analyses = AnalysisCache::new(&cache);

        let path = temp_dir.path().join("flyer.png");
        fs::write(&path, b"pixels").unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(UNIX_EPOCH - Duration::from_secs(10)).unwrap();
        let source = path.to_string_lossy().to_string();

        assert!(analysis_key(&source).is_err());

        analyses.set_analysis(&source, &json!({"events": ["a"]}), None);
        assert_eq!(cache.stats().total_entries, 0);
        assert!(analyses.get_analysis::<Value>(&source).is_none());
    }
}
