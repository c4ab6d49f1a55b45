use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::data_cache::{DataCache, Lazy};
use crate::redirects::RedirectRule;

/// Where data files are read from
pub trait DataStore: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

pub struct FsStore;

impl DataStore for FsStore {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

pub fn load_yaml<T: DeserializeOwned>(store: &dyn DataStore, path: &Path) -> io::Result<T> {
    let text = store.read_to_string(path)?;
    match serde_yaml::from_str::<T>(&text) {
        Ok(value) => Ok(value),
        Err(e) => Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("Error parsing {}: {}", path.display(), e),
        )),
    }
}

/// Data files used by the site build. Each file is read the first time its getter is called;
/// regenerated files are only seen by a new `SiteData` or after the cache is cleared.
pub struct SiteData {
    cache: Arc<DataCache>,
    redirect_rules: Lazy<Vec<RedirectRule>>,
}

impl SiteData {
    pub fn new(redirect_rules_path: PathBuf, store: Arc<dyn DataStore>, cache: Arc<DataCache>) -> Self {
        let redirect_rules = Lazy::new(move || load_yaml(store.as_ref(), &redirect_rules_path));
        SiteData {
            cache,
            redirect_rules,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.redirect_rules_path(), Arc::new(FsStore), Arc::new(DataCache::new()))
    }

    pub fn cache(&self) -> &Arc<DataCache> {
        &self.cache
    }

    pub fn redirect_rules(&self) -> io::Result<Arc<Vec<RedirectRule>>> {
        self.redirect_rules.get(&self.cache)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingStore {
        files: HashMap<PathBuf, String>,
        reads: AtomicUsize,
    }

    impl CountingStore {
        fn with_file(path: &str, content: &str) -> Self {
            let mut files = HashMap::new();
            files.insert(PathBuf::from(path), content.to_string());
            CountingStore {
                files,
                reads: AtomicUsize::new(0),
            }
        }
    }

    impl DataStore for CountingStore {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.files.get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(ErrorKind::NotFound, format!("{} not found", path.display())))
        }
    }

    const RULES: &str = "- destination: posts/first-post\n  source: posts/legacyPost1\n  type: 301\n";

    #[test]
    fn test_redirect_rules_read_once() {
        let store = Arc::new(CountingStore::with_file("data/rules.yaml", RULES));
        let site_data = SiteData::new(PathBuf::from("data/rules.yaml"), store.clone(), Arc::new(DataCache::new()));

        let first = site_data.redirect_rules().unwrap();
        let second = site_data.redirect_rules().unwrap();
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.as_slice(), &[RedirectRule {
            destination: "posts/first-post".to_string(),
            source: "posts/legacyPost1".to_string(),
            status: 301,
        }]);
    }

    #[test]
    fn test_cleared_cache_reads_again() {
        let store = Arc::new(CountingStore::with_file("rules.yaml", RULES));
        let site_data = SiteData::new(PathBuf::from("rules.yaml"), store.clone(), Arc::new(DataCache::new()));

        site_data.redirect_rules().unwrap();
        site_data.cache().clear();
        site_data.redirect_rules().unwrap();
        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let store = Arc::new(CountingStore::with_file("rules.yaml", RULES));
        let site_data = SiteData::new(PathBuf::from("other.yaml"), store, Arc::new(DataCache::new()));
        assert_eq!(site_data.redirect_rules().unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let store = Arc::new(CountingStore::with_file("rules.yaml", "destination: [unclosed"));
        let site_data = SiteData::new(PathBuf::from("rules.yaml"), store, Arc::new(DataCache::new()));
        assert_eq!(site_data.redirect_rules().unwrap_err().kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_reads_generated_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated-legacy-redirect-rules.yaml");
        fs::write(&path, RULES).unwrap();

        let site_data = SiteData::new(path.clone(), Arc::new(FsStore), Arc::new(DataCache::new()));
        assert_eq!(site_data.redirect_rules().unwrap().len(), 1);

        // Not picked up until the cache is reset
        fs::write(&path, "[]\n").unwrap();
        assert_eq!(site_data.redirect_rules().unwrap().len(), 1);
        site_data.cache().clear();
        assert!(site_data.redirect_rules().unwrap().is_empty());
    }
}
