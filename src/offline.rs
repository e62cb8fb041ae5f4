//! Versioned cache-first asset store with network fallback.
//!
//! [`OfflineCache`] mirrors the lifecycle of an installable web worker:
//! `install` pre-caches the asset list, `activate` drops stale versions and
//! takes control of open clients, and `fetch` serves same-origin requests
//! from the cache before trying the network. The network sits behind the
//! [`Network`] port so the cache can be driven without one.

use std::collections::{BTreeMap, HashMap};

use url::Url;

use crate::error::{CacheError, FetchError};

/// Result type for fetches through the cache
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for cache storage writes
pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request {
    url: String,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// How a response relates to the requesting origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Same-origin
    Basic,
    /// Cross-origin with CORS
    Cors,
    /// Cross-origin without CORS; status and body are hidden
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub kind: ResponseKind,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    /// A successful same-origin response
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            kind: ResponseKind::Basic,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only complete same-origin responses are stored on the fetch path
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

/// Port to whatever actually performs requests
pub trait Network {
    fn fetch(&mut self, request: &Request) -> FetchResult<Response>;
}

/// Named cache namespaces, each mapping URL to response
#[derive(Debug, Default, Clone)]
pub struct CacheStorage {
    namespaces: BTreeMap<String, HashMap<String, Response>>,
    /// Per-namespace entry quota
    max_entries: Option<usize>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..Self::default()
        }
    }

    /// Create the namespace if it does not exist yet
    pub fn open(&mut self, name: &str) {
        self.namespaces.entry(name.to_owned()).or_default();
    }

    pub fn has(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn delete(&mut self, name: &str) -> bool {
        self.namespaces.remove(name).is_some()
    }

    pub fn put(&mut self, name: &str, url: &str, response: Response) -> CacheResult<()> {
        let entries = self.namespaces.entry(name.to_owned()).or_default();
        if let Some(max) = self.max_entries {
            if entries.len() >= max && !entries.contains_key(url) {
                return Err(CacheError::QuotaExceeded(name.to_owned()));
            }
        }
        entries.insert(url.to_owned(), response);
        Ok(())
    }

    pub fn get(&self, name: &str, url: &str) -> Option<&Response> {
        self.namespaces.get(name)?.get(url)
    }

    /// Look `url` up across every namespace
    pub fn lookup(&self, url: &str) -> Option<&Response> {
        self.namespaces.values().find_map(|entries| entries.get(url))
    }

    pub fn len(&self, name: &str) -> usize {
        self.namespaces.get(name).map_or(0, HashMap::len)
    }
}

/// Lifecycle of the cache worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerState {
    #[default]
    Parsed,
    Installed,
    Activated,
}

#[derive(Debug)]
pub struct OfflineCache {
    version: String,
    /// Base URL relative asset paths resolve against
    origin: Url,
    assets: Vec<String>,
    offline_document: Option<String>,
    storage: CacheStorage,
    state: WorkerState,
    claims_clients: bool,
}

impl OfflineCache {
    /// Cache scoped to `origin`, which must be an absolute URL
    pub fn new(version: impl Into<String>, origin: &str) -> FetchResult<Self> {
        let origin = Url::parse(origin).map_err(|source| FetchError::InvalidUrl {
            url: origin.to_owned(),
            source,
        })?;
        Ok(Self {
            version: version.into(),
            origin,
            assets: Vec::new(),
            offline_document: None,
            storage: CacheStorage::new(),
            state: WorkerState::default(),
            claims_clients: false,
        })
    }

    pub fn with_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets = assets.into_iter().map(Into::into).collect();
        self
    }

    /// Document served when a request can be answered neither way
    pub fn with_offline_document(mut self, url: impl Into<String>) -> Self {
        self.offline_document = Some(url.into());
        self
    }

    pub fn with_storage(mut self, storage: CacheStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// True once activation has taken control of open clients
    pub fn claims_clients(&self) -> bool {
        self.claims_clients
    }

    /// Pre-cache the asset list into the current namespace.
    /// Returns how many assets were stored; failures are logged and skipped.
    pub fn install(&mut self, network: &mut impl Network) -> usize {
        self.storage.open(&self.version);
        let mut stored = 0;
        for asset in &self.assets {
            let url = match self.resolve(asset) {
                Ok(url) => url,
                Err(err) => {
                    log::warn!("Skipping {asset}: {err}");
                    continue;
                }
            };
            match network.fetch(&Request::new(url.as_str())) {
                Ok(response) if response.is_success() => {
                    match self.storage.put(&self.version, url.as_str(), response) {
                        Ok(()) => stored += 1,
                        Err(err) => log::warn!("Failed to pre-cache {url}: {err}"),
                    }
                }
                Ok(response) => log::warn!("Skipping {url}: status {}", response.status),
                Err(err) => log::warn!("Skipping {url}: {err}"),
            }
        }
        self.state = WorkerState::Installed;
        log::info!(
            "Installed cache {} ({stored}/{} assets)",
            self.version,
            self.assets.len()
        );
        stored
    }

    /// Delete every namespace but the current one and claim open clients
    pub fn activate(&mut self) {
        let stale: Vec<String> = self
            .storage
            .keys()
            .filter(|name| *name != self.version)
            .map(str::to_owned)
            .collect();
        for name in stale {
            self.storage.delete(&name);
            log::info!("Deleted stale cache {name}");
        }
        self.state = WorkerState::Activated;
        self.claims_clients = true;
    }

    /// Serve a request cache-first.
    ///
    /// Cross-origin requests go straight to the network. Cache-write failures
    /// never reach the caller.
    pub fn fetch(&mut self, network: &mut impl Network, request: &Request) -> FetchResult<Response> {
        let url = self.resolve(request.url())?;
        if !self.is_same_origin(&url) {
            return network.fetch(&Request::new(url.as_str()));
        }

        if let Some(cached) = self.storage.lookup(url.as_str()) {
            log::trace!("Cache hit for {url}");
            return Ok(cached.clone());
        }

        match network.fetch(&Request::new(url.as_str())) {
            Ok(response) => {
                if response.is_cacheable() {
                    if let Err(err) = self.storage.put(&self.version, url.as_str(), response.clone())
                    {
                        log::warn!("Failed to cache {url}: {err}");
                    }
                }
                Ok(response)
            }
            Err(err) => {
                log::debug!("Network failed for {url}: {err}");
                self.offline_fallback().ok_or(FetchError::Offline(url.into()))
            }
        }
    }

    fn offline_fallback(&self) -> Option<Response> {
        let document = self.offline_document.as_deref()?;
        let url = self.resolve(document).ok()?;
        self.storage.lookup(url.as_str()).cloned()
    }

    /// Absolute URL for `url`, resolving relative references against the
    /// origin. The fragment is dropped since it never reaches the network.
    pub fn resolve(&self, url: &str) -> FetchResult<Url> {
        let mut resolved = self.origin.join(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_owned(),
            source,
        })?;
        resolved.set_fragment(None);
        Ok(resolved)
    }

    /// Same scheme, host and port as the cache's origin
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeNetwork {
        responses: HashMap<String, Response>,
        offline: bool,
        requests: Vec<String>,
    }

    impl FakeNetwork {
        fn serve(mut self, url: &str, response: Response) -> Self {
            self.responses.insert(url.to_owned(), response);
            self
        }
    }

    impl Network for FakeNetwork {
        fn fetch(&mut self, request: &Request) -> FetchResult<Response> {
            self.requests.push(request.url().to_owned());
            if self.offline {
                return Err(FetchError::Network {
                    url: request.url().to_owned(),
                    reason: "offline".to_owned(),
                });
            }
            Ok(self
                .responses
                .get(request.url())
                .cloned()
                .unwrap_or(Response {
                    status: 404,
                    kind: ResponseKind::Basic,
                    content_type: None,
                    body: Vec::new(),
                }))
        }
    }

    const ORIGIN: &str = "https://paint.test";

    fn cache() -> OfflineCache {
        OfflineCache::new("v1", ORIGIN).unwrap()
    }

    fn resolved(cache: &OfflineCache, url: &str) -> String {
        cache.resolve(url).unwrap().into()
    }

    #[test]
    fn test_resolve_relative_urls() {
        let cache = OfflineCache::new("v1", "https://paint.test/").unwrap();
        assert_eq!(resolved(&cache, "./"), "https://paint.test/");
        assert_eq!(resolved(&cache, "./js/app.js"), "https://paint.test/js/app.js");
        assert_eq!(resolved(&cache, "/index.html"), "https://paint.test/index.html");
        assert_eq!(resolved(&cache, "js/../a.js#top"), "https://paint.test/a.js");
        assert_eq!(resolved(&cache, "https://cdn.test/a.css"), "https://cdn.test/a.css");
    }

    #[test]
    fn test_same_origin_follows_url_origin() {
        let cache = cache();
        let check = |url: &str| cache.is_same_origin(&cache.resolve(url).unwrap());
        assert!(check("https://paint.test?x"));
        assert!(check("https://paint.test:443/a.js"));
        assert!(check("https://PAINT.test/a.js"));
        assert!(!check("https://paint.test.evil/a.js"));
        assert!(!check("http://paint.test/a.js"));
        assert!(!check("https://paint.test:8443/a.js"));
    }

    #[test]
    fn test_bare_origin_with_query_is_cached() {
        let mut network =
            FakeNetwork::default().serve("https://paint.test/?x", Response::ok("home"));
        let mut cache = cache();
        let response = cache
            .fetch(&mut network, &Request::new("https://paint.test?x"))
            .unwrap();
        assert_eq!(response.body, b"home");
        assert!(cache.storage().get("v1", "https://paint.test/?x").is_some());
    }

    #[test]
    fn test_invalid_origin_rejected() {
        assert!(matches!(
            OfflineCache::new("v1", "paint.test"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_install_skips_failures() {
        let mut network = FakeNetwork::default().serve("https://paint.test/a.js", Response::ok("a"));
        let mut cache = cache().with_assets(["./a.js", "./missing.js"]);
        assert_eq!(cache.install(&mut network), 1);
        assert_eq!(cache.state(), WorkerState::Installed);
        assert_eq!(cache.storage().len("v1"), 1);
    }

    #[test]
    fn test_activate_drops_other_versions() {
        let mut storage = CacheStorage::new();
        storage.put("v0", "https://paint.test/a.js", Response::ok("old")).unwrap();
        let mut cache = cache().with_storage(storage);
        cache.install(&mut FakeNetwork::default());
        cache.activate();

        assert!(!cache.storage().has("v0"));
        assert!(cache.storage().has("v1"));
        assert!(cache.claims_clients());
    }

    #[test]
    fn test_fetch_caches_basic_200_only() {
        let mut network = FakeNetwork::default()
            .serve("https://paint.test/ok.png", Response::ok("png"))
            .serve(
                "https://paint.test/opaque",
                Response {
                    kind: ResponseKind::Opaque,
                    ..Response::ok("x")
                },
            );
        let mut cache = cache();

        cache.fetch(&mut network, &Request::new("./ok.png")).unwrap();
        cache.fetch(&mut network, &Request::new("./opaque")).unwrap();
        let missing = cache.fetch(&mut network, &Request::new("./nope")).unwrap();

        assert_eq!(missing.status, 404);
        assert!(cache.storage().get("v1", "https://paint.test/ok.png").is_some());
        assert!(cache.storage().get("v1", "https://paint.test/opaque").is_none());
        assert!(cache.storage().get("v1", "https://paint.test/nope").is_none());
    }

    #[test]
    fn test_cross_origin_bypasses_cache() {
        let url = "https://cdn.test/font.css";
        let mut network = FakeNetwork::default().serve(
            url,
            Response {
                kind: ResponseKind::Cors,
                ..Response::ok("css")
            },
        );
        let mut cache = cache();
        cache.fetch(&mut network, &Request::new(url)).unwrap();
        cache.fetch(&mut network, &Request::new(url)).unwrap();
        assert_eq!(network.requests.len(), 2);
        assert_eq!(cache.storage().len("v1"), 0);
    }

    #[test]
    fn test_offline_falls_back_to_document() {
        let mut network =
            FakeNetwork::default().serve("https://paint.test/index.html", Response::ok("<html>"));
        let mut cache = OfflineCache::new("v1", ORIGIN)
            .unwrap()
            .with_assets(["./index.html"])
            .with_offline_document("./index.html");
        cache.install(&mut network);
        network.offline = true;

        let response = cache.fetch(&mut network, &Request::new("./gallery")).unwrap();
        assert_eq!(response.body, b"<html>");
    }

    #[test]
    fn test_offline_without_document_errors() {
        let mut network = FakeNetwork {
            offline: true,
            ..FakeNetwork::default()
        };
        let mut cache = cache();
        let result = cache.fetch(&mut network, &Request::new("./x"));
        assert_eq!(result, Err(FetchError::Offline("https://paint.test/x".to_owned())));
    }

    #[test]
    fn test_cache_write_failure_is_swallowed() {
        let mut network = FakeNetwork::default()
            .serve("https://paint.test/a", Response::ok("a"))
            .serve("https://paint.test/b", Response::ok("b"));
        let mut cache = cache().with_storage(CacheStorage::with_quota(1));
        cache.fetch(&mut network, &Request::new("./a")).unwrap();
        let response = cache.fetch(&mut network, &Request::new("./b")).unwrap();
        assert_eq!(response.body, b"b");
        assert_eq!(cache.storage().len("v1"), 1);
    }
}
