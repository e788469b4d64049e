#![forbid(unsafe_code)]

//! Asynchronous template sources and a de-duplicating cache.
//!
//! [`TemplateCache`] wraps any [`TemplateSource`]. Concurrent requests for the
//! same reference share one in-flight fetch; successful results are kept for
//! the life of the cache, failed ones are evicted so a later request retries.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use futures::future::{self, FutureExt, LocalBoxFuture, Shared};

use crate::ResolveError;

/// Future yielding template markup.
pub type TemplateFuture = LocalBoxFuture<'static, Result<Rc<str>, ResolveError>>;

/// Something that can load template markup by reference.
pub trait TemplateSource {
    fn fetch(&self, url: &str) -> TemplateFuture;
}

/// In-memory template source.
#[derive(Default)]
pub struct StaticTemplates {
    entries: RefCell<AHashMap<String, Rc<str>>>,
    fetches: Cell<usize>,
}

impl StaticTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(self, url: impl Into<String>, content: impl Into<Rc<str>>) -> Self {
        self.insert(url, content);
        self
    }

    pub fn insert(&self, url: impl Into<String>, content: impl Into<Rc<str>>) {
        self.entries
            .borrow_mut()
            .insert(url.into(), content.into());
    }

    /// Number of `fetch` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl TemplateSource for StaticTemplates {
    fn fetch(&self, url: &str) -> TemplateFuture {
        self.fetches.set(self.fetches.get() + 1);
        let found = self.entries.borrow().get(url).cloned();
        let result = found.ok_or_else(|| ResolveError::Template {
            url: url.to_owned(),
            message: "not found".to_owned(),
        });
        future::ready(result).boxed_local()
    }
}

impl fmt::Debug for StaticTemplates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTemplates")
            .field("templates", &self.entries.borrow().len())
            .field("fetches", &self.fetches.get())
            .finish()
    }
}

type SharedTemplate = Shared<TemplateFuture>;

/// Caching front for a [`TemplateSource`].
#[derive(Clone)]
pub struct TemplateCache {
    source: Rc<dyn TemplateSource>,
    entries: Rc<RefCell<AHashMap<String, SharedTemplate>>>,
}

impl TemplateCache {
    pub fn new(source: Rc<dyn TemplateSource>) -> Self {
        Self {
            source,
            entries: Rc::new(RefCell::new(AHashMap::new())),
        }
    }

    /// Seed the cache so `url` never reaches the source.
    pub fn put(&self, url: impl Into<String>, content: impl Into<Rc<str>>) {
        let ready: TemplateFuture = future::ready(Ok(content.into())).boxed_local();
        self.entries.borrow_mut().insert(url.into(), ready.shared());
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.borrow().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop a cached entry. Returns whether one existed.
    pub fn remove(&self, url: &str) -> bool {
        self.entries.borrow_mut().remove(url).is_some()
    }

    /// Load `url`, from cache when possible.
    pub fn get(&self, url: &str) -> TemplateFuture {
        let cached = self.entries.borrow().get(url).cloned();
        let shared = match cached {
            Some(shared) => shared,
            None => {
                tracing::debug!(url, "template cache miss");
                let shared = self.source.fetch(url).shared();
                self.entries
                    .borrow_mut()
                    .insert(url.to_owned(), shared.clone());
                shared
            }
        };

        let entries = Rc::clone(&self.entries);
        let url = url.to_owned();
        let probe = shared.clone();
        async move {
            let outcome = shared.await;
            if outcome.is_err() {
                let mut entries = entries.borrow_mut();
                if entries.get(&url).is_some_and(|s| s.ptr_eq(&probe)) {
                    entries.remove(&url);
                }
            }
            outcome
        }
        .boxed_local()
    }
}

impl fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCache")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn cache_with(source: &Rc<StaticTemplates>) -> TemplateCache {
        TemplateCache::new(Rc::clone(source) as Rc<dyn TemplateSource>)
    }

    #[test]
    fn fetches_once_then_serves_from_cache() {
        let source = Rc::new(StaticTemplates::new().with("a.html", "<p>a</p>"));
        let cache = cache_with(&source);

        assert_eq!(block_on(cache.get("a.html")).as_deref(), Ok("<p>a</p>"));
        assert_eq!(block_on(cache.get("a.html")).as_deref(), Ok("<p>a</p>"));
        assert_eq!(source.fetch_count(), 1);
        assert!(cache.contains("a.html"));
    }

    #[test]
    fn concurrent_requests_share_one_fetch() {
        let source = Rc::new(StaticTemplates::new().with("a.html", "A"));
        let cache = cache_with(&source);

        let first = cache.get("a.html");
        let second = cache.get("a.html");
        let (a, b) = block_on(future::join(first, second));
        assert_eq!(a.as_deref(), Ok("A"));
        assert_eq!(b.as_deref(), Ok("A"));
        assert_eq!(source.fetch_count(), 1);
    }

    #[test]
    fn failures_are_evicted() {
        let source = Rc::new(StaticTemplates::new());
        let cache = cache_with(&source);

        let err = block_on(cache.get("late.html")).expect_err("missing template");
        assert!(matches!(err, ResolveError::Template { ref url, .. } if url == "late.html"));
        assert!(!cache.contains("late.html"));

        source.insert("late.html", "now here");
        assert_eq!(block_on(cache.get("late.html")).as_deref(), Ok("now here"));
        assert_eq!(source.fetch_count(), 2);
    }

    #[test]
    fn seeded_entries_skip_the_source() {
        let source = Rc::new(StaticTemplates::new());
        let cache = cache_with(&source);
        cache.put("seeded.html", "S");

        assert_eq!(block_on(cache.get("seeded.html")).as_deref(), Ok("S"));
        assert_eq!(source.fetch_count(), 0);
        assert_eq!(cache.len(), 1);
        assert!(cache.remove("seeded.html"));
        assert!(cache.is_empty());
    }
}
