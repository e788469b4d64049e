#![forbid(unsafe_code)]

//! Named-argument dependency resolution.
//!
//! An [`Injectable`] is a provider function plus the names of the arguments
//! it expects. [`Injector::invoke`] looks each name up in the caller-supplied
//! [`Locals`] first and in the service registry second, then calls the
//! provider with the values in declaration order.
//!
//! Providers are asynchronous: they return a [`ProviderFuture`]. Synchronous
//! providers are wrapped with [`Injectable::sync`].
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown argument | Name in neither locals nor registry | Ready `Err(UnknownDependency)` |
//! | Provider rejects | Provider future yields `Err` | Error passed through |

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use ahash::AHashMap;
use futures::future::{self, FutureExt, LocalBoxFuture};
use serde_json::Value;

use crate::ResolveError;

/// Future produced by a provider.
pub type ProviderFuture = LocalBoxFuture<'static, Result<Value, ResolveError>>;

/// Per-invocation named values that take precedence over registered services.
pub type Locals = AHashMap<String, Value>;

type ProviderFn = dyn Fn(Vec<Value>) -> ProviderFuture;

/// A provider function with declared argument names.
#[derive(Clone)]
pub struct Injectable {
    deps: Rc<[String]>,
    func: Rc<ProviderFn>,
}

impl Injectable {
    /// An asynchronous provider taking the named arguments in order.
    pub fn new<I, S, F, Fut>(deps: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Result<Value, ResolveError>> + 'static,
    {
        Self {
            deps: deps.into_iter().map(Into::into).collect(),
            func: Rc::new(move |args| f(args).boxed_local()),
        }
    }

    /// A synchronous provider taking the named arguments in order.
    pub fn sync<I, S, F>(deps: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Vec<Value>) -> Result<Value, ResolveError> + 'static,
    {
        Self::new(deps, move |args| future::ready(f(args)))
    }

    /// A provider with no arguments that yields a fixed value.
    pub fn value(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::sync(std::iter::empty::<String>(), move |_| Ok(value.clone()))
    }

    /// Argument names in call order.
    pub fn deps(&self) -> &[String] {
        &self.deps
    }
}

impl fmt::Debug for Injectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injectable")
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

/// Registry of named services and invoker of [`Injectable`]s.
#[derive(Default)]
pub struct Injector {
    services: RefCell<AHashMap<String, Value>>,
}

impl Injector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a named service value.
    pub fn register(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.services
            .borrow_mut()
            .insert(name.into(), value.into());
    }

    pub fn has(&self, name: &str) -> bool {
        self.services.borrow().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.services.borrow().get(name).cloned()
    }

    /// Call `injectable` with its arguments resolved by name.
    pub fn invoke(&self, injectable: &Injectable, locals: Option<&Locals>) -> ProviderFuture {
        let mut args = Vec::with_capacity(injectable.deps.len());
        for name in injectable.deps.iter() {
            let value = locals
                .and_then(|l| l.get(name).cloned())
                .or_else(|| self.get(name));
            match value {
                Some(value) => args.push(value),
                None => {
                    tracing::debug!(dependency = %name, "unknown dependency");
                    return future::ready(Err(ResolveError::UnknownDependency {
                        name: name.clone(),
                    }))
                    .boxed_local();
                }
            }
        }
        (injectable.func)(args)
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.services.borrow().keys().cloned().collect();
        names.sort();
        f.debug_struct("Injector").field("services", &names).finish()
    }
}
