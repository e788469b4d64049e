#![forbid(unsafe_code)]

//! Cooperative-runtime primitives for the modal stack.
//!
//! Everything here runs on a single thread and a single local executor
//! (`futures::executor::LocalPool` or any [`futures::task::LocalSpawn`]):
//!
//! - [`promise`]: single-assignment [`Deferred`] / shareable [`Promise`] pairs.
//! - [`transition`]: one-shot "transition finished" notifications.
//! - [`scope`]: hierarchical view-model scopes with explicit destruction.
//! - [`injector`]: named-argument dependency resolution.
//! - [`template`]: asynchronous template sources and a de-duplicating cache.
//!
//! # Invariants
//!
//! 1. A `Deferred` settles at most once; later settlements are ignored.
//! 2. Transition callbacks fire exactly once and never while the signal
//!    holds an internal borrow.
//! 3. A destroyed scope stays destroyed; destroy listeners run once.

pub mod error;
pub mod injector;
pub mod promise;
pub mod scope;
pub mod template;
pub mod transition;

pub use error::ResolveError;
pub use injector::{Injectable, Injector, Locals, ProviderFuture};
pub use promise::{Deferred, Promise, deferred};
pub use scope::{Scope, ScopeId};
pub use template::{StaticTemplates, TemplateCache, TemplateFuture, TemplateSource};
pub use transition::{
    ImmediateTransitions, ManualTransitions, TimedTransitions, TransitionEnd, TransitionPhase,
    TransitionSignal,
};

/// Dynamic value passed between dialogs, providers, and scopes.
pub use serde_json::Value;
