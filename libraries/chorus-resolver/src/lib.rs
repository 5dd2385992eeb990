//! Chorus Resolver
//!
//! Turns a free-form request ("play Top Hits --list") into an ordered,
//! non-empty list of playables.
//!
//! This crate provides:
//! - Source classification with a fixed precedence (URL, provider URI, flags)
//! - Per-call credential selection (requester login vs shared credentials)
//! - Bounded searches with zero / one / many handling
//! - An asynchronous disambiguation gate for several candidates
//! - A playable factory with optional background redirect of catalog items
//! - Fixture-backed in-memory providers for demos and tests
//!
//! # Example
//!
//! ```rust,no_run
//! use chorus_core::types::{flags, CommandInput, Requester};
//! use chorus_resolver::memory::MemoryProviders;
//! use chorus_resolver::{
//!     BoundedRedirectExecutor, ChannelDisambiguator, PlayableResolver, ResolveRequest,
//!     ResolverConfig, StandardSyntax,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> chorus_core::Result<()> {
//! let config = ResolverConfig::default();
//! let providers = Arc::new(MemoryProviders::from_json("{}")?);
//! let executor = BoundedRedirectExecutor::new(providers.clone(), config.redirect_concurrency)?;
//! let (disambiguator, _questions) = ChannelDisambiguator::channel(1);
//!
//! let collaborators = providers.collaborators(
//!     Arc::new(StandardSyntax::new(config.catalog_uri_scheme.clone())),
//!     Arc::new(executor),
//!     Arc::new(disambiguator),
//! );
//! let resolver = PlayableResolver::new(config, collaborators);
//!
//! let request = ResolveRequest::new(
//!     CommandInput::new("Top Hits").flag(flags::LIST),
//!     Requester::new("u1", "guild-1"),
//! );
//! let outcome = resolver.resolve(&request).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod classifier;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod executor;
pub mod factory;
pub mod gate;
pub mod memory;
pub mod resolver;
pub mod sink;

pub use classifier::{classify, StandardSyntax};
pub use crate::config::ResolverConfig;
pub use credentials::CredentialSelector;
pub use dispatch::{Cardinality, Dispatcher};
pub use executor::BoundedRedirectExecutor;
pub use factory::PlayableFactory;
pub use gate::{
    ChannelDisambiguator, DisambiguationGate, Disambiguator, Labeler, PendingQuestion, Question,
    QuestionOption,
};
pub use resolver::{Collaborators, PlayableResolver, ResolveRequest};
pub use sink::ResultSink;
