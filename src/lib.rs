//! Parley — a function-calling conversation orchestrator for
//! OpenAI-compatible completion APIs.
//!
//! The crate drives the turn-taking loop around model-invoked function
//! calls: callers register named functions with typed parameter schemas, and
//! the [`orchestrator::Orchestrator`] decides after each model response
//! whether to surface a final answer, dispatch a function call and re-inject
//! its result, or report an incomplete outcome. Works with any endpoint
//! speaking the `/chat/completions` function-calling protocol (OpenAI,
//! Ollama, OpenRouter, etc.).
//!
//! # Quick start
//!
//! ```no_run
//! use parley::config::load_config;
//! use parley::decode::Arguments;
//! use parley::orchestrator::Orchestrator;
//! use parley::registry::FunctionRegistry;
//! use parley::schema::{FunctionSpec, Property, SchemaObject};
//!
//! fn lookup(args: &Arguments) -> String {
//!     format!("{{\"location\":{:?},\"temperature\":22.5}}",
//!         args.string("location").unwrap_or_default())
//! }
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let mut registry = FunctionRegistry::new();
//! registry
//!     .register(
//!         FunctionSpec::new(
//!             "get_current_weather",
//!             "Get the current weather in a given location",
//!             SchemaObject::new()
//!                 .property(Property::string("location", "City and state").required()),
//!         ),
//!         lookup,
//!     )
//!     .unwrap();
//! let mut orchestrator = Orchestrator::new(config, registry);
//! let outcome = orchestrator.run_turn("What's the weather in Glasgow?").await;
//! println!("{outcome:?}");
//! # }
//! ```

pub mod api;
pub mod build_info;
pub mod config;
pub mod decode;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod render;
pub mod schema;
pub mod transcript;
pub mod types;
