//! Pluggable function registry.
//!
//! Registered functions are what the model is allowed to call during the
//! orchestration loop. Each registration pairs a [`FunctionSpec`] (advertised
//! to the API) with an async handler invoked after argument validation.

use crate::decode::{self, Arguments};
use crate::error::RegistryError;
use crate::schema::FunctionSpec;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// A caller-supplied implementation of a registered function.
///
/// Handlers only ever see arguments that passed schema validation, and must
/// be total over that input: the returned string is placed verbatim in the
/// Function-role result message (serialize it yourself, e.g. as JSON text).
#[async_trait]
pub trait FunctionHandler: Send + Sync {
    async fn call(&self, args: &Arguments) -> String;
}

/// Plain synchronous closures register directly as handlers.
#[async_trait]
impl<F> FunctionHandler for F
where
    F: Fn(&Arguments) -> String + Send + Sync,
{
    async fn call(&self, args: &Arguments) -> String {
        self(args)
    }
}

// ---------------------------------------------------------------------------
// Function registry
// ---------------------------------------------------------------------------

struct Registration {
    spec: FunctionSpec,
    handler: Box<dyn FunctionHandler>,
}

/// Registry of callable functions.
///
/// The orchestrator advertises all registered specs on every request and
/// dispatches function calls through this registry. Registration order is
/// preserved so `describe` output is stable within a session. The registry
/// is read-only after registration and can be shared across independent
/// conversations.
#[derive(Default)]
pub struct FunctionRegistry {
    entries: Vec<Registration>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a function spec together with its handler.
    ///
    /// Names are unique; re-registering a name fails with
    /// [`RegistryError::Duplicate`].
    pub fn register(
        &mut self,
        spec: FunctionSpec,
        handler: impl FunctionHandler + 'static,
    ) -> Result<(), RegistryError> {
        if self.entries.iter().any(|e| e.spec.name == spec.name) {
            return Err(RegistryError::Duplicate(spec.name));
        }
        self.entries.push(Registration {
            spec,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Function specs for the API request, in registration order.
    pub fn describe(&self) -> Vec<FunctionSpec> {
        self.entries.iter().map(|e| e.spec.clone()).collect()
    }

    /// Validate arguments against the named function's schema and invoke
    /// its handler.
    pub async fn dispatch(&self, name: &str, args_json: &str) -> Result<String, RegistryError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.spec.name == name)
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))?;
        let args = decode::decode(&entry.spec.parameters, args_json)?;
        Ok(entry.handler.call(&args).await)
    }

    /// True if no functions are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
