//! Module: session
//! Responsibility: validate a request completely, then hand it to storage.
//! Does not own: retries or interpretation of storage failures.

use crate::{
    config::Config,
    error::{Error, StorageError},
    obs::sink::{self, MetricsEvent},
    query::{Action, Request, ValidateError, validate_request},
};
use serde_json::Value as JsonValue;
use tracing::{debug, error, warn};
use tutordb_schema::prelude::{Registry, registry};

///
/// Storage
///
/// The engine that executes validated requests.
/// Referential existence (e.g. `connect` to a missing row) is checked here.
///

pub trait Storage {
    type Output;

    fn execute(&self, request: Request) -> Result<Self::Output, StorageError>;
}

///
/// Session
///

pub struct Session<S> {
    registry: &'static Registry,
    config: Config,
    storage: S,
}

impl<S: Storage> Session<S> {
    /// Open a session over the built-in catalog with default limits.
    pub fn new(storage: S) -> Result<Self, Error> {
        Self::with_config(storage, Config::default())
    }

    pub fn with_config(storage: S, config: Config) -> Result<Self, Error> {
        Ok(Self::from_parts(registry()?, config, storage))
    }

    #[must_use]
    pub const fn from_parts(registry: &'static Registry, config: Config, storage: S) -> Self {
        Self {
            registry,
            config,
            storage,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Validate without executing.
    pub fn validate(
        &self,
        entity: &str,
        action: Action,
        args: &JsonValue,
    ) -> Result<Request, ValidateError> {
        match validate_request(self.registry, &self.config, entity, action, args) {
            Ok(request) => {
                debug!(entity = request.entity, %action, "request accepted");
                self.record(MetricsEvent::RequestValidated {
                    entity: request.entity,
                    action,
                });

                Ok(request)
            }
            Err(err) => {
                warn!(
                    entity,
                    %action,
                    kind = %err.kind(),
                    path = err.path().unwrap_or(""),
                    error = %err.leaf(),
                    "request rejected"
                );
                self.record(MetricsEvent::RequestRejected {
                    entity: self.registry.entity(entity).map(|e| e.name),
                    kind: err.kind(),
                });

                Err(err)
            }
        }
    }

    /// Validate, then execute. Storage is never called for an invalid request.
    pub fn execute(
        &self,
        entity: &str,
        action: Action,
        args: &JsonValue,
    ) -> Result<S::Output, Error> {
        let request = self.validate(entity, action, args)?;
        let entity = request.entity;

        self.record(MetricsEvent::StorageCall { entity, action });
        self.storage.execute(request).map_err(|err| {
            error!(entity, %action, code = err.code.as_deref(), error = %err, "storage failed");
            self.record(MetricsEvent::StorageFailed { entity, action });

            Error::Storage(err)
        })
    }

    fn record(&self, event: MetricsEvent) {
        if self.config.metrics {
            sink::record(event);
        }
    }
}
