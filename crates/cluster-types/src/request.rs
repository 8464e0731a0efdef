use serde::{Deserialize, Serialize};
use time::Duration;

use crate::mapping::Mappings;
use crate::settings::{default_request_timeout, Settings};

/// `(cause, index_name, settings, mappings, timeout)` (§3), built with the fluent setters
/// §6 specifies. `timeout` defaults to 5s.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexRequest {
    cause: String,
    index_name: String,
    settings: Settings,
    mappings: Mappings,
    timeout: Duration,
}

impl CreateIndexRequest {
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            cause: String::new(),
            index_name: index_name.into(),
            settings: Settings::new(),
            mappings: Mappings::new(),
            timeout: default_request_timeout(),
        }
    }

    pub fn cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = cause.into();
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn mappings(mut self, mappings: Mappings) -> Self {
        self.mappings = mappings;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cause_str(&self) -> &str {
        &self.cause
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn settings_ref(&self) -> &Settings {
        &self.settings
    }

    pub fn mappings_ref(&self) -> &Mappings {
        &self.mappings
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }
}

/// `{ acknowledged: bool }` (§3). True iff all non-master peers reported creation before the
/// deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub acknowledged: bool,
}

impl Response {
    pub fn acknowledged() -> Self {
        Self { acknowledged: true }
    }

    pub fn timed_out() -> Self {
        Self { acknowledged: false }
    }
}
