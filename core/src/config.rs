//! Client and per-call configuration.
//!
//! # Design
//! Every option is an `Option` so that layers can be stacked: a call-level
//! `Configuration` is merged over the client-level one, and whatever is still
//! unset falls back to the built-in default in `resolve`. Parsing responses
//! never depends on configuration; it only shapes outgoing request bodies.

use serde::{Deserialize, Serialize};

/// Layered, override-able client options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// Pretty-print outgoing JSON request bodies. Defaults to `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretty_json: Option<bool>,
}

impl Configuration {
    /// A configuration that sets nothing and defers every option.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn pretty_json(mut self, enabled: bool) -> Self {
        self.pretty_json = Some(enabled);
        self
    }

    /// Layer `overrides` on top of `self`. Options set in `overrides` win.
    pub fn merge(&self, overrides: &Configuration) -> Configuration {
        Configuration {
            pretty_json: overrides.pretty_json.or(self.pretty_json),
        }
    }

    /// Fill unset options with their defaults.
    pub fn resolve(&self) -> ResolvedConfiguration {
        ResolvedConfiguration {
            pretty_json: self.pretty_json.unwrap_or(false),
        }
    }
}

/// A configuration with every option decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    pub pretty_json: bool,
}
