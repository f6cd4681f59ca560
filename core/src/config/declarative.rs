use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::RegistryConfig;
use crate::errors::RegistryResult;

/// **DECLARATIVE CONFIGURATION DOCUMENT**
///
/// **PURPOSE**: The data-only part of a `RegistryConfig`, read from JSON.
/// Providers and decorators are code and cannot be declared here.
///
/// ```json
/// {
///     "services": { "Port": 8080, "Name": "vessel" },
///     "aliases": { "HttpPort": "Port" },
///     "shared": { "HttpPort": false },
///     "sharedByDefault": true
/// }
/// ```
///
/// Services are stored as `serde_json::Value` instances. Sections are
/// applied in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeclarativeConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, JsonValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub shared: BTreeMap<String, bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_by_default: Option<bool>,
}

impl DeclarativeConfig {
    pub fn from_json_str(json: &str) -> RegistryResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> RegistryResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// **LOWER INTO A BATCH**
    pub fn into_config(self) -> RegistryConfig {
        let config = self
            .services
            .into_iter()
            .fold(RegistryConfig::new(), |config, (key, value)| {
                config.with_service(key, value)
            });

        let config = self
            .aliases
            .into_iter()
            .fold(config, |config, (alias, target)| config.with_alias(alias, target));

        let config = self
            .shared
            .into_iter()
            .fold(config, |config, (key, flag)| config.with_shared(key, flag));

        match self.shared_by_default {
            Some(flag) => config.with_shared_by_default(flag),
            None => config,
        }
    }
}

impl From<DeclarativeConfig> for RegistryConfig {
    fn from(document: DeclarativeConfig) -> Self {
        document.into_config()
    }
}
