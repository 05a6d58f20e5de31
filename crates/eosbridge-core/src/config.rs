// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extension configuration.
//
// Settings are exported by the authoring tool into the app's package.json:
//
//   {
//     "project-details": { "name": "...", "version": "..." },
//     "exported-properties": {
//       "scirra-epic-games": { "product-id": "...", "client-id": "...", ... }
//     }
//   }

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{BridgeError, Result};

/// Component id registered with the host for messaging and used as the
/// key of our exported properties.
pub const COMPONENT_ID: &str = "scirra-epic-games";

/// Name of the SDK cache directory inside the app-data folder.
const CACHE_DIR_NAME: &str = "EOSCache";

/// Encryption is not used for the SDK cache; the platform still requires a
/// 64 hex digit key.
const DUMMY_ENCRYPTION_KEY: &str =
    "1111111111111111111111111111111111111111111111111111111111111111";

#[derive(Deserialize)]
struct PackageJson {
    #[serde(rename = "project-details")]
    project_details: ProjectDetails,
    #[serde(rename = "exported-properties")]
    exported_properties: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct ProjectDetails {
    name: String,
    version: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ExportedProperties {
    product_name: String,
    product_version: String,
    product_id: String,
    client_id: String,
    client_secret: String,
    sandbox_id: String,
    deployment_id: String,
}

/// SDK settings read from package.json.
#[derive(Clone, PartialEq, Eq)]
pub struct PluginConfig {
    pub product_name: String,
    pub product_version: String,
    pub product_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub sandbox_id: String,
    pub deployment_id: String,
}

impl PluginConfig {
    /// Parse the host's package.json content.
    ///
    /// All values are trimmed. An empty product name or version falls back
    /// to the project name or version. Any missing field is an error.
    pub fn from_package_json(content: &str) -> Result<Self> {
        let package: PackageJson = serde_json::from_str(content)
            .map_err(|e| BridgeError::Configuration(format!("package.json: {e}")))?;

        let props = package
            .exported_properties
            .get(COMPONENT_ID)
            .cloned()
            .ok_or_else(|| {
                BridgeError::Configuration(format!("no exported properties for {COMPONENT_ID}"))
            })?;
        let props: ExportedProperties = serde_json::from_value(props)
            .map_err(|e| BridgeError::Configuration(format!("{COMPONENT_ID}: {e}")))?;

        let project_name = package.project_details.name.trim();
        let project_version = package.project_details.version.trim();

        let mut product_name = props.product_name.trim().to_owned();
        if product_name.is_empty() {
            product_name = project_name.to_owned();
        }
        let mut product_version = props.product_version.trim().to_owned();
        if product_version.is_empty() {
            product_version = project_version.to_owned();
        }

        let config = Self {
            product_name,
            product_version,
            product_id: props.product_id.trim().to_owned(),
            client_id: props.client_id.trim().to_owned(),
            client_secret: props.client_secret.trim().to_owned(),
            sandbox_id: props.sandbox_id.trim().to_owned(),
            deployment_id: props.deployment_id.trim().to_owned(),
        };

        info!(config = ?config, "parsed package JSON");
        Ok(config)
    }
}

impl std::fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfig")
            .field("product_name", &self.product_name)
            .field("product_version", &self.product_version)
            .field("product_id", &self.product_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("sandbox_id", &self.sandbox_id)
            .field("deployment_id", &self.deployment_id)
            .finish()
    }
}

/// Options used to create the native platform instance.
#[derive(Clone)]
pub struct PlatformOptions {
    pub config: PluginConfig,
    pub cache_directory: PathBuf,
    pub is_server: bool,
    pub encryption_key: String,
}

impl PlatformOptions {
    pub fn new(config: PluginConfig, app_data_folder: &Path) -> Self {
        Self {
            config,
            cache_directory: app_data_folder.join(CACHE_DIR_NAME),
            is_server: false,
            encryption_key: DUMMY_ENCRYPTION_KEY.to_owned(),
        }
    }
}

impl std::fmt::Debug for PlatformOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformOptions")
            .field("config", &self.config)
            .field("cache_directory", &self.cache_directory)
            .field("is_server", &self.is_server)
            .finish_non_exhaustive()
    }
}

/// What the process command line says about how the app was launched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherInfo {
    /// Started from the store launcher (`-EpicPortal`).
    pub is_epic_launcher: bool,
    /// Exchange code handed over with `-AUTH_PASSWORD=`; empty if absent.
    pub exchange_code: String,
}

impl LauncherInfo {
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut info = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            if arg == "-EpicPortal" {
                info.is_epic_launcher = true;
            } else if let Some(code) = arg.strip_prefix("-AUTH_PASSWORD=") {
                info.exchange_code = code.to_owned();
            }
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package_json(product_name: &str, client_id: &str) -> String {
        format!(
            r#"{{
                "project-details": {{ "name": " My Game ", "version": "1.2.0.0" }},
                "exported-properties": {{
                    "scirra-epic-games": {{
                        "product-name": "{product_name}",
                        "product-version": "",
                        "product-id": " prod ",
                        "client-id": "{client_id}",
                        "client-secret": "secret",
                        "sandbox-id": "sandbox",
                        "deployment-id": "deploy\n"
                    }}
                }}
            }}"#
        )
    }

    #[test]
    fn values_are_trimmed_and_fall_back_to_project_details() {
        let config = PluginConfig::from_package_json(&package_json("  ", " client ")).expect("parse");
        assert_eq!(config.product_name, "My Game");
        assert_eq!(config.product_version, "1.2.0.0");
        assert_eq!(config.product_id, "prod");
        assert_eq!(config.client_id, "client");
        assert_eq!(config.deployment_id, "deploy");
    }

    #[test]
    fn explicit_product_name_wins() {
        let config = PluginConfig::from_package_json(&package_json("Shipped Name", "c")).expect("parse");
        assert_eq!(config.product_name, "Shipped Name");
    }

    #[test]
    fn missing_component_is_configuration_error() {
        let json = r#"{
            "project-details": { "name": "x", "version": "1" },
            "exported-properties": {}
        }"#;
        let err = PluginConfig::from_package_json(json).expect_err("should fail");
        assert!(matches!(err, BridgeError::Configuration(_)));
    }

    #[test]
    fn missing_field_is_configuration_error() {
        let json = r#"{
            "project-details": { "name": "x", "version": "1" },
            "exported-properties": { "scirra-epic-games": { "product-id": "p" } }
        }"#;
        assert!(matches!(
            PluginConfig::from_package_json(json),
            Err(BridgeError::Configuration(_))
        ));
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        assert!(matches!(
            PluginConfig::from_package_json("{ not json"),
            Err(BridgeError::Configuration(_))
        ));
    }

    #[test]
    fn secret_is_redacted() {
        let config = PluginConfig::from_package_json(&package_json("n", "c")).expect("parse");
        assert!(!format!("{config:?}").contains("secret\""));
        assert!(format!("{config:?}").contains("<redacted>"));
    }

    #[test]
    fn cache_directory_lives_under_app_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PluginConfig::from_package_json(&package_json("n", "c")).expect("parse");
        let options = PlatformOptions::new(config, dir.path());
        assert_eq!(options.cache_directory, dir.path().join("EOSCache"));
        assert!(!options.is_server);
        assert_eq!(options.encryption_key.len(), 64);
    }

    #[test]
    fn launcher_arguments_are_detected() {
        let info = LauncherInfo::from_args(["game.exe", "-EpicPortal", "-AUTH_PASSWORD=abc123", "-Other"]);
        assert!(info.is_epic_launcher);
        assert_eq!(info.exchange_code, "abc123");

        let plain = LauncherInfo::from_args(["game.exe"]);
        assert_eq!(plain, LauncherInfo::default());
    }
}
