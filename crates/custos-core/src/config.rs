//! Audit configuration.
//!
//! Settings are usually loaded from a YAML or JSON file:
//!
//! ```yaml
//! audit_models:
//!   - ["geonode.layers.models.Layer", "Layer"]
//!   - ["geonode.maps.models.Map", "Map"]
//! file_auditing: true
//! logfile_location: /var/log/custos/audit.json
//! database: /var/lib/custos/audit.sqlite3
//! ```

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One `(dotted-type-path, resource-type-label)` entry of `audit_models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct AuditModelSpec {
    /// Dotted path of the audited type, e.g. `geonode.layers.models.Layer`.
    pub type_path: String,
    /// Label recorded as the resource type, e.g. `Layer`.
    pub resource_type: String,
}

impl AuditModelSpec {
    /// Creates a new entry.
    #[must_use]
    pub fn new(type_path: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            type_path: type_path.into(),
            resource_type: resource_type.into(),
        }
    }

    /// Checks that the type path is a well-formed dotted path and the label
    /// is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTypePath`] or
    /// [`ConfigError::EmptyResourceType`].
    pub fn validate(&self) -> Result<()> {
        split_type_path(&self.type_path)?;
        if self.resource_type.trim().is_empty() {
            return Err(ConfigError::EmptyResourceType {
                path: self.type_path.clone(),
            });
        }
        Ok(())
    }

    /// Returns the type name (last path segment), if the path is well formed.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        split_type_path(&self.type_path).ok().map(|(_, name)| name)
    }
}

impl From<(String, String)> for AuditModelSpec {
    fn from((type_path, resource_type): (String, String)) -> Self {
        Self {
            type_path,
            resource_type,
        }
    }
}

impl From<AuditModelSpec> for (String, String) {
    fn from(spec: AuditModelSpec) -> Self {
        (spec.type_path, spec.resource_type)
    }
}

/// Splits `module.path.Type` into `("module.path", "Type")`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTypePath`] when the path has no module part
/// or any segment is not an identifier.
pub fn split_type_path(path: &str) -> Result<(&str, &str)> {
    let invalid = |reason: &str| ConfigError::InvalidTypePath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let (module, name) = path
        .rsplit_once('.')
        .ok_or_else(|| invalid("expected <module>.<Type>"))?;

    for segment in module.split('.').chain(std::iter::once(name)) {
        if !is_identifier(segment) {
            return Err(invalid(&format!("'{segment}' is not an identifier")));
        }
    }

    Ok((module, name))
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

const fn default_file_auditing() -> bool {
    true
}

/// Audit settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Audited types and their resource-type labels, in priority order.
    #[serde(default)]
    pub audit_models: Vec<AuditModelSpec>,

    /// Whether per-call file read/write events are recorded.
    #[serde(default = "default_file_auditing")]
    pub file_auditing: bool,

    /// Location of the JSON-lines audit trail, if enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logfile_location: Option<PathBuf>,

    /// Location of the SQLite audit store, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            audit_models: Vec::new(),
            file_auditing: default_file_auditing(),
            logfile_location: None,
            database: None,
        }
    }
}

impl AuditSettings {
    /// Creates empty settings with file auditing enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a file. `.json` files are parsed as JSON,
    /// everything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parses and validates YAML settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or fails validation.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses and validates JSON settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates every `audit_models` entry.
    ///
    /// # Errors
    ///
    /// Returns the first entry error found.
    pub fn validate(&self) -> Result<()> {
        self.audit_models.iter().try_for_each(AuditModelSpec::validate)
    }

    /// Appends an audited type.
    #[must_use]
    pub fn with_model(
        mut self,
        type_path: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        self.audit_models
            .push(AuditModelSpec::new(type_path, resource_type));
        self
    }

    /// Enables or disables per-call file auditing.
    #[must_use]
    pub const fn with_file_auditing(mut self, enabled: bool) -> Self {
        self.file_auditing = enabled;
        self
    }

    /// Sets the JSON-lines trail location.
    #[must_use]
    pub fn with_logfile_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.logfile_location = Some(path.into());
        self
    }

    /// Sets the SQLite store location.
    #[must_use]
    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = AuditSettings::new();
        assert!(settings.audit_models.is_empty());
        assert!(settings.file_auditing);
        assert_eq!(settings.logfile_location, None);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
audit_models:
  - ["geonode.layers.models.Layer", "Layer"]
  - ["geonode.maps.models.Map", "Map"]
file_auditing: false
logfile_location: /tmp/audit.json
"#;
        let settings = AuditSettings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.audit_models.len(), 2);
        assert_eq!(
            settings.audit_models[0],
            AuditModelSpec::new("geonode.layers.models.Layer", "Layer")
        );
        assert!(!settings.file_auditing);
        assert_eq!(
            settings.logfile_location,
            Some(PathBuf::from("/tmp/audit.json"))
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"audit_models": [["app.models.Doc", "Document"]]}"#;
        let settings = AuditSettings::from_json_str(json).unwrap();
        assert_eq!(settings.audit_models[0].resource_type, "Document");
        assert!(settings.file_auditing);
    }

    #[test]
    fn test_malformed_path_fails_fast() {
        let yaml = r#"audit_models: [["Layer", "Layer"]]"#;
        let err = AuditSettings::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTypePath { .. }));

        let yaml = r#"audit_models: [["app..Layer", "Layer"]]"#;
        assert!(AuditSettings::from_yaml_str(yaml).is_err());

        let yaml = r#"audit_models: [["app.models.9Layer", "Layer"]]"#;
        assert!(AuditSettings::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_empty_label_rejected() {
        let settings = AuditSettings::new().with_model("app.models.Layer", " ");
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::EmptyResourceType { .. })
        ));
    }

    #[test]
    fn test_split_type_path() {
        assert_eq!(
            split_type_path("app.models.Layer").unwrap(),
            ("app.models", "Layer")
        );
        assert_eq!(
            AuditModelSpec::new("a.B", "B").type_name(),
            Some("B")
        );
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("audit.json");
        std::fs::File::create(&json_path)
            .unwrap()
            .write_all(br#"{"audit_models": [["a.B", "B"]], "database": "audit.db"}"#)
            .unwrap();
        let settings = AuditSettings::from_file(&json_path).unwrap();
        assert_eq!(settings.database, Some(PathBuf::from("audit.db")));

        let yaml_path = dir.path().join("audit.yaml");
        std::fs::write(&yaml_path, "file_auditing: false\n").unwrap();
        let settings = AuditSettings::from_file(&yaml_path).unwrap();
        assert!(!settings.file_auditing);
    }

    #[test]
    fn test_from_file_missing() {
        let err = AuditSettings::from_file("/nonexistent/custos.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_serialization_uses_pairs() {
        let settings = AuditSettings::new().with_model("a.B", "B");
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains(r#""audit_models":[["a.B","B"]]"#));
    }
}
