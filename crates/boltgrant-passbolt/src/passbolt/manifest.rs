//! Declared grants, loaded from YAML.
//!
//! ```yaml
//! grants:
//!   - folder: Finance
//!     subject: { kind: Group, name: Accounting }
//!     level: "7"
//!   - folder: Finance
//!     subject: { kind: User, name: ada@example.com }
//!     state: absent
//! ```

use crate::passbolt::error::{Result, ShareError};
use crate::passbolt::level::PermissionLevel;
use crate::passbolt::reconciler::GrantIntent;
use crate::passbolt::types::AroKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whether a grant must exist or must not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantState {
    #[default]
    Present,
    Absent,
}

/// Who receives the grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
    pub kind: AroKind,
    pub name: String,
}

/// One declared grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantEntry {
    pub folder: String,
    pub subject: SubjectRef,
    /// Level code exactly as written. Plain scalars such as `7` or `+7`
    /// keep their source text and are checked by the level codec.
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub state: GrantState,
}

/// The whole manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantManifest {
    #[serde(default)]
    pub grants: Vec<GrantEntry>,
}

impl GrantManifest {
    /// Parse and validate a manifest.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let manifest: Self =
            serde_yaml::from_str(text).map_err(|e| ShareError::InvalidManifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read, parse and validate a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ShareError::InvalidManifest(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Check every entry. Levels go through the same codec the reconciler
    /// uses, so a bad code fails here before anything is sent.
    pub fn validate(&self) -> Result<()> {
        for (i, entry) in self.grants.iter().enumerate() {
            let at =
                |msg: String| ShareError::InvalidManifest(format!("grant #{}: {}", i + 1, msg));
            if entry.folder.trim().is_empty() {
                return Err(at("folder must not be empty".into()));
            }
            if entry.subject.name.trim().is_empty() {
                return Err(at("subject name must not be empty".into()));
            }
            match (entry.state, entry.level.as_deref()) {
                (GrantState::Present, None) => {
                    return Err(at("level is required when state is present".into()))
                }
                (GrantState::Present, Some(code)) => {
                    PermissionLevel::decode(code)?;
                }
                (GrantState::Absent, Some(_)) => {
                    return Err(at("level must be omitted when state is absent".into()))
                }
                (GrantState::Absent, None) => {}
            }
        }
        Ok(())
    }

    /// Grant intents in declaration order.
    pub fn intents(&self) -> Vec<GrantIntent> {
        self.grants.iter().map(GrantEntry::intent).collect()
    }
}

impl GrantEntry {
    pub fn intent(&self) -> GrantIntent {
        GrantIntent {
            folder: self.folder.clone(),
            subject_kind: self.subject.kind,
            subject_name: self.subject.name.clone(),
            level: match self.state {
                GrantState::Present => self.level.clone(),
                GrantState::Absent => None,
            },
        }
    }
}
