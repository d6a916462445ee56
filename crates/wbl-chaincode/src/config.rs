use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wbl_index::IndexConfig;

use crate::capability::{AllowAll, AttributeCapability, AttributeSource, CapabilityCheck};
use crate::error::{DispatchError, DispatchResult};

/// Chaincode configuration, usually read from `wbl.toml`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaincodeConfig {
    /// Require `Create*` blobs to decode as a waybill document whose
    /// embedded id (if any) matches the identifier argument.
    pub validate_documents: bool,
    pub index: IndexConfig,
    pub access: AccessConfig,
}

/// Attribute-based access rules. With no `attribute` every caller is
/// allowed everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub attribute: Option<String>,
    pub read: Vec<String>,
    pub write: Vec<String>,
}

impl AccessConfig {
    /// Build the capability check these rules describe.
    pub fn build(&self, source: Arc<dyn AttributeSource>) -> Arc<dyn CapabilityCheck> {
        match &self.attribute {
            Some(attribute) => Arc::new(AttributeCapability::new(
                attribute.clone(),
                self.read.clone(),
                self.write.clone(),
                source,
            )),
            None => Arc::new(AllowAll),
        }
    }
}

impl ChaincodeConfig {
    pub fn from_toml_str(s: &str) -> DispatchResult<Self> {
        toml::from_str(s).map_err(|e| DispatchError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> DispatchResult<String> {
        toml::to_string_pretty(self).map_err(|e| DispatchError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> DispatchResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DispatchError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
