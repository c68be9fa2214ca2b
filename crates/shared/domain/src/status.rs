//! Status shapes reported by the feature manager and the application.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureStatus {
    Active,
    Failed,
}

/// Per-feature bookkeeping recorded after a successful registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub namespace: String,
    pub status: FeatureStatus,
    pub registered_at: DateTime<Local>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturesStatus {
    pub total_features: usize,
    pub features: BTreeMap<String, FeatureRecord>,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStatus {
    pub initialized: bool,
    pub settings_loaded: bool,
}

/// Feature status plus the `application` section, flattened into one object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub features: FeaturesStatus,
    pub application: ApplicationStatus,
}
