// src/types.rs
//
// Common shared types for the epidemica engine.

use serde::{Deserialize, Serialize};

/// Simulation step index (one step = one simulated day).
pub type StepIndex = u64;

/// Closed set of resource-allocation categories.
///
/// The allocation ledger is a fixed-size record keyed by this enum, so an
/// unknown category is unrepresentable rather than silently creating a
/// new bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Healthcare,
    Economic,
    Research,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 3] = [
        ResourceCategory::Healthcare,
        ResourceCategory::Economic,
        ResourceCategory::Research,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Healthcare => "healthcare",
            ResourceCategory::Economic => "economic",
            ResourceCategory::Research => "research",
        }
    }
}

/// Geographic region in the two-region population model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Urban,
    Rural,
}

/// Economic sector in the three-sector GDP model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Essential,
    InPersonServices,
    RemoteCapable,
}

impl Sector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Essential => "essential",
            Sector::InPersonServices => "in_person_services",
            Sector::RemoteCapable => "remote_capable",
        }
    }
}
