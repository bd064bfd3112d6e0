//! Technique catalog: sports → techniques → joint-angle tuples.
//!
//! The on-disk format mirrors what the rule source hands out, a flat list of
//! `(joint1, joint2, joint3, expectedAngle)` entries per technique, so a file
//! exported from the remote store can be dropped in as-is.

use anyhow::{Context, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crate::error::{OverlayError, OverlayResult};
use crate::pose::Topology;
use crate::rules::{ActiveRules, JointRule, RuleSet};

/// (sport, technique) pair selecting a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TechniqueKey {
    pub sport: String,
    pub technique: String,
}

impl TechniqueKey {
    pub fn new(sport: impl Into<String>, technique: impl Into<String>) -> Self {
        Self {
            sport: sport.into(),
            technique: technique.into(),
        }
    }
}

impl fmt::Display for TechniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sport, self.technique)
    }
}

/// One catalog entry before validation. `joint2` is the vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJoint {
    pub joint1: usize,
    pub joint2: usize,
    pub joint3: usize,
    pub expected_angle: f32,
    /// Falls back to the configured tolerance when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f32>,
}

impl RawJoint {
    pub fn new(joint1: usize, joint2: usize, joint3: usize, expected_angle: f32) -> Self {
        Self {
            joint1,
            joint2,
            joint3,
            expected_angle,
            tolerance: None,
        }
    }

    pub fn into_rule(self, default_tolerance: f32) -> OverlayResult<JointRule> {
        JointRule::from_triple(
            self.joint1,
            self.joint2,
            self.joint3,
            self.expected_angle,
            self.tolerance.unwrap_or(default_tolerance),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechniqueCatalog {
    #[serde(default)]
    sports: BTreeMap<String, BTreeMap<String, Vec<RawJoint>>>,
}

impl TechniqueCatalog {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read technique catalog {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse technique catalog {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Catalog shipped with the crate (sprint knee drive and support leg).
    pub fn builtin() -> Self {
        use crate::pose::PoseLandmark::*;

        Self::default().with_technique(
            TechniqueKey::new("Sprint", "Technique1"),
            vec![
                RawJoint::new(RightHip.index(), RightKnee.index(), RightAnkle.index(), 90.0),
                RawJoint::new(RightAnkle.index(), RightKnee.index(), RightHip.index(), 90.0),
                RawJoint::new(LeftHip.index(), LeftKnee.index(), LeftAnkle.index(), 120.0),
            ],
        )
    }

    pub fn with_technique(mut self, key: TechniqueKey, joints: Vec<RawJoint>) -> Self {
        self.sports
            .entry(key.sport)
            .or_default()
            .insert(key.technique, joints);
        self
    }

    pub fn sports(&self) -> impl Iterator<Item = &str> {
        self.sports.keys().map(String::as_str)
    }

    /// Technique names for a sport, sorted. Empty for an unknown sport.
    pub fn techniques(&self, sport: &str) -> Vec<&str> {
        self.sports
            .get(sport)
            .map(|t| t.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn raw_joints(&self, key: &TechniqueKey) -> Option<&[RawJoint]> {
        self.sports
            .get(&key.sport)
            .and_then(|t| t.get(&key.technique))
            .map(Vec::as_slice)
    }

    /// Normalizes the technique's tuples into validated rules.
    pub fn rule_set(&self, key: &TechniqueKey, default_tolerance: f32) -> OverlayResult<RuleSet> {
        let joints = self.raw_joints(key).ok_or_else(|| {
            OverlayError::MalformedRuleConfiguration(format!("unknown technique {}", key))
        })?;

        let rules = joints
            .iter()
            .map(|j| j.into_rule(default_tolerance))
            .collect::<OverlayResult<Vec<_>>>()?;

        Ok(RuleSet::new(Some(key.clone()), rules))
    }

    /// Same as [`rule_set`](Self::rule_set), also checking joints against `topology`.
    pub fn validated_rule_set(
        &self,
        key: &TechniqueKey,
        default_tolerance: f32,
        topology: &Topology,
    ) -> OverlayResult<RuleSet> {
        let rules = self.rule_set(key, default_tolerance)?;
        rules.validate_against(topology)?;
        Ok(rules)
    }
}

/// Where a catalog comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    Builtin,
    File(PathBuf),
}

impl CatalogSource {
    pub fn load(&self) -> Result<TechniqueCatalog> {
        match self {
            CatalogSource::Builtin => Ok(TechniqueCatalog::builtin()),
            CatalogSource::File(path) => TechniqueCatalog::load(path),
        }
    }
}

/// Loads the catalog on a worker thread and publishes the selected rule set.
///
/// On failure the previously published rules stay active. The handle yields
/// the generation of the published set.
pub fn spawn_catalog_fetch(
    source: CatalogSource,
    key: TechniqueKey,
    default_tolerance: f32,
    topology: Topology,
    active: ActiveRules,
) -> thread::JoinHandle<Result<u64>> {
    thread::spawn(move || {
        let result = source.load().and_then(|catalog| {
            catalog
                .validated_rule_set(&key, default_tolerance, &topology)
                .map_err(anyhow::Error::from)
        });

        match result {
            Ok(rules) => {
                info!("Loaded {} rules for {} from {:?}", rules.len(), key, source);
                Ok(active.publish(rules))
            }
            Err(e) => {
                error!("Failed to load rules for {}: {:#}", key, e);
                Err(e)
            }
        }
    })
}
