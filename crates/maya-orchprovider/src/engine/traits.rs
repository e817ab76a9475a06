// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Volume engine trait and registry.
//!
//! An engine knows how one storage engine's processes are laid out as a
//! Nomad job. Engines are selected per claim by its volume type.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::claim::{self, ClaimSpec, VolumeClaim};
use crate::config::CtlConfig;
use crate::error::{Error, Result};
use crate::job::{Evaluation, Job};
use crate::status::{self, VolumeStatus};

use super::JivaEngine;

/// Trait for volume engines.
///
/// Engines are pure transformations: they never talk to Nomad or the claim
/// store. Submitting the job and fetching evaluations is the caller's job.
pub trait VolumeEngine: Send + Sync {
    /// Engine type identifier, matched against a claim's volume type.
    fn engine_type(&self) -> &'static str;

    /// Check the claim and parse it into typed form.
    ///
    /// Engines that need more than the common labels override this.
    fn validate(&self, claim: Option<&VolumeClaim>) -> Result<ClaimSpec> {
        claim::validate(claim)
    }

    /// Lay out the job for a claim that passed [`VolumeEngine::validate`].
    fn build(&self, spec: &ClaimSpec) -> Job;

    /// Compile a claim into a complete job.
    ///
    /// A claim that fails validation never yields a job.
    fn synthesize(&self, claim: Option<&VolumeClaim>) -> Result<Job> {
        let spec = self.validate(claim)?;
        Ok(self.build(&spec))
    }

    /// Volume status from an evaluation of this engine's job.
    fn project_evaluation(
        &self,
        job_name: &str,
        evaluation: Option<&Evaluation>,
    ) -> Result<VolumeStatus> {
        status::from_evaluation(job_name, evaluation)
    }

    /// Volume status from this engine's job as read back from Nomad.
    fn project_job(&self, job: Option<&Job>) -> Result<VolumeStatus> {
        status::from_job(job)
    }
}

/// Engines keyed by type, plus the type used for claims that name none.
#[derive(Clone)]
pub struct EngineRegistry {
    engines: BTreeMap<&'static str, Arc<dyn VolumeEngine>>,
    default_engine: String,
}

impl Default for EngineRegistry {
    fn default() -> Self {
        let mut registry = Self::empty(super::JIVA_ENGINE);
        registry.register(Arc::new(JivaEngine));
        registry
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.engine_types())
            .field("default_engine", &self.default_engine)
            .finish()
    }
}

/// Engine type as matched against the registry: trimmed and lowercased.
/// Blank input names no engine.
fn normalize_engine_type(engine_type: &str) -> Option<String> {
    let engine_type = engine_type.trim();
    (!engine_type.is_empty()).then(|| engine_type.to_lowercase())
}

impl EngineRegistry {
    /// Registry with no engines.
    pub fn empty(default_engine: impl Into<String>) -> Self {
        let default_engine = default_engine.into();
        Self {
            engines: BTreeMap::new(),
            default_engine: normalize_engine_type(&default_engine).unwrap_or(default_engine),
        }
    }

    /// Built-in engines with the default taken from configuration.
    pub fn from_config(config: &CtlConfig) -> Result<Self> {
        let mut registry = Self::default();
        registry.default_engine = normalize_engine_type(&config.default_engine)
            .ok_or_else(|| Error::UnsupportedEngine(config.default_engine.clone()))?;
        registry.get(&registry.default_engine)?;
        Ok(registry)
    }

    /// Add an engine, replacing any engine of the same type.
    pub fn register(&mut self, engine: Arc<dyn VolumeEngine>) {
        tracing::debug!(engine_type = engine.engine_type(), "Registered volume engine");
        self.engines.insert(engine.engine_type(), engine);
    }

    /// Registered engine types, sorted.
    pub fn engine_types(&self) -> Vec<&'static str> {
        self.engines.keys().copied().collect()
    }

    pub fn default_engine(&self) -> &str {
        &self.default_engine
    }

    /// Look up an engine by type, ignoring case and surrounding whitespace.
    pub fn get(&self, engine_type: &str) -> Result<Arc<dyn VolumeEngine>> {
        normalize_engine_type(engine_type)
            .and_then(|key| self.engines.get(key.as_str()).cloned())
            .ok_or_else(|| Error::UnsupportedEngine(engine_type.to_string()))
    }

    /// Engine responsible for a claim.
    ///
    /// An absent or blank volume type selects the default engine.
    pub fn engine_for(&self, claim: &VolumeClaim) -> Result<Arc<dyn VolumeEngine>> {
        match claim.volume_type.as_deref().and_then(normalize_engine_type) {
            Some(volume_type) => self.get(&volume_type),
            None => self.get(&self.default_engine),
        }
    }

    /// Compile a claim with the engine its volume type selects.
    pub fn synthesize(&self, claim: Option<&VolumeClaim>) -> Result<Job> {
        let claim = claim.ok_or(Error::NilInput("volume claim"))?;
        let engine = self.engine_for(claim)?;
        engine.synthesize(Some(claim))
    }
}
