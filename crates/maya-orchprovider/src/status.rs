// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Projection of Nomad evaluations and jobs onto volume status.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::job::{Evaluation, Job, JobStatus};

pub const EVAL_PRIORITY_ANNOTATION: &str = "evalpriority";
pub const EVAL_TYPE_ANNOTATION: &str = "evaltype";
pub const EVAL_TRIGGER_ANNOTATION: &str = "evaltrigger";
pub const EVAL_JOB_ANNOTATION: &str = "evaljob";
pub const EVAL_STATUS_ANNOTATION: &str = "evalstatus";
pub const EVAL_STATUS_DESC_ANNOTATION: &str = "evalstatusdesc";
pub const EVAL_BLOCKED_EVAL_ANNOTATION: &str = "evalblockedeval";

/// Observable state of a volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeStatus {
    pub name: String,
    pub message: String,
    pub reason: String,
    /// Orchestrator metadata. Empty when nothing is surfaced.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Volume status from the evaluation of a job.
pub fn from_evaluation(job_name: &str, evaluation: Option<&Evaluation>) -> Result<VolumeStatus> {
    let eval = evaluation.ok_or(Error::NilInput("job evaluation"))?;

    let annotations = BTreeMap::from([
        (EVAL_PRIORITY_ANNOTATION.to_string(), eval.priority.to_string()),
        (EVAL_TYPE_ANNOTATION.to_string(), eval.eval_type.clone()),
        (EVAL_TRIGGER_ANNOTATION.to_string(), eval.triggered_by.clone()),
        (EVAL_JOB_ANNOTATION.to_string(), eval.job_id.clone()),
        (EVAL_STATUS_ANNOTATION.to_string(), eval.status.clone()),
        (
            EVAL_STATUS_DESC_ANNOTATION.to_string(),
            eval.status_description.clone(),
        ),
        (
            EVAL_BLOCKED_EVAL_ANNOTATION.to_string(),
            eval.blocked_eval.clone(),
        ),
    ]);

    tracing::debug!(
        job = %job_name,
        eval_id = %eval.id,
        eval_status = %eval.status,
        "Projected evaluation onto volume status"
    );

    Ok(VolumeStatus {
        name: job_name.to_string(),
        message: eval.status_description.clone(),
        reason: eval.status.clone(),
        annotations,
    })
}

/// Volume status from a job read back from Nomad.
///
/// Job metadata is only surfaced while the job is running; connection
/// details of a pending or dead job may not be valid yet.
pub fn from_job(job: Option<&Job>) -> Result<VolumeStatus> {
    let job = job.ok_or(Error::NilInput("job"))?;

    let name = job
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or(Error::MissingField("Name"))?;
    let status = job.status.as_deref().ok_or(Error::MissingField("Status"))?;
    let description = job
        .status_description
        .as_deref()
        .ok_or(Error::MissingField("StatusDescription"))?;

    let annotations = if status == JobStatus::Running.as_ref() {
        job.meta.clone()
    } else {
        BTreeMap::new()
    };

    tracing::debug!(
        job = %name,
        status = %status,
        annotations = annotations.len(),
        "Projected job onto volume status"
    );

    Ok(VolumeStatus {
        name: name.to_string(),
        message: description.to_string(),
        reason: status.to_string(),
        annotations,
    })
}
