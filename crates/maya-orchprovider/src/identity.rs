// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Name correspondence between claims, jobs and volumes.
//!
//! Claim name, job name, job ID and volume name are all the same string.

use crate::claim::VolumeClaim;
use crate::error::{Error, Result};
use crate::job::Job;
use crate::status::VolumeStatus;

/// Job name for a claim.
pub fn claim_to_job_name(claim: Option<&VolumeClaim>) -> Result<String> {
    let claim = claim.ok_or(Error::NilInput("volume claim"))?;
    if claim.name.is_empty() {
        return Err(Error::MissingField("name"));
    }
    Ok(claim.name.clone())
}

/// Identity-only job reference for lookup and deregistration calls.
pub fn volume_to_job_stub(volume: Option<&VolumeStatus>) -> Result<Job> {
    let volume = volume.ok_or(Error::NilInput("volume"))?;
    job_stub(&volume.name)
}

/// Identity-only job reference for a bare volume name.
pub fn job_stub(name: &str) -> Result<Job> {
    if name.is_empty() {
        return Err(Error::MissingField("name"));
    }
    Ok(Job {
        id: Some(name.to_string()),
        name: Some(name.to_string()),
        ..Default::default()
    })
}
