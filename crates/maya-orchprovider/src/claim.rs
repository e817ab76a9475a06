// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Volume claims and claim validation.
//!
//! A claim arrives as a name plus a flat label bag. Validation checks every
//! label the synthesizer needs and parses them once into a [`ClaimSpec`], so
//! engines only ever work with typed values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Label carrying the Nomad region.
pub const REGION_LABEL: &str = "region";
/// Label carrying the Nomad datacenter.
pub const DATACENTER_LABEL: &str = "dc";
/// Label carrying the frontend (controller) image version.
pub const FRONTEND_IMAGE_LABEL: &str = "feImage";
/// Label carrying the container network type.
pub const NETWORK_TYPE_LABEL: &str = "cnType";
/// Label carrying the frontend IP address.
pub const FRONTEND_IP_LABEL: &str = "feIP";
/// Label carrying the backend (replica) IP address.
pub const BACKEND_IP_LABEL: &str = "beIP";
/// Label carrying the container network subnet.
pub const SUBNET_LABEL: &str = "subnet";
/// Label carrying the network interface name.
pub const INTERFACE_LABEL: &str = "iface";

/// Labels a claim must carry, in the order they are checked.
pub const REQUIRED_LABELS: [&str; 8] = [
    REGION_LABEL,
    DATACENTER_LABEL,
    FRONTEND_IMAGE_LABEL,
    NETWORK_TYPE_LABEL,
    FRONTEND_IP_LABEL,
    BACKEND_IP_LABEL,
    SUBNET_LABEL,
    INTERFACE_LABEL,
];

/// A request for a replicated block volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeClaim {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Selects the volume engine. `None` means the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
}

impl VolumeClaim {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set a label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Set the volume type discriminator.
    pub fn with_volume_type(mut self, volume_type: impl Into<String>) -> Self {
        self.volume_type = Some(volume_type.into());
        self
    }

    fn label(&self, key: &'static str) -> Result<String> {
        match self.labels.get(key) {
            Some(value) if !value.is_empty() => Ok(value.clone()),
            _ => Err(Error::MissingField(key)),
        }
    }
}

/// Typed view of a validated claim.
///
/// Only obtainable through [`validate`] or `TryFrom<&VolumeClaim>`, so every
/// field is known to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimSpec {
    name: String,
    region: String,
    datacenter: String,
    frontend_image: String,
    network_type: String,
    frontend_ip: String,
    backend_ip: String,
    subnet: String,
    interface: String,
}

impl ClaimSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn datacenter(&self) -> &str {
        &self.datacenter
    }

    pub fn frontend_image(&self) -> &str {
        &self.frontend_image
    }

    pub fn network_type(&self) -> &str {
        &self.network_type
    }

    pub fn frontend_ip(&self) -> &str {
        &self.frontend_ip
    }

    pub fn backend_ip(&self) -> &str {
        &self.backend_ip
    }

    pub fn subnet(&self) -> &str {
        &self.subnet
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl TryFrom<&VolumeClaim> for ClaimSpec {
    type Error = Error;

    fn try_from(claim: &VolumeClaim) -> Result<Self> {
        if claim.name.is_empty() {
            return Err(Error::MissingField("name"));
        }

        Ok(Self {
            name: claim.name.clone(),
            region: claim.label(REGION_LABEL)?,
            datacenter: claim.label(DATACENTER_LABEL)?,
            frontend_image: claim.label(FRONTEND_IMAGE_LABEL)?,
            network_type: claim.label(NETWORK_TYPE_LABEL)?,
            frontend_ip: claim.label(FRONTEND_IP_LABEL)?,
            backend_ip: claim.label(BACKEND_IP_LABEL)?,
            subnet: claim.label(SUBNET_LABEL)?,
            interface: claim.label(INTERFACE_LABEL)?,
        })
    }
}

/// Validate a claim and parse its labels.
///
/// Stops at the first problem: a nil claim, then an empty name, then the
/// first missing label in [`REQUIRED_LABELS`] order.
pub fn validate(claim: Option<&VolumeClaim>) -> Result<ClaimSpec> {
    let claim = claim.ok_or(Error::NilInput("volume claim"))?;
    ClaimSpec::try_from(claim)
}

/// Collect every validation problem instead of stopping at the first.
pub fn validate_all(claim: Option<&VolumeClaim>) -> Vec<Error> {
    let Some(claim) = claim else {
        return vec![Error::NilInput("volume claim")];
    };

    let mut errors = Vec::new();
    if claim.name.is_empty() {
        errors.push(Error::MissingField("name"));
    }
    errors.extend(
        REQUIRED_LABELS
            .iter()
            .filter_map(|&key| claim.label(key).err()),
    );
    errors
}
