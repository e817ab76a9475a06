// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Maya Nomad Orchestration Provider
//!
//! Compiles replicated block-volume claims into Nomad jobs, and projects
//! Nomad evaluations and jobs back onto volume status.
//!
//! # Architecture
//!
//! Everything here is a pure transformation over in-memory values:
//! - Claim validation (`claim`): label bag in, typed [`ClaimSpec`] out
//! - Job synthesis (`engine`): per-engine strategies, jiva by default
//! - Status projection (`status`): evaluation or job in, [`VolumeStatus`] out
//! - Identity mapping (`identity`): claim name = job name = volume name
//!
//! Submitting jobs to Nomad and storing claims belong to the caller.
//!
//! # Example
//!
//! ```
//! use maya_orchprovider::{EngineRegistry, VolumeClaim};
//!
//! let claim = VolumeClaim::new("vol1")
//!     .with_label("region", "us-east")
//!     .with_label("dc", "dc1")
//!     .with_label("feImage", "v1")
//!     .with_label("cnType", "flat")
//!     .with_label("feIP", "10.0.0.5")
//!     .with_label("beIP", "10.0.0.6")
//!     .with_label("subnet", "10.0.0.0/24")
//!     .with_label("iface", "eth0");
//!
//! let job = EngineRegistry::default().synthesize(Some(&claim)).unwrap();
//! assert_eq!(job.meta["targetportal"], "10.0.0.5:3260");
//! assert_eq!(job.task_groups.len(), 2);
//! ```

pub mod claim;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod job;
pub mod status;

pub use claim::{ClaimSpec, VolumeClaim, validate, validate_all};
pub use config::{ConfigError, CtlConfig};
pub use engine::jiva::synthesize;
pub use engine::{EngineRegistry, JivaEngine, VolumeEngine};
pub use error::{Error, Result};
pub use identity::{claim_to_job_name, job_stub, volume_to_job_stub};
pub use job::{
    Constraint, Evaluation, Job, JobStatus, JobType, LogConfig, NetworkResource, Resources,
    RestartMode, RestartPolicy, Task, TaskArtifact, TaskGroup,
};
pub use status::{VolumeStatus, from_evaluation, from_job};
