// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Jiva volume engine.
//!
//! Lays a jiva volume out as two task groups: a frontend controller that
//! exports the volume over iSCSI, and a backend replica that finds the
//! controller through its IP. Both tasks run the jiva launch scripts through
//! the `raw_exec` driver.
//!
//! Every constant here must match what Nomad and the launch scripts expect.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::claim::{ClaimSpec, VolumeClaim};
use crate::error::Result;
use crate::job::{
    Constraint, Job, JobType, LogConfig, NetworkResource, Resources, RestartMode, RestartPolicy,
    Task, TaskArtifact, TaskGroup,
};

use super::VolumeEngine;

/// Engine type for jiva volumes.
pub const JIVA_ENGINE: &str = "jiva";

/// Port of the iSCSI target portal exposed by the controller.
pub const ISCSI_TARGET_PORTAL_PORT: &str = "3260";
/// Prefix of every jiva volume IQN.
pub const IQN_PREFIX: &str = "iqn.2016-09.com.openebs.jiva";

/// Job metadata key for the iSCSI target portal.
pub const TARGET_PORTAL_META: &str = "targetportal";
/// Job metadata key for the volume IQN.
pub const IQN_META: &str = "iqn";

pub const JOB_PRIORITY: i32 = 50;
pub const KERNEL_CONSTRAINT_TARGET: &str = "${attr.kernel.name}";
pub const KERNEL_CONSTRAINT_VALUE: &str = "linux";

pub const GROUP_SUFFIX: &str = "pod";
pub const FRONTEND_TASK: &str = "fe1";
pub const BACKEND_TASK: &str = "be1";

pub const TASK_DRIVER: &str = "raw_exec";
pub const DEFAULT_VOLUME_SIZE: &str = "5g";
pub const REPLICA_STORE_BASE: &str = "/tmp/jiva/";

pub const RESTART_ATTEMPTS: u32 = 3;
pub const RESTART_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const RESTART_DELAY: Duration = Duration::from_secs(25);

pub const TASK_CPU_MHZ: u32 = 500;
pub const TASK_MEMORY_MB: u32 = 256;
pub const TASK_NETWORK_MBITS: u32 = 400;

pub const LOG_MAX_FILES: u32 = 3;
pub const LOG_MAX_FILE_SIZE_MB: u32 = 1;

pub const FRONTEND_LAUNCHER: &str = "launch-jiva-ctl-with-ip";
pub const BACKEND_LAUNCHER: &str = "launch-jiva-rep-with-ip";
pub const LAUNCHER_BASE_URL: &str = "https://raw.githubusercontent.com/openebs/jiva/master/scripts/";
pub const ARTIFACT_DEST: &str = "local/";

/// Name of the frontend task group.
pub fn frontend_group() -> String {
    format!("fe{}", GROUP_SUFFIX)
}

/// Name of the backend task group.
pub fn backend_group() -> String {
    format!("be{}", GROUP_SUFFIX)
}

/// The jiva engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct JivaEngine;

impl VolumeEngine for JivaEngine {
    fn engine_type(&self) -> &'static str {
        JIVA_ENGINE
    }

    fn build(&self, spec: &ClaimSpec) -> Job {
        let job = build_job(spec);

        tracing::info!(
            job = %spec.name(),
            region = %spec.region(),
            datacenter = %spec.datacenter(),
            frontend_ip = %spec.frontend_ip(),
            backend_ip = %spec.backend_ip(),
            "Synthesized jiva job"
        );

        job
    }
}

/// Compile a claim into a jiva job.
///
/// Validation runs first; a claim that fails it never yields a job.
pub fn synthesize(claim: Option<&VolumeClaim>) -> Result<Job> {
    JivaEngine.synthesize(claim)
}

/// Build the job for an already validated claim.
pub(crate) fn build_job(spec: &ClaimSpec) -> Job {
    let meta = BTreeMap::from([
        (
            TARGET_PORTAL_META.to_string(),
            format!("{}:{}", spec.frontend_ip(), ISCSI_TARGET_PORTAL_PORT),
        ),
        (IQN_META.to_string(), format!("{}:{}", IQN_PREFIX, spec.name())),
    ]);

    Job {
        region: Some(spec.region().to_string()),
        id: Some(spec.name().to_string()),
        name: Some(spec.name().to_string()),
        job_type: Some(JobType::Service),
        priority: Some(JOB_PRIORITY),
        datacenters: vec![spec.datacenter().to_string()],
        constraints: vec![Constraint::new(
            KERNEL_CONSTRAINT_TARGET,
            "=",
            KERNEL_CONSTRAINT_VALUE,
        )],
        task_groups: vec![frontend_task_group(spec), backend_task_group(spec)],
        meta,
        status: None,
        status_description: None,
    }
}

fn frontend_task_group(spec: &ClaimSpec) -> TaskGroup {
    let group = frontend_group();
    let env = BTreeMap::from([
        (
            "JIVA_CTL_NAME".to_string(),
            process_name(spec.name(), &group, FRONTEND_TASK),
        ),
        ("JIVA_CTL_VERSION".to_string(), spec.frontend_image().to_string()),
        ("JIVA_CTL_VOLNAME".to_string(), spec.name().to_string()),
        ("JIVA_CTL_VOLSIZE".to_string(), DEFAULT_VOLUME_SIZE.to_string()),
        ("JIVA_CTL_IP".to_string(), spec.frontend_ip().to_string()),
        ("JIVA_CTL_SUBNET".to_string(), spec.subnet().to_string()),
        ("JIVA_CTL_IFACE".to_string(), spec.interface().to_string()),
    ]);

    task_group(group, launcher_task(FRONTEND_TASK, FRONTEND_LAUNCHER, env))
}

fn backend_task_group(spec: &ClaimSpec) -> TaskGroup {
    let group = backend_group();
    // The store path has no separator between volume name and group.
    let volume_store = format!(
        "{}{}{}/{}",
        REPLICA_STORE_BASE, spec.name(), group, BACKEND_TASK
    );
    let env = BTreeMap::from([
        (
            "JIVA_REP_NAME".to_string(),
            process_name(spec.name(), &group, BACKEND_TASK),
        ),
        ("JIVA_CTL_IP".to_string(), spec.frontend_ip().to_string()),
        ("JIVA_REP_VOLNAME".to_string(), spec.name().to_string()),
        ("JIVA_REP_VOLSIZE".to_string(), DEFAULT_VOLUME_SIZE.to_string()),
        ("JIVA_REP_VOLSTORE".to_string(), volume_store),
        ("JIVA_REP_VERSION".to_string(), spec.frontend_image().to_string()),
        ("JIVA_REP_NETWORK".to_string(), spec.network_type().to_string()),
        ("JIVA_REP_IFACE".to_string(), spec.interface().to_string()),
        ("JIVA_REP_IP".to_string(), spec.backend_ip().to_string()),
        ("JIVA_REP_SUBNET".to_string(), spec.subnet().to_string()),
    ]);

    task_group(group, launcher_task(BACKEND_TASK, BACKEND_LAUNCHER, env))
}

fn process_name(volume: &str, group: &str, task: &str) -> String {
    format!("{}-{}-{}", volume, group, task)
}

fn task_group(name: String, task: Task) -> TaskGroup {
    TaskGroup {
        name: Some(name),
        count: Some(1),
        restart_policy: Some(RestartPolicy {
            attempts: RESTART_ATTEMPTS,
            interval: RESTART_INTERVAL,
            delay: RESTART_DELAY,
            mode: RestartMode::Delay,
        }),
        tasks: vec![task],
    }
}

fn launcher_task(name: &str, launcher: &str, env: BTreeMap<String, String>) -> Task {
    Task {
        name: name.to_string(),
        driver: TASK_DRIVER.to_string(),
        config: BTreeMap::from([(
            "command".to_string(),
            serde_json::Value::String(launcher.to_string()),
        )]),
        env,
        resources: Some(Resources {
            cpu: TASK_CPU_MHZ,
            memory_mb: TASK_MEMORY_MB,
            networks: vec![NetworkResource {
                mbits: TASK_NETWORK_MBITS,
            }],
        }),
        artifacts: vec![TaskArtifact {
            getter_source: format!("{}{}", LAUNCHER_BASE_URL, launcher),
            relative_dest: ARTIFACT_DEST.to_string(),
        }],
        log_config: Some(LogConfig {
            max_files: LOG_MAX_FILES,
            max_file_size_mb: LOG_MAX_FILE_SIZE_MB,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::{
        BACKEND_IP_LABEL, DATACENTER_LABEL, FRONTEND_IMAGE_LABEL, FRONTEND_IP_LABEL,
        INTERFACE_LABEL, NETWORK_TYPE_LABEL, REGION_LABEL, SUBNET_LABEL,
    };
    use crate::error::Error;

    fn claim() -> VolumeClaim {
        VolumeClaim::new("vol1")
            .with_label(REGION_LABEL, "us-east")
            .with_label(DATACENTER_LABEL, "dc1")
            .with_label(FRONTEND_IMAGE_LABEL, "v1")
            .with_label(NETWORK_TYPE_LABEL, "flat")
            .with_label(FRONTEND_IP_LABEL, "10.0.0.5")
            .with_label(BACKEND_IP_LABEL, "10.0.0.6")
            .with_label(SUBNET_LABEL, "10.0.0.0/24")
            .with_label(INTERFACE_LABEL, "eth0")
    }

    #[test]
    fn test_group_names() {
        assert_eq!(frontend_group(), "fepod");
        assert_eq!(backend_group(), "bepod");
    }

    #[test]
    fn test_job_header() {
        let job = synthesize(Some(&claim())).unwrap();
        assert_eq!(job.id.as_deref(), Some("vol1"));
        assert_eq!(job.name.as_deref(), Some("vol1"));
        assert_eq!(job.region.as_deref(), Some("us-east"));
        assert_eq!(job.datacenters, vec!["dc1"]);
        assert_eq!(job.job_type, Some(JobType::Service));
        assert_eq!(job.priority, Some(50));
        assert_eq!(
            job.constraints,
            vec![Constraint::new("${attr.kernel.name}", "=", "linux")]
        );
        assert_eq!(job.meta["targetportal"], "10.0.0.5:3260");
        assert_eq!(job.meta["iqn"], "iqn.2016-09.com.openebs.jiva:vol1");
    }

    #[test]
    fn test_frontend_task() {
        let job = synthesize(Some(&claim())).unwrap();
        let group = job.task_group("fepod").unwrap();
        let task = &group.tasks[0];

        assert_eq!(task.name, "fe1");
        assert_eq!(task.driver, "raw_exec");
        assert_eq!(task.env["JIVA_CTL_NAME"], "vol1-fepod-fe1");
        assert_eq!(task.env["JIVA_CTL_VERSION"], "v1");
        assert_eq!(task.env["JIVA_CTL_VOLNAME"], "vol1");
        assert_eq!(task.env["JIVA_CTL_VOLSIZE"], "5g");
        assert_eq!(task.env["JIVA_CTL_IP"], "10.0.0.5");
        assert_eq!(task.env["JIVA_CTL_SUBNET"], "10.0.0.0/24");
        assert_eq!(task.env["JIVA_CTL_IFACE"], "eth0");
        assert_eq!(task.env.len(), 7);
        assert_eq!(
            task.artifacts[0].getter_source,
            "https://raw.githubusercontent.com/openebs/jiva/master/scripts/launch-jiva-ctl-with-ip"
        );
        assert_eq!(task.artifacts[0].relative_dest, "local/");
        assert_eq!(task.config["command"], "launch-jiva-ctl-with-ip");
    }

    #[test]
    fn test_backend_task() {
        let job = synthesize(Some(&claim())).unwrap();
        let group = job.task_group("bepod").unwrap();
        let task = &group.tasks[0];

        assert_eq!(task.name, "be1");
        assert_eq!(task.env["JIVA_REP_NAME"], "vol1-bepod-be1");
        assert_eq!(task.env["JIVA_CTL_IP"], "10.0.0.5");
        assert_eq!(task.env["JIVA_REP_IP"], "10.0.0.6");
        assert_eq!(task.env["JIVA_REP_VOLSTORE"], "/tmp/jiva/vol1bepod/be1");
        assert_eq!(task.env["JIVA_REP_VERSION"], "v1");
        assert_eq!(task.env["JIVA_REP_NETWORK"], "flat");
        assert_eq!(task.env["JIVA_REP_SUBNET"], "10.0.0.0/24");
        assert_eq!(task.env["JIVA_REP_IFACE"], "eth0");
        assert_eq!(task.env.len(), 10);
        assert_eq!(
            task.artifacts[0].getter_source,
            "https://raw.githubusercontent.com/openebs/jiva/master/scripts/launch-jiva-rep-with-ip"
        );
        assert_eq!(task.config["command"], "launch-jiva-rep-with-ip");
    }

    #[test]
    fn test_group_defaults() {
        let job = synthesize(Some(&claim())).unwrap();
        for group in &job.task_groups {
            assert_eq!(group.count, Some(1));
            assert_eq!(group.tasks.len(), 1);

            let policy = group.restart_policy.as_ref().unwrap();
            assert_eq!(policy.attempts, 3);
            assert_eq!(policy.interval, Duration::from_secs(300));
            assert_eq!(policy.delay, Duration::from_secs(25));
            assert_eq!(policy.mode, RestartMode::Delay);

            let task = &group.tasks[0];
            let resources = task.resources.as_ref().unwrap();
            assert_eq!(resources.cpu, 500);
            assert_eq!(resources.memory_mb, 256);
            assert_eq!(resources.networks, vec![NetworkResource { mbits: 400 }]);

            let logs = task.log_config.as_ref().unwrap();
            assert_eq!(logs.max_files, 3);
            assert_eq!(logs.max_file_size_mb, 1);
        }
    }

    #[test]
    fn test_missing_region_yields_no_job() {
        let mut claim = claim();
        claim.labels.remove(REGION_LABEL);
        assert_eq!(synthesize(Some(&claim)), Err(Error::MissingField("region")));
    }

    #[test]
    fn test_engine_delegates() {
        let engine = JivaEngine;
        assert_eq!(engine.engine_type(), "jiva");
        assert_eq!(
            engine.synthesize(Some(&claim())).unwrap(),
            synthesize(Some(&claim())).unwrap()
        );
    }
}
