// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Maya Control CLI
//!
//! Compiles volume claims into Nomad jobs and projects Nomad state onto
//! volume status, reading JSON documents from disk. Talks to nothing.
//!
//! Usage:
//!   maya-ctl <command> [args]
//!
//! Commands:
//!   synthesize <claim.json>
//!   job-name <claim.json>
//!   eval-status <job-name> <eval.json>
//!   job-status <job.json>
//!   stub <volume-name>
//!   engines

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, warn};

use maya_orchprovider::{
    CtlConfig, EngineRegistry, Evaluation, Job, VolumeClaim, claim_to_job_name, job_stub,
};

fn print_usage() {
    eprintln!(
        r#"Usage: maya-ctl <command> [args]

Compile volume claims into Nomad jobs and project Nomad state onto volumes.

COMMANDS:
    synthesize <claim.json>              Print the Nomad job for a claim
    job-name <claim.json>                Print the job name for a claim
    eval-status <job-name> <eval.json>   Project an evaluation onto volume status
    job-status <job.json>                Project a job onto volume status
    stub <volume-name>                   Print an identity-only job for lookups
    engines                              List registered volume engines

ENVIRONMENT:
    MAYA_DEFAULT_ENGINE                  Engine for untyped claims (default: jiva)
    MAYA_PRETTY_OUTPUT                   Pretty-print JSON (default: true)
    RUST_LOG                             Log filter (default: maya_orchprovider=info)

EXAMPLES:
    # Compile a claim and submit it with the nomad CLI
    maya-ctl synthesize vol1.json > vol1.job.json
    nomad job run -json vol1.job.json
"#
    );
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Synthesize { claim_path: String },
    JobName { claim_path: String },
    EvalStatus { job_name: String, eval_path: String },
    JobStatus { job_path: String },
    Stub { volume_name: String },
    Engines,
}

fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from_vec(&args)
}

fn parse_args_from_vec(args: &[String]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("No command specified".to_string());
    }

    let command = match args[1].as_str() {
        "help" | "--help" | "-h" => Command::Help,
        "synthesize" => Command::Synthesize {
            claim_path: args.get(2).ok_or("Claim file required")?.clone(),
        },
        "job-name" => Command::JobName {
            claim_path: args.get(2).ok_or("Claim file required")?.clone(),
        },
        "eval-status" => Command::EvalStatus {
            job_name: args.get(2).ok_or("Job name required")?.clone(),
            eval_path: args.get(3).ok_or("Evaluation file required")?.clone(),
        },
        "job-status" => Command::JobStatus {
            job_path: args.get(2).ok_or("Job file required")?.clone(),
        },
        "stub" => Command::Stub {
            volume_name: args.get(2).ok_or("Volume name required")?.clone(),
        },
        "engines" => Command::Engines,
        other => return Err(format!("Unknown command: {}", other)),
    };

    let expected = match command {
        Command::Help | Command::Engines => 2,
        Command::EvalStatus { .. } => 4,
        _ => 3,
    };
    if let Some(extra) = args.get(expected) {
        return Err(format!("Unexpected argument: {}", extra));
    }

    Ok(command)
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only JSON.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maya_orchprovider=info".into()),
        )
        .init();

    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }

    let cmd = match parse_args() {
        Ok(Command::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            return ExitCode::from(2);
        }
    };

    match run(cmd) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cmd: Command) -> anyhow::Result<String> {
    let config = CtlConfig::from_env()?;
    let registry = EngineRegistry::from_config(&config)?;
    execute_command(&registry, &config, cmd)
}

fn execute_command(
    registry: &EngineRegistry,
    config: &CtlConfig,
    cmd: Command,
) -> anyhow::Result<String> {
    match cmd {
        Command::Help => Ok(String::new()),
        Command::Synthesize { claim_path } => {
            let claim: VolumeClaim = load_json(Path::new(&claim_path))?;
            let job = registry
                .synthesize(Some(&claim))
                .with_context(|| format!("Failed to synthesize job from {}", claim_path))?;
            render(&job, config.pretty_output)
        }
        Command::JobName { claim_path } => {
            let claim: VolumeClaim = load_json(Path::new(&claim_path))?;
            Ok(claim_to_job_name(Some(&claim))?)
        }
        Command::EvalStatus {
            job_name,
            eval_path,
        } => {
            let eval: Evaluation = load_json(Path::new(&eval_path))?;
            if eval.job_id != job_name {
                warn!(
                    job = %job_name,
                    eval_job = %eval.job_id,
                    "Evaluation belongs to a different job"
                );
            }
            let engine = registry.get(registry.default_engine())?;
            let status = engine.project_evaluation(&job_name, Some(&eval))?;
            render(&status, config.pretty_output)
        }
        Command::JobStatus { job_path } => {
            let job: Job = load_json(Path::new(&job_path))?;
            let engine = registry.get(registry.default_engine())?;
            let status = engine.project_job(Some(&job))?;
            render(&status, config.pretty_output)
        }
        Command::Stub { volume_name } => render(&job_stub(&volume_name)?, config.pretty_output),
        Command::Engines => Ok(registry
            .engine_types()
            .into_iter()
            .map(|engine| {
                if engine == registry.default_engine() {
                    format!("{} (default)", engine)
                } else {
                    engine.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn render<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(a: &[&str]) -> Vec<String> {
        a.iter().map(|s| s.to_string()).collect()
    }

    fn json_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const CLAIM: &str = r#"{
        "name": "vol1",
        "labels": {
            "region": "us-east", "dc": "dc1", "feImage": "v1", "cnType": "flat",
            "feIP": "10.0.0.5", "beIP": "10.0.0.6", "subnet": "10.0.0.0/24", "iface": "eth0"
        }
    }"#;

    fn compact() -> CtlConfig {
        CtlConfig::default().with_pretty_output(false)
    }

    #[test]
    fn test_parse_no_command() {
        let result = parse_args_from_vec(&args(&["maya-ctl"]));
        assert_eq!(result.unwrap_err(), "No command specified");
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_args_from_vec(&args(&["maya-ctl", "synthesize", "c.json"])).unwrap(),
            Command::Synthesize {
                claim_path: "c.json".to_string()
            }
        );
        assert_eq!(
            parse_args_from_vec(&args(&["maya-ctl", "eval-status", "vol1", "e.json"])).unwrap(),
            Command::EvalStatus {
                job_name: "vol1".to_string(),
                eval_path: "e.json".to_string()
            }
        );
        assert_eq!(
            parse_args_from_vec(&args(&["maya-ctl", "--help"])).unwrap(),
            Command::Help
        );
        assert_eq!(
            parse_args_from_vec(&args(&["maya-ctl", "engines"])).unwrap(),
            Command::Engines
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_args_from_vec(&args(&["maya-ctl", "synthesize"])).unwrap_err(),
            "Claim file required"
        );
        assert_eq!(
            parse_args_from_vec(&args(&["maya-ctl", "eval-status", "vol1"])).unwrap_err(),
            "Evaluation file required"
        );
        assert_eq!(
            parse_args_from_vec(&args(&["maya-ctl", "stub", "a", "b"])).unwrap_err(),
            "Unexpected argument: b"
        );
        assert!(
            parse_args_from_vec(&args(&["maya-ctl", "deploy"]))
                .unwrap_err()
                .contains("Unknown command")
        );
    }

    #[test]
    fn test_execute_synthesize() {
        let file = json_file(CLAIM);
        let cmd = Command::Synthesize {
            claim_path: file.path().display().to_string(),
        };
        let output = execute_command(&EngineRegistry::default(), &compact(), cmd).unwrap();
        let job: Job = serde_json::from_str(&output).unwrap();
        assert_eq!(job.name.as_deref(), Some("vol1"));
        assert_eq!(job.meta["targetportal"], "10.0.0.5:3260");
    }

    #[test]
    fn test_execute_synthesize_missing_label() {
        let file = json_file(r#"{"name": "vol1", "labels": {"dc": "dc1"}}"#);
        let cmd = Command::Synthesize {
            claim_path: file.path().display().to_string(),
        };
        let err = execute_command(&EngineRegistry::default(), &compact(), cmd).unwrap_err();
        assert!(format!("{:#}", err).contains("missing region"));
    }

    #[test]
    fn test_execute_job_name_and_stub() {
        let file = json_file(CLAIM);
        let cmd = Command::JobName {
            claim_path: file.path().display().to_string(),
        };
        let registry = EngineRegistry::default();
        assert_eq!(execute_command(&registry, &compact(), cmd).unwrap(), "vol1");

        let cmd = Command::Stub {
            volume_name: "vol1".to_string(),
        };
        assert_eq!(
            execute_command(&registry, &compact(), cmd).unwrap(),
            r#"{"ID":"vol1","Name":"vol1"}"#
        );
    }

    #[test]
    fn test_execute_job_status() {
        let file = json_file(
            r#"{"Name": "vol1", "Status": "running", "StatusDescription": "",
                "Meta": {"iqn": "iqn.2016-09.com.openebs.jiva:vol1"}}"#,
        );
        let cmd = Command::JobStatus {
            job_path: file.path().display().to_string(),
        };
        let output = execute_command(&EngineRegistry::default(), &compact(), cmd).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["reason"], "running");
        assert_eq!(value["annotations"]["iqn"], "iqn.2016-09.com.openebs.jiva:vol1");
    }

    #[test]
    fn test_execute_job_status_with_nomad_nulls() {
        let file = json_file(
            r#"{"ID": "vol1", "Name": "vol1", "Type": "sysbatch", "Status": "running",
                "StatusDescription": "", "Datacenters": null, "Constraints": null,
                "Meta": null, "TaskGroups": [{"Name": "fepod", "Tasks": null}]}"#,
        );
        let cmd = Command::JobStatus {
            job_path: file.path().display().to_string(),
        };
        let output = execute_command(&EngineRegistry::default(), &compact(), cmd).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["name"], "vol1");
        assert_eq!(value["reason"], "running");
        assert!(value.get("annotations").is_none());
    }

    #[test]
    fn test_execute_eval_status() {
        let file = json_file(r#"{"ID": "e1", "Priority": 50, "JobID": "vol1", "Status": "complete"}"#);
        let cmd = Command::EvalStatus {
            job_name: "vol1".to_string(),
            eval_path: file.path().display().to_string(),
        };
        let output = execute_command(&EngineRegistry::default(), &compact(), cmd).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["name"], "vol1");
        assert_eq!(value["annotations"]["evalpriority"], "50");
    }

    #[test]
    fn test_execute_engines() {
        let output =
            execute_command(&EngineRegistry::default(), &compact(), Command::Engines).unwrap();
        assert_eq!(output, "jiva (default)");
    }

    #[test]
    fn test_load_json_missing_file() {
        let err = load_json::<Job>(Path::new("/nonexistent/job.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
