//! Environment readiness checks.
//!
//! Before the agent touches any external platform, the binary runs
//! [`check_environment`] over a snapshot of the process environment. Every
//! missing or placeholder value becomes one [`EnvFinding`] with a pointer to
//! where the value comes from. The report is informational only; the caller
//! decides whether to proceed.

use crate::config::{
    ENV_LIVEKIT_API_KEY, ENV_LIVEKIT_API_SECRET, ENV_LIVEKIT_URL, ENV_OPENAI_API_KEY,
    ENV_TAVUS_API_KEY, ENV_TAVUS_PERSONA_ID, ENV_TAVUS_REPLICA_ID, PERSONA_ID_PLACEHOLDER,
    REPLICA_ID_PLACEHOLDER,
};
use std::collections::HashMap;

/// Required credential variables with a hint on where to obtain each.
const REQUIRED_CREDENTIALS: &[(&str, &str)] = &[
    (
        ENV_OPENAI_API_KEY,
        "get one from https://platform.openai.com/api-keys",
    ),
    (ENV_LIVEKIT_URL, "get it from https://cloud.livekit.io/"),
    (
        ENV_LIVEKIT_API_KEY,
        "get it from the LiveKit Cloud dashboard",
    ),
    (
        ENV_LIVEKIT_API_SECRET,
        "get it from the LiveKit Cloud dashboard",
    ),
    (ENV_TAVUS_API_KEY, "get one from https://tavus.io/"),
];

/// Identity variables that additionally carry an "unconfigured" sentinel.
const REQUIRED_IDENTITIES: &[(&str, &str, &str)] = &[
    (
        ENV_TAVUS_REPLICA_ID,
        REPLICA_ID_PLACEHOLDER,
        "create a replica at https://tavus.io/ and export its ID",
    ),
    (
        ENV_TAVUS_PERSONA_ID,
        PERSONA_ID_PLACEHOLDER,
        "create a persona (pipeline_mode=echo, transport_type=livekit) and export its ID",
    ),
];

/// Why a variable failed the readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvIssue {
    /// Variable is absent or empty.
    Unset,
    /// Variable is set but still equals the checked-in placeholder.
    Placeholder,
}

/// A single failed check.
#[derive(Debug, Clone)]
pub struct EnvFinding {
    /// Name of the offending environment variable.
    pub var: &'static str,
    /// What is wrong with it.
    pub issue: EnvIssue,
    /// Where to obtain a real value.
    pub help: &'static str,
}

/// Result of validating one environment snapshot.
#[derive(Debug, Clone, Default)]
pub struct EnvReport {
    /// One finding per missing or placeholder variable, in check order.
    pub findings: Vec<EnvFinding>,
}

impl EnvReport {
    /// True when every required variable carries a usable value.
    pub fn is_ready(&self) -> bool {
        self.findings.is_empty()
    }

    /// Names of all flagged variables, in check order.
    pub fn flagged_vars(&self) -> Vec<&'static str> {
        self.findings.iter().map(|f| f.var).collect()
    }

    /// Human-readable diagnostic lines, one per finding.
    pub fn render_lines(&self) -> Vec<String> {
        self.findings
            .iter()
            .map(|f| match f.issue {
                EnvIssue::Unset => format!("{} is not set ({})", f.var, f.help),
                EnvIssue::Placeholder => {
                    format!("{} is still the placeholder value ({})", f.var, f.help)
                }
            })
            .collect()
    }
}

/// Validate an environment snapshot against the required variable set.
///
/// Credentials fail only when absent or empty. The replica/persona identity
/// variables additionally fail when set to the checked-in placeholder
/// strings, since a fresh checkout "sets" them without configuring anything.
pub fn check_environment(env: &HashMap<String, String>) -> EnvReport {
    let mut findings = Vec::new();

    for &(var, help) in REQUIRED_CREDENTIALS {
        if is_blank(env.get(var)) {
            findings.push(EnvFinding {
                var,
                issue: EnvIssue::Unset,
                help,
            });
        }
    }

    for &(var, placeholder, help) in REQUIRED_IDENTITIES {
        match env.get(var).map(|v| v.trim()) {
            None | Some("") => findings.push(EnvFinding {
                var,
                issue: EnvIssue::Unset,
                help,
            }),
            Some(value) if value == placeholder => findings.push(EnvFinding {
                var,
                issue: EnvIssue::Placeholder,
                help,
            }),
            Some(_) => {}
        }
    }

    EnvReport { findings }
}

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
