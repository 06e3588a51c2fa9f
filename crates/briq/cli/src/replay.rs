//! Call script replay

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use briq_runtime::{BriqRuntime, Call};
use briq_types::{Address, ErrorCode, OwnedItem};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One scripted call.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub call: Call,

    /// Rejection this step must produce
    #[serde(default)]
    pub expect_error: Option<ErrorCode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub entry_point: &'static str,
    #[serde(flatten)]
    pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Committed,
    Rejected { code: ErrorCode, message: String },
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepOutcome>,
    /// Final holdings of every account a step touched
    pub holdings: BTreeMap<Address, Vec<OwnedItem>>,
    /// Events in the verified hash chain
    pub events: usize,
}

impl ReplayReport {
    pub fn rejected(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step.status, StepStatus::Rejected { .. }))
            .count()
    }
}

pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse script {}", path.display()))
}

/// Run `steps` in order against `runtime`.
///
/// A step with `expect_error` must be rejected with exactly that code. Any
/// other rejection stops the replay unless `continue_on_error` is set.
pub fn replay(
    runtime: &BriqRuntime,
    steps: Vec<Step>,
    continue_on_error: bool,
) -> Result<ReplayReport> {
    let mut touched = BTreeSet::new();
    let mut outcomes = Vec::with_capacity(steps.len());

    for (index, step) in steps.into_iter().enumerate() {
        let entry_point = step.call.entry_point();
        if let Some(account) = step.call.subject() {
            touched.insert(account);
        }

        let status = match (runtime.dispatch(step.call), step.expect_error) {
            (Ok(_), None) => StepStatus::Committed,
            (Ok(_), Some(expected)) => {
                bail!("Step {index} ({entry_point}) committed but expected {expected}")
            }
            (Err(err), Some(expected)) if err.code() == expected => StepStatus::Rejected {
                code: err.code(),
                message: err.to_string(),
            },
            (Err(err), Some(expected)) => {
                bail!(
                    "Step {index} ({entry_point}) rejected with {} but expected {expected}: {err}",
                    err.code()
                )
            }
            (Err(err), None) if continue_on_error => {
                warn!(step = index, entry_point, code = %err.code(), "Step rejected, continuing");
                StepStatus::Rejected {
                    code: err.code(),
                    message: err.to_string(),
                }
            }
            (Err(err), None) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("Step {index} ({entry_point}) rejected")));
            }
        };

        outcomes.push(StepOutcome {
            index,
            entry_point,
            status,
        });
    }

    let mut holdings = BTreeMap::new();
    for account in touched {
        holdings.insert(account, runtime.get_all_tokens_for_owner(account)?);
    }
    let events = runtime.verify_events()?;

    info!(
        steps = outcomes.len(),
        accounts = holdings.len(),
        events,
        "Replay finished"
    );

    Ok(ReplayReport {
        steps: outcomes,
        holdings,
        events,
    })
}
