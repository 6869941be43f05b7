use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{ErrorKind, Result, ReelbatchError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    Skipped,
    Failed { kind: ErrorKind, message: String },
}

/// Result for one file or URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReport {
    pub item: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ItemReport {
    pub fn completed<S: Into<String>>(item: S) -> Self {
        Self { item: item.into(), outcome: Outcome::Completed }
    }

    pub fn skipped<S: Into<String>>(item: S) -> Self {
        Self { item: item.into(), outcome: Outcome::Skipped }
    }

    pub fn failed<S: Into<String>>(item: S, error: &ReelbatchError) -> Self {
        Self {
            item: item.into(),
            outcome: Outcome::Failed {
                kind: error.kind(),
                message: error.to_string(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub pipeline: String,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub items: Vec<ItemReport>,
}

impl RunReport {
    pub fn start<S: Into<String>>(pipeline: S) -> Self {
        Self {
            pipeline: pipeline.into(),
            started_at: Local::now(),
            finished_at: None,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: ItemReport) {
        self.items.push(item);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Completed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    fn count<F: Fn(&Outcome) -> bool>(&self, predicate: F) -> usize {
        self.items.iter().filter(|i| predicate(&i.outcome)).count()
    }

    pub fn log_summary(&self) {
        info!(
            "{} finished: {} completed, {} skipped, {} failed",
            self.pipeline,
            self.completed(),
            self.skipped(),
            self.failed()
        );
        for item in self.items.iter().filter(|i| i.is_failed()) {
            if let Outcome::Failed { message, .. } = &item.outcome {
                warn!("  {}: {}", item.item, message);
            }
        }
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
