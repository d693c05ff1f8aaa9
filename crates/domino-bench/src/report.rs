use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use domino_core::inference::EstimateSummary;
use domino_core::model::{Party, Pip, Tile};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything a scenario run produced, as written to `report.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioReport {
    pub run_id: String,
    pub observer: Party,
    pub observer_hand: Vec<Tile>,
    pub line: Vec<Tile>,
    pub open_ends: Option<(Pip, Pip)>,
    pub live_items: usize,
    pub hand_targets: Vec<HandTargetRow>,
    pub steps: Vec<StepRecord>,
    pub estimate: EstimateSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandTargetRow {
    pub party: Party,
    pub size: usize,
}

/// One applied move and its effect on the partition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepRecord {
    pub index: usize,
    pub party: Party,
    pub action: String,
    pub relocated: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orphaned: Vec<Tile>,
    pub live_items: usize,
}

impl ScenarioReport {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        fs::write(path, self.to_markdown())?;
        Ok(())
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Scenario `{}`\n", self.run_id);
        let _ = writeln!(
            out,
            "Observer {} holds {}.\n",
            self.observer,
            join_tiles(&self.observer_hand)
        );
        let ends = match self.open_ends {
            Some((left, right)) => format!("{left} | {right}"),
            None => "none".to_string(),
        };
        let _ = writeln!(
            out,
            "Line: {} (open ends {ends}). Live tiles: {}. Consistent deals: {} across {} branches.\n",
            if self.line.is_empty() {
                "empty".to_string()
            } else {
                join_tiles(&self.line)
            },
            self.live_items,
            self.estimate.total_weight,
            self.estimate.branch_count
        );

        if !self.steps.is_empty() {
            out.push_str("| # | Party | Action | Relocated | Orphaned | Live |\n");
            out.push_str("|---|-------|--------|-----------|----------|------|\n");
            for step in &self.steps {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} | {} |",
                    step.index,
                    step.party,
                    step.action.replace('|', "\\|"),
                    step.relocated,
                    step.orphaned.len(),
                    step.live_items
                );
            }
            out.push('\n');
        }

        for party in &self.estimate.parties {
            let _ = writeln!(out, "## {} ({} tiles)\n", party.party, party.hand_size);
            out.push_str("| Pip | P(holds) | Exact | Expected |\n");
            out.push_str("|-----|----------|-------|----------|\n");
            for row in &party.attributes {
                let _ = writeln!(
                    out,
                    "| {} | {:.2}% | {} | {:.3} |",
                    row.attribute, row.percent, row.probability, row.expected_count
                );
            }
            if !party.top_compositions.is_empty() {
                out.push_str("\nMost likely hand compositions:\n\n");
                for (rank, composition) in party.top_compositions.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "{}. `{}` at {:.2}%",
                        rank + 1,
                        composition.composition,
                        composition.percent
                    );
                }
            }
            out.push('\n');
        }
        out
    }
}

fn join_tiles(tiles: &[Tile]) -> String {
    tiles
        .iter()
        .map(Tile::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize report: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}
