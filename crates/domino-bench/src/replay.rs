use std::fs;
use std::path::{Path, PathBuf};

use domino_core::belief::{Belief, BeliefUpdate};
use domino_core::board::{LineOfPlay, PlayError};
use domino_core::inference::{EstimateError, EstimateSummary};
use domino_core::model::{Party, Pip, Pool, Tile};
use domino_core::zone::ZoneError;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{MoveConfig, ResolvedOutputs, ScenarioConfig};
use crate::logging::telemetry_path;
use crate::report::{HandTargetRow, ReportError, ScenarioReport, StepRecord};

const TOP_COMPOSITIONS: usize = 5;

/// Replays a configured scenario through the belief tracker and writes reports.
pub struct ScenarioRunner {
    config: ScenarioConfig,
    outputs: ResolvedOutputs,
    observer: Party,
    observer_hand: Vec<Tile>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub run_id: String,
    pub moves_applied: usize,
    pub live_items: usize,
    pub branch_count: u64,
    pub report_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub report: ScenarioReport,
}

/// Table state after every configured move has been applied.
pub struct ReplayState {
    pub belief: Belief<Tile>,
    pub line: LineOfPlay,
    pub steps: Vec<StepRecord>,
}

impl ScenarioRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: ScenarioConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let table = &config.table;
        let observer = Party::new(table.observer);
        let observer_hand = match (&table.observer_hand, table.seed) {
            (Some(hand), _) => hand.clone(),
            (None, Some(seed)) => {
                let seats = Party::seats(table.parties);
                Pool::shuffled_with_seed(table.max_pip, seed)
                    .deal(table.hand_size, &seats)
                    .into_iter()
                    .find(|(party, _)| *party == observer)
                    .map(|(_, hand)| hand)
                    .unwrap_or_default()
            }
            (None, None) => {
                return Err(RunnerError::scenario(
                    "table needs an observer_hand or a seed".to_string(),
                ));
            }
        };

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            observer,
            observer_hand,
        })
    }

    pub fn observer(&self) -> Party {
        self.observer
    }

    pub fn observer_hand(&self) -> &[Tile] {
        &self.observer_hand
    }

    /// Parties whose hands are hidden from the observer.
    pub fn hidden_parties(&self) -> Vec<Party> {
        Party::seats(self.config.table.parties)
            .into_iter()
            .filter(|party| *party != self.observer)
            .collect()
    }

    /// Applies every configured move without touching the filesystem.
    pub fn replay(&self) -> Result<ReplayState, RunnerError> {
        let table = &self.config.table;
        let hidden = self.hidden_parties();
        let mut belief = Belief::new(
            Pool::with_max_pip(table.max_pip).tiles().iter().copied(),
            &hidden,
            table.hand_size,
        )?;
        for tile in &self.observer_hand {
            belief.apply(BeliefUpdate::ItemSettled(*tile))?;
        }

        let mut state = ReplayState {
            belief,
            line: LineOfPlay::new(),
            steps: Vec::with_capacity(self.config.moves.len()),
        };
        let mut observer_remaining = self.observer_hand.clone();

        for (index, step) in self.config.moves.iter().enumerate() {
            let party = Party::new(step.party());
            let mut record = StepRecord {
                index,
                party,
                action: describe(step),
                relocated: 0,
                orphaned: Vec::new(),
                live_items: 0,
            };

            match step {
                MoveConfig::Play { tile, side, .. } => {
                    if party == self.observer {
                        let Some(position) = observer_remaining.iter().position(|t| t == tile)
                        else {
                            return Err(RunnerError::scenario(format!(
                                "move {index}: observer does not hold {tile}"
                            )));
                        };
                        state.line.play(*tile, *side)?;
                        observer_remaining.remove(position);
                    } else {
                        if state.belief.hands().get(party) == 0 {
                            return Err(RunnerError::scenario(format!(
                                "move {index}: {party} has no tiles left to play"
                            )));
                        }
                        state.line.play(*tile, *side)?;
                        state.belief.on_item_played(party, *tile)?;
                    }
                }
                MoveConfig::Pass { .. } => {
                    if party != self.observer {
                        let pips = state.line.pass_reveals();
                        reveal(&mut state.belief, party, &pips, &mut record);
                    }
                }
                MoveConfig::Reveal { pips, .. } => {
                    if party != self.observer {
                        reveal(&mut state.belief, party, pips, &mut record);
                    }
                }
            }

            record.live_items = state.belief.partition().live_count();
            if self.logging_enabled && tracing::enabled!(Level::INFO) {
                event!(
                    target: "domino_bench::replay",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    step = index,
                    party = %party,
                    action = %record.action,
                    relocated = record.relocated,
                    orphaned = record.orphaned.len(),
                    live = record.live_items,
                    "move applied"
                );
            }
            state.steps.push(record);
        }

        Ok(state)
    }

    /// Replays the scenario, estimates, and writes the JSON report and Markdown summary.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.report_json.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let state = self.replay()?;
        let estimate = state.belief.estimate()?;
        event!(
            target: "domino_bench::replay",
            Level::INFO,
            run_id = %self.config.run_id,
            branches = estimate.branch_count(),
            "estimate complete"
        );

        let report = ScenarioReport {
            run_id: self.config.run_id.clone(),
            observer: self.observer,
            observer_hand: self.observer_hand.clone(),
            line: state.line.tiles().collect(),
            open_ends: state.line.open_ends(),
            live_items: state.belief.partition().live_count(),
            hand_targets: state
                .belief
                .hands()
                .iter()
                .map(|(party, size)| HandTargetRow { party, size })
                .collect(),
            steps: state.steps,
            estimate: EstimateSummary::capture(&estimate, TOP_COMPOSITIONS),
        };
        report.write_json(&self.outputs.report_json)?;
        report.write_markdown(&self.outputs.summary_md)?;

        let telemetry = if self.logging_enabled {
            Some(telemetry_path(&self.outputs))
        } else {
            None
        };

        Ok(RunSummary {
            run_id: self.config.run_id.clone(),
            moves_applied: self.config.moves.len(),
            live_items: report.live_items,
            branch_count: estimate.branch_count(),
            report_path: self.outputs.report_json.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path: telemetry,
            report,
        })
    }
}

fn reveal(belief: &mut Belief<Tile>, party: Party, pips: &[Pip], record: &mut StepRecord) {
    for &pip in pips {
        let outcome = belief.on_structural_reveal(|tile| tile.has(pip), party);
        record.relocated += outcome.relocated;
        record.orphaned.extend(outcome.orphaned);
    }
}

fn describe(step: &MoveConfig) -> String {
    match step {
        MoveConfig::Play { tile, side, .. } => format!("play {tile} {side}"),
        MoveConfig::Pass { .. } => "pass".to_string(),
        MoveConfig::Reveal { pips, .. } => {
            let pips: Vec<String> = pips.iter().map(Pip::to_string).collect();
            format!("reveal no {}", pips.join(","))
        }
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("zone bookkeeping failed: {0}")]
    Zone(#[from] ZoneError),
    #[error("illegal play: {0}")]
    Play(#[from] PlayError),
    #[error("estimation failed: {0}")]
    Estimate(#[from] EstimateError),
    #[error("report output failed: {0}")]
    Report(#[from] ReportError),
    #[error("scenario is inconsistent: {message}")]
    Scenario { message: String },
}

impl RunnerError {
    fn scenario(message: String) -> Self {
        RunnerError::Scenario { message }
    }
}
