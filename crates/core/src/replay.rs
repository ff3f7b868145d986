//! Recording and replaying headless sessions against a [`SimulatedHost`].

use thiserror::Error;

use crate::config::DungeonConfig;
use crate::error::DungeonError;
use crate::host::SimulatedHost;
use crate::journal::{InputJournal, JOURNAL_FORMAT_VERSION, SessionInput};
use crate::level::LevelFlow;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("journal format {found} is not supported (expected {JOURNAL_FORMAT_VERSION})")]
    UnsupportedVersion { found: u16 },

    #[error("failed to set up the first level")]
    Setup(#[source] DungeonError),

    #[error("input {seq} was recorded at tick {recorded} but replay reached tick {actual}")]
    TickMismatch { seq: u64, recorded: u64, actual: u64 },

    #[error("input {seq} failed")]
    Input {
        seq: u64,
        #[source]
        source: DungeonError,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_tick: u64,
    pub final_level: u32,
    pub final_snapshot_hash: u64,
    pub game_over: bool,
}

/// A live session that journals every input it applies.
pub struct Session {
    flow: LevelFlow,
    host: SimulatedHost,
    journal: InputJournal,
}

impl Session {
    pub fn start(config: DungeonConfig, run_seed: u64) -> Result<Self, DungeonError> {
        let journal = InputJournal::new(run_seed, config.clone());
        let mut flow = LevelFlow::with_run_seed(config, run_seed)?;
        let mut host = SimulatedHost::new();
        flow.start_new_level(&mut host)?;
        Ok(Self { flow, host, journal })
    }

    /// Journals `input`, then applies it. The record is kept even when the
    /// input fails so a replay fails at the same point.
    pub fn apply(&mut self, input: SessionInput) -> Result<(), DungeonError> {
        self.journal.append(self.flow.dungeon().now(), input);
        self.flow.apply(&input, &mut self.host)
    }

    pub fn flow(&self) -> &LevelFlow {
        &self.flow
    }

    pub fn host(&self) -> &SimulatedHost {
        &self.host
    }

    pub fn journal(&self) -> &InputJournal {
        &self.journal
    }

    pub fn into_journal(self) -> InputJournal {
        self.journal
    }

    pub fn result(&self) -> ReplayResult {
        summarize(&self.flow)
    }
}

fn summarize(flow: &LevelFlow) -> ReplayResult {
    ReplayResult {
        final_tick: flow.dungeon().now(),
        final_level: flow.current_level(),
        final_snapshot_hash: flow.dungeon().snapshot_hash(),
        game_over: flow.is_game_over(),
    }
}

/// Rebuilds the session from its seed and config and applies every input.
pub fn replay_to_end(journal: &InputJournal) -> Result<ReplayResult, ReplayError> {
    if journal.format_version != JOURNAL_FORMAT_VERSION {
        return Err(ReplayError::UnsupportedVersion { found: journal.format_version });
    }

    let mut flow =
        LevelFlow::with_run_seed(journal.config.clone(), journal.seed).map_err(ReplayError::Setup)?;
    let mut host = SimulatedHost::new();
    flow.start_new_level(&mut host).map_err(ReplayError::Setup)?;

    for record in &journal.inputs {
        let actual = flow.dungeon().now();
        if record.tick != actual {
            return Err(ReplayError::TickMismatch { seq: record.seq, recorded: record.tick, actual });
        }
        flow.apply(&record.input, &mut host)
            .map_err(|source| ReplayError::Input { seq: record.seq, source })?;
    }

    Ok(summarize(&flow))
}
