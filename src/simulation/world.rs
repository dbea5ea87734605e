//! World - owns every piece of mutable simulation state

use crate::core::config::PondConfig;
use crate::core::error::Result;
use crate::core::rng::PondRng;
use crate::core::types::{Clock, IdCounter};
use crate::pond::Pond;
use crate::simulation::stats::{PondCensus, PopulationEvent, Report, Reporter, StatCounters};

/// The pond plus the shared state every cycle touches
///
/// There are no process-wide globals: the random stream, id counter and
/// statistics all live here so independent worlds can coexist.
pub struct World {
    pub config: PondConfig,
    pub pond: Pond,
    pub rng: PondRng,
    pub ids: IdCounter,
    pub stats: StatCounters,
    pub reporter: Reporter,
    pub clock: Clock,
}

impl World {
    /// Validate `config` and build a pond of blank cells
    pub fn new(config: PondConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => PondRng::with_seed(seed),
            None => PondRng::from_entropy(),
        };
        Ok(Self::with_rng(config, rng))
    }

    /// Build a world around an explicit random source
    ///
    /// Assumes `config` is already validated.
    pub fn with_rng(config: PondConfig, rng: PondRng) -> Self {
        let pond = Pond::new(config.width, config.height, config.genome_depth);
        Self {
            config,
            pond,
            rng,
            ids: IdCounter::new(),
            stats: StatCounters::default(),
            reporter: Reporter::new(),
            clock: 0,
        }
    }

    /// Scan the pond, summarize, detect population transitions, reset counters
    pub fn report(&mut self) -> (Report, Option<PopulationEvent>) {
        let census = PondCensus::scan(&self.pond);
        let report = Report::new(self.clock, &census, &self.stats);
        let event = self.reporter.observe(census.viable_replicators);
        self.stats.reset();
        (report, event)
    }
}
