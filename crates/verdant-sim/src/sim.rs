//! Central garden simulation facade.
//!
//! [`GardenSim`] is the single source of truth for the garden, the player's
//! wallet and progression, and the current seed selection. External
//! collaborators (renderer, input handler, persistence) read through the
//! accessors and mutate only through the command operations here; every
//! guard is checked before any state changes, so a failed command has no
//! side effects.

use thiserror::Error;
use tracing::{debug, info};

use verdant_common::SpeciesId;

use crate::economy::{EconomyError, Wallet};
use crate::events::{EventBus, GardenEvent};
use crate::garden::{Garden, PlotStage};
use crate::progression::Progression;
use crate::species::SpeciesCatalog;

/// Errors produced by simulation commands.
#[derive(Debug, Error)]
pub enum GardenError {
    /// Plot index outside the garden
    #[error("no plot at index {index} (garden has {plots})")]
    InvalidPlot {
        /// Requested index
        index: usize,
        /// Number of plots in the garden
        plots: usize,
    },

    /// Planting into a plot that already holds a species
    #[error("plot {index} is already planted")]
    PlotOccupied {
        /// Plot index
        index: usize,
    },

    /// Planting with no species selected
    #[error("no seed selected")]
    NoSeedSelected,

    /// Not enough coins for the selected seed
    #[error(transparent)]
    InsufficientFunds(#[from] EconomyError),

    /// Species requires a higher player level
    #[error("species {species} unlocks at level {required}, player is level {level}")]
    SpeciesLocked {
        /// The locked species
        species: SpeciesId,
        /// Level required to select it
        required: u32,
        /// The player's current level
        level: u32,
    },

    /// Harvesting a plot that is empty or still growing
    #[error("plot {index} is not ready to harvest")]
    NotReady {
        /// Plot index
        index: usize,
    },

    /// Watering an empty plot
    #[error("plot {index} has nothing planted")]
    NotPlanted {
        /// Plot index
        index: usize,
    },

    /// Species id not present in the catalog
    #[error("unknown species {0}")]
    UnknownSpecies(SpeciesId),
}

/// Result type for simulation commands.
pub type SimResult<T> = Result<T, GardenError>;

/// The garden simulation: plots, player economy, and seed selection.
#[derive(Debug)]
pub struct GardenSim {
    pub(crate) catalog: SpeciesCatalog,
    pub(crate) garden: Garden,
    pub(crate) wallet: Wallet,
    pub(crate) progression: Progression,
    pub(crate) selected: Option<SpeciesId>,
    pub(crate) ticks: u64,
    events: EventBus,
}

impl GardenSim {
    /// Creates a simulation with a single-row garden of `plot_count` plots.
    #[must_use]
    pub fn new(catalog: SpeciesCatalog, plot_count: usize, starting_coins: u64) -> Self {
        Self::with_garden(catalog, Garden::new(plot_count), starting_coins)
    }

    /// Creates a simulation around an existing garden layout.
    #[must_use]
    pub fn with_garden(catalog: SpeciesCatalog, garden: Garden, starting_coins: u64) -> Self {
        Self {
            catalog,
            garden,
            wallet: Wallet::new(starting_coins),
            progression: Progression::new(),
            selected: None,
            ticks: 0,
            events: EventBus::default(),
        }
    }

    /// Selects the species used by subsequent [`plant`](Self::plant) calls.
    ///
    /// Rejects species the catalog does not define and species whose unlock
    /// level exceeds the player's; the prior selection is kept on failure.
    pub fn select_species(&mut self, id: SpeciesId) -> SimResult<()> {
        let def = self
            .catalog
            .get(id)
            .ok_or(GardenError::UnknownSpecies(id))?;

        let level = self.progression.level();
        if !def.is_unlocked_at(level) {
            return Err(GardenError::SpeciesLocked {
                species: id,
                required: def.unlock_level,
                level,
            });
        }

        self.selected = Some(id);
        Ok(())
    }

    /// Plants the selected species into an empty plot, paying its seed cost.
    pub fn plant(&mut self, index: usize) -> SimResult<()> {
        let plots = self.garden.len();
        let occupied = self
            .garden
            .get(index)
            .ok_or(GardenError::InvalidPlot { index, plots })?
            .species()
            .is_some();
        if occupied {
            return Err(GardenError::PlotOccupied { index });
        }

        let id = self.selected.ok_or(GardenError::NoSeedSelected)?;
        let def = self
            .catalog
            .get(id)
            .ok_or(GardenError::UnknownSpecies(id))?;

        // Last guard: the spend itself fails without deducting.
        self.wallet.spend(def.cost)?;

        if let Some(plot) = self.garden.get_mut(index) {
            plot.plant(id);
        }
        debug!(plot = index, species = id.raw(), "planted");
        self.events.publish(GardenEvent::Planted { plot: index, species: id });
        Ok(())
    }

    /// Waters a planted plot so growth ticks take effect.
    ///
    /// Watering an already-watered plot is a no-op.
    pub fn water(&mut self, index: usize) -> SimResult<()> {
        let plots = self.garden.len();
        let plot = self
            .garden
            .get_mut(index)
            .ok_or(GardenError::InvalidPlot { index, plots })?;

        if plot.is_empty() {
            return Err(GardenError::NotPlanted { index });
        }
        if plot.is_watered() {
            return Ok(());
        }

        plot.water();
        debug!(plot = index, "watered");
        self.events.publish(GardenEvent::Watered { plot: index });
        Ok(())
    }

    /// Advances the simulation by one time step.
    ///
    /// Every watered, non-mature plot gains exactly one tick of progress.
    /// Returns `true` if any plot's derived stage changed, so a caller can
    /// skip re-rendering on quiet ticks.
    pub fn tick(&mut self) -> bool {
        let transitions = self.garden.advance(&self.catalog);
        self.ticks += 1;

        for t in &transitions {
            self.events.publish(GardenEvent::StageChanged {
                plot: t.plot,
                from: t.from,
                to: t.to,
            });
        }
        !transitions.is_empty()
    }

    /// Harvests a mature plot, crediting coins and experience.
    pub fn harvest(&mut self, index: usize) -> SimResult<()> {
        let plots = self.garden.len();
        let plot = self
            .garden
            .get(index)
            .ok_or(GardenError::InvalidPlot { index, plots })?;

        let id = plot.species().ok_or(GardenError::NotReady { index })?;
        let def = self
            .catalog
            .get(id)
            .ok_or(GardenError::UnknownSpecies(id))?;
        if plot.progress() < def.growth_ticks {
            return Err(GardenError::NotReady { index });
        }

        let coins = def.sell_value;
        let xp = def.xp_reward;
        self.wallet.earn(coins);
        let gained = self.progression.grant(xp);

        if let Some(plot) = self.garden.get_mut(index) {
            plot.clear();
        }

        info!(
            plot = index,
            species = id.raw(),
            coins,
            xp,
            "harvested"
        );
        self.events.publish(GardenEvent::Harvested {
            plot: index,
            species: id,
            coins,
            xp,
        });

        let level = self.progression.level();
        for step in 0..gained {
            let reached = level - gained + step + 1;
            info!(level = reached, "level up");
            self.events.publish(GardenEvent::LeveledUp { level: reached });
        }

        Ok(())
    }

    /// Derives the growth stage of a plot.
    pub fn stage_of(&self, index: usize) -> SimResult<PlotStage> {
        let plots = self.garden.len();
        let plot = self
            .garden
            .get(index)
            .ok_or(GardenError::InvalidPlot { index, plots })?;

        match plot.species() {
            None => Ok(PlotStage::Empty),
            Some(id) => {
                let def = self
                    .catalog
                    .get(id)
                    .ok_or(GardenError::UnknownSpecies(id))?;
                Ok(plot.stage(def))
            }
        }
    }

    /// Returns the garden for read access.
    #[must_use]
    pub fn garden(&self) -> &Garden {
        &self.garden
    }

    /// Returns the species catalog.
    #[must_use]
    pub fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    /// Returns the player's coin balance.
    #[must_use]
    pub fn balance(&self) -> u64 {
        self.wallet.balance()
    }

    /// Returns the player's level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.progression.level()
    }

    /// Returns experience within the current level.
    #[must_use]
    pub fn experience(&self) -> u64 {
        self.progression.experience()
    }

    /// Returns experience still needed for the next level.
    #[must_use]
    pub fn xp_to_next_level(&self) -> u64 {
        self.progression.xp_to_next_level()
    }

    /// Returns the currently selected species, if any.
    #[must_use]
    pub fn selected_species(&self) -> Option<SpeciesId> {
        self.selected
    }

    /// Returns the number of ticks processed.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Returns the event bus for draining notifications.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::species_ids;

    fn sim_with(coins: u64, plots: usize) -> GardenSim {
        GardenSim::new(SpeciesCatalog::with_defaults(), plots, coins)
    }

    #[test]
    fn test_select_unknown_species() {
        let mut sim = sim_with(100, 1);
        let result = sim.select_species(SpeciesId::new(999));
        assert!(matches!(result, Err(GardenError::UnknownSpecies(_))));
        assert_eq!(sim.selected_species(), None);
    }

    #[test]
    fn test_select_locked_species_keeps_prior_selection() {
        let mut sim = sim_with(1000, 1);
        sim.select_species(species_ids::CARROT).expect("carrot");

        // Potato unlocks at level 2; player is level 1.
        let result = sim.select_species(species_ids::POTATO);
        assert!(matches!(
            result,
            Err(GardenError::SpeciesLocked {
                required: 2,
                level: 1,
                ..
            })
        ));
        assert_eq!(sim.selected_species(), Some(species_ids::CARROT));
    }

    #[test]
    fn test_plant_out_of_range() {
        let mut sim = sim_with(100, 2);
        sim.select_species(species_ids::CARROT).expect("carrot");
        let result = sim.plant(2);
        assert!(matches!(
            result,
            Err(GardenError::InvalidPlot { index: 2, plots: 2 })
        ));
    }

    #[test]
    fn test_plant_without_selection() {
        let mut sim = sim_with(100, 1);
        let result = sim.plant(0);
        assert!(matches!(result, Err(GardenError::NoSeedSelected)));
        assert_eq!(sim.balance(), 100);
    }

    #[test]
    fn test_plant_occupied() {
        let mut sim = sim_with(100, 1);
        sim.select_species(species_ids::CARROT).expect("carrot");
        sim.plant(0).expect("first plant");

        let balance = sim.balance();
        let result = sim.plant(0);
        assert!(matches!(result, Err(GardenError::PlotOccupied { index: 0 })));
        assert_eq!(sim.balance(), balance);
    }

    #[test]
    fn test_plant_insufficient_funds() {
        let mut sim = sim_with(5, 1);
        sim.select_species(species_ids::CARROT).expect("carrot");

        let result = sim.plant(0);
        assert!(matches!(result, Err(GardenError::InsufficientFunds(_))));
        assert_eq!(sim.balance(), 5);
        assert!(sim.garden().get(0).expect("plot").is_empty());
    }

    #[test]
    fn test_water_empty_plot() {
        let mut sim = sim_with(100, 1);
        let result = sim.water(0);
        assert!(matches!(result, Err(GardenError::NotPlanted { index: 0 })));
    }

    #[test]
    fn test_water_twice_is_noop() {
        let mut sim = sim_with(100, 1);
        sim.select_species(species_ids::CARROT).expect("carrot");
        sim.plant(0).expect("plant");

        sim.water(0).expect("first water");
        sim.water(0).expect("second water");

        // Only one Watered event was published
        let watered = sim
            .events()
            .drain()
            .into_iter()
            .filter(|e| matches!(e, GardenEvent::Watered { .. }))
            .count();
        assert_eq!(watered, 1);
    }

    #[test]
    fn test_growth_waits_for_water() {
        let mut sim = sim_with(100, 1);
        sim.select_species(species_ids::CARROT).expect("carrot");
        sim.plant(0).expect("plant");

        for _ in 0..20 {
            sim.tick();
        }
        assert_eq!(sim.stage_of(0).expect("stage"), PlotStage::Planted);

        sim.water(0).expect("water");
        sim.tick();
        assert_eq!(sim.garden().get(0).expect("plot").progress(), 1);
    }

    #[test]
    fn test_harvest_not_ready() {
        let mut sim = sim_with(100, 1);
        sim.select_species(species_ids::CARROT).expect("carrot");
        sim.plant(0).expect("plant");
        sim.water(0).expect("water");

        // One tick short of maturity
        for _ in 0..9 {
            sim.tick();
        }
        let result = sim.harvest(0);
        assert!(matches!(result, Err(GardenError::NotReady { index: 0 })));

        // Exactly at maturity it succeeds
        sim.tick();
        sim.harvest(0).expect("harvest at maturity");
    }

    #[test]
    fn test_harvest_empty_plot() {
        let mut sim = sim_with(100, 1);
        let result = sim.harvest(0);
        assert!(matches!(result, Err(GardenError::NotReady { index: 0 })));
    }

    #[test]
    fn test_tick_reports_stage_changes() {
        let mut sim = sim_with(100, 1);
        sim.select_species(species_ids::CARROT).expect("carrot");
        sim.plant(0).expect("plant");
        sim.water(0).expect("water");

        // Carrot (duration 10, two phases): changes at ticks 5 and 10.
        let changed: Vec<bool> = (0..10).map(|_| sim.tick()).collect();
        assert_eq!(changed.iter().filter(|&&c| c).count(), 2);
        assert!(changed[4]);
        assert!(changed[9]);

        // Mature plot: quiet ticks from here on
        assert!(!sim.tick());
        assert_eq!(sim.tick_count(), 11);
    }

    #[test]
    fn test_unlock_after_leveling() {
        let mut sim = sim_with(1000, 1);
        assert!(sim.select_species(species_ids::POTATO).is_err());

        // Harvest carrots until level 2 (threshold 100, carrot xp 15)
        sim.select_species(species_ids::CARROT).expect("carrot");
        while sim.level() < 2 {
            sim.plant(0).expect("plant");
            sim.water(0).expect("water");
            for _ in 0..10 {
                sim.tick();
            }
            sim.harvest(0).expect("harvest");
        }

        sim.select_species(species_ids::POTATO)
            .expect("potato unlocked at level 2");
    }

    #[test]
    fn test_end_to_end_carrot_run() {
        let mut sim = sim_with(20, 1);

        sim.select_species(species_ids::CARROT).expect("select");
        sim.plant(0).expect("plant");
        assert_eq!(sim.balance(), 10);
        assert_eq!(
            sim.garden().get(0).expect("plot").species(),
            Some(species_ids::CARROT)
        );
        assert_eq!(sim.garden().get(0).expect("plot").progress(), 0);

        sim.water(0).expect("water");
        for _ in 0..10 {
            sim.tick();
        }
        assert_eq!(sim.garden().get(0).expect("plot").progress(), 10);
        assert_eq!(sim.stage_of(0).expect("stage"), PlotStage::Ready);

        sim.harvest(0).expect("harvest");
        assert_eq!(sim.balance(), 35);
        assert_eq!(sim.experience(), 15);
        assert_eq!(sim.level(), 1);
        assert!(sim.garden().get(0).expect("plot").is_empty());
        assert_eq!(sim.garden().get(0).expect("plot").progress(), 0);
    }

    #[test]
    fn test_harvest_publishes_level_up_events() {
        let mut catalog = SpeciesCatalog::new();
        catalog.register(
            crate::species::SpeciesDef::builder(SpeciesId::new(1), "Prize Gourd")
                .cost(1)
                .growth_ticks(1)
                .sell_value(5)
                .xp_reward(250) // crosses levels 1 -> 3 in one harvest
                .build(),
        );
        let mut sim = GardenSim::new(catalog, 1, 10);

        sim.select_species(SpeciesId::new(1)).expect("select");
        sim.plant(0).expect("plant");
        sim.water(0).expect("water");
        sim.tick();
        sim.harvest(0).expect("harvest");

        assert_eq!(sim.level(), 3);
        let levels: Vec<u32> = sim
            .events()
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                GardenEvent::LeveledUp { level } => Some(level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![2, 3]);
    }
}
