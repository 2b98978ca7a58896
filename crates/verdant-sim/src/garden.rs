//! Garden plots and growth advancement.
//!
//! The garden is a fixed-size collection of plots created once at simulation
//! start. Plots are never added or removed; only their contents change. A
//! plot cycles empty → planted → watered/growing → ready, and growth ticks
//! only count once the plot has been watered.

use serde::{Deserialize, Serialize};

use verdant_common::{PlotCoord, SpeciesId};

use crate::species::{SpeciesCatalog, SpeciesDef};

/// One addressable slot in the garden grid.
///
/// Invariants: `progress == 0` and `watered == false` whenever no species is
/// planted; `progress` never exceeds the planted species' growth duration.
#[derive(Debug, Clone, Default)]
pub struct Plot {
    /// Planted species, if any.
    species: Option<SpeciesId>,
    /// Accumulated growth ticks since watering.
    progress: u32,
    /// Whether the planting has been watered (growth gate).
    watered: bool,
}

impl Plot {
    /// Creates an empty plot.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            species: None,
            progress: 0,
            watered: false,
        }
    }

    /// Returns the planted species, if any.
    #[must_use]
    pub const fn species(&self) -> Option<SpeciesId> {
        self.species
    }

    /// Returns accumulated growth ticks.
    #[must_use]
    pub const fn progress(&self) -> u32 {
        self.progress
    }

    /// Returns whether the planting has been watered.
    #[must_use]
    pub const fn is_watered(&self) -> bool {
        self.watered
    }

    /// Checks whether the plot holds no species.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.species.is_none()
    }

    /// Plants a species, resetting growth state.
    pub fn plant(&mut self, species: SpeciesId) {
        self.species = Some(species);
        self.progress = 0;
        self.watered = false;
    }

    /// Marks the planting as watered so growth ticks take effect.
    pub fn water(&mut self) {
        self.watered = true;
    }

    /// Clears the plot back to empty.
    pub fn clear(&mut self) {
        self.species = None;
        self.progress = 0;
        self.watered = false;
    }

    /// Derives the growth stage against a species definition.
    ///
    /// The definition must be the one for this plot's planted species.
    #[must_use]
    pub fn stage(&self, def: &SpeciesDef) -> PlotStage {
        if self.species.is_none() {
            return PlotStage::Empty;
        }
        if !self.watered {
            return PlotStage::Planted;
        }
        if self.progress >= def.growth_ticks {
            return PlotStage::Ready;
        }

        // growth_ticks > 0 here: a zero-duration species is already Ready.
        let of = def.intermediate_stages();
        let stage = (u64::from(self.progress) * u64::from(of) / u64::from(def.growth_ticks)) as u32;
        PlotStage::Growing {
            stage: (stage + 1).min(of),
            of,
        }
    }

    /// Restores persisted growth state, clamping progress to the duration.
    pub(crate) fn restore(&mut self, species: SpeciesId, progress: u32, watered: bool, def: &SpeciesDef) {
        self.species = Some(species);
        self.progress = progress.min(def.growth_ticks);
        self.watered = watered;
    }
}

/// Coarse growth phase of a plot, derived from progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotStage {
    /// No species planted.
    Empty,
    /// Seeded but not yet watered; growth has not started.
    Planted,
    /// Watered and below maturity.
    Growing {
        /// Current intermediate phase (1-based).
        stage: u32,
        /// Total intermediate phases for the species.
        of: u32,
    },
    /// Mature and harvestable.
    Ready,
}

impl PlotStage {
    /// Checks if the plot can be harvested in this stage.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// A stage change observed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    /// Index of the plot that changed.
    pub plot: usize,
    /// Stage before the tick.
    pub from: PlotStage,
    /// Stage after the tick.
    pub to: PlotStage,
}

/// Fixed-size ordered collection of plots, addressable as a grid.
#[derive(Debug, Clone)]
pub struct Garden {
    plots: Vec<Plot>,
    columns: u16,
}

impl Garden {
    /// Creates a single-row garden with the given plot count.
    #[must_use]
    pub fn new(plot_count: usize) -> Self {
        Self {
            plots: vec![Plot::empty(); plot_count],
            columns: plot_count.min(u16::MAX as usize) as u16,
        }
    }

    /// Creates a garden laid out as a rows × columns grid.
    #[must_use]
    pub fn with_grid(rows: u16, columns: u16) -> Self {
        Self {
            plots: vec![Plot::empty(); rows as usize * columns as usize],
            columns,
        }
    }

    /// Rebuilds an empty garden from a persisted layout.
    pub(crate) fn with_layout(plot_count: usize, columns: u16) -> Self {
        Self {
            plots: vec![Plot::empty(); plot_count],
            columns,
        }
    }

    /// Returns the number of plots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plots.len()
    }

    /// Checks if the garden has no plots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Returns the column count for grid addressing.
    #[must_use]
    pub const fn columns(&self) -> u16 {
        self.columns
    }

    /// Gets a plot by linear index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Plot> {
        self.plots.get(index)
    }

    /// Gets a mutable plot by linear index.
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Plot> {
        self.plots.get_mut(index)
    }

    /// Gets a plot by grid coordinate.
    #[must_use]
    pub fn get_at(&self, coord: PlotCoord) -> Option<&Plot> {
        if coord.col >= self.columns {
            return None;
        }
        self.get(coord.to_index(self.columns))
    }

    /// Returns the grid coordinate of a linear index.
    #[must_use]
    pub fn coord_of(&self, index: usize) -> PlotCoord {
        PlotCoord::from_index(index, self.columns)
    }

    /// Iterates over all plots in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Plot> {
        self.plots.iter()
    }

    /// Derives the stage of a plot against the catalog.
    ///
    /// Returns `None` for an out-of-range index or a plot whose species the
    /// catalog does not define.
    #[must_use]
    pub fn stage_of(&self, index: usize, catalog: &SpeciesCatalog) -> Option<PlotStage> {
        let plot = self.get(index)?;
        match plot.species() {
            None => Some(PlotStage::Empty),
            Some(id) => {
                let def = catalog.get(id)?;
                Some(plot.stage(def))
            }
        }
    }

    /// Advances growth by one tick for every eligible plot.
    ///
    /// A plot is eligible when it holds a species, has been watered, and is
    /// below the species' growth duration; mature plots are untouched.
    /// Returns the stage transitions observed, in plot order.
    pub(crate) fn advance(&mut self, catalog: &SpeciesCatalog) -> Vec<StageTransition> {
        let mut transitions = Vec::new();

        for (index, plot) in self.plots.iter_mut().enumerate() {
            let Some(id) = plot.species else { continue };
            let Some(def) = catalog.get(id) else { continue };
            if !plot.watered || plot.progress >= def.growth_ticks {
                continue;
            }

            let before = plot.stage(def);
            plot.progress += 1;
            let after = plot.stage(def);

            if before != after {
                transitions.push(StageTransition {
                    plot: index,
                    from: before,
                    to: after,
                });
            }
        }

        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::species_ids;

    fn carrot_def() -> SpeciesDef {
        SpeciesCatalog::with_defaults()
            .get(species_ids::CARROT)
            .expect("carrot")
            .clone()
    }

    #[test]
    fn test_empty_plot_invariants() {
        let plot = Plot::empty();
        assert!(plot.is_empty());
        assert_eq!(plot.progress(), 0);
        assert!(!plot.is_watered());
        assert_eq!(plot.stage(&carrot_def()), PlotStage::Empty);
    }

    #[test]
    fn test_plant_resets_growth_state() {
        let mut plot = Plot::empty();
        plot.plant(species_ids::CARROT);
        plot.water();
        plot.clear();

        plot.plant(species_ids::CARROT);
        assert_eq!(plot.progress(), 0);
        assert!(!plot.is_watered());
        assert_eq!(plot.stage(&carrot_def()), PlotStage::Planted);
    }

    #[test]
    fn test_stage_interpolation() {
        // Carrot: duration 10, three markers -> two intermediate phases.
        let def = carrot_def();
        let mut plot = Plot::empty();
        plot.plant(species_ids::CARROT);
        plot.water();

        assert_eq!(plot.stage(&def), PlotStage::Growing { stage: 1, of: 2 });
        plot.progress = 4;
        assert_eq!(plot.stage(&def), PlotStage::Growing { stage: 1, of: 2 });
        plot.progress = 5;
        assert_eq!(plot.stage(&def), PlotStage::Growing { stage: 2, of: 2 });
        plot.progress = 9;
        assert_eq!(plot.stage(&def), PlotStage::Growing { stage: 2, of: 2 });
        plot.progress = 10;
        assert_eq!(plot.stage(&def), PlotStage::Ready);
    }

    #[test]
    fn test_advance_requires_watering() {
        let catalog = SpeciesCatalog::with_defaults();
        let mut garden = Garden::new(2);

        garden.get_mut(0).expect("plot").plant(species_ids::CARROT);

        let transitions = garden.advance(&catalog);
        assert!(transitions.is_empty());
        assert_eq!(garden.get(0).expect("plot").progress(), 0);
    }

    #[test]
    fn test_advance_to_maturity_and_clamp() {
        let catalog = SpeciesCatalog::with_defaults();
        let duration = catalog
            .get(species_ids::CARROT)
            .expect("carrot")
            .growth_ticks;

        let mut garden = Garden::new(1);
        let plot = garden.get_mut(0).expect("plot");
        plot.plant(species_ids::CARROT);
        plot.water();

        for _ in 0..duration {
            garden.advance(&catalog);
        }
        assert_eq!(garden.get(0).expect("plot").progress(), duration);
        assert_eq!(
            garden.stage_of(0, &catalog),
            Some(PlotStage::Ready)
        );

        // Further ticks leave a mature plot unchanged
        let transitions = garden.advance(&catalog);
        assert!(transitions.is_empty());
        assert_eq!(garden.get(0).expect("plot").progress(), duration);
    }

    #[test]
    fn test_advance_reports_transitions() {
        let catalog = SpeciesCatalog::with_defaults();
        let mut garden = Garden::new(1);
        let plot = garden.get_mut(0).expect("plot");
        plot.plant(species_ids::CARROT);
        plot.water();

        // Carrot crosses its midpoint at tick 5 and matures at tick 10.
        let mut observed = Vec::new();
        for _ in 0..10 {
            observed.extend(garden.advance(&catalog));
        }

        assert_eq!(observed.len(), 2);
        assert_eq!(observed[0].to, PlotStage::Growing { stage: 2, of: 2 });
        assert_eq!(observed[1].to, PlotStage::Ready);
    }

    #[test]
    fn test_grid_addressing() {
        let garden = Garden::with_grid(3, 4);
        assert_eq!(garden.len(), 12);
        assert_eq!(garden.columns(), 4);
        assert_eq!(garden.coord_of(7), PlotCoord::new(1, 3));
        assert!(garden.get_at(PlotCoord::new(2, 3)).is_some());
        assert!(garden.get_at(PlotCoord::new(0, 4)).is_none());
        assert!(garden.get_at(PlotCoord::new(3, 0)).is_none());
    }

    proptest::proptest! {
        // Progress stays within [0, duration] no matter how many ticks run.
        #[test]
        fn prop_progress_bounded(ticks in 0usize..64) {
            let catalog = SpeciesCatalog::with_defaults();
            let duration = catalog
                .get(species_ids::CARROT)
                .expect("carrot")
                .growth_ticks;

            let mut garden = Garden::new(1);
            let plot = garden.get_mut(0).expect("plot");
            plot.plant(species_ids::CARROT);
            plot.water();

            for _ in 0..ticks {
                garden.advance(&catalog);
            }

            let progress = garden.get(0).expect("plot").progress();
            proptest::prop_assert!(progress <= duration);
            proptest::prop_assert_eq!(progress, (ticks as u32).min(duration));
        }
    }
}
