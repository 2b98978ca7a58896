//! Species catalog for plantable crops.
//!
//! A species describes one plantable crop: what a seed costs, how many ticks
//! it needs to mature, what selling the harvest pays, and the level at which
//! the shop offers it. Definitions are immutable once registered; plots and
//! the player refer to them by [`SpeciesId`] only.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use verdant_common::SpeciesId;

/// Errors that can occur while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two definitions in a catalog document share an ID
    #[error("duplicate species in catalog: {0}")]
    DuplicateSpecies(SpeciesId),

    /// Catalog document failed to parse
    #[error("catalog parse error: {0}")]
    Parse(String),
}

/// Well-known species IDs for the default catalog.
pub mod species_ids {
    use verdant_common::SpeciesId;

    /// Carrot: the starter crop.
    pub const CARROT: SpeciesId = SpeciesId::new(1);
    /// Turnip: cheap and quick.
    pub const TURNIP: SpeciesId = SpeciesId::new(2);
    /// Potato: slower, better margin.
    pub const POTATO: SpeciesId = SpeciesId::new(3);
    /// Strawberry: mid-game cash crop.
    pub const STRAWBERRY: SpeciesId = SpeciesId::new(4);
    /// Pumpkin: late unlock, long grower.
    pub const PUMPKIN: SpeciesId = SpeciesId::new(5);
}

fn default_unlock_level() -> u32 {
    1
}

fn default_stage_markers() -> Vec<String> {
    vec!["sprout".into(), "growing".into(), "mature".into()]
}

/// Definition of a plantable species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesDef {
    /// Unique identifier.
    pub id: SpeciesId,
    /// Display name.
    pub name: String,
    /// Seed purchase cost, deducted on planting.
    pub cost: u64,
    /// Ticks from watering to maturity.
    pub growth_ticks: u32,
    /// Coins credited on harvest.
    pub sell_value: u64,
    /// Experience awarded on harvest.
    pub xp_reward: u64,
    /// Minimum player level required to select this species.
    #[serde(default = "default_unlock_level")]
    pub unlock_level: u32,
    /// Ordered visual markers for the growth phases, ending at mature.
    /// Only the count matters to the engine.
    #[serde(default = "default_stage_markers")]
    pub stage_markers: Vec<String>,
}

impl SpeciesDef {
    /// Creates a new species definition builder.
    #[must_use]
    pub fn builder(id: SpeciesId, name: &str) -> SpeciesDefBuilder {
        SpeciesDefBuilder::new(id, name)
    }

    /// Number of intermediate growth phases before maturity.
    ///
    /// The last marker is the mature look, so a three-marker species has two
    /// intermediate phases. Always at least one.
    #[must_use]
    pub fn intermediate_stages(&self) -> u32 {
        (self.stage_markers.len().saturating_sub(1)).max(1) as u32
    }

    /// Checks whether a player at the given level may select this species.
    #[must_use]
    pub const fn is_unlocked_at(&self, level: u32) -> bool {
        level >= self.unlock_level
    }
}

/// Builder for species definitions.
#[derive(Debug)]
pub struct SpeciesDefBuilder {
    def: SpeciesDef,
}

impl SpeciesDefBuilder {
    /// Creates a new builder with sensible starter-crop defaults.
    #[must_use]
    pub fn new(id: SpeciesId, name: &str) -> Self {
        Self {
            def: SpeciesDef {
                id,
                name: name.to_string(),
                cost: 10,
                growth_ticks: 30,
                sell_value: 20,
                xp_reward: 10,
                unlock_level: default_unlock_level(),
                stage_markers: default_stage_markers(),
            },
        }
    }

    /// Sets the seed cost.
    #[must_use]
    pub fn cost(mut self, cost: u64) -> Self {
        self.def.cost = cost;
        self
    }

    /// Sets the growth duration in ticks.
    #[must_use]
    pub fn growth_ticks(mut self, ticks: u32) -> Self {
        self.def.growth_ticks = ticks;
        self
    }

    /// Sets the harvest sell value.
    #[must_use]
    pub fn sell_value(mut self, value: u64) -> Self {
        self.def.sell_value = value;
        self
    }

    /// Sets the harvest experience reward.
    #[must_use]
    pub fn xp_reward(mut self, xp: u64) -> Self {
        self.def.xp_reward = xp;
        self
    }

    /// Sets the level required to select this species.
    #[must_use]
    pub fn unlock_level(mut self, level: u32) -> Self {
        self.def.unlock_level = level;
        self
    }

    /// Sets the growth-stage markers (last one is the mature look).
    #[must_use]
    pub fn stage_markers(mut self, markers: &[&str]) -> Self {
        self.def.stage_markers = markers.iter().map(|&m| m.to_string()).collect();
        self
    }

    /// Builds the species definition.
    #[must_use]
    pub fn build(self) -> SpeciesDef {
        self.def
    }
}

/// Registry of species definitions.
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    definitions: HashMap<SpeciesId, SpeciesDef>,
}

impl SpeciesCatalog {
    /// Creates a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog with the default crop roster.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.register_defaults();
        catalog
    }

    /// Registers the default crop roster.
    pub fn register_defaults(&mut self) {
        self.register(
            SpeciesDef::builder(species_ids::CARROT, "Carrot")
                .cost(10)
                .growth_ticks(10)
                .sell_value(25)
                .xp_reward(15)
                .build(),
        );

        self.register(
            SpeciesDef::builder(species_ids::TURNIP, "Turnip")
                .cost(20)
                .growth_ticks(18)
                .sell_value(45)
                .xp_reward(25)
                .build(),
        );

        self.register(
            SpeciesDef::builder(species_ids::POTATO, "Potato")
                .cost(35)
                .growth_ticks(30)
                .sell_value(80)
                .xp_reward(45)
                .unlock_level(2)
                .build(),
        );

        self.register(
            SpeciesDef::builder(species_ids::STRAWBERRY, "Strawberry")
                .cost(60)
                .growth_ticks(45)
                .sell_value(150)
                .xp_reward(80)
                .unlock_level(3)
                .stage_markers(&["sprout", "vine", "flowering", "mature"])
                .build(),
        );

        self.register(
            SpeciesDef::builder(species_ids::PUMPKIN, "Pumpkin")
                .cost(120)
                .growth_ticks(80)
                .sell_value(320)
                .xp_reward(170)
                .unlock_level(5)
                .stage_markers(&["sprout", "vine", "budding", "mature"])
                .build(),
        );
    }

    /// Loads a catalog from a JSON array of species definitions.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let defs: Vec<SpeciesDef> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let mut catalog = Self::new();
        for def in defs {
            if catalog.contains(def.id) {
                return Err(CatalogError::DuplicateSpecies(def.id));
            }
            catalog.register(def);
        }
        Ok(catalog)
    }

    /// Registers a species definition, replacing any existing entry.
    pub fn register(&mut self, definition: SpeciesDef) {
        self.definitions.insert(definition.id, definition);
    }

    /// Gets a species definition by ID.
    #[must_use]
    pub fn get(&self, id: SpeciesId) -> Option<&SpeciesDef> {
        self.definitions.get(&id)
    }

    /// Checks whether the catalog defines a species.
    #[must_use]
    pub fn contains(&self, id: SpeciesId) -> bool {
        self.definitions.contains_key(&id)
    }

    /// Iterates over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &SpeciesDef> {
        self.definitions.values()
    }

    /// Returns the number of registered species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Checks if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
