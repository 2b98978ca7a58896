//! Snapshot persistence for the garden simulation.
//!
//! Snapshots hold primitive and identifier fields only. Species are stored
//! by raw ID and re-resolved against the live catalog on restore, never
//! embedded, so a catalog update between versions cannot leave stale
//! definitions inside a save file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info, warn};

use verdant_common::{MagicBytes, SchemaVersion, SpeciesId};

use crate::economy::Wallet;
use crate::garden::Garden;
use crate::progression::Progression;
use crate::sim::GardenSim;
use crate::species::SpeciesCatalog;

/// Errors that can occur during snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid magic bytes
    #[error("invalid snapshot file format")]
    InvalidFormat,

    /// Version mismatch
    #[error("incompatible snapshot version: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version
        expected: SchemaVersion,
        /// Found version
        found: SchemaVersion,
    },

    /// Snapshot file not found
    #[error("snapshot not found: {0}")]
    NotFound(String),

    /// Snapshot file corrupted
    #[error("snapshot corrupted: {0}")]
    Corrupted(String),

    /// Snapshot references a species the live catalog does not define
    #[error("snapshot references unknown species {0}")]
    UnknownSpecies(SpeciesId),
}

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Persisted state of a single plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotRecord {
    /// Raw species ID, `None` for an empty plot
    pub species: Option<u32>,
    /// Accumulated growth ticks
    pub progress: u32,
    /// Whether the planting was watered
    pub watered: bool,
}

/// Complete simulation snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GardenSnapshot {
    /// Snapshot format version
    pub version: SchemaVersion,
    /// Capture timestamp (Unix seconds)
    pub timestamp: u64,
    /// Column count for grid addressing
    pub columns: u16,
    /// Plot states in index order
    pub plots: Vec<PlotRecord>,
    /// Player coin balance
    pub coins: u64,
    /// Player level
    pub level: u32,
    /// Experience within the current level
    pub experience: u64,
    /// Raw ID of the selected species, if any
    pub selected_species: Option<u32>,
    /// Ticks processed so far
    pub ticks: u64,
}

impl GardenSnapshot {
    /// Captures the full state of a simulation.
    #[must_use]
    pub fn capture(sim: &GardenSim) -> Self {
        let plots = sim
            .garden()
            .iter()
            .map(|plot| PlotRecord {
                species: plot.species().map(SpeciesId::raw),
                progress: plot.progress(),
                watered: plot.is_watered(),
            })
            .collect();

        Self {
            version: SchemaVersion::SNAPSHOT,
            timestamp: current_timestamp(),
            columns: sim.garden().columns(),
            plots,
            coins: sim.balance(),
            level: sim.level(),
            experience: sim.experience(),
            selected_species: sim.selected_species().map(SpeciesId::raw),
            ticks: sim.tick_count(),
        }
    }

    /// Serializes to the binary envelope (magic bytes + body).
    pub fn to_bytes(&self) -> SnapshotResult<Vec<u8>> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&MagicBytes::SNAPSHOT.0);

        let body =
            bincode::serialize(self).map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        buffer.extend(body);

        Ok(buffer)
    }

    /// Deserializes from the binary envelope.
    pub fn from_bytes(bytes: &[u8]) -> SnapshotResult<Self> {
        if bytes.len() < 4 || bytes[0..4] != MagicBytes::SNAPSHOT.0 {
            return Err(SnapshotError::InvalidFormat);
        }

        let snapshot: GardenSnapshot =
            bincode::deserialize(&bytes[4..]).map_err(|e| SnapshotError::Corrupted(e.to_string()))?;

        if !SchemaVersion::SNAPSHOT.can_read(&snapshot.version) {
            return Err(SnapshotError::VersionMismatch {
                expected: SchemaVersion::SNAPSHOT,
                found: snapshot.version,
            });
        }

        Ok(snapshot)
    }
}

impl GardenSim {
    /// Restores a simulation from a snapshot against a live catalog.
    ///
    /// Every species ID in the snapshot is re-resolved; an ID the catalog no
    /// longer defines fails the restore rather than silently dropping the
    /// planting. Persisted progress is clamped to the species' duration.
    pub fn restore(catalog: SpeciesCatalog, snapshot: &GardenSnapshot) -> SnapshotResult<Self> {
        let mut garden = Garden::with_layout(snapshot.plots.len(), snapshot.columns);

        for (index, record) in snapshot.plots.iter().enumerate() {
            let Some(raw) = record.species else { continue };
            let id = SpeciesId::new(raw);
            let def = catalog
                .get(id)
                .ok_or(SnapshotError::UnknownSpecies(id))?;
            if let Some(plot) = garden.get_mut(index) {
                plot.restore(id, record.progress, record.watered, def);
            }
        }

        let selected = match snapshot.selected_species {
            None => None,
            Some(raw) => {
                let id = SpeciesId::new(raw);
                if !catalog.contains(id) {
                    return Err(SnapshotError::UnknownSpecies(id));
                }
                Some(id)
            }
        };

        let mut sim = Self::with_garden(catalog, garden, 0);
        sim.wallet = Wallet::new(snapshot.coins);
        sim.progression = Progression::from_parts(snapshot.level, snapshot.experience);
        sim.selected = selected;
        sim.ticks = snapshot.ticks;

        debug!(
            plots = snapshot.plots.len(),
            level = snapshot.level,
            "restored simulation from snapshot"
        );
        Ok(sim)
    }
}

/// Directory-backed store of named snapshot slots.
#[derive(Debug)]
pub struct SnapshotStore {
    /// Directory for snapshot files
    dir: PathBuf,
}

/// Slot metadata for listing snapshots without restoring them.
#[derive(Debug, Clone)]
pub struct SlotMetadata {
    /// Slot name
    pub slot: String,
    /// Capture timestamp
    pub timestamp: u64,
    /// Player level at capture
    pub level: u32,
    /// Coin balance at capture
    pub coins: u64,
    /// File size in bytes
    pub file_size: u64,
}

impl SnapshotStore {
    /// Creates a store rooted at the given directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensures the store directory exists.
    pub fn ensure_dir(&self) -> SnapshotResult<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.vds"))
    }

    fn temp_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.vds.tmp"))
    }

    /// Saves a snapshot to a named slot.
    ///
    /// Uses atomic write (write to temp, then rename) so an interrupted save
    /// never clobbers the previous file.
    pub fn save(&self, slot: &str, snapshot: &GardenSnapshot) -> SnapshotResult<()> {
        self.ensure_dir()?;

        let bytes = snapshot.to_bytes()?;
        let temp_path = self.temp_path(slot);
        let final_path = self.slot_path(slot);

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &final_path)?;

        info!(slot, bytes = bytes.len(), "snapshot saved");
        Ok(())
    }

    /// Loads a snapshot from a named slot.
    pub fn load(&self, slot: &str) -> SnapshotResult<GardenSnapshot> {
        let path = self.slot_path(slot);

        if !path.exists() {
            return Err(SnapshotError::NotFound(slot.to_string()));
        }

        let mut file = fs::File::open(&path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let snapshot = GardenSnapshot::from_bytes(&bytes);
        match &snapshot {
            Ok(_) => info!(slot, "snapshot loaded"),
            Err(e) => warn!(slot, error = %e, "snapshot load failed"),
        }
        snapshot
    }

    /// Checks if a slot exists.
    #[must_use]
    pub fn exists(&self, slot: &str) -> bool {
        self.slot_path(slot).exists()
    }

    /// Deletes a slot.
    pub fn delete(&self, slot: &str) -> SnapshotResult<()> {
        let path = self.slot_path(slot);

        if !path.exists() {
            return Err(SnapshotError::NotFound(slot.to_string()));
        }

        fs::remove_file(&path)?;
        info!(slot, "snapshot deleted");
        Ok(())
    }

    /// Lists all slots with metadata, newest first.
    pub fn list(&self) -> SnapshotResult<Vec<SlotMetadata>> {
        self.ensure_dir()?;

        let mut slots = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "vds") {
                continue;
            }
            let Some(slot) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            if let Ok(snapshot) = self.load(slot) {
                let file_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                slots.push(SlotMetadata {
                    slot: slot.to_string(),
                    timestamp: snapshot.timestamp,
                    level: snapshot.level,
                    coins: snapshot.coins,
                    file_size,
                });
            }
        }

        slots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(slots)
    }

    /// Copies an existing slot to a timestamped backup slot.
    pub fn backup(&self, slot: &str) -> SnapshotResult<String> {
        let backup_slot = format!("{slot}_backup_{}", current_timestamp());

        let snapshot = self.load(slot)?;
        self.save(&backup_slot, &snapshot)?;

        info!(from = slot, to = %backup_slot, "snapshot backed up");
        Ok(backup_slot)
    }
}

/// Returns current Unix timestamp.
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
