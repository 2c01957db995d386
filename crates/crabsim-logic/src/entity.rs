//! The cohort entity: one record for every life stage.
//!
//! An entity stands for one individual or, as a super-individual, for
//! `number` identical individuals. Which fields matter depends on its
//! [`StageType`]; the stage schema lists the ones it reports.

use serde::{Deserialize, Serialize};

use crate::field::{GridCell, GridPoint, HydroField, Position};
use crate::params::BoundStage;
use crate::spawning::SpawningState;
use crate::stages::StageType;

/// Why an entity stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    StageDurationExceeded,
    AbundanceFloor,
    DevelopmentCeiling,
    Starvation,
    WeightLoss,
    GridExit { cell: GridCell },
    /// Single individual converted into its successor.
    Transitioned,
}

impl DeathCause {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StageDurationExceeded => "stage_duration_exceeded",
            Self::AbundanceFloor => "abundance_floor",
            Self::DevelopmentCeiling => "development_ceiling",
            Self::Starvation => "starvation",
            Self::WeightLoss => "weight_loss",
            Self::GridExit { .. } => "grid_exit",
            Self::Transitioned => "transitioned",
        }
    }
}

/// One historical position, in both coordinate systems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub position: Position,
    pub grid: GridPoint,
}

/// Continuous stage state. Stages use the subset their schema lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageState {
    /// Embryonic stage index, eggs only.
    pub dev_stage: f64,
    /// Fraction of the current molt completed.
    pub molt_indicator: f64,
    /// Carapace width (mm).
    pub size: f64,
    /// Wet weight (g).
    pub weight: f64,
    pub peak_weight: f64,
    pub egg_diameter: f64,
    pub egg_density: f64,
    pub starvation_days: f64,
}

impl StageState {
    /// State at entry into `stage` from nothing.
    pub fn initial(stage: &BoundStage) -> Self {
        let weight = stage.weight_at(stage.initial_size);
        Self {
            dev_stage: 1.0,
            size: stage.initial_size,
            weight,
            peak_weight: weight,
            egg_diameter: stage.egg_diameter,
            egg_density: stage.egg_density,
            ..Self::default()
        }
    }
}

/// Environment sampled at the entity's position; a cache, refreshed every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub temperature: f64,
    pub salinity: f64,
    pub bottom_depth: f64,
    pub ph: Option<f64>,
}

impl Environment {
    pub fn sample(field: &dyn HydroField, position: &Position) -> Self {
        Self {
            temperature: field.temperature(position),
            salinity: field.salinity(position),
            bottom_depth: field.bathymetric_depth(position),
            ph: field.field("ph", position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortEntity {
    pub id: u64,
    pub parent_id: u64,
    pub orig_id: u64,
    pub stage: StageType,
    pub number: f64,
    pub num_trans: f64,
    pub super_individual: bool,
    /// Days since genesis.
    pub age: f64,
    /// Days since entering the current stage.
    pub age_in_stage: f64,
    pub position: Position,
    pub grid: GridPoint,
    /// Append-only position history.
    pub track: Vec<TrackPoint>,
    pub state: StageState,
    pub env: Environment,
    pub attached: bool,
    pub spawning: Option<SpawningState>,
    pub death: Option<DeathCause>,
    pub exit_cell: Option<GridCell>,
    alive: bool,
    active: bool,
    #[serde(skip)]
    pending_spawned: Vec<CohortEntity>,
}

impl CohortEntity {
    /// Fresh entity of `stage` at `position`, with unset lineage ids.
    ///
    /// Stage state starts from the stage's initial values and the
    /// environment is sampled immediately.
    pub fn new(
        stage: &BoundStage,
        number: f64,
        position: Position,
        field: &dyn HydroField,
    ) -> Self {
        let mut entity = Self {
            id: 0,
            parent_id: 0,
            orig_id: 0,
            stage: stage.stage,
            number,
            num_trans: 0.0,
            super_individual: stage.is_super_individual,
            age: 0.0,
            age_in_stage: 0.0,
            position,
            grid: GridPoint::default(),
            track: Vec::new(),
            state: StageState::initial(stage),
            env: Environment::default(),
            attached: false,
            spawning: stage.spawning.as_ref().map(|_| SpawningState::default()),
            death: None,
            exit_cell: None,
            alive: true,
            active: true,
            pending_spawned: Vec::new(),
        };
        entity.refresh(field);
        entity
    }

    /// Genesis entity: its own parent and lineage root.
    pub fn genesis(
        id: u64,
        stage: &BoundStage,
        number: f64,
        position: Position,
        field: &dyn HydroField,
    ) -> Self {
        let mut entity = Self::new(stage, number, position, field);
        entity.set_lineage(id, id, id);
        entity
    }

    pub fn set_lineage(&mut self, id: u64, parent_id: u64, orig_id: u64) {
        self.id = id;
        self.parent_id = parent_id;
        self.orig_id = orig_id;
    }

    /// Entity in `stage` continuing from `from`: same place, same track,
    /// age carried, stage clock reset. Lineage ids are copied and the
    /// caller overwrites them as the transition protocol requires.
    pub fn successor_of(from: &CohortEntity, stage: &BoundStage, number: f64) -> Self {
        let size = from.state.size.max(stage.initial_size);
        let weight = from.state.weight.max(stage.weight_at(size));
        Self {
            id: from.id,
            parent_id: from.parent_id,
            orig_id: from.orig_id,
            stage: stage.stage,
            number,
            num_trans: 0.0,
            super_individual: stage.is_super_individual,
            age: from.age,
            age_in_stage: 0.0,
            position: from.position,
            grid: from.grid,
            track: from.track.clone(),
            state: StageState {
                dev_stage: 1.0,
                molt_indicator: 0.0,
                size,
                weight,
                peak_weight: weight,
                egg_diameter: stage.egg_diameter,
                egg_density: stage.egg_density,
                starvation_days: 0.0,
            },
            env: from.env,
            attached: false,
            spawning: stage.spawning.as_ref().map(|_| SpawningState::default()),
            death: None,
            exit_cell: None,
            alive: true,
            active: true,
            pending_spawned: Vec::new(),
        }
    }

    /// Newborn released by `parent`: starts at age zero in `stage` with
    /// `number = 1` where the parent is.
    pub fn offspring_of(parent: &CohortEntity, stage: &BoundStage) -> Self {
        let mut child = Self::successor_of(parent, stage, 1.0);
        child.age = 0.0;
        child.state = StageState::initial(stage);
        child
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Terminal: the entity takes no further steps.
    pub fn kill(&mut self, cause: DeathCause) {
        log::debug!(
            "entity {} ({}) died: {} after {:.2} days in stage",
            self.id,
            self.stage,
            cause.label(),
            self.age_in_stage
        );
        if let DeathCause::GridExit { cell } = cause {
            self.exit_cell = Some(cell);
        }
        self.alive = false;
        self.active = false;
        self.death = Some(cause);
    }

    /// Take the offspring released since the last call.
    pub fn pending_spawned(&mut self) -> Vec<CohortEntity> {
        std::mem::take(&mut self.pending_spawned)
    }

    pub(crate) fn push_spawned(&mut self, offspring: CohortEntity) {
        self.pending_spawned.push(offspring);
    }

    /// Resample the environment and grid coordinates and append a track point.
    pub fn refresh(&mut self, field: &dyn HydroField) {
        self.env = Environment::sample(field, &self.position);
        self.grid = field.to_grid(&self.position);
        self.track.push(TrackPoint {
            position: self.position,
            grid: self.grid,
        });
    }

    pub fn cell(&self) -> GridCell {
        self.grid.cell()
    }
}
