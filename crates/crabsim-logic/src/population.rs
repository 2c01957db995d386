//! Minimal population driver.
//!
//! Owns the entities and the run context and advances them in lock step.
//! Entities created during a tick (successors and spawned offspring) join
//! the population after every existing entity has stepped, so nothing
//! observes another entity's step in progress. Entities that die are held
//! only until the next tick; a driver that wants them drains them each tick.

use std::collections::BTreeMap;

use crate::context::{Calendar, LineageIds, SeededRandom, SequentialIds, StepContext};
use crate::entity::CohortEntity;
use crate::error::SimError;
use crate::field::{HydroField, Position};
use crate::registry::StageRegistry;
use crate::stages::StageType;
use crate::stepper;
use crate::transition;

/// What happened in one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    pub tick: u64,
    /// Seconds since the calendar epoch at the end of the tick.
    pub time: f64,
    pub stepped: usize,
    pub transitioned: usize,
    pub spawned: usize,
    pub died: usize,
    /// Entities alive at the end of the tick.
    pub alive: usize,
    /// (entity count, total abundance) per stage at the end of the tick.
    pub by_stage: BTreeMap<StageType, (usize, f64)>,
}

pub struct Population {
    registry: StageRegistry,
    entities: Vec<CohortEntity>,
    /// Removed by the most recent tick.
    retired: Vec<CohortEntity>,
    deaths: BTreeMap<&'static str, u64>,
    rng: SeededRandom,
    ids: SequentialIds,
    calendar: Calendar,
    time: f64,
    tick: u64,
}

impl Population {
    pub fn new(registry: StageRegistry, seed: u64, calendar: Calendar) -> Self {
        Self {
            registry,
            entities: Vec::new(),
            retired: Vec::new(),
            deaths: BTreeMap::new(),
            rng: SeededRandom::new(seed),
            ids: SequentialIds::starting_at(1),
            calendar,
            time: 0.0,
            tick: 0,
        }
    }

    /// Add a genesis cohort. Returns its id.
    pub fn seed(
        &mut self,
        stage: StageType,
        number: f64,
        position: Position,
        field: &dyn HydroField,
    ) -> Result<u64, SimError> {
        let bound = self.registry.get(stage)?;
        let id = self.ids.next_id();
        self.entities
            .push(CohortEntity::genesis(id, bound, number, position, field));
        Ok(id)
    }

    /// Step every active entity by `dt` seconds.
    pub fn tick(&mut self, dt: f64, field: &dyn HydroField) -> Result<TickSummary, SimError> {
        let mut summary = TickSummary {
            tick: self.tick,
            ..TickSummary::default()
        };
        let mut born = Vec::new();

        for entity in self.entities.iter_mut().filter(|e| e.is_active()) {
            let outcome = {
                let mut ctx =
                    StepContext::new(self.time, &mut self.rng, &self.calendar, &mut self.ids);
                stepper::step(entity, &self.registry, dt, field, &mut ctx)?
            };
            summary.stepped += 1;
            if outcome.transition_ready {
                let successors =
                    transition::pending_transitions(entity, &self.registry, &mut self.ids)?;
                summary.transitioned += successors.len();
                born.extend(successors);
            }
            let offspring = entity.pending_spawned();
            summary.spawned += offspring.len();
            born.extend(offspring);
        }

        let (alive, dead): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entities)
            .into_iter()
            .partition(CohortEntity::is_alive);
        for entity in &dead {
            if let Some(cause) = entity.death {
                *self.deaths.entry(cause.label()).or_default() += 1;
            }
        }
        summary.died = dead.len();
        self.retired = dead;
        self.entities = alive;
        self.entities.extend(born);

        self.time += dt;
        self.tick += 1;
        summary.time = self.time;
        summary.alive = self.entities.len();
        for entity in &self.entities {
            let slot = summary.by_stage.entry(entity.stage).or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 += entity.number;
        }

        log::info!(
            "tick {} day {:.2}: {} alive, {} stepped, {} transitions, {} spawned, {} died",
            summary.tick,
            self.calendar.day_of_year(self.time),
            summary.alive,
            summary.stepped,
            summary.transitioned,
            summary.spawned,
            summary.died
        );
        Ok(summary)
    }

    pub fn entities(&self) -> &[CohortEntity] {
        &self.entities
    }

    /// Entities removed by the most recent tick.
    pub fn retired(&self) -> &[CohortEntity] {
        &self.retired
    }

    /// Take the entities removed by the most recent tick.
    pub fn drain_retired(&mut self) -> Vec<CohortEntity> {
        std::mem::take(&mut self.retired)
    }

    /// Deaths so far, by cause label.
    pub fn deaths(&self) -> &BTreeMap<&'static str, u64> {
        &self.deaths
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Seconds since the calendar epoch.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }
}
