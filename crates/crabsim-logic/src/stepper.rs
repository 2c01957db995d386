//! Per-timestep update of one cohort entity.
//!
//! Order within a step:
//!
//! 1. age bookkeeping and the maximum stage duration
//! 2. competing-hazard abundance update and the abundance floor
//! 3. development and growth, with their ceilings
//! 4. advection through the particle tracker
//! 5. environment sampling at the new position
//! 6. grid edge check
//! 7. seasonal spawning (stages that spawn)
//!
//! Each terminal condition stops the step where it fires. Transition
//! readiness is evaluated afterwards as a pure predicate.

use crate::context::{days_in_year, StepContext, SECONDS_PER_DAY};
use crate::entity::{CohortEntity, DeathCause};
use crate::error::{DomainError, SimError};
use crate::field::HydroField;
use crate::hazard::{competing_hazard, settle_floor, ABUNDANCE_FLOOR};
use crate::params::BoundStage;
use crate::rates::{DevelopmentFunction, RateInputs};
use crate::registry::StageRegistry;
use crate::tracker::{track, TrackRequest};
use crate::transition;

/// Grid cells from the open boundary at which an entity leaves the domain.
pub const GRID_EDGE_TOLERANCE: f64 = 0.5;

/// What the driver needs to know after a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub transition_ready: bool,
    /// Offspring released this step (waiting in `pending_spawned`).
    pub spawned: usize,
}

fn finite(field: &'static str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NonFiniteState { field, value })
    }
}

fn rate_inputs(entity: &CohortEntity) -> RateInputs {
    RateInputs {
        temperature: entity.env.temperature,
        size: entity.state.size,
        weight: entity.state.weight,
        dev_stage: entity.state.dev_stage,
        depth: entity.position.depth,
        bottom_depth: entity.env.bottom_depth,
    }
}

/// Stage-transition rate (per day) acting on a super-individual this step.
fn transition_rate(entity: &CohortEntity, stage: &BoundStage) -> f64 {
    let has_successor = !entity.stage.schema().successors.is_empty();
    if entity.super_individual && has_successor && entity.age_in_stage >= stage.min_stage_duration {
        stage.stage_transition_rate
    } else {
        0.0
    }
}

/// Advance `entity` by `dt` seconds.
///
/// Inactive entities are left untouched. Domain errors abort the step; grid
/// exit and the abundance floor are terminal states recorded on the entity.
pub fn step(
    entity: &mut CohortEntity,
    registry: &StageRegistry,
    dt: f64,
    field: &dyn HydroField,
    ctx: &mut StepContext<'_>,
) -> Result<StepOutcome, SimError> {
    if !entity.is_active() {
        return Ok(StepOutcome::default());
    }
    let stage = registry.get(entity.stage)?;
    let dt_days = dt / SECONDS_PER_DAY;
    let day = finite("day_of_year", ctx.day_of_year())?;

    // 1. age
    entity.age += dt_days;
    entity.age_in_stage += dt_days;
    if entity.age_in_stage > stage.max_stage_duration {
        entity.kill(DeathCause::StageDurationExceeded);
        return Ok(StepOutcome::default());
    }

    // 2. abundance
    let inputs = rate_inputs(entity);
    let mu = stage.mortality.rate(&inputs)?;
    let sigma = transition_rate(entity, stage);
    let (number, num_trans) = competing_hazard(entity.number, entity.num_trans, mu, sigma, dt);
    entity.number = finite("number", number)?;
    entity.num_trans = finite("num_trans", num_trans)?;
    if entity.number < ABUNDANCE_FLOOR {
        let (number, num_trans) = settle_floor(entity.number, entity.num_trans, stage.floor_policy);
        entity.number = number;
        entity.num_trans = num_trans;
        entity.kill(DeathCause::AbundanceFloor);
        return Ok(StepOutcome::default());
    }

    // 3. development and growth
    match &stage.development {
        DevelopmentFunction::EggTemperature(egg) => {
            let dev = egg.advance(dt_days * 24.0, entity.state.dev_stage, inputs.temperature, ctx.rng)?;
            entity.state.dev_stage = finite("dev_stage", dev)?;
            if entity.state.dev_stage > stage.max_dev_stage {
                entity.kill(DeathCause::DevelopmentCeiling);
                return Ok(StepOutcome::default());
            }
        }
        DevelopmentFunction::MoltDuration { .. } => {
            if let Some(duration) = stage.development.stage_duration(inputs.temperature) {
                if duration > 0.0 && duration.is_finite() {
                    entity.state.molt_indicator += dt_days / duration;
                }
            }
        }
        DevelopmentFunction::None => {}
    }

    let growth = stage.growth.advance(&inputs, dt_days, stage.length_weight);
    entity.state.size = finite("size", growth.size)?;
    entity.state.weight = finite("weight", growth.weight)?;
    entity.state.peak_weight = entity.state.peak_weight.max(entity.state.weight);
    if growth.net_balance < 0.0 {
        entity.state.starvation_days += dt_days;
    } else {
        entity.state.starvation_days = 0.0;
    }
    if entity.state.starvation_days > stage.max_starvation_days {
        entity.kill(DeathCause::Starvation);
        return Ok(StepOutcome::default());
    }
    if entity.state.peak_weight > 0.0
        && entity.state.weight < (1.0 - stage.max_weight_loss) * entity.state.peak_weight
    {
        entity.kill(DeathCause::WeightLoss);
        return Ok(StepOutcome::default());
    }

    // 4. advection
    let swim = if stage.vertical.pins_to_bottom() {
        (0.0, 0.0)
    } else {
        stage.horizontal.velocity(dt, ctx.rng)
    };
    let moved = track(
        field,
        &TrackRequest {
            position: entity.position,
            time: ctx.time,
            dt,
            day_of_year: day,
            vertical: &stage.vertical,
            swim,
        },
    );
    finite("lon", moved.position.lon)?;
    finite("lat", moved.position.lat)?;
    finite("depth", moved.position.depth)?;
    entity.position = moved.position;
    entity.attached = moved.attached;

    // 5. environment
    entity.refresh(field);

    // 6. boundary
    if field.is_at_grid_edge(&entity.position, GRID_EDGE_TOLERANCE) {
        let cell = entity.cell();
        entity.kill(DeathCause::GridExit { cell });
        return Ok(StepOutcome::default());
    }

    // 7. spawning
    let year_length = days_in_year(ctx.calendar.year(ctx.time));
    let batch_due = match (stage.spawning.as_ref(), entity.spawning.as_mut()) {
        (Some(params), Some(state)) => state.advance(params, day, year_length, dt_days, ctx.rng),
        _ => false,
    };
    let spawned = if batch_due {
        transition::spawn_batch(entity, registry, ctx.ids)?
    } else {
        0
    };

    Ok(StepOutcome {
        transition_ready: is_transition_ready(entity, stage),
        spawned,
    })
}

/// Whether `entity` has a transition to hand to the lineage manager.
///
/// Super-individuals are ready whenever abundance has been committed to
/// transition. Single individuals are ready once the stage's trigger holds
/// and the minimum stage duration has passed.
pub fn is_transition_ready(entity: &CohortEntity, stage: &BoundStage) -> bool {
    use crate::stages::TransitionTrigger as T;

    if !entity.is_alive() || entity.stage.schema().successors.is_empty() {
        return false;
    }
    if entity.super_individual {
        return entity.num_trans > 0.0;
    }
    if entity.age_in_stage < stage.min_stage_duration {
        return false;
    }
    let s = &entity.state;
    match stage.trigger {
        T::Never => false,
        T::Hatch => s.dev_stage >= stage.hatch_stage,
        T::Molt => s.molt_indicator >= stage.molt_threshold,
        T::Settlement => {
            let (lo, hi) = stage.settlement_depth;
            s.molt_indicator >= stage.molt_threshold
                && (lo..=hi).contains(&entity.env.bottom_depth)
        }
        T::SizeAtImmature => s.size >= stage.size_at_immature,
        T::SizeAtMaturity => s.size >= stage.size_at_maturity,
    }
}

impl CohortEntity {
    /// Advance this entity by `dt` seconds; see [`step`].
    pub fn step(
        &mut self,
        registry: &StageRegistry,
        dt: f64,
        field: &dyn HydroField,
        ctx: &mut StepContext<'_>,
    ) -> Result<StepOutcome, SimError> {
        step(self, registry, dt, field, ctx)
    }
}
