//! Integration tests for the life-stage engine.
//!
//! Exercises: StageParameters → StageRegistry → CohortEntity → step
//! → pending_transitions / pending_spawned → Population
//!
//! All tests are pure logic against the analytic field.

use crabsim_logic::context::{
    Calendar, RandomSource, SeededRandom, SequentialIds, StepContext, SECONDS_PER_DAY,
};
use crabsim_logic::egg_development::EggDevelopment;
use crabsim_logic::entity::DeathCause;
use crabsim_logic::error::{ConfigError, DomainError};
use crabsim_logic::field::{HydroField, Position, UniformField, Velocity};
use crabsim_logic::hazard::competing_hazard;
use crabsim_logic::params::ParamValue;
use crabsim_logic::rates::{FunctionCategory, FunctionKind, RateFunction};
use crabsim_logic::stages::params as p;
use crabsim_logic::tracker::{track, TrackRequest};
use crabsim_logic::stepper;
use crabsim_logic::transition::pending_transitions;
use crabsim_logic::vertical::VerticalMovement;
use crabsim_logic::{CohortEntity, Population, StageParameters, StageRegistry, StageType};

// ── Helpers ────────────────────────────────────────────────────────────

/// Random source that counts draws and always returns the midpoint.
#[derive(Default)]
struct CountingRandom {
    draws: usize,
}

impl RandomSource for CountingRandom {
    fn normal(&mut self) -> f64 {
        self.draws += 1;
        0.0
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        self.draws += 1;
        0.5 * (lo + hi)
    }
}

fn start() -> Position {
    Position::new(-165.0, 58.0, 20.0)
}

fn genesis(registry: &StageRegistry, stage: StageType, number: f64) -> CohortEntity {
    CohortEntity::genesis(
        10,
        registry.get(stage).unwrap(),
        number,
        start(),
        &UniformField::default(),
    )
}

// ── Competing hazards ──────────────────────────────────────────────────

#[test]
fn hazard_never_increases_number_or_negates_num_trans() {
    for &mu in &[0.0, 0.01, 0.5, 3.0] {
        for &sigma in &[0.0, 0.05, 1.0, 10.0] {
            for &dt in &[1.0, 3600.0, SECONDS_PER_DAY, 30.0 * SECONDS_PER_DAY] {
                let (n, t) = competing_hazard(250.0, 4.0, mu, sigma, dt);
                assert!((0.0..=250.0).contains(&n), "mu={mu} sigma={sigma} dt={dt}: n={n}");
                assert!(t >= 0.0, "mu={mu} sigma={sigma} dt={dt}: t={t}");
            }
        }
    }
}

#[test]
fn hazard_is_step_size_invariant() {
    let (mu, sigma) = (0.07, 0.3);
    let total = 5.0 * SECONDS_PER_DAY;
    let (n_one, t_one) = competing_hazard(1000.0, 0.0, mu, sigma, total);

    for sub_steps in [2, 10, 240] {
        let dt = total / sub_steps as f64;
        let (mut n, mut t) = (1000.0, 0.0);
        for _ in 0..sub_steps {
            let next = competing_hazard(n, t, mu, sigma, dt);
            n = next.0;
            t = next.1;
        }
        assert!((n - n_one).abs() < 1e-9, "{sub_steps} sub-steps: n={n} vs {n_one}");
        assert!((t - t_one).abs() < 1e-9, "{sub_steps} sub-steps: t={t} vs {t_one}");
        assert!(((n + t) - (n_one + t_one)).abs() < 1e-9);
    }
}

// ── Transitions ────────────────────────────────────────────────────────

#[test]
fn single_individual_transition_keeps_lineage_and_kills_trigger() {
    let registry = StageRegistry::with_defaults().unwrap();
    let mut ids = SequentialIds::starting_at(1000);
    let mut egg = genesis(&registry, StageType::Egg, 1.0);
    egg.set_lineage(10, 9, 3);
    let before = (egg.id, egg.parent_id, egg.orig_id);

    let successors = pending_transitions(&mut egg, &registry, &mut ids).unwrap();

    assert_eq!(successors.len(), 1);
    let zoea = &successors[0];
    assert_eq!((zoea.id, zoea.parent_id, zoea.orig_id), before);
    assert!(!egg.is_alive());
    assert!(!egg.is_active());
    assert_eq!(egg.death, Some(DeathCause::Transitioned));
}

/// Molted single-individual megalopa, past its minimum stage duration, stepped
/// once for an hour over `field`. Returns whether it is ready to settle.
fn molted_megalopa_settles(field: &UniformField, depth: f64) -> (bool, Option<StageType>) {
    let mut params = StageParameters::defaults(StageType::Megalopa);
    params.set_flag(p::IS_SUPER_INDIVIDUAL, false);
    params
        .select_function(FunctionCategory::VerticalMovement, "passive")
        .unwrap();
    params
        .select_function(FunctionCategory::HorizontalMovement, "none")
        .unwrap();
    let mut registry = StageRegistry::with_defaults().unwrap();
    registry.bind(&params).unwrap();

    let position = Position::new(-165.0, 58.0, depth);
    let bound = registry.get(StageType::Megalopa).unwrap();
    let mut e = CohortEntity::genesis(10, bound, 1.0, position, field);
    e.age_in_stage = 20.0;
    e.state.molt_indicator = 1.0;

    let calendar = Calendar::new(2001, 200.0);
    let mut ids = SequentialIds::starting_at(100);
    let mut rng = CountingRandom::default();
    let mut ctx = StepContext::new(0.0, &mut rng, &calendar, &mut ids);
    let out = e.step(&registry, 3600.0, field, &mut ctx).unwrap();
    assert!(e.is_alive());
    assert_eq!(
        out.transition_ready,
        stepper::is_transition_ready(&e, bound)
    );

    let settled = if out.transition_ready {
        let successors = pending_transitions(&mut e, &registry, &mut ids).unwrap();
        successors.first().map(|s| s.stage)
    } else {
        None
    };
    (out.transition_ready, settled)
}

#[test]
fn megalopa_settles_only_over_settlement_depths() {
    // settlement window is 20..=200 m of bottom depth
    let shelf = UniformField::default();
    assert_eq!(shelf.bathymetric_depth(&Position::new(-165.0, 58.0, 0.0)), 95.0);
    assert_eq!(
        molted_megalopa_settles(&shelf, 20.0),
        (true, Some(StageType::Juvenile))
    );

    let deep = UniformField {
        shelf_depth: 300.0,
        ..UniformField::default()
    };
    assert!(deep.bathymetric_depth(&Position::new(-165.0, 58.0, 0.0)) > 200.0);
    assert_eq!(molted_megalopa_settles(&deep, 20.0), (false, None));

    let shallow = UniformField {
        shelf_depth: 10.0,
        depth_slope: 0.0,
        ..UniformField::default()
    };
    assert_eq!(molted_megalopa_settles(&shallow, 5.0), (false, None));
}

#[test]
fn super_individual_transition_keeps_trigger_alive() {
    let registry = StageRegistry::with_defaults().unwrap();
    let mut ids = SequentialIds::starting_at(1000);
    let mut megalopa = genesis(&registry, StageType::Megalopa, 500.0);
    megalopa.set_lineage(10, 9, 3);
    megalopa.num_trans = 40.0;

    let successors = pending_transitions(&mut megalopa, &registry, &mut ids).unwrap();

    assert_eq!(successors.len(), 1);
    let juvenile = &successors[0];
    assert_eq!(juvenile.stage, StageType::Juvenile);
    assert_eq!(juvenile.parent_id, 10);
    assert_eq!(juvenile.orig_id, 3);
    assert_eq!(juvenile.id, 1000);
    assert_eq!(juvenile.number, 40.0);
    assert!(megalopa.is_alive());
    assert_eq!(megalopa.num_trans, 0.0);
}

#[test]
fn sex_ratio_branch_splits_abundance() {
    let mut params = StageParameters::defaults(StageType::Juvenile);
    params.set_float(p::SEX_RATIO, 0.35);
    let mut registry = StageRegistry::with_defaults().unwrap();
    registry.bind(&params).unwrap();
    let mut ids = SequentialIds::starting_at(1000);
    let mut juvenile = genesis(&registry, StageType::Juvenile, 900.0);
    juvenile.num_trans = 80.0;

    let successors = pending_transitions(&mut juvenile, &registry, &mut ids).unwrap();

    assert_eq!(successors.len(), 2);
    let female = successors
        .iter()
        .find(|e| e.stage == StageType::ImmatureFemale)
        .unwrap();
    let male = successors
        .iter()
        .find(|e| e.stage == StageType::ImmatureMale)
        .unwrap();
    assert!((female.number - 0.65 * 80.0).abs() < 1e-12);
    assert!((male.number - 0.35 * 80.0).abs() < 1e-12);
    assert!((female.number + male.number - 80.0).abs() < 1e-12);
    assert_ne!(female.id, male.id);
}

// ── Egg development ────────────────────────────────────────────────────

#[test]
fn egg_development_one_day_without_noise_draws_nothing() {
    let dev = EggDevelopment::default();
    let mut rng = CountingRandom::default();
    let s = dev.advance(24.0, 1.0, 3.0, &mut rng).unwrap();
    let rate = (-3.052159_f64 + 0.2153114 * 3.0).exp();
    assert!((s - (1.0 + 24.0 * rate)).abs() < 1e-12);
    assert!((s - 3.1637).abs() < 1e-3);
    assert_eq!(rng.draws, 0);
}

#[test]
fn egg_development_with_noise_draws_once() {
    let dev = EggDevelopment {
        sigma: 0.3,
        ..EggDevelopment::default()
    };
    let mut rng = CountingRandom::default();
    dev.advance(24.0, 1.0, 3.0, &mut rng).unwrap();
    assert_eq!(rng.draws, 1);
}

#[test]
fn stage_bin_lookup_never_clamps() {
    assert!(matches!(
        EggDevelopment::stage_index(0.3),
        Err(DomainError::StageIndexOutOfRange { index: -1, .. })
    ));
    assert!(matches!(
        EggDevelopment::stage_index(19.5),
        Err(DomainError::StageIndexOutOfRange { index: 19, .. })
    ));
    assert_eq!(EggDevelopment::stage_index(18.6).unwrap(), 18);
}

#[test]
fn egg_stepped_for_one_day_matches_table() {
    let registry = StageRegistry::with_defaults().unwrap();
    let field = UniformField::default();
    let calendar = Calendar::default();
    let mut ids = SequentialIds::default();
    let mut rng = CountingRandom::default();
    let mut egg = genesis(&registry, StageType::Egg, 1.0);
    let mut ctx = StepContext::new(0.0, &mut rng, &calendar, &mut ids);
    egg.step(&registry, SECONDS_PER_DAY, &field, &mut ctx).unwrap();
    assert!((egg.state.dev_stage - 3.1637).abs() < 1e-3);
    assert_eq!(rng.draws, 0);
}

// ── Tracking ───────────────────────────────────────────────────────────

#[test]
fn predictor_corrector_with_zero_velocity_is_a_no_op() {
    let field = UniformField::default();
    for vertical in [
        VerticalMovement::Passive,
        VerticalMovement::FixedDepthRange {
            min_depth: 0.0,
            max_depth: 50.0,
            speed: 0.01,
        },
    ] {
        let step = track(
            &field,
            &TrackRequest {
                position: start(),
                time: 0.0,
                dt: 3600.0,
                day_of_year: 200.0,
                vertical: &vertical,
                swim: (0.0, 0.0),
            },
        );
        assert_eq!(step.position, start());
        assert_eq!(step.current, Velocity::default());
        assert_eq!(step.next, Velocity::default());
    }
}

#[test]
fn corrector_resamples_vertical_velocity_at_predicted_depth() {
    // rise from 50 m toward a 40 m ceiling at up to 8 mm/s over 1000 s
    let field = UniformField::default();
    let vertical = VerticalMovement::FixedDepthRange {
        min_depth: 0.0,
        max_depth: 40.0,
        speed: 0.008,
    };
    let position = Position::new(-165.0, 58.0, 50.0);
    let step = track(
        &field,
        &TrackRequest {
            position,
            time: 0.0,
            dt: 1000.0,
            day_of_year: 200.0,
            vertical: &vertical,
            swim: (0.0, 0.0),
        },
    );

    // full speed at the start; only 2 m left at the predicted 42 m
    assert!((step.current.w - 0.008).abs() < 1e-12);
    assert!((step.next.w - 0.002).abs() < 1e-12);
    // mean velocity over the step: 5 mm/s for 1000 s
    assert!((step.position.depth - 45.0).abs() < 1e-9, "depth={}", step.position.depth);
    assert_eq!((step.position.lon, step.position.lat), (position.lon, position.lat));
    assert!(!step.attached);
}

// ── Configuration ──────────────────────────────────────────────────────

#[test]
fn unsupported_selection_is_fatal_at_bind() {
    let mut params = StageParameters::defaults(StageType::Zoea1);
    params.add_catalog(
        FunctionCategory::Growth,
        vec![RateFunction::Growth(
            crabsim_logic::rates::GrowthFunction::Bioenergetic {
                consumption: 0.1,
                respiration_base: 0.01,
                respiration_coefficient: 0.05,
            },
        )],
    );
    let mut registry = StageRegistry::with_defaults().unwrap();
    let err = registry.bind(&params).unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnsupportedFunction {
            stage: StageType::Zoea1,
            category: FunctionCategory::Growth,
            function: FunctionKind::Bioenergetic,
        }
    );
}

#[test]
fn parameter_clone_is_independent() {
    let mut original = StageParameters::defaults(StageType::Megalopa);
    original
        .select_function(FunctionCategory::VerticalMovement, "off bottom")
        .unwrap();
    let mut copy = original.clone();

    copy.set(p::MAX_SETTLEMENT_DEPTH, ParamValue::Float(500.0));
    copy.set_function_parameter(FunctionCategory::VerticalMovement, "off bottom", "distance", 9.0)
        .unwrap();
    copy.select_function(FunctionCategory::VerticalMovement, "passive")
        .unwrap();

    assert_eq!(original.float(p::MAX_SETTLEMENT_DEPTH).unwrap(), 200.0);
    assert_eq!(
        original
            .selected(FunctionCategory::VerticalMovement)
            .unwrap()
            .name(),
        "off bottom"
    );
    assert_eq!(
        original
            .selected(FunctionCategory::VerticalMovement)
            .unwrap()
            .parameters(),
        vec![("distance", 2.0), ("speed", 0.004)]
    );
}

// ── Population ─────────────────────────────────────────────────────────

#[test]
fn spawned_eggs_hatch_into_zoea() {
    let field = UniformField::default();
    let mut female = StageParameters::defaults(StageType::MatureFemale);
    female
        .select_function(FunctionCategory::HorizontalMovement, "none")
        .unwrap();
    let mut registry = StageRegistry::with_defaults().unwrap();
    registry.bind(&female).unwrap();
    // season opens on day 60, first batch 10 days later
    let mut population = Population::new(registry, 7, Calendar::new(2001, 50.0));
    let mother = population
        .seed(StageType::MatureFemale, 1.0, start(), &field)
        .unwrap();

    let mut spawned = 0;
    let mut hatched_on = None;
    for day in 0..120 {
        spawned += population.tick(SECONDS_PER_DAY, &field).unwrap().spawned;
        if population.entities().iter().any(|e| e.stage == StageType::Zoea1) {
            hatched_on = Some(day);
            break;
        }
    }

    assert!(spawned > 0, "no eggs were spawned");
    let day = hatched_on.expect("no eggs hatched");
    assert!(day > 40, "hatched too early: day {day}");
    let zoea: Vec<_> = population
        .entities()
        .iter()
        .filter(|e| e.stage == StageType::Zoea1)
        .collect();
    for z in &zoea {
        // hatching keeps the egg's lineage; eggs are parented to the spawner
        assert_eq!(z.parent_id, mother);
        assert_eq!(z.id, z.orig_id);
        assert_ne!(z.orig_id, mother);
    }
    assert_eq!(population.deaths().get("transitioned").copied(), Some(zoea.len() as u64));
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = |seed: u64| {
        let registry = StageRegistry::with_defaults().unwrap();
        let field = UniformField::with_current(0.01, 0.0);
        let mut population = Population::new(registry, seed, Calendar::new(2001, 120.0));
        population
            .seed(StageType::Zoea1, 1000.0, start(), &field)
            .unwrap();
        for _ in 0..20 {
            population.tick(SECONDS_PER_DAY / 4.0, &field).unwrap();
        }
        population
            .entities()
            .iter()
            .map(|e| (e.id, e.position.lon, e.position.lat, e.number))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(5), run(5));
    assert_ne!(run(5), run(6));
}

#[test]
fn independent_entity_streams_are_reproducible() {
    let mut a = SeededRandom::for_entity(99, 17);
    let mut b = SeededRandom::for_entity(99, 17);
    assert_eq!(a.normal(), b.normal());
}
