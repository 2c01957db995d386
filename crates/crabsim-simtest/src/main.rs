//! CrabSim Headless Life-Cycle Harness
//!
//! Runs a scenario against the analytic shelf-sea field and validates the
//! life-stage engine end to end. Everything runs in-process.
//!
//! Usage:
//!   cargo run -p crabsim-simtest
//!   cargo run -p crabsim-simtest -- --verbose

use std::collections::{BTreeMap, BTreeSet};

use crabsim_logic::context::{Calendar, RandomSource, SequentialIds, SECONDS_PER_DAY};
use crabsim_logic::egg_development::EggDevelopment;
use crabsim_logic::field::{HydroField, Position, UniformField};
use crabsim_logic::hazard::competing_hazard;
use crabsim_logic::params::ParamValue;
use crabsim_logic::rates::FunctionCategory;
use crabsim_logic::stages::params as p;
use crabsim_logic::transition::pending_transitions;
use crabsim_logic::{
    CohortEntity, ConfigError, Population, StageParameters, StageRegistry, StageType,
};
use serde::Deserialize;

// ── Scenario ────────────────────────────────────────────────────────────
const SCENARIO_JSON: &str = include_str!("../../../data/scenario.json");

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    seed: u64,
    dt_hours: f64,
    days: u32,
    calendar: Calendar,
    #[serde(default)]
    current: Current,
    cohorts: Vec<CohortSpec>,
    #[serde(default)]
    overrides: Vec<StageOverride>,
}

#[derive(Debug, Default, Deserialize)]
struct Current {
    u: f64,
    v: f64,
}

#[derive(Debug, Deserialize)]
struct CohortSpec {
    stage: String,
    number: f64,
    lon: f64,
    lat: f64,
    depth: f64,
}

#[derive(Debug, Deserialize)]
struct StageOverride {
    stage: String,
    #[serde(default)]
    scalars: BTreeMap<String, ParamValue>,
    #[serde(default)]
    select: Vec<Selection>,
    #[serde(default)]
    parameters: Vec<FunctionParameter>,
}

#[derive(Debug, Deserialize)]
struct Selection {
    category: FunctionCategory,
    function: String,
}

#[derive(Debug, Deserialize)]
struct FunctionParameter {
    category: FunctionCategory,
    function: String,
    name: String,
    value: f64,
}

impl Scenario {
    fn registry(&self) -> Result<StageRegistry, ConfigError> {
        let mut registry = StageRegistry::with_defaults()?;
        for o in &self.overrides {
            let stage = StageType::from_name(&o.stage)?;
            let mut params = StageParameters::defaults(stage);
            for (name, value) in &o.scalars {
                params.set(name, *value);
            }
            for s in &o.select {
                params.select_function(s.category, &s.function)?;
            }
            for fp in &o.parameters {
                params.set_function_parameter(fp.category, &fp.function, &fp.name, fp.value)?;
            }
            registry.bind(&params)?;
        }
        Ok(registry)
    }

    fn field(&self) -> UniformField {
        UniformField::with_current(self.current.u, self.current.v)
    }
}

// ── Logging ─────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    init_logging(verbose);
    println!("=== CrabSim Life-Cycle Harness ===\n");

    let mut results = Vec::new();

    // 1. Scenario parse and stage binding
    let scenario = match validate_scenario(&mut results) {
        Some(s) => s,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Configuration rules
    results.extend(validate_configuration(verbose));

    // 3. Competing hazards
    results.extend(validate_hazards(verbose));

    // 4. Egg development timing
    results.extend(validate_egg_development(verbose));

    // 5. Transitions and lineage
    results.extend(validate_transitions(verbose));

    // 6. Full scenario run
    results.extend(validate_population_run(&scenario, verbose));

    if !report(&results, verbose) {
        std::process::exit(1);
    }
}

/// Print the summary. Returns true when everything passed.
fn report(results: &[TestResult], verbose: bool) -> bool {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );
    failed == 0
}

// ── 1. Scenario ─────────────────────────────────────────────────────────

fn validate_scenario(results: &mut Vec<TestResult>) -> Option<Scenario> {
    println!("--- Scenario ---");

    let scenario: Scenario = match serde_json::from_str(SCENARIO_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "scenario_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };
    results.push(TestResult {
        name: "scenario_parse".into(),
        passed: true,
        detail: format!(
            "'{}': {} cohorts, {} overrides",
            scenario.name,
            scenario.cohorts.len(),
            scenario.overrides.len()
        ),
    });

    let unknown: Vec<_> = scenario
        .cohorts
        .iter()
        .filter(|c| StageType::from_name(&c.stage).is_err())
        .map(|c| c.stage.clone())
        .collect();
    results.push(TestResult {
        name: "scenario_known_stages".into(),
        passed: unknown.is_empty(),
        detail: if unknown.is_empty() {
            "every cohort names a known stage".into()
        } else {
            format!("unknown stages: {:?}", unknown)
        },
    });

    match scenario.registry() {
        Ok(registry) => {
            results.push(TestResult {
                name: "scenario_binds".into(),
                passed: registry.len() == StageType::all().len(),
                detail: format!("{} stages bound", registry.len()),
            });
        }
        Err(e) => {
            results.push(TestResult {
                name: "scenario_binds".into(),
                passed: false,
                detail: e.to_string(),
            });
            return None;
        }
    }

    let field = scenario.field();
    let outside: Vec<_> = scenario
        .cohorts
        .iter()
        .filter(|c| {
            let pos = Position::new(c.lon, c.lat, c.depth);
            field.is_at_grid_edge(&pos, 0.5) || c.depth > field.bathymetric_depth(&pos)
        })
        .map(|c| format!("{}@({}, {})", c.stage, c.lon, c.lat))
        .collect();
    results.push(TestResult {
        name: "scenario_cohorts_in_domain".into(),
        passed: outside.is_empty(),
        detail: if outside.is_empty() {
            "all cohorts start inside the domain and above the bottom".into()
        } else {
            format!("outside: {:?}", outside)
        },
    });

    Some(scenario)
}

// ── 2. Configuration ────────────────────────────────────────────────────

fn validate_configuration(_verbose: bool) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    let failures: Vec<_> = StageType::all()
        .iter()
        .filter_map(|s| {
            StageParameters::defaults(*s)
                .bind()
                .err()
                .map(|e| e.to_string())
        })
        .collect();
    results.push(TestResult {
        name: "config_defaults_bind".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!("{} default parameter sets bind", StageType::all().len())
        } else {
            failures.join("; ")
        },
    });

    // Attached is not a pelagic larval behaviour
    let mut zoea = StageParameters::defaults(StageType::Zoea1);
    let rejected = zoea
        .select_function(FunctionCategory::VerticalMovement, "attached")
        .is_err();
    results.push(TestResult {
        name: "config_rejects_foreign_function".into(),
        passed: rejected,
        detail: "zoea cannot select an attached vertical behaviour".into(),
    });

    let mut copy = zoea.clone();
    copy.set_float(p::MAX_STAGE_DURATION, 1.0);
    let copy_ok = copy
        .select_function(FunctionCategory::Growth, "none")
        .is_ok();
    let independent = zoea.float(p::MAX_STAGE_DURATION) != copy.float(p::MAX_STAGE_DURATION)
        && zoea.selected(FunctionCategory::Growth).map(|f| f.name()) == Some("linear");
    results.push(TestResult {
        name: "config_clone_is_deep".into(),
        passed: copy_ok && independent,
        detail: "edits to a cloned parameter set leave the original alone".into(),
    });

    let mut female = StageParameters::defaults(StageType::MatureFemale);
    female.set_float(p::LENGTH_SPAWNING_SEASON, 0.0);
    results.push(TestResult {
        name: "config_rejects_empty_season".into(),
        passed: matches!(female.bind(), Err(ConfigError::InvalidParameter { .. })),
        detail: "a zero-length spawning season is invalid".into(),
    });

    results
}

// ── 3. Competing Hazards ────────────────────────────────────────────────

fn validate_hazards(verbose: bool) -> Vec<TestResult> {
    println!("--- Competing Hazards ---");
    let mut results = Vec::new();

    let (mu, sigma) = (0.04, 0.15);
    let horizon = 20.0 * SECONDS_PER_DAY;
    let (n_ref, t_ref) = competing_hazard(1.0e4, 0.0, mu, sigma, horizon);
    let mut worst = 0.0_f64;
    for steps in [1_u32, 4, 20, 80, 480] {
        let dt = horizon / f64::from(steps);
        let (mut n, mut t) = (1.0e4, 0.0);
        for _ in 0..steps {
            (n, t) = competing_hazard(n, t, mu, sigma, dt);
        }
        let err = (n - n_ref).abs().max((t - t_ref).abs());
        worst = worst.max(err);
        if verbose {
            println!("  {:4} steps: N={:.6} numTrans={:.6}", steps, n, t);
        }
    }
    results.push(TestResult {
        name: "hazard_step_size_invariant".into(),
        passed: worst < 1e-6,
        detail: format!("max deviation across step sizes {:.2e}", worst),
    });

    let mut violations = 0;
    for &mu in &[0.0, 0.001, 0.1, 2.0] {
        for &sigma in &[0.0, 0.01, 0.5, 5.0] {
            let (n, t) = competing_hazard(100.0, 3.0, mu, sigma, SECONDS_PER_DAY);
            if n > 100.0 || n < 0.0 || t < 0.0 {
                violations += 1;
            }
        }
    }
    results.push(TestResult {
        name: "hazard_monotone".into(),
        passed: violations == 0,
        detail: format!("{} bound violations over 16 rate pairs", violations),
    });

    let (n, t) = competing_hazard(100.0, 0.0, 0.0, 0.0, SECONDS_PER_DAY);
    results.push(TestResult {
        name: "hazard_zero_rates".into(),
        passed: n == 100.0 && t == 0.0,
        detail: "zero hazards leave abundance untouched".into(),
    });

    results
}

// ── 4. Egg Development ──────────────────────────────────────────────────

/// Random source for the deterministic development check.
struct NoNoise;

impl RandomSource for NoNoise {
    fn normal(&mut self) -> f64 {
        0.0
    }
    fn uniform(&mut self, lo: f64, _hi: f64) -> f64 {
        lo
    }
}

fn validate_egg_development(verbose: bool) -> Vec<TestResult> {
    println!("--- Egg Development ---");
    let mut results = Vec::new();
    let dev = EggDevelopment::default();

    let one_day = dev.advance(24.0, 1.0, 0.0, &mut NoNoise);
    results.push(TestResult {
        name: "egg_one_day_nominal".into(),
        passed: matches!(one_day, Ok(s) if (s - 3.1637).abs() < 1e-3),
        detail: format!("stage after one day at 3 °C: {:?}", one_day),
    });

    let mut s = 1.0;
    let mut days = 0;
    let mut error = None;
    while s < 18.5 && days < 365 {
        match dev.advance(24.0, s, 0.0, &mut NoNoise) {
            Ok(next) => s = next,
            Err(e) => {
                error = Some(e);
                break;
            }
        }
        days += 1;
    }
    if verbose {
        println!("  hatch after {} days (stage {:.3})", days, s);
    }
    results.push(TestResult {
        name: "egg_hatch_time".into(),
        passed: error.is_none() && (20..=60).contains(&days),
        detail: format!("{} daily steps to hatch at nominal temperature", days),
    });

    let below = EggDevelopment::stage_index(0.4).is_err();
    let above = EggDevelopment::stage_index(19.6).is_err();
    results.push(TestResult {
        name: "egg_stage_index_never_clamps".into(),
        passed: below && above,
        detail: "stages outside [0.5, 19.5) are domain errors".into(),
    });

    results
}

// ── 5. Transitions ──────────────────────────────────────────────────────

fn validate_transitions(_verbose: bool) -> Vec<TestResult> {
    println!("--- Transitions & Lineage ---");
    let mut results = Vec::new();
    let registry = match StageRegistry::with_defaults() {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult {
                name: "transition_registry".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let field = UniformField::default();
    let at = Position::new(-165.0, 58.0, 40.0);
    let mut ids = SequentialIds::starting_at(100);

    let make = |stage: StageType, number: f64| -> Result<CohortEntity, ConfigError> {
        let mut e = CohortEntity::genesis(1, registry.get(stage)?, number, at, &field);
        e.set_lineage(7, 6, 5);
        Ok(e)
    };

    // super-individual: split off num_trans, trigger stays
    let super_ok = make(StageType::Megalopa, 100.0).and_then(|mut e| {
        e.num_trans = 30.0;
        let next = pending_transitions(&mut e, &registry, &mut ids)?;
        Ok(next.len() == 1
            && next[0].number == 30.0
            && next[0].parent_id == 7
            && next[0].orig_id == 5
            && e.is_alive()
            && e.num_trans == 0.0)
    });
    results.push(TestResult {
        name: "transition_super_individual".into(),
        passed: super_ok == Ok(true),
        detail: format!("{:?}", super_ok),
    });

    // single individual: successor takes over the ids
    let single_ok = make(StageType::Egg, 1.0).and_then(|mut e| {
        let next = pending_transitions(&mut e, &registry, &mut ids)?;
        Ok(next.len() == 1
            && (next[0].id, next[0].parent_id, next[0].orig_id) == (7, 6, 5)
            && !e.is_alive())
    });
    results.push(TestResult {
        name: "transition_single_individual".into(),
        passed: single_ok == Ok(true),
        detail: format!("{:?}", single_ok),
    });

    // sex-ratio branch conserves abundance
    let branch = make(StageType::Juvenile, 500.0).and_then(|mut e| {
        e.num_trans = 50.0;
        let next = pending_transitions(&mut e, &registry, &mut ids)?;
        Ok(next.iter().map(|n| n.number).sum::<f64>())
    });
    results.push(TestResult {
        name: "transition_sex_branch_conserves".into(),
        passed: matches!(branch, Ok(total) if (total - 50.0).abs() < 1e-9),
        detail: format!("branch total {:?} of 50", branch),
    });

    results
}

// ── 6. Population Run ───────────────────────────────────────────────────

fn validate_population_run(scenario: &Scenario, verbose: bool) -> Vec<TestResult> {
    println!("--- Population Run ---");
    let mut results = Vec::new();

    let registry = match scenario.registry() {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult {
                name: "run_registry".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let field = scenario.field();
    let mut population = Population::new(registry, scenario.seed, scenario.calendar);

    let mut seeded = 0;
    for c in &scenario.cohorts {
        let placed = StageType::from_name(&c.stage).map_err(Into::into).and_then(|stage| {
            population.seed(stage, c.number, Position::new(c.lon, c.lat, c.depth), &field)
        });
        if let Err(e) = placed {
            results.push(TestResult {
                name: "run_seed".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
        seeded += 1;
    }

    let dt = scenario.dt_hours * 3600.0;
    let ticks = (f64::from(scenario.days) * 24.0 / scenario.dt_hours).round() as u64;
    let mut totals = (0_usize, 0_usize, 0_usize);
    let mut retired = (0_usize, 0_usize);
    let mut stages_seen = BTreeSet::new();
    let mut bad_state = Vec::new();
    let mut run_error = None;

    for _ in 0..ticks {
        let summary = match population.tick(dt, &field) {
            Ok(s) => s,
            Err(e) => {
                run_error = Some(e);
                break;
            }
        };
        totals.0 += summary.transitioned;
        totals.1 += summary.spawned;
        totals.2 += summary.died;
        stages_seen.extend(summary.by_stage.keys().copied());

        for e in population.drain_retired() {
            retired.0 += 1;
            if e.is_alive() || e.death.is_none() {
                retired.1 += 1;
            }
        }

        for e in population.entities() {
            let bottom = field.bathymetric_depth(&e.position);
            let finite = e.number.is_finite() && e.num_trans.is_finite() && e.state.size.is_finite();
            let in_column = e.position.depth >= 0.0 && e.position.depth <= bottom + 1e-9;
            if !finite || !in_column || e.number < 0.0 || e.num_trans < 0.0 {
                bad_state.push(e.id);
            }
        }
        if verbose && summary.tick % 40 == 0 {
            let row: Vec<_> = summary
                .by_stage
                .iter()
                .map(|(s, (count, n))| format!("{}={}/{:.0}", s, count, n))
                .collect();
            println!(
                "  day {:6.1}: {}",
                population.calendar().day_of_year(summary.time),
                row.join(" ")
            );
        }
    }

    results.push(TestResult {
        name: "run_completes".into(),
        passed: run_error.is_none() && population.ticks() == ticks,
        detail: match &run_error {
            None => format!("{} ticks of {:.1} h from {} cohorts", ticks, scenario.dt_hours, seeded),
            Some(e) => format!("aborted at tick {}: {}", population.ticks(), e),
        },
    });

    bad_state.sort_unstable();
    bad_state.dedup();
    results.push(TestResult {
        name: "run_state_valid".into(),
        passed: bad_state.is_empty(),
        detail: format!("{} entities with invalid abundance or depth", bad_state.len()),
    });

    results.push(TestResult {
        name: "run_spawning".into(),
        passed: totals.1 > 0,
        detail: format!("{} eggs spawned", totals.1),
    });

    results.push(TestResult {
        name: "run_hatching".into(),
        passed: population.deaths().get("transitioned").copied().unwrap_or(0) > 0,
        detail: format!(
            "{} single-individual transitions, {} successors total",
            population.deaths().get("transitioned").copied().unwrap_or(0),
            totals.0
        ),
    });

    results.push(TestResult {
        name: "run_stage_coverage".into(),
        passed: stages_seen.contains(&StageType::Egg)
            && stages_seen.contains(&StageType::Zoea2)
            && stages_seen.contains(&StageType::Juvenile),
        detail: format!("{} stages present during the run", stages_seen.len()),
    });

    results.push(TestResult {
        name: "run_retired_drained".into(),
        passed: retired.0 == totals.2 && retired.1 == 0,
        detail: format!(
            "{} retired of {} deaths, {} without a cause",
            retired.0, totals.2, retired.1
        ),
    });

    let mut ids = BTreeSet::new();
    let duplicates = population
        .entities()
        .iter()
        .filter(|e| !ids.insert(e.id))
        .count();
    results.push(TestResult {
        name: "run_unique_ids".into(),
        passed: duplicates == 0,
        detail: format!("{} live entities, {} duplicate ids", ids.len(), duplicates),
    });

    let misaligned = population
        .entities()
        .iter()
        .filter(|e| e.report_header().len() != e.report_values().len())
        .count();
    results.push(TestResult {
        name: "run_report_alignment".into(),
        passed: misaligned == 0,
        detail: "report header and values line up for every entity".into(),
    });

    if verbose {
        println!("  deaths by cause:");
        for (cause, count) in population.deaths() {
            println!("    {:24} {}", cause, count);
        }
    }

    results
}
