//! Stage parameter sets: scalar parameters plus one selected rate function
//! per category, and binding to the typed [`BoundStage`] the stepper reads.
//!
//! Parameter sets are plain values: `clone()` is a deep copy of every scalar
//! and every catalog entry, and keeps the current selections.

use serde::{Deserialize, Serialize};

use crate::egg_development::EggDevelopment;
use crate::error::ConfigError;
use crate::rates::{
    DevelopmentFunction, FecundityFunction, FunctionCategory, GrowthFunction, HorizontalMovement,
    MortalityFunction, RateFunction,
};
use crate::spawning::SpawningParams;
use crate::stages::{params as p, FloorPolicy, ParamKind, StageType, TransitionTrigger};
use crate::vertical::VerticalMovement;

/// A typed scalar parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Float(f64),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Bool(_) => ParamKind::Bool,
            Self::Float(_) => ParamKind::Float,
        }
    }
}

/// The selectable rate functions for one category and which one is in use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSlot {
    pub category: FunctionCategory,
    selected: usize,
    catalog: Vec<RateFunction>,
}

impl FunctionSlot {
    /// Slot with `catalog[0]` selected. All entries must belong to `category`.
    pub fn new(category: FunctionCategory, catalog: Vec<RateFunction>) -> Self {
        debug_assert!(catalog.iter().all(|f| f.category() == category));
        Self {
            category,
            selected: 0,
            catalog,
        }
    }

    pub fn selected(&self) -> Option<&RateFunction> {
        self.catalog.get(self.selected)
    }

    pub fn catalog(&self) -> &[RateFunction] {
        &self.catalog
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.catalog.iter().position(|f| f.name() == name)
    }

    pub fn select(&mut self, name: &str) -> bool {
        match self.find(name) {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut RateFunction> {
        let i = self.find(name)?;
        self.catalog.get_mut(i)
    }
}

/// Configuration for one stage type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageParameters {
    pub stage: StageType,
    scalars: Vec<(String, ParamValue)>,
    functions: Vec<FunctionSlot>,
}

impl StageParameters {
    /// Empty parameter set; mostly useful for building a configuration by hand.
    pub fn empty(stage: StageType) -> Self {
        Self {
            stage,
            scalars: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn scalar(&self, name: &str) -> Option<ParamValue> {
        self.scalars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Ordered scalar parameters.
    pub fn scalars(&self) -> &[(String, ParamValue)] {
        &self.scalars
    }

    pub fn float(&self, name: &str) -> Result<f64, ConfigError> {
        match self.scalar(name) {
            Some(ParamValue::Float(v)) => Ok(v),
            Some(ParamValue::Bool(_)) => Err(ConfigError::ParameterType {
                stage: self.stage,
                name: name.to_string(),
                expected: "float",
            }),
            None => Err(self.missing(name)),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool, ConfigError> {
        match self.scalar(name) {
            Some(ParamValue::Bool(v)) => Ok(v),
            Some(ParamValue::Float(_)) => Err(ConfigError::ParameterType {
                stage: self.stage,
                name: name.to_string(),
                expected: "bool",
            }),
            None => Err(self.missing(name)),
        }
    }

    /// Insert or replace a scalar parameter.
    pub fn set(&mut self, name: &str, value: ParamValue) {
        match self.scalars.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.scalars.push((name.to_string(), value)),
        }
    }

    pub fn set_float(&mut self, name: &str, value: f64) {
        self.set(name, ParamValue::Float(value));
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.set(name, ParamValue::Bool(value));
    }

    pub fn slot(&self, category: FunctionCategory) -> Option<&FunctionSlot> {
        self.functions.iter().find(|s| s.category == category)
    }

    pub fn slots(&self) -> &[FunctionSlot] {
        &self.functions
    }

    fn slot_mut(&mut self, category: FunctionCategory) -> Option<&mut FunctionSlot> {
        self.functions.iter_mut().find(|s| s.category == category)
    }

    /// Add (or replace) the catalog for a category; its first entry becomes selected.
    pub fn add_catalog(&mut self, category: FunctionCategory, catalog: Vec<RateFunction>) {
        let slot = FunctionSlot::new(category, catalog);
        match self.slot_mut(category) {
            Some(existing) => *existing = slot,
            None => self.functions.push(slot),
        }
    }

    pub fn selected(&self, category: FunctionCategory) -> Option<&RateFunction> {
        self.slot(category).and_then(FunctionSlot::selected)
    }

    /// Select the catalog entry named `name` for `category`.
    pub fn select_function(
        &mut self,
        category: FunctionCategory,
        name: &str,
    ) -> Result<(), ConfigError> {
        let stage = self.stage;
        let unknown = || ConfigError::UnknownFunction {
            stage,
            category,
            name: name.to_string(),
        };
        let slot = self.slot_mut(category).ok_or_else(unknown)?;
        if slot.select(name) {
            Ok(())
        } else {
            Err(unknown())
        }
    }

    /// Set a named parameter of the catalog entry `function` in `category`.
    pub fn set_function_parameter(
        &mut self,
        category: FunctionCategory,
        function: &str,
        name: &str,
        value: f64,
    ) -> Result<(), ConfigError> {
        let stage = self.stage;
        let entry = self
            .slot_mut(category)
            .and_then(|s| s.entry_mut(function))
            .ok_or_else(|| ConfigError::UnknownFunction {
                stage,
                category,
                name: function.to_string(),
            })?;
        if entry.set_parameter(name, value) {
            Ok(())
        } else {
            Err(ConfigError::MissingParameter {
                stage,
                name: format!("{function}.{name}"),
            })
        }
    }

    fn missing(&self, name: &str) -> ConfigError {
        ConfigError::MissingParameter {
            stage: self.stage,
            name: name.to_string(),
        }
    }

    fn invalid(&self, name: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidParameter {
            stage: self.stage,
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Selected function for a category the stage requires, checked against the schema.
    fn checked(&self, category: FunctionCategory) -> Result<Option<&RateFunction>, ConfigError> {
        let schema = self.stage.schema();
        let Some(function) = self.selected(category) else {
            if schema.requires(category) {
                return Err(ConfigError::MissingFunction {
                    stage: self.stage,
                    category,
                });
            }
            return Ok(None);
        };
        if !schema.supports(category, function.kind()) || !function.fits_call_site(category) {
            return Err(ConfigError::UnsupportedFunction {
                stage: self.stage,
                category,
                function: function.kind(),
            });
        }
        Ok(Some(function))
    }

    /// Validate against the stage schema and copy into the fast typed form.
    pub fn bind(&self) -> Result<BoundStage, ConfigError> {
        let schema = self.stage.schema();

        for spec in schema.scalar_specs() {
            match (spec.kind, self.scalar(spec.name)) {
                (_, None) => return Err(self.missing(spec.name)),
                (expected, Some(v)) if v.kind() != expected => {
                    return Err(ConfigError::ParameterType {
                        stage: self.stage,
                        name: spec.name.to_string(),
                        expected: match expected {
                            ParamKind::Float => "float",
                            ParamKind::Bool => "bool",
                        },
                    })
                }
                _ => {}
            }
        }

        // The match arms below cover every variant of each category; anything the
        // schema does not list was already rejected by `checked`.
        let mortality = match self.checked(FunctionCategory::Mortality)? {
            Some(RateFunction::Mortality(f)) => f.clone(),
            _ => return Err(self.missing_function(FunctionCategory::Mortality)),
        };
        let development = match self.checked(FunctionCategory::Development)? {
            Some(RateFunction::Development(f)) => f.clone(),
            _ => return Err(self.missing_function(FunctionCategory::Development)),
        };
        let growth = match self.checked(FunctionCategory::Growth)? {
            Some(RateFunction::Growth(f)) => f.clone(),
            _ => return Err(self.missing_function(FunctionCategory::Growth)),
        };
        let vertical = match self.checked(FunctionCategory::VerticalMovement)? {
            Some(RateFunction::VerticalMovement(f)) => f.clone(),
            _ => return Err(self.missing_function(FunctionCategory::VerticalMovement)),
        };
        let horizontal = match self.checked(FunctionCategory::HorizontalMovement)? {
            Some(RateFunction::HorizontalMovement(f)) => f.clone(),
            _ => return Err(self.missing_function(FunctionCategory::HorizontalMovement)),
        };
        let fecundity = match self.checked(FunctionCategory::Fecundity)? {
            Some(RateFunction::Fecundity(f)) => Some(f.clone()),
            _ => None,
        };

        let opt = |name: &str| self.float(name).ok();

        let min_stage_duration = self.float(p::MIN_STAGE_DURATION)?;
        let max_stage_duration = self.float(p::MAX_STAGE_DURATION)?;
        if min_stage_duration < 0.0 || max_stage_duration < min_stage_duration {
            return Err(self.invalid(
                p::MAX_STAGE_DURATION,
                format!("stage durations must satisfy 0 <= min ({min_stage_duration}) <= max ({max_stage_duration})"),
            ));
        }
        let stage_transition_rate = self.float(p::STAGE_TRANSITION_RATE)?;
        if stage_transition_rate < 0.0 {
            return Err(self.invalid(p::STAGE_TRANSITION_RATE, "must be >= 0"));
        }

        let sex_ratio = opt(p::SEX_RATIO).unwrap_or(0.5);
        if !(0.0..=1.0).contains(&sex_ratio) {
            return Err(self.invalid(p::SEX_RATIO, "must lie in [0, 1]"));
        }

        let spawning = if schema.spawns() {
            let params = SpawningParams {
                first_day_spawning: self.float(p::FIRST_DAY_SPAWNING)?,
                length_spawning_season: self.float(p::LENGTH_SPAWNING_SEASON)?,
                recovery_period: self.float(p::RECOVERY_PERIOD)?,
                initial_spawn_delay: self.float(p::INITIAL_SPAWN_DELAY)?,
                randomize_spawn_time: self.flag(p::RANDOMIZE_SPAWN_TIME)?,
                batch_spawner: self.flag(p::BATCH_SPAWNER)?,
            };
            if params.length_spawning_season <= 0.0 {
                return Err(self.invalid(p::LENGTH_SPAWNING_SEASON, "must be > 0"));
            }
            if fecundity.is_none() {
                return Err(self.missing_function(FunctionCategory::Fecundity));
            }
            Some(params)
        } else {
            None
        };

        Ok(BoundStage {
            stage: self.stage,
            is_super_individual: self.flag(p::IS_SUPER_INDIVIDUAL)?,
            min_stage_duration,
            max_stage_duration,
            stage_transition_rate,
            initial_size: self.float(p::INITIAL_SIZE)?,
            length_weight: (self.float(p::LENGTH_WEIGHT_A)?, self.float(p::LENGTH_WEIGHT_B)?),
            hatch_stage: opt(p::HATCH_STAGE).unwrap_or(f64::INFINITY),
            max_dev_stage: opt(p::MAX_DEV_STAGE).unwrap_or(f64::INFINITY),
            egg_diameter: opt(p::EGG_DIAMETER).unwrap_or(0.0),
            egg_density: opt(p::EGG_DENSITY).unwrap_or(0.0),
            molt_threshold: opt(p::MOLT_THRESHOLD).unwrap_or(1.0),
            settlement_depth: (
                opt(p::MIN_SETTLEMENT_DEPTH).unwrap_or(0.0),
                opt(p::MAX_SETTLEMENT_DEPTH).unwrap_or(f64::INFINITY),
            ),
            size_at_immature: opt(p::SIZE_AT_IMMATURE).unwrap_or(f64::INFINITY),
            size_at_maturity: opt(p::SIZE_AT_MATURITY).unwrap_or(f64::INFINITY),
            sex_ratio,
            max_starvation_days: opt(p::MAX_STARVATION_DAYS).unwrap_or(f64::INFINITY),
            max_weight_loss: opt(p::MAX_WEIGHT_LOSS).unwrap_or(1.0),
            trigger: schema.trigger,
            floor_policy: schema.floor_policy,
            mortality,
            development,
            growth,
            vertical,
            horizontal,
            fecundity,
            spawning,
        })
    }

    fn missing_function(&self, category: FunctionCategory) -> ConfigError {
        ConfigError::MissingFunction {
            stage: self.stage,
            category,
        }
    }
}

/// A validated parameter set, copied into plain fields for the stepper.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStage {
    pub stage: StageType,
    pub is_super_individual: bool,
    /// Days.
    pub min_stage_duration: f64,
    /// Days.
    pub max_stage_duration: f64,
    /// Per day.
    pub stage_transition_rate: f64,
    pub initial_size: f64,
    pub length_weight: (f64, f64),
    pub hatch_stage: f64,
    pub max_dev_stage: f64,
    pub egg_diameter: f64,
    pub egg_density: f64,
    pub molt_threshold: f64,
    /// (min, max) bottom depth in metres.
    pub settlement_depth: (f64, f64),
    pub size_at_immature: f64,
    pub size_at_maturity: f64,
    /// Fraction of successors that are male.
    pub sex_ratio: f64,
    pub max_starvation_days: f64,
    /// Fraction of peak weight that may be lost before death.
    pub max_weight_loss: f64,
    pub trigger: TransitionTrigger,
    pub floor_policy: FloorPolicy,
    pub mortality: MortalityFunction,
    pub development: DevelopmentFunction,
    pub growth: GrowthFunction,
    pub vertical: VerticalMovement,
    pub horizontal: HorizontalMovement,
    pub fecundity: Option<FecundityFunction>,
    pub spawning: Option<SpawningParams>,
}

impl BoundStage {
    /// Weight implied by size through the length-weight relation.
    pub fn weight_at(&self, size: f64) -> f64 {
        let (a, b) = self.length_weight;
        if size > 0.0 {
            a * size.powf(b)
        } else {
            0.0
        }
    }
}

// ============================================================================
// DEFAULT PARAMETER SETS
// ============================================================================

fn mortality_catalog(constant: f64) -> Vec<RateFunction> {
    vec![
        RateFunction::Mortality(MortalityFunction::Constant { rate: constant }),
        RateFunction::Mortality(MortalityFunction::SizePowerLaw {
            a: constant * 2.0,
            b: -0.5,
        }),
        RateFunction::Mortality(MortalityFunction::TemperatureExponential {
            base: constant,
            coefficient: 0.08,
            reference: 2.0,
        }),
    ]
}

fn pelagic_vertical_catalog(night: (f64, f64), day: (f64, f64), speed: f64) -> Vec<RateFunction> {
    vec![
        RateFunction::VerticalMovement(VerticalMovement::DielMigration {
            day_min_depth: day.0,
            day_max_depth: day.1,
            night_min_depth: night.0,
            night_max_depth: night.1,
            speed,
        }),
        RateFunction::VerticalMovement(VerticalMovement::Passive),
        RateFunction::VerticalMovement(VerticalMovement::FixedDepthRange {
            min_depth: night.0,
            max_depth: day.1,
            speed,
        }),
        RateFunction::VerticalMovement(VerticalMovement::DepthTemperatureRange {
            min_depth: night.0,
            max_depth: day.1,
            min_temperature: -1.0,
            max_temperature: 8.0,
            speed,
        }),
    ]
}

fn benthic_growth_catalog(rate: f64, asymptote: f64) -> Vec<RateFunction> {
    vec![
        RateFunction::Growth(GrowthFunction::Logistic { rate, asymptote }),
        RateFunction::Growth(GrowthFunction::Linear { rate: asymptote * rate * 0.25 }),
        RateFunction::Growth(GrowthFunction::Exponential { rate }),
        RateFunction::Growth(GrowthFunction::TemperatureLinear {
            intercept: 0.01,
            slope: 0.01,
        }),
        RateFunction::Growth(GrowthFunction::Bioenergetic {
            consumption: 0.02,
            respiration_base: 0.008,
            respiration_coefficient: 0.07,
        }),
    ]
}

fn benthic_movement(params: &mut StageParameters, diffusivity: f64) {
    params.add_catalog(
        FunctionCategory::VerticalMovement,
        vec![
            RateFunction::VerticalMovement(VerticalMovement::OffBottom {
                distance: 0.0,
                speed: 0.05,
            }),
            RateFunction::VerticalMovement(VerticalMovement::Attached),
        ],
    );
    params.add_catalog(
        FunctionCategory::HorizontalMovement,
        vec![
            RateFunction::HorizontalMovement(HorizontalMovement::RandomWalk { diffusivity }),
            RateFunction::HorizontalMovement(HorizontalMovement::None),
            RateFunction::HorizontalMovement(HorizontalMovement::DirectedSwimming {
                speed: 0.01,
                heading: 0.0,
            }),
        ],
    );
    params.add_catalog(
        FunctionCategory::Development,
        vec![RateFunction::Development(DevelopmentFunction::None)],
    );
}

fn common(
    params: &mut StageParameters,
    super_individual: bool,
    durations: (f64, f64),
    transition_rate: f64,
    initial_size: f64,
) {
    params.set_flag(p::IS_SUPER_INDIVIDUAL, super_individual);
    params.set_float(p::MIN_STAGE_DURATION, durations.0);
    params.set_float(p::MAX_STAGE_DURATION, durations.1);
    params.set_float(p::STAGE_TRANSITION_RATE, transition_rate);
    params.set_float(p::INITIAL_SIZE, initial_size);
    // carapace width (mm) to wet weight (g)
    params.set_float(p::LENGTH_WEIGHT_A, 0.000_27);
    params.set_float(p::LENGTH_WEIGHT_B, 3.1);
}

fn zoea(stage: StageType, initial_size: f64, molt_days: f64) -> StageParameters {
    let mut params = StageParameters::empty(stage);
    common(&mut params, true, (molt_days * 0.5, molt_days * 3.0), 0.2, initial_size);
    params.set_float(p::MOLT_THRESHOLD, 1.0);
    params.add_catalog(FunctionCategory::Mortality, mortality_catalog(0.05));
    params.add_catalog(
        FunctionCategory::Development,
        vec![RateFunction::Development(DevelopmentFunction::MoltDuration {
            a: molt_days * 1.35,
            b: 0.1,
        })],
    );
    params.add_catalog(
        FunctionCategory::Growth,
        vec![
            RateFunction::Growth(GrowthFunction::Linear { rate: 0.02 }),
            RateFunction::Growth(GrowthFunction::None),
            RateFunction::Growth(GrowthFunction::Exponential { rate: 0.01 }),
            RateFunction::Growth(GrowthFunction::TemperatureLinear {
                intercept: 0.005,
                slope: 0.004,
            }),
        ],
    );
    params.add_catalog(
        FunctionCategory::VerticalMovement,
        pelagic_vertical_catalog((0.0, 15.0), (20.0, 40.0), 0.002),
    );
    params.add_catalog(
        FunctionCategory::HorizontalMovement,
        vec![
            RateFunction::HorizontalMovement(HorizontalMovement::RandomWalk { diffusivity: 1.0 }),
            RateFunction::HorizontalMovement(HorizontalMovement::None),
        ],
    );
    params
}

impl StageParameters {
    /// Built-in parameter set for `stage`.
    pub fn defaults(stage: StageType) -> Self {
        match stage {
            StageType::Egg => {
                let mut params = Self::empty(stage);
                common(&mut params, false, (0.0, 365.0), 0.0, 0.0);
                params.set_float(p::HATCH_STAGE, 18.5);
                params.set_float(p::MAX_DEV_STAGE, 19.4);
                params.set_float(p::EGG_DIAMETER, 0.6);
                params.set_float(p::EGG_DENSITY, 1.05);
                params.add_catalog(
                    FunctionCategory::Mortality,
                    vec![
                        RateFunction::Mortality(MortalityFunction::Constant { rate: 0.005 }),
                        RateFunction::Mortality(MortalityFunction::TemperatureExponential {
                            base: 0.005,
                            coefficient: 0.1,
                            reference: 3.0,
                        }),
                    ],
                );
                params.add_catalog(
                    FunctionCategory::Development,
                    vec![RateFunction::Development(DevelopmentFunction::EggTemperature(
                        EggDevelopment::default(),
                    ))],
                );
                params.add_catalog(
                    FunctionCategory::Growth,
                    vec![RateFunction::Growth(GrowthFunction::None)],
                );
                params.add_catalog(
                    FunctionCategory::VerticalMovement,
                    vec![
                        RateFunction::VerticalMovement(VerticalMovement::Attached),
                        RateFunction::VerticalMovement(VerticalMovement::Passive),
                    ],
                );
                params.add_catalog(
                    FunctionCategory::HorizontalMovement,
                    vec![RateFunction::HorizontalMovement(HorizontalMovement::None)],
                );
                params
            }
            StageType::Zoea1 => zoea(stage, 1.0, 20.0),
            StageType::Zoea2 => zoea(stage, 1.5, 25.0),
            StageType::Megalopa => {
                let mut params = zoea(stage, 2.5, 30.0);
                params.set_float(p::MIN_SETTLEMENT_DEPTH, 20.0);
                params.set_float(p::MAX_SETTLEMENT_DEPTH, 200.0);
                let mut vertical = pelagic_vertical_catalog((0.0, 15.0), (20.0, 60.0), 0.004);
                vertical.push(RateFunction::VerticalMovement(VerticalMovement::OffBottom {
                    distance: 2.0,
                    speed: 0.004,
                }));
                params.add_catalog(FunctionCategory::VerticalMovement, vertical);
                params.add_catalog(
                    FunctionCategory::HorizontalMovement,
                    vec![
                        RateFunction::HorizontalMovement(HorizontalMovement::RandomWalk {
                            diffusivity: 1.0,
                        }),
                        RateFunction::HorizontalMovement(HorizontalMovement::None),
                        RateFunction::HorizontalMovement(HorizontalMovement::DirectedSwimming {
                            speed: 0.02,
                            heading: 0.0,
                        }),
                    ],
                );
                params
            }
            StageType::Juvenile => {
                let mut params = Self::empty(stage);
                common(&mut params, true, (30.0, 730.0), 0.05, 3.0);
                params.set_float(p::SIZE_AT_IMMATURE, 20.0);
                params.set_float(p::SEX_RATIO, 0.5);
                params.set_float(p::MAX_STARVATION_DAYS, 60.0);
                params.set_float(p::MAX_WEIGHT_LOSS, 0.5);
                params.add_catalog(FunctionCategory::Mortality, mortality_catalog(0.005));
                params.add_catalog(FunctionCategory::Growth, benthic_growth_catalog(0.01, 140.0));
                benthic_movement(&mut params, 0.1);
                params
            }
            StageType::ImmatureFemale | StageType::ImmatureMale => {
                let mut params = Self::empty(stage);
                common(&mut params, true, (60.0, 2000.0), 0.02, 20.0);
                let (maturity, asymptote) = if stage == StageType::ImmatureFemale {
                    (50.0, 90.0)
                } else {
                    (70.0, 140.0)
                };
                params.set_float(p::SIZE_AT_MATURITY, maturity);
                params.set_float(p::MAX_STARVATION_DAYS, 90.0);
                params.set_float(p::MAX_WEIGHT_LOSS, 0.5);
                params.add_catalog(FunctionCategory::Mortality, mortality_catalog(0.002));
                params.add_catalog(
                    FunctionCategory::Growth,
                    benthic_growth_catalog(0.004, asymptote),
                );
                benthic_movement(&mut params, 0.1);
                params
            }
            StageType::MatureFemale | StageType::MatureMale => {
                let mut params = Self::empty(stage);
                common(&mut params, true, (0.0, 3000.0), 0.0, 50.0);
                params.set_float(p::MAX_STARVATION_DAYS, 120.0);
                params.set_float(p::MAX_WEIGHT_LOSS, 0.5);
                params.add_catalog(FunctionCategory::Mortality, mortality_catalog(0.001));
                params.add_catalog(
                    FunctionCategory::Growth,
                    vec![
                        RateFunction::Growth(GrowthFunction::Logistic {
                            rate: 0.001,
                            asymptote: 100.0,
                        }),
                        RateFunction::Growth(GrowthFunction::Bioenergetic {
                            consumption: 0.01,
                            respiration_base: 0.004,
                            respiration_coefficient: 0.07,
                        }),
                    ],
                );
                benthic_movement(&mut params, 0.05);
                if stage == StageType::MatureFemale {
                    params.set_float(p::FIRST_DAY_SPAWNING, 60.0);
                    params.set_float(p::LENGTH_SPAWNING_SEASON, 60.0);
                    params.set_float(p::RECOVERY_PERIOD, 30.0);
                    params.set_float(p::INITIAL_SPAWN_DELAY, 10.0);
                    params.set_flag(p::RANDOMIZE_SPAWN_TIME, false);
                    params.set_flag(p::BATCH_SPAWNER, true);
                    params.add_catalog(
                        FunctionCategory::Fecundity,
                        vec![
                            RateFunction::Fecundity(FecundityFunction::SizePowerLaw {
                                a: 0.002,
                                b: 2.0,
                            }),
                            RateFunction::Fecundity(FecundityFunction::Constant { eggs: 5.0 }),
                        ],
                    );
                }
                params
            }
        }
    }
}
