//! Life stages and their static schemas.
//!
//! Every stage is described by a [`StageSchema`]: the attributes it reports,
//! the stages it may turn into or spawn, the scalar parameters it needs, and
//! which rate-function variants its code path accepts per category.
//!
//! ```text
//! Egg → Zoea1 → Zoea2 → Megalopa → Juvenile ─┬→ ImmatureFemale → MatureFemale ─(spawns)→ Egg
//!                                            └→ ImmatureMale   → MatureMale
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rates::{FunctionCategory, FunctionKind};

/// Life stage of a cohort entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum StageType {
    Egg = 0,
    Zoea1 = 1,
    Zoea2 = 2,
    Megalopa = 3,
    Juvenile = 4,
    ImmatureFemale = 5,
    ImmatureMale = 6,
    MatureFemale = 7,
    MatureMale = 8,
}

impl StageType {
    pub fn all() -> &'static [StageType] {
        &[
            Self::Egg,
            Self::Zoea1,
            Self::Zoea2,
            Self::Megalopa,
            Self::Juvenile,
            Self::ImmatureFemale,
            Self::ImmatureMale,
            Self::MatureFemale,
            Self::MatureMale,
        ]
    }

    pub fn name(&self) -> &'static str {
        self.schema().name
    }

    /// Parse a stage from its schema name (case-insensitive, spaces or underscores).
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        let wanted = normalize(name);
        Self::all()
            .iter()
            .copied()
            .find(|s| normalize(s.name()) == wanted)
            .ok_or_else(|| ConfigError::UnknownStage(name.to_string()))
    }

    pub fn from_u8(val: u8) -> Option<Self> {
        Self::all().get(val as usize).copied()
    }

    pub fn schema(&self) -> &'static StageSchema {
        match self {
            Self::Egg => &EGG,
            Self::Zoea1 => &ZOEA1,
            Self::Zoea2 => &ZOEA2,
            Self::Megalopa => &MEGALOPA,
            Self::Juvenile => &JUVENILE,
            Self::ImmatureFemale => &IMMATURE_FEMALE,
            Self::ImmatureMale => &IMMATURE_MALE,
            Self::MatureFemale => &MATURE_FEMALE,
            Self::MatureMale => &MATURE_MALE,
        }
    }
}

impl fmt::Display for StageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// SCHEMA TYPES
// ============================================================================

/// Stage-specific state reported after the common fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    DevStage,
    MoltIndicator,
    Size,
    Weight,
    EggDiameter,
    EggDensity,
    Attached,
    StarvationDays,
    GonadStage,
    SpawnBatches,
    TimeToSpawn,
}

impl Attribute {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DevStage => "dev_stage",
            Self::MoltIndicator => "molt_indicator",
            Self::Size => "size",
            Self::Weight => "weight",
            Self::EggDiameter => "egg_diameter",
            Self::EggDensity => "egg_density",
            Self::Attached => "attached",
            Self::StarvationDays => "starvation_days",
            Self::GonadStage => "gonad_stage",
            Self::SpawnBatches => "spawn_batches",
            Self::TimeToSpawn => "time_to_spawn",
        }
    }
}

/// Value type of a scalar parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Float,
    Bool,
}

/// A scalar parameter a stage requires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

const fn float(name: &'static str) -> ScalarSpec {
    ScalarSpec {
        name,
        kind: ParamKind::Float,
    }
}

const fn flag(name: &'static str) -> ScalarSpec {
    ScalarSpec {
        name,
        kind: ParamKind::Bool,
    }
}

/// What happens to `num_trans` when abundance drops below the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorPolicy {
    /// Committed-but-unsplit abundance is added back to `number`.
    FoldIntoNumber,
    /// Committed-but-unsplit abundance is dropped.
    Discard,
}

/// Condition that makes a single individual ready to transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTrigger {
    /// Terminal stage.
    Never,
    /// `dev_stage >= hatch_stage`.
    Hatch,
    /// `molt_indicator >= molt_threshold`.
    Molt,
    /// Molt complete and bottom depth within the settlement range.
    Settlement,
    /// `size >= size_at_immature`.
    SizeAtImmature,
    /// `size >= size_at_maturity`.
    SizeAtMaturity,
}

/// Immutable registry entry for a stage type.
#[derive(Debug)]
pub struct StageSchema {
    pub name: &'static str,
    pub attributes: &'static [Attribute],
    /// Permissible successor stages, in order. Two entries means a sex-ratio branch
    /// (female first, male second).
    pub successors: &'static [StageType],
    /// Stages this one spawns (not direct successors).
    pub spawned: &'static [StageType],
    /// Scalars required beyond [`COMMON_SCALARS`].
    pub scalars: &'static [ScalarSpec],
    pub required: &'static [FunctionCategory],
    pub supported: &'static [(FunctionCategory, &'static [FunctionKind])],
    pub trigger: TransitionTrigger,
    pub floor_policy: FloorPolicy,
}

impl StageSchema {
    /// Variants accepted for `category`, empty if the category is unused.
    pub fn supported_kinds(&self, category: FunctionCategory) -> &'static [FunctionKind] {
        self.supported
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, kinds)| *kinds)
            .unwrap_or(&[])
    }

    pub fn supports(&self, category: FunctionCategory, kind: FunctionKind) -> bool {
        self.supported_kinds(category).contains(&kind)
    }

    pub fn requires(&self, category: FunctionCategory) -> bool {
        self.required.contains(&category)
    }

    /// Every scalar the stage needs, common ones first.
    pub fn scalar_specs(&self) -> impl Iterator<Item = &'static ScalarSpec> {
        COMMON_SCALARS.iter().chain(self.scalars.iter())
    }

    pub fn branches_by_sex(&self) -> bool {
        self.successors.len() == 2
    }

    pub fn spawns(&self) -> bool {
        !self.spawned.is_empty()
    }
}

// ============================================================================
// SCALAR PARAMETER NAMES
// ============================================================================

pub mod params {
    pub const IS_SUPER_INDIVIDUAL: &str = "is_super_individual";
    pub const MIN_STAGE_DURATION: &str = "min_stage_duration";
    pub const MAX_STAGE_DURATION: &str = "max_stage_duration";
    pub const STAGE_TRANSITION_RATE: &str = "stage_transition_rate";
    pub const INITIAL_SIZE: &str = "initial_size";
    pub const LENGTH_WEIGHT_A: &str = "length_weight_a";
    pub const LENGTH_WEIGHT_B: &str = "length_weight_b";

    pub const HATCH_STAGE: &str = "hatch_stage";
    pub const MAX_DEV_STAGE: &str = "max_dev_stage";
    pub const EGG_DIAMETER: &str = "egg_diameter";
    pub const EGG_DENSITY: &str = "egg_density";

    pub const MOLT_THRESHOLD: &str = "molt_threshold";
    pub const MIN_SETTLEMENT_DEPTH: &str = "min_settlement_depth";
    pub const MAX_SETTLEMENT_DEPTH: &str = "max_settlement_depth";

    pub const SIZE_AT_IMMATURE: &str = "size_at_immature";
    pub const SEX_RATIO: &str = "sex_ratio";
    pub const SIZE_AT_MATURITY: &str = "size_at_maturity";
    pub const MAX_STARVATION_DAYS: &str = "max_starvation_days";
    pub const MAX_WEIGHT_LOSS: &str = "max_weight_loss";

    pub const FIRST_DAY_SPAWNING: &str = "first_day_spawning";
    pub const LENGTH_SPAWNING_SEASON: &str = "length_spawning_season";
    pub const RECOVERY_PERIOD: &str = "recovery_period";
    pub const INITIAL_SPAWN_DELAY: &str = "initial_spawn_delay";
    pub const RANDOMIZE_SPAWN_TIME: &str = "randomize_spawn_time";
    pub const BATCH_SPAWNER: &str = "batch_spawner";
}

/// Scalars every stage carries.
pub const COMMON_SCALARS: &[ScalarSpec] = &[
    flag(params::IS_SUPER_INDIVIDUAL),
    float(params::MIN_STAGE_DURATION),
    float(params::MAX_STAGE_DURATION),
    float(params::STAGE_TRANSITION_RATE),
    float(params::INITIAL_SIZE),
    float(params::LENGTH_WEIGHT_A),
    float(params::LENGTH_WEIGHT_B),
];

const BENTHIC_SCALARS: &[ScalarSpec] = &[
    float(params::MAX_STARVATION_DAYS),
    float(params::MAX_WEIGHT_LOSS),
];

// ============================================================================
// SUPPORTED FUNCTION SETS
// ============================================================================

use FunctionCategory as Cat;
use FunctionKind as K;

const CORE_CATEGORIES: &[FunctionCategory] = &[
    Cat::Mortality,
    Cat::Development,
    Cat::Growth,
    Cat::VerticalMovement,
    Cat::HorizontalMovement,
];

const SPAWNER_CATEGORIES: &[FunctionCategory] = &[
    Cat::Mortality,
    Cat::Development,
    Cat::Growth,
    Cat::VerticalMovement,
    Cat::HorizontalMovement,
    Cat::Fecundity,
];

const ALL_MORTALITY: &[FunctionKind] = &[
    K::ConstantMortality,
    K::SizePowerLawMortality,
    K::TemperatureExponentialMortality,
];

const EGG_FUNCTIONS: &[(FunctionCategory, &[FunctionKind])] = &[
    (
        Cat::Mortality,
        &[K::ConstantMortality, K::TemperatureExponentialMortality],
    ),
    (Cat::Development, &[K::EggTemperature]),
    (Cat::Growth, &[K::NoGrowth]),
    (Cat::VerticalMovement, &[K::Attached, K::Passive]),
    (Cat::HorizontalMovement, &[K::NoHorizontalMovement]),
];

const ZOEA_FUNCTIONS: &[(FunctionCategory, &[FunctionKind])] = &[
    (Cat::Mortality, ALL_MORTALITY),
    (Cat::Development, &[K::MoltDuration]),
    (
        Cat::Growth,
        &[
            K::NoGrowth,
            K::LinearGrowth,
            K::ExponentialGrowth,
            K::TemperatureLinearGrowth,
        ],
    ),
    (
        Cat::VerticalMovement,
        &[
            K::Passive,
            K::FixedDepthRange,
            K::DepthTemperatureRange,
            K::DielMigration,
        ],
    ),
    (
        Cat::HorizontalMovement,
        &[K::NoHorizontalMovement, K::RandomWalk],
    ),
];

const MEGALOPA_FUNCTIONS: &[(FunctionCategory, &[FunctionKind])] = &[
    (Cat::Mortality, ALL_MORTALITY),
    (Cat::Development, &[K::MoltDuration]),
    (
        Cat::Growth,
        &[
            K::NoGrowth,
            K::LinearGrowth,
            K::ExponentialGrowth,
            K::TemperatureLinearGrowth,
        ],
    ),
    (
        Cat::VerticalMovement,
        &[
            K::Passive,
            K::FixedDepthRange,
            K::OffBottom,
            K::DepthTemperatureRange,
            K::DielMigration,
        ],
    ),
    (
        Cat::HorizontalMovement,
        &[K::NoHorizontalMovement, K::RandomWalk, K::DirectedSwimming],
    ),
];

const BENTHIC_GROWTH: &[FunctionKind] = &[
    K::LinearGrowth,
    K::ExponentialGrowth,
    K::LogisticGrowth,
    K::TemperatureLinearGrowth,
    K::Bioenergetic,
];

const BENTHIC_HORIZONTAL: &[FunctionKind] =
    &[K::NoHorizontalMovement, K::RandomWalk, K::DirectedSwimming];

const BENTHIC_FUNCTIONS: &[(FunctionCategory, &[FunctionKind])] = &[
    (Cat::Mortality, ALL_MORTALITY),
    (Cat::Development, &[K::NoDevelopment]),
    (Cat::Growth, BENTHIC_GROWTH),
    (Cat::VerticalMovement, &[K::OffBottom, K::Attached]),
    (Cat::HorizontalMovement, BENTHIC_HORIZONTAL),
];

const SPAWNER_FUNCTIONS: &[(FunctionCategory, &[FunctionKind])] = &[
    (Cat::Mortality, ALL_MORTALITY),
    (Cat::Development, &[K::NoDevelopment]),
    (Cat::Growth, BENTHIC_GROWTH),
    (Cat::VerticalMovement, &[K::OffBottom, K::Attached]),
    (Cat::HorizontalMovement, BENTHIC_HORIZONTAL),
    (
        Cat::Fecundity,
        &[K::ConstantFecundity, K::SizePowerLawFecundity],
    ),
];

// ============================================================================
// STAGE SCHEMAS
// ============================================================================

static EGG: StageSchema = StageSchema {
    name: "Egg",
    attributes: &[
        Attribute::DevStage,
        Attribute::EggDiameter,
        Attribute::EggDensity,
        Attribute::Attached,
    ],
    successors: &[StageType::Zoea1],
    spawned: &[],
    scalars: &[
        float(params::HATCH_STAGE),
        float(params::MAX_DEV_STAGE),
        float(params::EGG_DIAMETER),
        float(params::EGG_DENSITY),
    ],
    required: CORE_CATEGORIES,
    supported: EGG_FUNCTIONS,
    trigger: TransitionTrigger::Hatch,
    floor_policy: FloorPolicy::FoldIntoNumber,
};

static ZOEA1: StageSchema = StageSchema {
    name: "Zoea1",
    attributes: &[Attribute::MoltIndicator, Attribute::Size, Attribute::Weight],
    successors: &[StageType::Zoea2],
    spawned: &[],
    scalars: &[float(params::MOLT_THRESHOLD)],
    required: CORE_CATEGORIES,
    supported: ZOEA_FUNCTIONS,
    trigger: TransitionTrigger::Molt,
    floor_policy: FloorPolicy::FoldIntoNumber,
};

static ZOEA2: StageSchema = StageSchema {
    name: "Zoea2",
    attributes: &[Attribute::MoltIndicator, Attribute::Size, Attribute::Weight],
    successors: &[StageType::Megalopa],
    spawned: &[],
    scalars: &[float(params::MOLT_THRESHOLD)],
    required: CORE_CATEGORIES,
    supported: ZOEA_FUNCTIONS,
    trigger: TransitionTrigger::Molt,
    floor_policy: FloorPolicy::FoldIntoNumber,
};

static MEGALOPA: StageSchema = StageSchema {
    name: "Megalopa",
    attributes: &[Attribute::MoltIndicator, Attribute::Size, Attribute::Weight],
    successors: &[StageType::Juvenile],
    spawned: &[],
    scalars: &[
        float(params::MOLT_THRESHOLD),
        float(params::MIN_SETTLEMENT_DEPTH),
        float(params::MAX_SETTLEMENT_DEPTH),
    ],
    required: CORE_CATEGORIES,
    supported: MEGALOPA_FUNCTIONS,
    trigger: TransitionTrigger::Settlement,
    floor_policy: FloorPolicy::FoldIntoNumber,
};

static JUVENILE: StageSchema = StageSchema {
    name: "Juvenile",
    attributes: &[Attribute::Size, Attribute::Weight, Attribute::StarvationDays],
    successors: &[StageType::ImmatureFemale, StageType::ImmatureMale],
    spawned: &[],
    scalars: &[
        float(params::SIZE_AT_IMMATURE),
        float(params::SEX_RATIO),
        float(params::MAX_STARVATION_DAYS),
        float(params::MAX_WEIGHT_LOSS),
    ],
    required: CORE_CATEGORIES,
    supported: BENTHIC_FUNCTIONS,
    trigger: TransitionTrigger::SizeAtImmature,
    floor_policy: FloorPolicy::Discard,
};

static IMMATURE_FEMALE: StageSchema = StageSchema {
    name: "ImmatureFemale",
    attributes: &[Attribute::Size, Attribute::Weight, Attribute::StarvationDays],
    successors: &[StageType::MatureFemale],
    spawned: &[],
    scalars: &[
        float(params::SIZE_AT_MATURITY),
        float(params::MAX_STARVATION_DAYS),
        float(params::MAX_WEIGHT_LOSS),
    ],
    required: CORE_CATEGORIES,
    supported: BENTHIC_FUNCTIONS,
    trigger: TransitionTrigger::SizeAtMaturity,
    floor_policy: FloorPolicy::Discard,
};

static IMMATURE_MALE: StageSchema = StageSchema {
    name: "ImmatureMale",
    attributes: &[Attribute::Size, Attribute::Weight, Attribute::StarvationDays],
    successors: &[StageType::MatureMale],
    spawned: &[],
    scalars: &[
        float(params::SIZE_AT_MATURITY),
        float(params::MAX_STARVATION_DAYS),
        float(params::MAX_WEIGHT_LOSS),
    ],
    required: CORE_CATEGORIES,
    supported: BENTHIC_FUNCTIONS,
    trigger: TransitionTrigger::SizeAtMaturity,
    floor_policy: FloorPolicy::Discard,
};

static MATURE_FEMALE: StageSchema = StageSchema {
    name: "MatureFemale",
    attributes: &[
        Attribute::Size,
        Attribute::Weight,
        Attribute::StarvationDays,
        Attribute::GonadStage,
        Attribute::SpawnBatches,
        Attribute::TimeToSpawn,
    ],
    successors: &[],
    spawned: &[StageType::Egg],
    scalars: &[
        float(params::MAX_STARVATION_DAYS),
        float(params::MAX_WEIGHT_LOSS),
        float(params::FIRST_DAY_SPAWNING),
        float(params::LENGTH_SPAWNING_SEASON),
        float(params::RECOVERY_PERIOD),
        float(params::INITIAL_SPAWN_DELAY),
        flag(params::RANDOMIZE_SPAWN_TIME),
        flag(params::BATCH_SPAWNER),
    ],
    required: SPAWNER_CATEGORIES,
    supported: SPAWNER_FUNCTIONS,
    trigger: TransitionTrigger::Never,
    floor_policy: FloorPolicy::Discard,
};

static MATURE_MALE: StageSchema = StageSchema {
    name: "MatureMale",
    attributes: &[Attribute::Size, Attribute::Weight, Attribute::StarvationDays],
    successors: &[],
    spawned: &[],
    scalars: BENTHIC_SCALARS,
    required: CORE_CATEGORIES,
    supported: BENTHIC_FUNCTIONS,
    trigger: TransitionTrigger::Never,
    floor_policy: FloorPolicy::Discard,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for stage in StageType::all() {
            assert_eq!(StageType::from_name(stage.name()).unwrap(), *stage);
            assert_eq!(StageType::from_u8(*stage as u8), Some(*stage));
        }
        assert_eq!(
            StageType::from_name("immature female").unwrap(),
            StageType::ImmatureFemale
        );
        assert!(matches!(
            StageType::from_name("lobster"),
            Err(ConfigError::UnknownStage(_))
        ));
        assert_eq!(StageType::from_u8(99), None);
    }

    #[test]
    fn successors_are_consistent() {
        for stage in StageType::all() {
            let schema = stage.schema();
            if schema.trigger == TransitionTrigger::Never {
                assert!(schema.successors.is_empty(), "{stage} is terminal");
            } else {
                assert!(!schema.successors.is_empty(), "{stage} needs a successor");
            }
        }
    }

    #[test]
    fn only_juvenile_branches_by_sex() {
        let branching: Vec<_> = StageType::all()
            .iter()
            .filter(|s| s.schema().branches_by_sex())
            .collect();
        assert_eq!(branching, vec![&StageType::Juvenile]);
    }

    #[test]
    fn only_mature_female_spawns() {
        for stage in StageType::all() {
            assert_eq!(stage.schema().spawns(), *stage == StageType::MatureFemale);
        }
        assert!(StageType::MatureFemale
            .schema()
            .requires(FunctionCategory::Fecundity));
    }

    #[test]
    fn every_required_category_has_supported_variants() {
        for stage in StageType::all() {
            let schema = stage.schema();
            for cat in schema.required {
                assert!(
                    !schema.supported_kinds(*cat).is_empty(),
                    "{stage} requires {cat:?} but supports nothing"
                );
            }
        }
    }

    #[test]
    fn egg_only_develops_by_temperature_table() {
        let schema = StageType::Egg.schema();
        assert!(schema.supports(FunctionCategory::Development, FunctionKind::EggTemperature));
        assert!(!schema.supports(FunctionCategory::Development, FunctionKind::MoltDuration));
        assert!(!schema.supports(FunctionCategory::Fecundity, FunctionKind::ConstantFecundity));
    }

    #[test]
    fn common_scalars_come_first() {
        let names: Vec<_> = StageType::Egg.schema().scalar_specs().map(|s| s.name).collect();
        assert_eq!(names[0], params::IS_SUPER_INDIVIDUAL);
        assert!(names.contains(&params::HATCH_STAGE));
    }

    #[test]
    fn floor_policy_split() {
        assert_eq!(StageType::Zoea1.schema().floor_policy, FloorPolicy::FoldIntoNumber);
        assert_eq!(StageType::Juvenile.schema().floor_policy, FloorPolicy::Discard);
    }
}
