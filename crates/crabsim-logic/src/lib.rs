//! Life-stage and population dynamics for a marine crustacean.
//!
//! Cohort entities (single individuals or super-individuals) move through
//! the stages egg, zoea, megalopa, juvenile and adult. Each step integrates
//! abundance under competing mortality and transition hazards, grows or
//! develops the entity, and advects it through an external hydrodynamic
//! field. Everything here is plain data plus functions; the ocean model,
//! random stream and calendar are passed in.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`context`] | Injected random source, calendar, lineage ids, step context |
//! | [`egg_development`] | Temperature-dependent stochastic egg development table |
//! | [`entity`] | The cohort entity record, death causes, track |
//! | [`error`] | Configuration and domain error types |
//! | [`field`] | Hydrodynamic field provider trait and an analytic shelf sea |
//! | [`hazard`] | Closed-form competing-hazard abundance update |
//! | [`params`] | Stage parameter sets, function catalogs, binding |
//! | [`population`] | Minimal driver stepping a whole population |
//! | [`rates`] | Rate-function catalog (mortality, growth, movement, ...) |
//! | [`registry`] | Bound parameter sets per stage type |
//! | [`report`] | Ordered report header and values |
//! | [`spawning`] | Seasonal spawning state machine |
//! | [`stages`] | Stage types and their static schemas |
//! | [`stepper`] | Per-timestep entity update and transition predicate |
//! | [`tracker`] | Predictor-corrector particle tracking |
//! | [`transition`] | Successor creation, sex-ratio branching, spawning batches |
//! | [`vertical`] | Vertical movement behaviours and day/night |

pub mod context;
pub mod egg_development;
pub mod entity;
pub mod error;
pub mod field;
pub mod hazard;
pub mod params;
pub mod population;
pub mod rates;
pub mod registry;
pub mod report;
pub mod spawning;
pub mod stages;
pub mod stepper;
pub mod tracker;
pub mod transition;
pub mod vertical;

pub use entity::CohortEntity;
pub use error::{ConfigError, DomainError, SimError};
pub use params::{BoundStage, StageParameters};
pub use population::{Population, TickSummary};
pub use registry::StageRegistry;
pub use stages::StageType;
