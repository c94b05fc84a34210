//! Site-to-POP assignment and coverage optimization over geographic
//! coordinates. Resolves each customer site to its nearest interconnection
//! facility, selects a minimal active facility set under a budget /
//! redundancy / latency profile, and scores every (site, facility) pair
//! for suitability heat maps.

mod coverage;
mod error;
mod geo;
mod input;
mod layout;
mod model;
mod nearest;
mod options;
mod pipeline;
mod regions;
mod score;

pub mod logging;

pub use coverage::select_facilities;
pub use error::{Error, Result};
pub use geo::{DistanceSpace, GeoPoint};
pub use input::read_plan_from_stdin;
pub use layout::{LayoutProjection, NodePosition};
pub use model::{
    Assignment, BudgetTier, Facility, FacilityDirectory, FacilityScore, LatencySensitivity,
    PrimaryGoal, RedundancyTier, RegionCluster, RegionalBias, RequirementsProfile, ScoreBreakdown,
    SelectionResult, Site, SiteCategory,
};
pub use nearest::resolve_nearest;
pub use options::{LogFormat, LogLevel, PlanOptions};
pub use pipeline::{PlanInput, PlanOutput, plan};
pub use regions::cluster_by_region;
pub use score::score_all;
