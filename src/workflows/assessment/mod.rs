pub mod calculators;
pub mod domain;
pub mod irradiance;

mod checklist;
mod report;
mod wizard;

pub use checklist::{ComplianceBlueprint, RequirementTemplate};
pub use report::{assemble, AssessmentReport};
pub use wizard::{AssessmentWizard, GatePolicy, LookupToken, ResolvedSite};
