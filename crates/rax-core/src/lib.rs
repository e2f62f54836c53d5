// Library root: the Rax valuation engine and its data model, configuration,
// and roster ingestion.

pub mod config;
pub mod model;
pub mod roster;
pub mod selection;
pub mod tiers;
pub mod valuation;
