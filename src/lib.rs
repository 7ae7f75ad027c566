pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::CourtApiClient;
pub use config::{CourtDirectory, LookupConfig};
pub use core::{build_request, parse, to_case_key, CaseKeyResolver};
pub use domain::model::{
    CaseIdentifier, CaseKey, CaseLookupResult, CaseSummary, CourtOffice, DocumentDeliveryEntry,
    InfoKind, LookupOutcome, LookupRequest, ScheduleEntry,
};
pub use domain::ports::CaseLookupClient;
pub use utils::error::{LookupError, Result};
