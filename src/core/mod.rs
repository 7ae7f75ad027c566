pub mod case_key;
pub mod reshape;
pub mod resolver;

pub use crate::domain::model::{
    CaseIdentifier, CaseKey, CaseLookupResult, CourtOffice, InfoKind, LookupOutcome,
    LookupRequest,
};
pub use crate::domain::ports::CaseLookupClient;
pub use crate::utils::error::Result;
pub use case_key::{build_request, parse, to_case_key};
pub use resolver::CaseKeyResolver;
