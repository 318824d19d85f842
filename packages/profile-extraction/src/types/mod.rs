//! Request-scoped data types for the extraction core.

pub mod profile;
pub mod request;
pub mod result;

pub use profile::{
    ActivityPost, Award, Certification, Education, Engagement, Experience, ExtractedProfile,
    ProfileHeader, VolunteerRole,
};
pub use request::{ExtractionRequest, OptimizationMode, ProfileKind};
pub use result::{BackendAttempt, BackendResponse, OrchestrationResult, UsageRecord};
