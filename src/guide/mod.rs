//! Guide core: step sequence, instruction sources, and the enrichment
//! service that ties them to the external generators.

pub mod script;
pub mod sequence;
pub mod service;
pub mod source;

pub use sequence::StepSequence;
pub use service::{EnrichmentKind, GuideService, NavOutcome, ServiceStatus, StepView};
pub use source::InstructionSource;
