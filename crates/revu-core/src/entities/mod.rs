//! Entity structs for revu domain objects.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` so they can
//! be written to every persistence sink and exported with `revu schema`.

mod correction;
mod progress;
mod record;

pub use correction::{CorrectionEntry, CorrectionReason};
pub use progress::{WorkflowProgress, WorkflowState};
pub use record::{AnnotationRecord, CaseRecord, EditedReport};
