use revu_core::entities::{CaseRecord, CorrectionEntry};
use revu_core::snapshot::ProgressSnapshot;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output;

/// Handle `revu schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name {
        SchemaType::Snapshot => schemars::schema_for!(ProgressSnapshot),
        SchemaType::Record => schemars::schema_for!(CaseRecord),
        SchemaType::Correction => schemars::schema_for!(CorrectionEntry),
    };
    output(&schema, flags.format)
}
