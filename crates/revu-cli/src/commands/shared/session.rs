use revu_config::GeneralConfig;
use revu_core::ids::generate_session_id;

/// `--session`, else the configured reviewer, else a fresh id.
pub fn resolve_session_id(flag: Option<&str>, general: &GeneralConfig) -> String {
    let non_empty = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    flag.and_then(non_empty)
        .or_else(|| non_empty(&general.reviewer))
        .unwrap_or_else(|| {
            let id = generate_session_id();
            tracing::warn!(session = %id, "No session given; pass --session {id} to resume later");
            id
        })
}
