//! Session id generation and filesystem-safe id rendering.
//!
//! Session ids are opaque strings. When the reviewer does not provide one, a
//! random id of the form `ses-a3f8b2c1` is generated.

/// Prefix for generated session ids.
pub const PREFIX_SESSION: &str = "ses";

/// Generate a random session id, e.g. `"ses-a3f8b2c1"`.
///
/// Uses the OS random source. Falls back to the clock if it is unavailable.
#[must_use]
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 4];
    if let Err(error) = getrandom::fill(&mut bytes) {
        tracing::warn!(%error, "OS random source unavailable; deriving session id from clock");
        let nanos = chrono::Utc::now().timestamp_subsec_nanos();
        bytes = nanos.to_le_bytes();
    }
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("{PREFIX_SESSION}-{hex}")
}

/// Render an opaque id so it can be embedded in a file name.
///
/// ASCII alphanumerics and `-` pass through; every other byte of the UTF-8
/// encoding becomes `_xx` (lowercase hex). Distinct ids always render
/// differently. An empty id renders as `_`.
#[must_use]
pub fn sanitize_for_path(id: &str) -> String {
    if id.is_empty() {
        return "_".to_string();
    }
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("_{byte:02x}"));
        }
    }
    out
}
