use revu_config::RevuConfig;

const SECTIONS: [&str; 3] = ["STORAGE", "CATALOG", "GENERAL"];

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &RevuConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &RevuConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut warnings = Vec::new();
    for (key, _) in env {
        let Some(rest) = key.strip_prefix("REVU_") else {
            continue;
        };
        for section in SECTIONS {
            if let Some(field) = rest.strip_prefix(section).and_then(|r| r.strip_prefix('_'))
                && !field.starts_with('_')
            {
                warnings.push(format!(
                    "{key} is ignored. Use double underscores (example: REVU_{section}__{field})."
                ));
            }
        }
    }

    if config.general.organs.is_empty() {
        warnings.push("general.organs is empty; any organ label will be accepted.".to_string());
    }
    warnings
}
