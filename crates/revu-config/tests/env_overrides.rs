use figment::Jail;
use revu_config::{DocumentMode, RevuConfig};
use revu_core::enums::SinkKind;

#[test]
fn env_selects_sinks_and_document_mode() {
    Jail::expect_with(|jail| {
        jail.set_env("REVU_STORAGE__SINKS", r#"["tabular"]"#);
        jail.set_env("REVU_STORAGE__DOCUMENT_MODE", "append");

        let config = RevuConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.storage.sinks, vec![SinkKind::Tabular]);
        assert_eq!(config.storage.document_mode, DocumentMode::Append);
        Ok(())
    });
}

#[test]
fn env_sets_reviewer_and_catalog_dir() {
    Jail::expect_with(|jail| {
        jail.set_env("REVU_GENERAL__REVIEWER", "r-42");
        jail.set_env("REVU_CATALOG__BASE_DIR", "/data/cases");

        let config = RevuConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.general.reviewer, "r-42");
        assert_eq!(config.catalog.base_dir, "/data/cases");
        Ok(())
    });
}

#[test]
fn zero_retry_attempts_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("REVU_STORAGE__RETRY_ATTEMPTS", "0");
        assert!(RevuConfig::load().is_err());
        Ok(())
    });
}
