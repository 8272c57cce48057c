use std::path::{Path, PathBuf};

use anyhow::Context;

/// Resolve the project root and make it the working directory, so relative
/// paths in the configuration (`storage.data_dir`, `catalog.base_dir`,
/// `.revu/config.toml`) resolve against it.
///
/// An explicit `--project` wins (a path to the `.revu` directory itself is
/// accepted). Otherwise the nearest ancestor holding `.revu` is used, falling
/// back to the current directory.
pub fn enter_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    let root = if let Some(path) = project_override {
        let explicit = PathBuf::from(path);
        let explicit = if explicit.file_name().is_some_and(|name| name == ".revu") {
            explicit
                .parent()
                .map(Path::to_path_buf)
                .context("invalid --project path: '.revu' directory has no parent")?
        } else {
            explicit
        };
        if !explicit.is_dir() {
            anyhow::bail!(
                "invalid --project '{}': directory does not exist",
                explicit.display()
            );
        }
        explicit
    } else {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        crate::context::find_project_root(&cwd).unwrap_or(cwd)
    };

    std::env::set_current_dir(&root)
        .with_context(|| format!("failed to enter project root {}", root.display()))?;
    Ok(root)
}

/// Load `.env` from the project root, then the layered configuration.
pub fn load_config(project_root: &Path) -> anyhow::Result<revu_config::RevuConfig> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }

    revu_config::RevuConfig::load().context("failed to load revu configuration")
}
