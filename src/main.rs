use anyhow::{Context, Result};
use retail_data::{Loader, LoaderConfig};
use std::{env, path::Path};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const CONFIG_FILE: &str = "retail-data.yaml";

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) configuration ───────────────────────────────────────────
    // `retail-data.yaml` wins; otherwise the cache sits in `../data/raw.csv`
    // next to the working directory, where earlier runs left it.
    let config = if Path::new(CONFIG_FILE).is_file() {
        info!(file = CONFIG_FILE, "reading config");
        LoaderConfig::from_yaml_file(CONFIG_FILE)?
    } else {
        let cwd = env::current_dir().context("reading current directory")?;
        let base = cwd.parent().unwrap_or(cwd.as_path());
        LoaderConfig::for_base_dir(base)
    };
    info!(
        remote = %config.remote_url,
        sheet = %config.sheet_name,
        cache = %config.cache_path.display(),
        "configured"
    );

    // ─── 3) load ─────────────────────────────────────────────────────
    let loader = Loader::new(config)?;
    let dataset = loader.standard_access()?;

    info!(
        rows = dataset.num_rows(),
        columns = ?dataset.column_names(),
        "dataset ready"
    );
    Ok(())
}
