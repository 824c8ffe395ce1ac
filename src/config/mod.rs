mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./seqforge.toml",
        "./config.toml",
        "~/.config/seqforge/config.toml",
        "/etc/seqforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let check = &config.check;
    if check.images == 0 {
        anyhow::bail!("check.images must be at least 1");
    }
    if check.frames == 0 {
        anyhow::bail!("check.frames must be at least 1");
    }
    if check.progress_every == 0 {
        anyhow::bail!("check.progress_every must be at least 1");
    }
    if check.metadata_key.is_empty() {
        anyhow::bail!("check.metadata_key cannot be empty");
    }

    if config.archive.part_size.trim().is_empty() {
        anyhow::bail!("archive.part_size cannot be empty");
    }

    if config.sheets.tiles_x == 0 || config.sheets.tiles_y == 0 {
        anyhow::bail!("sheets.tiles_x and sheets.tiles_y must be at least 1");
    }

    let movies = &config.movies;
    if movies.input_fps == 0 || movies.output_fps == 0 {
        anyhow::bail!("movies.input_fps and movies.output_fps must be at least 1");
    }
    if movies.frames == 0 || movies.loops == 0 {
        anyhow::bail!("movies.frames and movies.loops must be at least 1");
    }

    // Tool overrides are only warnings: PATH lookup still applies
    let tools = &config.tools;
    for (name, path) in [
        ("tar", &tools.tar),
        ("zip", &tools.zip),
        ("split", &tools.split),
        ("pngcheck", &tools.pngcheck),
        ("ffmpeg", &tools.ffmpeg),
        ("gm", &tools.gm),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("Configured {} path does not exist: {:?}", name, path);
            }
        }
    }

    Ok(())
}
