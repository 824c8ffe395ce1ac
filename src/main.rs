mod cli;

use seqforge::archive::{self, ArchiveMode, ArchiveOutcome, Splitter};
use seqforge::check::{self, CheckOptions, IntegrityContext};
use seqforge::config::{self, Config};
use seqforge::elapsed::{format_elapsed, Stopwatch};
use seqforge::listing::{self, InputDirType};
use seqforge::{extract, movies, sample, sheets};
use seqforge_av::actions::ExtractOptions;
use seqforge_av::CancelToken;
use seqforge_common::paths::{FRAMES_DIR, IMAGES_DIR, MOVIES_DIR, SHEETS_DIR};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

/// Exit status after an interrupt, as a shell reports SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "seqforge=trace,seqforge_av=trace,seqforge_common=debug".to_string()
        } else {
            "seqforge=info,seqforge_av=info,seqforge_common=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let stopwatch = Stopwatch::start();
    let result = run(cli, &stopwatch);

    if let Err(e) = result {
        if is_cancelled(&e) {
            println!("\nInterrupted. Elapsed time: {}", format_elapsed(stopwatch.elapsed()));
            std::process::exit(EXIT_INTERRUPTED);
        }
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<seqforge::Error>()
            .is_some_and(seqforge::Error::is_cancelled)
            || cause
                .downcast_ref::<seqforge_av::Error>()
                .is_some_and(seqforge_av::Error::is_cancelled)
    })
}

fn run(cli: Cli, stopwatch: &Stopwatch) -> Result<()> {
    let config_path = cli.config.clone();
    let load = || config::load_config_or_default(config_path.as_deref());

    match cli.command {
        Commands::CheckTools => check_tools(),
        Commands::Validate { config: path } => validate_config(path.or(cli.config).as_deref()),
        Commands::Version => {
            println!("seqforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Sample {
            count,
            step,
            round,
            from,
            to,
        } => {
            let to = match to {
                Some(to) => to,
                None => load()?.check.images,
            };
            print_sample(count, step, round, from, to)
        }
        Commands::Check {
            input,
            tars,
            integrity,
            images,
            frames,
            json,
        } => {
            let mut config = load()?;
            if let Some(images) = images {
                config.check.images = images;
            }
            if let Some(frames) = frames {
                config.check.frames = frames;
            }
            config::validate_config(&config)?;
            run_batch(stopwatch, |cancel| {
                run_check(&config, &input, tars, integrity, json, cancel)
            })
        }
        Commands::Extract {
            tar_dir,
            out,
            from,
            to,
            tar_verbose,
            keep_old,
        } => {
            let config = load()?;
            let options = ExtractOptions {
                verbose: tar_verbose,
                keep_old,
            };
            run_batch(stopwatch, |cancel| {
                run_extract(&config, &tar_dir, out.as_deref(), from, to, options, cancel)
            })
        }
        Commands::Sheets {
            input,
            out,
            from,
            to,
        } => {
            let config = load()?;
            run_batch(stopwatch, |cancel| {
                run_sheets(&config, &input, out.as_deref(), from, to, cancel)
            })
        }
        Commands::Movies {
            input,
            out,
            from,
            to,
            codec,
        } => {
            let mut config = load()?;
            if let Some(codec) = codec {
                config.movies.codec = codec;
                config.movies.crf = None;
            }
            run_batch(stopwatch, |cancel| {
                run_movies(&config, &input, out.as_deref(), from, to, cancel)
            })
        }
        Commands::Archive {
            input,
            out,
            targets,
            numbered,
            part_size,
        } => {
            let mut config = load()?;
            if numbered {
                config.archive.numbered = true;
            }
            if let Some(part_size) = part_size {
                config.archive.part_size = part_size;
            }
            config::validate_config(&config)?;
            run_batch(stopwatch, |cancel| {
                run_archive(&config, &input, out.as_deref(), &targets, cancel)
            })
        }
    }
}

/// Run a long batch under a signal-aware cancel token and report its duration.
fn run_batch(stopwatch: &Stopwatch, batch: impl FnOnce(&CancelToken) -> Result<()>) -> Result<()> {
    let cancel = CancelToken::new();
    spawn_signal_watcher(cancel.clone(), *stopwatch)?;
    batch(&cancel)?;
    if cancel.is_cancelled() {
        return Err(seqforge::Error::Cancelled.into());
    }
    println!("\nElapsed time: {}", format_elapsed(stopwatch.elapsed()));
    Ok(())
}

/// Cancel `cancel` on SIGINT or SIGQUIT; exit on the second signal.
///
/// Runs a current-thread runtime on its own thread; the batch itself stays
/// synchronous and polls the token.
fn spawn_signal_watcher(cancel: CancelToken, stopwatch: Stopwatch) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start signal runtime")?;

    std::thread::Builder::new()
        .name("signal-watcher".to_string())
        .spawn(move || {
            rt.block_on(async {
                let name = wait_for_signal().await;
                tracing::warn!("Caught signal {}: stopping", name);
                cancel.cancel();

                let name = wait_for_signal().await;
                tracing::warn!("Caught signal {} again: exiting", name);
                println!("\nInterrupted. Elapsed time: {}", format_elapsed(stopwatch.elapsed()));
                std::process::exit(EXIT_INTERRUPTED);
            })
        })
        .context("Failed to spawn signal watcher")?;

    Ok(())
}

async fn wait_for_signal() -> &'static str {
    use tokio::signal;

    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let quit = async {
        match signal::unix::signal(signal::unix::SignalKind::quit()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGQUIT handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let quit = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = quit => "SIGQUIT",
    }
}

fn run_check(
    config: &Config,
    input: &Path,
    force_tars: bool,
    integrity: bool,
    json: bool,
    cancel: &CancelToken,
) -> Result<()> {
    let kind = listing::input_dir_type(input);
    if kind == InputDirType::Nonexistent {
        anyhow::bail!("Input folder does not exist: {:?}", input);
    }

    let files = if force_tars || kind == InputDirType::Tars {
        let tars = listing::list_files(input, "tar")?;
        println!("CHECK_TARS: {} TAR files found", tars.len());
        if tars.is_empty() {
            anyhow::bail!("No TAR files found in {:?}", input);
        }
        let tar = config.tools.resolve("tar")?;
        listing::list_tar_contents(&tar, &tars, cancel)?
    } else {
        println!("CHECK_FILES: Checking {}", input.display());
        listing::list_files_recursive(input, cancel)?
    };

    let validation = if integrity {
        if kind != InputDirType::Extraction {
            anyhow::bail!("Integrity checks need an extracted dataset: {:?}", input);
        }
        let pngcheck = config.tools.resolve("pngcheck")?;
        Some(IntegrityContext::standard(
            input,
            pngcheck,
            &config.check.metadata_key,
        ))
    } else {
        None
    };

    let options = CheckOptions::from(&config.check);
    let report = check::check_files(&files, input, &options, validation.as_ref(), cancel)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render(config.check.display_run_limit));
    }
    Ok(())
}

fn run_extract(
    config: &Config,
    tar_dir: &Path,
    out: Option<&Path>,
    from: usize,
    to: usize,
    options: ExtractOptions,
    cancel: &CancelToken,
) -> Result<()> {
    let tars = listing::list_files(tar_dir, "tar")?;
    println!("EXTRACT: {} TAR files found", tars.len());
    if tars.is_empty() {
        anyhow::bail!("No TAR files found in {:?}", tar_dir);
    }

    let dest = extract::extract_folder_for(tar_dir, out.unwrap_or(Path::new(".")));
    println!("Extract Folder (Images/Frames/Meta): {}", dest.display());

    let tar = config.tools.resolve("tar")?;
    let window = extract::tar_window(tars.len(), from, to);
    let count = extract::extract_tars(
        &tar,
        &tars,
        &dest,
        window,
        options,
        config.archive.platform(),
        cancel,
    )?;
    println!("Extracted {} of {} TAR files", count, tars.len());
    Ok(())
}

fn out_dir(input: &Path, out: Option<&Path>) -> PathBuf {
    out.unwrap_or(input).to_path_buf()
}

fn run_sheets(
    config: &Config,
    input: &Path,
    out: Option<&Path>,
    from: u32,
    to: u32,
    cancel: &CancelToken,
) -> Result<()> {
    let pngs = listing::list_files(&input.join(IMAGES_DIR), "png")?;
    let selected = listing::limit_range(pngs.clone(), from, to);
    if selected.len() == pngs.len() {
        println!("SHEETS: {} PNG files found", pngs.len());
    } else {
        println!(
            "SHEETS: {}/{} PNG files to be processed",
            selected.len(),
            pngs.len()
        );
    }
    if selected.is_empty() {
        return Ok(());
    }

    let gm = config.tools.resolve("gm")?;
    let dest = out_dir(input, out).join(SHEETS_DIR);
    let pages = sheets::create_contact_sheets(&gm, &selected, &dest, &config.sheets, cancel)?;
    println!("Wrote {} sheets to {}", pages.len(), dest.display());
    Ok(())
}

fn run_movies(
    config: &Config,
    input: &Path,
    out: Option<&Path>,
    from: u32,
    to: u32,
    cancel: &CancelToken,
) -> Result<()> {
    let folders = listing::list_numeric_dirs(&input.join(FRAMES_DIR))?;
    let selected = listing::limit_range(folders.clone(), from, to);
    if selected.len() == folders.len() {
        println!("MOVIES: {} animation folders found", folders.len());
    } else {
        println!(
            "MOVIES: {}/{} animation folders to be processed",
            selected.len(),
            folders.len()
        );
    }
    if selected.is_empty() {
        return Ok(());
    }

    let ffmpeg = config.tools.resolve("ffmpeg")?;
    let dest = out_dir(input, out).join(MOVIES_DIR);
    let written = movies::create_movies(&ffmpeg, &selected, &dest, &config.movies, cancel)?;
    println!("Wrote {} movies to {}", written.len(), dest.display());
    Ok(())
}

fn run_archive(
    config: &Config,
    input: &Path,
    out: Option<&Path>,
    targets: &str,
    cancel: &CancelToken,
) -> Result<()> {
    let targets = archive::parse_targets(targets);
    if targets.is_empty() {
        let all: Vec<&str> = archive::ArchiveTarget::ALL.iter().map(|t| t.name()).collect();
        println!("ARCHIVE: no valid targets given ({}, all)", all.join(", "));
        return Ok(());
    }
    let names: Vec<&str> = targets.iter().map(|t| t.name()).collect();
    println!("ARCHIVE: {}", names.join(", "));

    let mode = if config.archive.numbered {
        ArchiveMode::Numbered
    } else {
        ArchiveMode::Combined
    };
    let zip = config.tools.resolve("zip")?;
    let split = if mode == ArchiveMode::Numbered {
        config.tools.resolve("split")?
    } else {
        PathBuf::from("split")
    };
    let splitter = Splitter::new(
        zip,
        split,
        config.archive.part_size.as_str(),
        mode,
        config.archive.platform(),
    );

    let dest = out_dir(input, out);
    for (target, outcome) in archive::archive_targets(&splitter, &targets, input, &dest, cancel)? {
        match outcome {
            ArchiveOutcome::Skipped { folder } => {
                println!("Archiving {}: Skipping. Folder doesn't exist: {}", target, folder.display());
            }
            ArchiveOutcome::Written { parts } => {
                println!("Archiving {}: {} part(s)", target, parts.len());
                for part in parts {
                    println!("  {}", part.display());
                }
            }
        }
    }
    Ok(())
}

fn print_sample(count: Option<u32>, step: Option<u32>, round: bool, from: u32, to: u32) -> Result<()> {
    if to < from {
        anyhow::bail!("--to ({}) is below --from ({})", to, from);
    }
    let picks = match (count, step) {
        (_, Some(step)) if round => sample::pick_round(step, from, to),
        (_, Some(step)) => sample::pick_step(step, from, to),
        (count, None) => sample::pick_count(count.unwrap_or(10), from, to),
    };
    println!("{}", sample::format_numbers(&picks));
    Ok(())
}

fn check_tools() -> Result<()> {
    let tools = seqforge_av::check_tools();
    for tool in &tools {
        println!("{}", tool);
    }

    let missing = tools.iter().filter(|t| !t.available).count();
    if missing == 0 {
        println!("\nAll {} tools found", tools.len());
    } else {
        println!(
            "\n{} of {} tools missing; the commands listed next to them will fail",
            missing,
            tools.len()
        );
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Expected images: {}", config.check.images);
    println!("  Frames per animation: {}", config.check.frames);
    println!("  Archive part size: {}", config.archive.part_size);
    println!(
        "  Archive naming: {}",
        if config.archive.numbered { "numbered (.zip.001)" } else { "combined (.z01, .zip)" }
    );
    println!("  Platform: {}", config.archive.platform());
    println!("  Movie codec: {:?}", config.movies.codec);

    Ok(())
}
