mod cli;

use clipforge::{config, pipeline::Concatenator, server, PipelineError};
use clipforge_av::{ToolSource, TransitionKind, TransitionSpec};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag.
    // Logs go to stderr: stdout carries tool traffic in `serve` mode.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "clipforge=trace,clipforge_av=trace".to_string()
        } else {
            "clipforge=debug,clipforge_av=debug".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(server::serve_stdio(&config))
        }
        Commands::Concat {
            clips,
            transition,
            duration,
            output,
        } => concat_clips(
            &clips,
            transition.as_deref(),
            duration,
            output.as_deref(),
            cli.config.as_deref(),
        ),
        Commands::Normalize { clips, out_dir } => {
            normalize_clips(&clips, &out_dir, cli.config.as_deref())
        }
        Commands::Probe { file, json } => probe_file(&file, json, cli.config.as_deref()),
        Commands::Transitions => list_transitions(),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("clipforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Print the structured report for a failed pipeline run, then fail.
fn fail(err: PipelineError) -> anyhow::Error {
    println!("{}", err.report().to_json());
    err.into()
}

fn concat_clips(
    clips: &[PathBuf],
    transition: Option<&str>,
    duration: Option<f64>,
    output: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let style = transition.unwrap_or(config.transition.kind.name());
    let duration = duration.unwrap_or(config.transition.duration_secs);
    let spec = TransitionSpec::parse(style, duration)
        .map_err(|e| fail(PipelineError::input(e.to_string())))?;

    let concatenator = Concatenator::from_config(&config);
    let report = concatenator
        .concatenate(clips, &spec, output)
        .map_err(fail)?;

    for dropped in &report.clips_dropped {
        eprintln!(
            "Skipped clip {} ({}): {}",
            dropped.source_index,
            dropped.source_path.display(),
            dropped.reason
        );
    }
    if let Some(ref e) = report.cleanup_error {
        eprintln!("Warning: workspace cleanup failed: {}", e);
    }

    println!("{}", report.output_path.display());
    Ok(())
}

fn normalize_clips(clips: &[PathBuf], out_dir: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let outcome = Concatenator::from_config(&config)
        .normalize(clips, out_dir)
        .map_err(fail)?;

    for clip in &outcome.clips {
        println!("{}", clip.output_path.display());
    }
    for dropped in &outcome.dropped {
        eprintln!(
            "Skipped clip {} ({}): {}",
            dropped.source_index,
            dropped.source_path.display(),
            dropped.reason
        );
    }

    Ok(())
}

fn probe_file(file: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let media_info = Concatenator::from_config(&config)
        .inspect(file)
        .map_err(fail)?;

    if json {
        let json_str = serde_json::to_string_pretty(&media_info)?;
        println!("{}", json_str);
    } else {
        println!("File: {}", media_info.file_path.display());
        println!("Container: {}", media_info.container);
        println!("Size: {} bytes", media_info.file_size);
        if let Some(ref duration) = media_info.duration {
            let secs = duration.as_secs_f64();
            let whole = secs as u64;
            println!(
                "Duration: {:02}:{:02}:{:06.3}",
                whole / 3600,
                (whole / 60) % 60,
                secs % 60.0
            );
        }

        println!("\nVideo Tracks: {}", media_info.video_tracks.len());
        for (i, track) in media_info.video_tracks.iter().enumerate() {
            print!("  [{}] {} {}x{}", i, track.codec, track.width, track.height);
            if let Some(fps) = track.frame_rate {
                print!(" {:.3} fps", fps);
            }
            println!();
        }

        println!("\nAudio Tracks: {}", media_info.audio_tracks.len());
        for (i, track) in media_info.audio_tracks.iter().enumerate() {
            print!("  [{}] {} {}ch", i, track.codec, track.channels);
            if let Some(rate) = track.sample_rate {
                print!(" {} Hz", rate);
            }
            println!();
        }
    }

    Ok(())
}

fn list_transitions() -> Result<()> {
    for kind in TransitionKind::ALL {
        println!("{}", kind);
    }
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Checking external tools...\n");

    let mut all_ok = true;
    for name in clipforge_av::REQUIRED_TOOLS {
        let configured = config.tools.configured_path(name);
        match clipforge_av::resolve_tool(name, configured) {
            Ok(tool) => {
                print!("✓ {}", tool.name);
                if let Some(version) = tool.version() {
                    print!(" ({})", version);
                }
                print!(" - {}", tool.path.display());
                if tool.source == ToolSource::Configured {
                    print!(" [configured]");
                }
                println!();
            }
            Err(_) => {
                all_ok = false;
                print!("✗ {}", name);
                if let Some(path) = configured {
                    print!(" (configured path {} missing)", path.display());
                }
                println!();
            }
        }
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to enable all features.");
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
            config::Config::default()
        }
    };

    let profile = config.normalization.profile();
    println!(
        "  Profile: {}x{} @ {} fps, crf {}, {} preset",
        profile.width,
        profile.height,
        profile.frame_rate,
        profile.quality_factor,
        profile.speed_preset.ffmpeg_name()
    );
    println!(
        "  Audio: aac {} @ {} Hz",
        profile.audio_bitrate, profile.audio_sample_rate
    );
    println!(
        "  Transition: {} ({}s)",
        config.transition.kind, config.transition.duration_secs
    );
    println!("  Workers: {}", config.normalization.worker_count());
    println!("  Workspace: {}", config.workspace.root.display());
    println!("  Output: {}", config.workspace.default_output().display());

    Ok(())
}
