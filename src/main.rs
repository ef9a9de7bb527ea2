#![cfg(feature = "cli")]
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use log::{info, warn, LevelFilter};

use rscpix::config::TitanConfig;
use rscpix::cpix::CpixDocument;
use rscpix::drm::DrmRegistry;
use rscpix::json::JsonExporter;
use rscpix::titan::TitanExporter;
use rscpix::utils::{
    json_output_path, spliced_preset_output_path, titan_output_path, write_output,
};

#[derive(Parser)]
#[command(name = "rscpix", version, about = "CPIX document converter")]
struct Cli {
    #[arg(short = 'd', long = "debug", action = ArgAction::SetTrue)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Export a CPIX document as JSON.
    ///
    /// Writes next to the document with a `.json` extension unless
    /// `--output` is given.
    Json {
        cpix_path: PathBuf,
        #[arg(short = 'p', long = "pretty", action = ArgAction::SetTrue)]
        pretty: bool,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Export a Titan File `commonencryption` preset fragment.
    Titan {
        cpix_path: PathBuf,
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Replace the `commonencryption` section of a Titan File .kpreset.
    ///
    /// The original preset is left untouched; the result is written to
    /// `<preset>_cpix.kpreset` unless `--output` is given.
    Splice {
        cpix_path: PathBuf,
        preset_path: PathBuf,
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Print the keys, DRM systems and usage rules of a CPIX document.
    Inspect { cpix_path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Json {
            cpix_path,
            pretty,
            output,
        } => run_json(&cpix_path, pretty, output.as_deref()),
        Commands::Titan {
            cpix_path,
            config,
            output,
        } => run_titan(&cpix_path, config.as_deref(), output.as_deref()),
        Commands::Splice {
            cpix_path,
            preset_path,
            config,
            output,
        } => run_splice(&cpix_path, &preset_path, config.as_deref(), output.as_deref()),
        Commands::Inspect { cpix_path } => run_inspect(&cpix_path),
    }
}

fn load_document(path: &Path) -> anyhow::Result<CpixDocument> {
    let doc = CpixDocument::from_path(path)
        .with_context(|| format!("Failed to parse CPIX document {}", path.display()))?;
    info!(
        "[+] Loaded CPIX document ({} keys, {} DRM systems, {} usage rules)",
        doc.content_keys().len(),
        doc.drm_systems().len(),
        doc.usage_rules().len()
    );
    Ok(doc)
}

fn load_exporter(config: Option<&Path>) -> anyhow::Result<TitanExporter> {
    let config = match config {
        Some(path) => TitanConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TitanConfig::default(),
    };
    Ok(TitanExporter::new(DrmRegistry::default(), config))
}

fn run_json(cpix_path: &Path, pretty: bool, output: Option<&Path>) -> anyhow::Result<()> {
    let doc = load_document(cpix_path)?;
    let exporter = JsonExporter::default();
    let json = if pretty {
        exporter.to_json_pretty(&doc)?
    } else {
        exporter.to_json(&doc)?
    };

    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| json_output_path(cpix_path));
    write_output(&out_path, &json).context("Failed to write JSON")?;
    info!("[+] Saved to: {}", out_path.display());
    Ok(())
}

fn run_titan(cpix_path: &Path, config: Option<&Path>, output: Option<&Path>) -> anyhow::Result<()> {
    let doc = load_document(cpix_path)?;
    let xml = load_exporter(config)?.to_titan_xml(&doc)?;

    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| titan_output_path(cpix_path));
    write_output(&out_path, &xml).context("Failed to write Titan preset")?;
    info!("[+] Saved to: {}", out_path.display());
    Ok(())
}

fn run_splice(
    cpix_path: &Path,
    preset_path: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let doc = load_document(cpix_path)?;
    let host = std::fs::read_to_string(preset_path)
        .with_context(|| format!("Failed to read preset {}", preset_path.display()))?;

    let spliced = load_exporter(config)?
        .to_titan_xml_spliced(&doc, &host)
        .with_context(|| format!("Failed to update preset {}", preset_path.display()))?;

    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| spliced_preset_output_path(preset_path));
    if out_path == preset_path {
        anyhow::bail!("Refusing to overwrite the input preset '{}'", preset_path.display());
    }
    write_output(&out_path, &spliced).context("Failed to write preset")?;
    info!("[+] Saved to: {}", out_path.display());
    Ok(())
}

fn run_inspect(cpix_path: &Path) -> anyhow::Result<()> {
    let doc = load_document(cpix_path)?;
    let registry = DrmRegistry::default();

    for key in doc.content_keys() {
        info!("[KEY] {}:{}", key.kid, key.key_hex());
        for drm in doc.find_drm_systems(&key.kid) {
            info!(
                " + {} ({}) pssh_data: {} chars",
                registry.name_for(&drm.system_id),
                drm.system_id,
                drm.pssh_data.len()
            );
        }
        match doc.find_usage_rule(&key.kid) {
            Some(rule) => info!(
                " + usage rule: pixels {}..{}, audio: {}",
                rule.video_filter.min_pixels, rule.video_filter.max_pixels, rule.audio_filter
            ),
            None => info!(" + no usage rule"),
        }
    }

    for kid in doc.orphan_kids() {
        warn!("[-] kid {} has no content key", kid);
    }
    Ok(())
}
