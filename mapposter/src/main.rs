use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use mapposter_rs::mapposter_canvas2d::FontConfig;
use mapposter_rs::styles::STYLES;
use mapposter_rs::{
    compose, BasemapProvider, ComposeOptions, Design, ExportFormat, ExportRequest, ExportState,
    Exporter, FallbackProvider, FontLibrary, ImageFileProvider, PlaceholderProvider, SizePreset,
    StaticMapProvider,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// mapposter: Compose and export personalized map posters
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a design to one or more files
    Export(ExportArgs),

    /// Check that a design file is valid
    Validate {
        /// Path to the design JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the composed scene as JSON
    Scene {
        /// Path to the design JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List available map styles
    Styles,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Path to the design JSON file
    #[arg(short, long)]
    input: PathBuf,

    /// Output format: png, jpeg or pdf. May be repeated
    #[arg(short, long = "format", default_value = "png")]
    formats: Vec<String>,

    /// Size preset: web, 8x10, 11x14, 12x16, 16x20, 18x24 or 24x36
    #[arg(short, long, default_value = "12x16")]
    size: String,

    /// Print resolution in dots per inch (ignored for the web preset)
    #[arg(long, default_value_t = mapposter_rs::export::DEFAULT_DPI)]
    dpi: u32,

    /// Directory to write artifacts into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Static map URL template for basemap imagery
    #[arg(long)]
    basemap_url: Option<String>,

    /// Local image used as basemap imagery
    #[arg(long)]
    basemap_file: Option<PathBuf>,

    /// Additional directory to load fonts from. May be repeated
    #[arg(long)]
    font_dir: Vec<PathBuf>,

    /// Do not scan system fonts
    #[arg(long)]
    no_system_fonts: bool,

    /// Text stamped along the bottom edge
    #[arg(long)]
    watermark: Option<String>,
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn read_design(path: &Path) -> anyhow::Result<Design> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read design file: {}", path.display()))?;
    Design::from_json(&json).with_context(|| format!("Invalid design: {}", path.display()))
}

fn basemap_provider(args: &ExportArgs) -> anyhow::Result<Arc<dyn BasemapProvider>> {
    let remote = args
        .basemap_url
        .as_ref()
        .map(|url| StaticMapProvider::new(url.clone()))
        .transpose()?
        .map(|provider| Arc::new(provider) as Arc<dyn BasemapProvider>);
    let local = args
        .basemap_file
        .as_ref()
        .map(|path| Arc::new(ImageFileProvider::new(path)) as Arc<dyn BasemapProvider>);

    Ok(match (remote, local) {
        (Some(remote), Some(local)) => Arc::new(FallbackProvider::new(remote, local)),
        (Some(provider), None) | (None, Some(provider)) => provider,
        (None, None) => Arc::new(PlaceholderProvider),
    })
}

async fn run_export(args: ExportArgs) -> anyhow::Result<()> {
    let design = read_design(&args.input)?;
    let size: SizePreset = args.size.parse()?;
    let requests = args
        .formats
        .iter()
        .map(|format| -> anyhow::Result<ExportRequest> {
            let format: ExportFormat = format.parse()?;
            Ok(ExportRequest::new(format, size, args.dpi))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let fonts = FontLibrary::new(&FontConfig {
        load_system_fonts: !args.no_system_fonts,
        font_dirs: args.font_dir.clone(),
        ..Default::default()
    });
    let exporter = Exporter::new(Arc::new(fonts), basemap_provider(&args)?).with_observer(
        Arc::new(|state: ExportState| log::info!(target: "mapposter", "export {}", state)),
    );

    let scene = compose(
        &design,
        &ComposeOptions {
            watermark: args.watermark.clone(),
        },
    );

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            args.output_dir.display()
        )
    })?;

    let mut failures = 0;
    for result in exporter.export_all(&scene, &requests).await {
        match result {
            Ok(artifact) => {
                for warning in &artifact.warnings {
                    eprintln!("warning: {}", warning);
                }
                let path = args.output_dir.join(&artifact.filename);
                std::fs::write(&path, &artifact.bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "{} ({}x{} px)",
                    path.display(),
                    artifact.width,
                    artifact.height
                );
            }
            Err(err) => {
                eprintln!("{}", err);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} exports failed", failures, requests.len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Export(args) => run_export(args).await?,
        Commands::Validate { input } => {
            let design = read_design(&input)?;
            println!(
                "{}: valid ({} frame, {} style)",
                design.location.name.replace('\n', " "),
                design.frame.shape,
                design.map.style
            );
        }
        Commands::Scene { input, pretty } => {
            let design = read_design(&input)?;
            let scene = compose(&design, &ComposeOptions::default());
            let json = if pretty {
                serde_json::to_string_pretty(&scene)
            } else {
                serde_json::to_string(&scene)
            }
            .map_err(|err| anyhow!("Failed to serialize scene: {}", err))?;
            println!("{}", json);
        }
        Commands::Styles => {
            for style in STYLES {
                println!("{}\t{}\t{}", style.id, style.name, style.background);
            }
        }
    }

    Ok(())
}
