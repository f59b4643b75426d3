use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "layerstack", version)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a layered PSD from a manifest.
    Save(SaveArgs),
    /// Flatten a manifest into a PNG preview.
    Preview(PreviewArgs),
    /// Print the canvas and layer table of a PSD as JSON.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct SaveArgs {
    /// Input manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Override `output.directory`.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Override `output.filename` (without extension).
    #[arg(long)]
    name: Option<String>,

    /// Replace an existing file instead of picking a free `_N` suffix.
    #[arg(long)]
    overwrite: bool,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Split compositing rows across worker threads.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input PSD.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Save(args) => cmd_save(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_manifest(
    path: &Path,
) -> anyhow::Result<(layerstack::DocumentManifest, layerstack::Document)> {
    let manifest = layerstack::DocumentManifest::from_path(path)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    let doc = manifest.load_document(root)?;
    Ok((manifest, doc))
}

fn cmd_save(args: SaveArgs) -> anyhow::Result<()> {
    let (manifest, doc) = load_manifest(&args.manifest)?;

    let mut opts = manifest.output;
    if let Some(dir) = args.out_dir {
        opts.directory = dir;
    } else if opts.directory.is_relative() {
        let root = args.manifest.parent().unwrap_or_else(|| Path::new("."));
        opts.directory = root.join(&opts.directory);
    }
    if let Some(name) = args.name {
        opts.filename = name;
    }
    opts.overwrite |= args.overwrite;

    let path = layerstack::save_document(&doc, &opts, &mut layerstack::PsdCodec::new())?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let (_, doc) = load_manifest(&args.manifest)?;
    let opts = layerstack::CompositeOpts {
        parallel: args.parallel,
        threads: args.threads,
    };
    layerstack::save_preview_png_with(&doc, &args.out, &opts)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read '{}'", args.in_path.display()))?;
    let doc = layerstack::deserialize(&bytes, &mut layerstack::PsdCodec::new())?;

    let canvas = doc.canvas_size();
    let layers: Vec<serde_json::Value> = doc
        .layers()
        .iter()
        .map(|l| {
            serde_json::json!({
                "name": l.name(),
                "blend_mode": l.blend_mode(),
                "opacity": l.opacity().to_u8(),
                "width": l.size().width,
                "height": l.size().height,
                "digest": format!("{:016x}", l.pixels().digest()),
            })
        })
        .collect();
    let out = serde_json::json!({
        "canvas": canvas,
        "layers": layers,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
