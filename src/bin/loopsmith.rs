use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use loopsmith::{
    BatchOptions, FileTree, FilterConfig, LoopConfig, Payload, RawFile, RuntimeAssets,
    SourceFolder, preview_folder, process_batch,
};

#[derive(Parser, Debug)]
#[command(name = "loopsmith", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build one loop artifact folder per input folder.
    Build(BuildArgs),
    /// Render one folder as a single self-contained preview document.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Output directory; one artifact folder is written per input folder.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    common: CommonArgs,

    /// Input folders, one loop each.
    #[arg(required = true)]
    folders: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Output HTML file.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    common: CommonArgs,

    /// Input folder.
    folder: PathBuf,
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Comma-separated substrings; any filename containing one is skipped.
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Disable autoplay in the generated artifact.
    #[arg(long)]
    no_autoplay: bool,

    /// Crossfade duration between slides, in milliseconds.
    #[arg(long, default_value_t = 100)]
    speed: u32,

    /// Dwell time per slide before auto-advance, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pause: u32,

    /// Filename of an overlay image to lift out of the rotation.
    #[arg(long)]
    overlay: Option<String>,

    /// Path to a jquery.min.js to bundle; a placeholder is emitted when absent.
    #[arg(long)]
    vendor_js: Option<PathBuf>,
}

impl CommonArgs {
    fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            filter: FilterConfig::default().with_excludes(self.exclude.iter().cloned()),
            config: LoopConfig {
                autoplay: !self.no_autoplay,
                transition_speed_ms: self.speed,
                pause_duration_ms: self.pause,
                ..LoopConfig::default()
            },
            overlay_name: self.overlay.clone(),
        }
    }

    fn runtime(&self) -> RuntimeAssets {
        RuntimeAssets::load(self.vendor_js.as_deref())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let opts = args.common.batch_options();
    let runtime = args.common.runtime();

    let folders = args
        .folders
        .iter()
        .map(|path| read_folder(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let built = process_batch(&folders, &runtime, &opts);
    if built.is_empty() {
        eprintln!("no loops generated");
        return Ok(());
    }

    fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;
    for result in &built {
        write_tree(&result.tree, &args.out)?;
        eprintln!(
            "wrote {} ({} images)",
            args.out.join(&result.name).display(),
            result.image_count
        );
    }
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let opts = args.common.batch_options();
    let runtime = args.common.runtime();

    let folder = read_folder(&args.folder)?;
    let html = preview_folder(&folder, &runtime, &opts)
        .with_context(|| format!("preview folder '{}'", folder.name))?;

    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
    }
    fs::write(&args.out, html).with_context(|| format!("write '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

/// Flatten one directory tree into the raw-file tuples ingestion consumes.
fn read_folder(root: &Path) -> anyhow::Result<SourceFolder> {
    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("unusable folder name '{}'", root.display()))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk '{}'", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("relativize '{}'", entry.path().display()))?
            .to_string_lossy()
            .replace('\\', "/");
        let bytes = fs::read(entry.path())
            .with_context(|| format!("read '{}'", entry.path().display()))?;
        files.push(RawFile {
            relative_path: format!("{name}/{rel}"),
            bytes,
            declared_mime: String::new(),
        });
    }

    Ok(SourceFolder { name, files })
}

/// The packaging collaborator: materialize a built tree under `parent`.
fn write_tree(tree: &FileTree, parent: &Path) -> anyhow::Result<()> {
    match tree {
        FileTree::Folder(folder) => {
            let dir = parent.join(&folder.name);
            fs::create_dir_all(&dir)
                .with_context(|| format!("create dir '{}'", dir.display()))?;
            for child in folder.children.values() {
                write_tree(child, &dir)?;
            }
        }
        FileTree::Leaf(leaf) => {
            let path = parent.join(&leaf.name);
            match &leaf.payload {
                Payload::Text(text) => fs::write(&path, text),
                Payload::Binary(bytes) => fs::write(&path, bytes),
            }
            .with_context(|| format!("write '{}'", path.display()))?;
        }
    }
    Ok(())
}
