use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::{
    artifact::{self, BuildInput, OverlayImage, runtime::RuntimeAssets},
    config::{FilterConfig, LoopConfig},
    error::{LoopsmithError, LoopsmithResult},
    ingest::{self, RawFile, probe},
    tree::FileTree,
};

/// One prospective artifact: a named folder plus its raw files.
#[derive(Clone, Debug)]
pub struct SourceFolder {
    pub name: String,
    pub files: Vec<RawFile>,
}

#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    pub filter: FilterConfig,
    pub config: LoopConfig,
    /// Filename of the overlay image, matched case-insensitively against the
    /// last path segment. `None` means no folder has an overlay.
    pub overlay_name: Option<String>,
}

/// One successfully built loop.
#[derive(Clone, Debug)]
pub struct BuiltLoop {
    pub name: String,
    pub tree: FileTree,
    pub image_count: usize,
    pub has_overlay: bool,
    pub warnings: Vec<String>,
}

/// Group a flat file list by its top-level path segment, one group per
/// prospective loop. Files without a folder component are dropped.
pub fn group_by_folder(files: Vec<RawFile>) -> Vec<SourceFolder> {
    let mut folders: BTreeMap<String, Vec<RawFile>> = BTreeMap::new();
    for file in files {
        let Some((folder, rest)) = file.relative_path.split_once('/') else {
            continue;
        };
        if folder.is_empty() || rest.is_empty() {
            continue;
        }
        folders.entry(folder.to_string()).or_default().push(file);
    }
    folders
        .into_iter()
        .map(|(name, files)| SourceFolder { name, files })
        .collect()
}

/// Ingest, probe, and build a single folder.
#[tracing::instrument(skip_all, fields(folder = %folder.name))]
pub fn process_folder(
    folder: &SourceFolder,
    runtime: &RuntimeAssets,
    opts: &BatchOptions,
) -> LoopsmithResult<BuiltLoop> {
    let (files, overlay) = split_overlay(&folder.files, opts.overlay_name.as_deref());

    let records = ingest::ingest(&files, &opts.filter)?;
    let warnings = ingest::validate_sequence(&records);
    for warning in &warnings {
        warn!(folder = %folder.name, "{warning}");
    }

    let first = records.first().ok_or(LoopsmithError::NoImages)?;
    let size = probe::probe_layout_size(first);

    let input = BuildInput {
        folder_name: &folder.name,
        images: &records,
        overlay: overlay.as_ref(),
        layout_width: size.width,
        config: &opts.config,
        runtime,
    };
    let tree = artifact::build(&input)?;

    Ok(BuiltLoop {
        name: folder.name.clone(),
        tree,
        image_count: records.len(),
        has_overlay: overlay.is_some(),
        warnings,
    })
}

/// Render a single folder as one self-contained preview document.
pub fn preview_folder(
    folder: &SourceFolder,
    runtime: &RuntimeAssets,
    opts: &BatchOptions,
) -> LoopsmithResult<String> {
    let (files, overlay) = split_overlay(&folder.files, opts.overlay_name.as_deref());

    let records = ingest::ingest(&files, &opts.filter)?;
    let first = records.first().ok_or(LoopsmithError::NoImages)?;
    let size = probe::probe_layout_size(first);

    let input = BuildInput {
        folder_name: &folder.name,
        images: &records,
        overlay: overlay.as_ref(),
        layout_width: size.width,
        config: &opts.config,
        runtime,
    };
    artifact::build_preview(&input)
}

/// Process every folder sequentially. A failing folder is logged and skipped;
/// it never blocks or corrupts its siblings. Zero successes is an empty,
/// non-error result.
pub fn process_batch(
    folders: &[SourceFolder],
    runtime: &RuntimeAssets,
    opts: &BatchOptions,
) -> Vec<BuiltLoop> {
    let mut built = Vec::new();
    for folder in folders {
        match process_folder(folder, runtime, opts) {
            Ok(result) => {
                info!(
                    folder = %result.name,
                    images = result.image_count,
                    overlay = result.has_overlay,
                    "generated loop"
                );
                built.push(result);
            }
            Err(err) => {
                warn!(folder = %folder.name, %err, "skipping folder");
            }
        }
    }
    built
}

/// Pull the externally-designated overlay file out before ingestion so
/// sequence assignment never sees it. First case-insensitive exact filename
/// match wins.
fn split_overlay(files: &[RawFile], overlay_name: Option<&str>) -> (Vec<RawFile>, Option<OverlayImage>) {
    let Some(wanted) = overlay_name else {
        return (files.to_vec(), None);
    };

    let mut overlay = None;
    let mut rest = Vec::with_capacity(files.len());
    for file in files {
        let name = ingest::file_name(&file.relative_path);
        if overlay.is_none() && name.eq_ignore_ascii_case(wanted) {
            let extension = ingest::normalized_extension(name).unwrap_or_default();
            overlay = Some(OverlayImage {
                file_name: name.to_string(),
                mime: ingest::derived_mime(&extension, &file.declared_mime),
                bytes: file.bytes.clone(),
            });
        } else {
            rest.push(file.clone());
        }
    }
    (rest, overlay)
}
