use crate::{
    config::LoopConfig,
    error::{LoopsmithError, LoopsmithResult},
    ingest::{self, ImageRecord},
    tree::{FileTree, FolderNode, LeafNode, Payload},
};

pub mod runtime;
pub mod template;

use runtime::RuntimeAssets;
use template::{
    ENTRY_FILE_NAME, EntryDocument, OverlayRef, PLAYER_FILE_NAME, SRC_DIR_NAME, SlideRef,
    STYLESHEET_FILE_NAME, VENDOR_FILE_NAME, sanitize_file_name, sanitize_title, stylesheet,
};

/// An auxiliary image lifted out of the rotation by the orchestration layer.
/// The builder never infers which file this is.
#[derive(Clone, Debug)]
pub struct OverlayImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl OverlayImage {
    pub fn data_uri(&self) -> String {
        ingest::encode_data_uri(&self.mime, &self.bytes)
    }
}

/// Everything one artifact build reads. Identical input always yields an
/// identical tree; nothing here carries a timestamp.
#[derive(Clone, Debug)]
pub struct BuildInput<'a> {
    pub folder_name: &'a str,
    pub images: &'a [ImageRecord],
    pub overlay: Option<&'a OverlayImage>,
    /// Width probed from the first image; drives the stylesheet constraint.
    pub layout_width: u32,
    pub config: &'a LoopConfig,
    pub runtime: &'a RuntimeAssets,
}

/// Assemble the artifact file tree: entry document, `src/` assets, and one
/// leaf per image under its deterministic generated name.
pub fn build(input: &BuildInput<'_>) -> LoopsmithResult<FileTree> {
    if input.images.is_empty() {
        return Err(LoopsmithError::NoImages);
    }

    let config = embedded_config(input);
    let document = EntryDocument {
        title: sanitize_title(input.folder_name),
        slides: external_slide_refs(input.images),
        overlay: input.overlay.map(|overlay| OverlayRef {
            src: sanitize_file_name(&overlay.file_name),
        }),
        config_literal: config_literal(&config)?,
    };

    let mut src = FolderNode::new(SRC_DIR_NAME);
    src.insert(FileTree::Leaf(LeafNode {
        name: STYLESHEET_FILE_NAME.to_string(),
        mime: "text/css".to_string(),
        payload: Payload::Text(stylesheet(input.layout_width)),
        original_name: None,
    }));
    src.insert(FileTree::Leaf(LeafNode {
        name: PLAYER_FILE_NAME.to_string(),
        mime: "application/javascript".to_string(),
        payload: Payload::Text(input.runtime.player_script.to_string()),
        original_name: None,
    }));
    src.insert(FileTree::Leaf(LeafNode {
        name: VENDOR_FILE_NAME.to_string(),
        mime: "application/javascript".to_string(),
        payload: Payload::Text(input.runtime.vendor_script.clone()),
        original_name: None,
    }));

    let mut root = FolderNode::new(input.folder_name);
    root.insert(FileTree::Leaf(LeafNode {
        name: ENTRY_FILE_NAME.to_string(),
        mime: "text/html".to_string(),
        payload: Payload::Text(document.render()),
        original_name: None,
    }));
    root.insert(FileTree::Folder(src));

    for record in input.images {
        root.insert(FileTree::Leaf(LeafNode {
            name: record.artifact_file_name(),
            mime: format!("image/{}", record.extension),
            payload: Payload::Binary(record.bytes.clone()),
            original_name: Some(record.original_name.clone()),
        }));
    }

    if let Some(overlay) = input.overlay {
        root.insert(FileTree::Leaf(LeafNode {
            name: sanitize_file_name(&overlay.file_name),
            mime: overlay.mime.clone(),
            payload: Payload::Binary(overlay.bytes.clone()),
            original_name: Some(overlay.file_name.clone()),
        }));
    }

    Ok(FileTree::Folder(root))
}

/// Single self-contained document: assets inlined, every image a data URI.
/// Shares the template model and config literal with [`build`].
pub fn build_preview(input: &BuildInput<'_>) -> LoopsmithResult<String> {
    if input.images.is_empty() {
        return Err(LoopsmithError::NoImages);
    }

    let config = embedded_config(input);
    let document = EntryDocument {
        title: sanitize_title(input.folder_name),
        slides: input
            .images
            .iter()
            .map(|record| SlideRef {
                src: record.data_uri(),
                alt: record.alt_text.clone(),
            })
            .collect(),
        overlay: input.overlay.map(|overlay| OverlayRef {
            src: overlay.data_uri(),
        }),
        config_literal: config_literal(&config)?,
    };

    Ok(document.render_inline(
        &stylesheet(input.layout_width),
        &input.runtime.vendor_script,
        input.runtime.player_script,
    ))
}

/// The exact config the artifact embeds: the caller's settings, coerced, with
/// the overlay toggle reflecting whether an overlay leaf exists.
fn embedded_config(input: &BuildInput<'_>) -> LoopConfig {
    let mut config = input.config.clone().normalized();
    config.overlay_toggle = input.overlay.is_some();
    config.slide_captions = false;
    config
}

fn config_literal(config: &LoopConfig) -> LoopsmithResult<String> {
    serde_json::to_string_pretty(config).map_err(|err| LoopsmithError::serde(err.to_string()))
}

fn external_slide_refs(images: &[ImageRecord]) -> Vec<SlideRef> {
    images
        .iter()
        .map(|record| SlideRef {
            src: record.artifact_file_name(),
            alt: record.alt_text.clone(),
        })
        .collect()
}
