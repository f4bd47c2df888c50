#![forbid(unsafe_code)]

pub mod artifact;
pub mod batch;
pub mod config;
pub mod error;
pub mod ingest;
pub mod playback;
pub mod tree;

pub use artifact::{BuildInput, OverlayImage, build, build_preview, runtime::RuntimeAssets};
pub use batch::{
    BatchOptions, BuiltLoop, SourceFolder, group_by_folder, preview_folder, process_batch,
    process_folder,
};
pub use config::{FilterConfig, LoopConfig};
pub use error::{LoopsmithError, LoopsmithResult};
pub use ingest::{ImageRecord, RawFile, ingest, probe::ImageSize, probe::probe_layout_size};
pub use playback::{
    ControlKind, ControlRegistry, PlaybackSession, PlayerState, layout_max_width,
};
pub use tree::{FileTree, FolderNode, LeafNode, Payload, TreeFingerprint};
