use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::iter::Peekable;
use std::str::Chars;

use base64::Engine as _;

use crate::{
    config::FilterConfig,
    error::{LoopsmithError, LoopsmithResult},
};

pub mod probe;

/// Per-image size above which a playback warning is raised.
pub const LARGE_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
/// Total payload size above which a playback warning is raised.
pub const LARGE_TOTAL_BYTES: u64 = 50 * 1024 * 1024;

/// One raw input blob as delivered by the folder-enumeration collaborator.
#[derive(Clone, Debug)]
pub struct RawFile {
    /// Flat name or `folder/sub/name.ext` style relative path.
    pub relative_path: String,
    pub bytes: Vec<u8>,
    /// MIME type as declared by the source; may be empty.
    pub declared_mime: String,
}

/// One accepted, ordered image. Immutable once created; the builder reads it,
/// never rewrites it.
#[derive(Clone, Debug)]
pub struct ImageRecord {
    /// 1-based position in loop order, contiguous within one build.
    pub sequence_index: u32,
    pub original_name: String,
    /// Lower-cased, with `jpeg` canonicalized to `jpg`.
    pub extension: String,
    pub bytes: Vec<u8>,
    pub byte_size: u64,
    pub mime: String,
    pub alt_text: String,
}

impl ImageRecord {
    /// Deterministic filename the artifact stores this image under.
    pub fn artifact_file_name(&self) -> String {
        format!("image_{:03}.{}", self.sequence_index, self.extension)
    }

    /// Self-contained rendering of the payload for the inline preview.
    pub fn data_uri(&self) -> String {
        encode_data_uri(&self.mime, &self.bytes)
    }
}

pub(crate) fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Filter, order, and decode a folder's raw files into image records.
///
/// Ordering is natural filename order and is the sole determinant of
/// `sequence_index`. A single undecodable file rejects the whole folder so a
/// published loop never silently renumbers around a gap.
pub fn ingest(files: &[RawFile], filter: &FilterConfig) -> LoopsmithResult<Vec<ImageRecord>> {
    let mut accepted: Vec<Candidate<'_>> = files
        .iter()
        .filter_map(|file| Candidate::accept(file, filter))
        .collect();

    if accepted.is_empty() {
        return Err(LoopsmithError::empty_result(
            "every file was rejected by the image filter",
        ));
    }

    accepted.sort_by(|a, b| natural_cmp(&a.file_name, &b.file_name));

    let mut records = Vec::with_capacity(accepted.len());
    for (i, candidate) in accepted.into_iter().enumerate() {
        records.push(candidate.into_record(i as u32 + 1)?);
    }
    Ok(records)
}

struct Candidate<'a> {
    file: &'a RawFile,
    file_name: String,
    extension: String,
}

impl<'a> Candidate<'a> {
    fn accept(file: &'a RawFile, filter: &FilterConfig) -> Option<Self> {
        let name = file_name(&file.relative_path);
        let extension = normalized_extension(name)?;
        if !filter.accepted_extensions.contains(&extension) {
            return None;
        }
        if is_excluded(name, &filter.exclude_substrings) {
            return None;
        }
        Some(Self {
            file,
            file_name: name.to_string(),
            extension,
        })
    }

    fn into_record(self, sequence_index: u32) -> LoopsmithResult<ImageRecord> {
        if image::guess_format(&self.file.bytes).is_err() {
            return Err(LoopsmithError::decode(format!(
                "'{}' is not a recognizable image",
                self.file_name
            )));
        }
        let byte_size = self.file.bytes.len() as u64;
        Ok(ImageRecord {
            sequence_index,
            mime: derived_mime(&self.extension, &self.file.declared_mime),
            original_name: self.file_name,
            extension: self.extension,
            bytes: self.file.bytes.clone(),
            byte_size,
            alt_text: format!("Image {sequence_index}"),
        })
    }
}

/// Last path segment, so flat names and relative paths both work.
pub fn file_name(relative_path: &str) -> &str {
    relative_path
        .rsplit('/')
        .next()
        .unwrap_or(relative_path)
}

/// Lower-cased extension with `jpeg` canonicalized to `jpg`; `None` when the
/// name has no dot.
pub fn normalized_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    Some(if ext == "jpeg" { "jpg".to_string() } else { ext })
}

pub(crate) fn derived_mime(extension: &str, declared: &str) -> String {
    if declared.is_empty() {
        format!("image/{extension}")
    } else {
        declared.to_string()
    }
}

fn is_excluded(file_name: &str, tokens: &BTreeSet<String>) -> bool {
    let lower = file_name.to_lowercase();
    tokens
        .iter()
        .any(|token| lower.contains(&token.to_lowercase()))
}

/// Natural filename comparison: digit runs compare as numbers, everything
/// else compares case-insensitively, with a plain byte comparison breaking
/// full ties so the order stays total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ac), Some(bc)) => {
                if ac.is_ascii_digit() && bc.is_ascii_digit() {
                    let an = take_number(&mut ai);
                    let bn = take_number(&mut bi);
                    match an.cmp(&bn) {
                        Ordering::Equal => {}
                        unequal => return unequal,
                    }
                } else {
                    let al = ac.to_lowercase().next().unwrap_or(ac);
                    let bl = bc.to_lowercase().next().unwrap_or(bc);
                    match al.cmp(&bl) {
                        Ordering::Equal => {
                            ai.next();
                            bi.next();
                        }
                        unequal => return unequal,
                    }
                }
            }
        }
    }
}

fn take_number(chars: &mut Peekable<Chars<'_>>) -> u64 {
    let mut n: u64 = 0;
    while let Some(c) = chars.peek().copied() {
        let Some(digit) = c.to_digit(10) else { break };
        n = n.saturating_mul(10).saturating_add(u64::from(digit));
        chars.next();
    }
    n
}

/// Advisory checks over an ordered sequence; warnings, never failures.
pub fn validate_sequence(records: &[ImageRecord]) -> Vec<String> {
    let mut warnings = Vec::new();

    if records.len() < 2 {
        warnings.push("only one image found; the loop will be static".to_string());
    }

    let large = records
        .iter()
        .filter(|r| r.byte_size > LARGE_IMAGE_BYTES)
        .count();
    if large > 0 {
        warnings.push(format!(
            "{large} image(s) larger than {}; playback may stutter",
            format_byte_size(LARGE_IMAGE_BYTES)
        ));
    }

    let total: u64 = records.iter().map(|r| r.byte_size).sum();
    if total > LARGE_TOTAL_BYTES {
        warnings.push(format!(
            "total image payload is {}; consider optimizing for the web",
            format_byte_size(total)
        ));
    }

    let formats: BTreeSet<&str> = records.iter().map(|r| r.extension.as_str()).collect();
    if formats.len() > 1 {
        warnings.push("mixed image formats in one loop; prefer a consistent format".to_string());
    }

    warnings
}

pub fn format_byte_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut buf),
                image::ImageFormat::Png,
            )
            .unwrap();
        buf
    }

    fn raw(path: &str) -> RawFile {
        RawFile {
            relative_path: path.to_string(),
            bytes: png_bytes(2, 2),
            declared_mime: String::new(),
        }
    }

    fn png_filter() -> FilterConfig {
        FilterConfig::default()
    }

    #[test]
    fn sorts_by_name_and_assigns_contiguous_indices() {
        let files = vec![raw("loop/b.png"), raw("loop/a.png"), raw("loop/c.png")];
        let records = ingest(&files, &png_filter()).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.original_name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png", "c.png"]);
        let indices: Vec<u32> = records.iter().map(|r| r.sequence_index).collect();
        assert_eq!(indices, [1, 2, 3]);
        assert_eq!(records[0].alt_text, "Image 1");
    }

    #[test]
    fn natural_order_treats_digit_runs_numerically() {
        assert_eq!(natural_cmp("image_2.jpg", "image_10.jpg"), Ordering::Less);
        assert_eq!(natural_cmp("img2.png", "img10.png"), Ordering::Less);
        assert_eq!(natural_cmp("a01.png", "a1.png"), Ordering::Less);
        assert_eq!(natural_cmp("b.png", "a.png"), Ordering::Greater);
    }

    #[test]
    fn jpeg_normalizes_to_jpg() {
        assert_eq!(normalized_extension("photo.JPEG").as_deref(), Some("jpg"));
        assert_eq!(normalized_extension("photo.jpg").as_deref(), Some("jpg"));
        assert_eq!(normalized_extension("archive.tar.GZ").as_deref(), Some("gz"));
        assert_eq!(normalized_extension("no_extension"), None);
    }

    #[test]
    fn file_name_takes_last_path_segment() {
        assert_eq!(file_name("Texas/2024/img.png"), "img.png");
        assert_eq!(file_name("img.png"), "img.png");
    }

    #[test]
    fn exclusion_matches_substrings_not_exact_names() {
        let filter = png_filter().with_excludes(["CONUS.jpg".to_string()]);
        let files = vec![
            RawFile {
                relative_path: "loop/old_CONUS.jpg_backup.png".to_string(),
                bytes: png_bytes(1, 1),
                declared_mime: String::new(),
            },
            raw("loop/keep.png"),
        ];
        let records = ingest(&files, &filter).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original_name, "keep.png");
    }

    #[test]
    fn all_excluded_is_an_empty_result() {
        let filter = FilterConfig {
            accepted_extensions: ["jpg".to_string()].into_iter().collect(),
            ..FilterConfig::default()
        }
        .with_excludes(["NH.jpg".to_string()]);
        let file = RawFile {
            relative_path: "loop/NH.jpg".to_string(),
            bytes: png_bytes(1, 1),
            declared_mime: String::new(),
        };
        let err = ingest(&[file], &filter).unwrap_err();
        assert!(matches!(err, LoopsmithError::EmptyResult(_)));
    }

    #[test]
    fn unreadable_image_rejects_the_folder() {
        let files = vec![
            raw("loop/a.png"),
            RawFile {
                relative_path: "loop/b.png".to_string(),
                bytes: b"definitely not an image".to_vec(),
                declared_mime: String::new(),
            },
        ];
        let err = ingest(&files, &png_filter()).unwrap_err();
        assert!(matches!(err, LoopsmithError::Decode(_)));
    }

    #[test]
    fn artifact_file_names_are_zero_padded() {
        let files = vec![raw("loop/a.png")];
        let records = ingest(&files, &png_filter()).unwrap();
        assert_eq!(records[0].artifact_file_name(), "image_001.png");
    }

    #[test]
    fn declared_mime_wins_over_derived() {
        let mut file = raw("loop/a.jpg");
        file.declared_mime = "image/jpeg".to_string();
        file.bytes = png_bytes(1, 1);
        let records = ingest(&[file], &png_filter()).unwrap();
        assert_eq!(records[0].mime, "image/jpeg");

        let records = ingest(&[raw("loop/b.png")], &png_filter()).unwrap();
        assert_eq!(records[0].mime, "image/png");
    }

    #[test]
    fn data_uri_carries_mime_and_base64() {
        let records = ingest(&[raw("loop/a.png")], &png_filter()).unwrap();
        let uri = records[0].data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(uri.len() > "data:image/png;base64,".len());
    }

    #[test]
    fn single_image_sequence_warns_static() {
        let records = ingest(&[raw("loop/a.png")], &png_filter()).unwrap();
        let warnings = validate_sequence(&records);
        assert!(warnings.iter().any(|w| w.contains("static")));
    }

    #[test]
    fn mixed_formats_warn() {
        let mut gif = raw("loop/b.gif");
        // GIF89a header is enough for the format sniff.
        gif.bytes = b"GIF89a\x01\x00\x01\x00\x00\x00\x00".to_vec();
        let records = ingest(&[raw("loop/a.png"), gif], &png_filter()).unwrap();
        let warnings = validate_sequence(&records);
        assert!(warnings.iter().any(|w| w.contains("mixed")));
    }

    #[test]
    fn byte_sizes_render_human_readable() {
        assert_eq!(format_byte_size(0), "0 B");
        assert_eq!(format_byte_size(512), "512 B");
        assert_eq!(format_byte_size(5 * 1024 * 1024), "5.00 MiB");
    }
}
