use tracing::debug;

use crate::ingest::ImageRecord;

/// Layout fallback when the first image cannot be measured.
pub const FALLBACK_WIDTH: u32 = 800;
pub const FALLBACK_HEIGHT: u32 = 600;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Measure the first image in sort order; this single measurement sizes the
/// whole artifact. Never fails: an unreadable image falls back to 800x600.
pub fn probe_layout_size(record: &ImageRecord) -> ImageSize {
    match image::load_from_memory(&record.bytes) {
        Ok(img) => ImageSize {
            width: img.width(),
            height: img.height(),
        },
        Err(err) => {
            debug!(name = %record.original_name, %err, "dimension probe failed, using fallback");
            ImageSize {
                width: FALLBACK_WIDTH,
                height: FALLBACK_HEIGHT,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(bytes: Vec<u8>) -> ImageRecord {
        ImageRecord {
            sequence_index: 1,
            original_name: "a.png".to_string(),
            extension: "png".to_string(),
            byte_size: bytes.len() as u64,
            bytes,
            mime: "image/png".to_string(),
            alt_text: "Image 1".to_string(),
        }
    }

    #[test]
    fn probe_reads_real_dimensions() {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 0, 0, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut buf),
                image::ImageFormat::Png,
            )
            .unwrap();

        let size = probe_layout_size(&record(buf));
        assert_eq!(size, ImageSize { width: 3, height: 2 });
        assert!((size.aspect_ratio() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn probe_falls_back_on_garbage() {
        let size = probe_layout_size(&record(b"not an image".to_vec()));
        assert_eq!(
            size,
            ImageSize {
                width: FALLBACK_WIDTH,
                height: FALLBACK_HEIGHT
            }
        );
    }
}
