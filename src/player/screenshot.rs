// Frame export
//
// Writes decoded frames as indexed PNG files. The canvas palette becomes the
// PNG palette, so the file keeps the exact palette indices of the frame.

use super::config::ExportConfig;
use crate::canvas::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FULL_HEIGHT, FULL_WIDTH, PALETTE_SIZE};
use crate::decoder::{Frame, FrameSink};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during frame export
#[derive(Debug)]
pub enum ScreenshotError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),
}

impl std::fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenshotError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenshotError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
        }
    }
}

impl std::error::Error for ScreenshotError {}

impl From<io::Error> for ScreenshotError {
    fn from(e: io::Error) -> Self {
        ScreenshotError::Io(e)
    }
}

impl From<png::EncodingError> for ScreenshotError {
    fn from(e: png::EncodingError) -> Self {
        ScreenshotError::PngEncoding(e)
    }
}

/// Write one frame as an indexed PNG
///
/// # Arguments
///
/// * `frame` - The frame to write
/// * `path` - Destination file
/// * `crop_border` - Write only the 294×204 area inside the border
pub fn save_frame_png(frame: &Frame<'_>, path: &Path, crop_border: bool) -> Result<(), ScreenshotError> {
    let (indices, width, height) = if crop_border {
        (frame.visible_pixels(), DISPLAY_WIDTH, DISPLAY_HEIGHT)
    } else {
        (frame.packed_pixels(), FULL_WIDTH, FULL_HEIGHT)
    };

    let mut palette = Vec::with_capacity(PALETTE_SIZE * 3);
    for index in 0..PALETTE_SIZE as u8 {
        palette.extend_from_slice(&frame.palette().to_rgb(index));
    }

    save_png(path, &indices, &palette, width as u32, height as u32)
}

/// Save the current frame under the configured output directory
///
/// Creates a directory structure like: <output_directory>/<source_name>/
///
/// # Returns
///
/// Result containing the path to the saved file or an error
pub fn save_screenshot(
    frame: &Frame<'_>,
    source_path: Option<&Path>,
    config: &ExportConfig,
) -> Result<PathBuf, ScreenshotError> {
    let dir = screenshot_directory(&config.output_directory, source_path);
    fs::create_dir_all(&dir)?;

    let filename = if config.include_timestamp {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        format!("final_{}.png", timestamp)
    } else {
        "final.png".to_string()
    };
    let file_path = dir.join(filename);

    save_frame_png(frame, &file_path, config.crop_border)?;

    Ok(file_path)
}

/// Directory frames of one source are written to
fn screenshot_directory(base_dir: &Path, source_path: Option<&Path>) -> PathBuf {
    if let Some(source_name) = source_path.and_then(|p| p.file_stem()) {
        return base_dir.join(source_name);
    }

    base_dir.join("default")
}

/// Save palette indices as an 8-bit indexed PNG
fn save_png(
    path: &Path,
    indices: &[u8],
    palette: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ScreenshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette.to_vec());

    let mut writer = encoder.write_header()?;
    writer.write_image_data(indices)?;

    Ok(())
}

/// Frame sink that writes every Nth frame to numbered PNG files
///
/// Sinks cannot fail, so the first export error is kept and reported by
/// [`FrameExporter::finish`]; no further frames are written after it.
pub struct FrameExporter {
    directory: PathBuf,
    interval: u64,
    crop_border: bool,
    frames_seen: u64,
    written: Vec<PathBuf>,
    error: Option<ScreenshotError>,
}

impl FrameExporter {
    /// Create an exporter writing into `<output_directory>/<source_name>/`
    pub fn new(config: &ExportConfig, source_path: Option<&Path>) -> Result<Self, ScreenshotError> {
        let directory = screenshot_directory(&config.output_directory, source_path);
        fs::create_dir_all(&directory)?;

        Ok(FrameExporter {
            directory,
            interval: config.frame_interval,
            crop_border: config.crop_border,
            frames_seen: 0,
            written: Vec::new(),
            error: None,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Files written so far, or the first error encountered
    pub fn finish(self) -> Result<Vec<PathBuf>, ScreenshotError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.written),
        }
    }
}

impl FrameSink for FrameExporter {
    fn on_frame(&mut self, frame: &Frame<'_>) {
        self.frames_seen += 1;

        if self.interval == 0 || self.error.is_some() || self.frames_seen % self.interval != 0 {
            return;
        }

        let path = self
            .directory
            .join(format!("frame_{:08}.png", self.frames_seen));
        match save_frame_png(frame, &path, self.crop_border) {
            Ok(()) => self.written.push(path),
            Err(e) => self.error = Some(e),
        }
    }
}
