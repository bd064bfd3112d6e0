//! Recorded landmark streams and image output for offline runs.
//!
//! Frames are stored as JSON Lines, one `LandmarkFrame` per line, which is
//! what a pose producer can dump without buffering a whole session.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::pose::LandmarkFrame;
use crate::render::PixelCanvas;

/// Reads every frame of a JSON Lines recording. Blank lines are skipped.
pub fn read_frames<P: AsRef<Path>>(path: P) -> Result<Vec<LandmarkFrame>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    parse_frames(BufReader::new(file))
        .with_context(|| format!("Failed to read frames from {}", path.display()))
}

pub fn parse_frames<R: BufRead>(reader: R) -> Result<Vec<LandmarkFrame>> {
    let mut frames = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: LandmarkFrame =
            serde_json::from_str(&line).with_context(|| format!("line {}", i + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

pub fn save_png<P: AsRef<Path>>(canvas: &PixelCanvas, path: P) -> Result<()> {
    let path = path.as_ref();
    let image = image::RgbaImage::from_raw(
        canvas.width() as u32,
        canvas.height() as u32,
        canvas.to_rgba8(),
    )
    .context("Canvas buffer does not match its dimensions")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::RunningMode;
    use crate::render::Color;

    #[test]
    fn test_parse_frames() {
        let input = r#"{"landmarks":[{"x":0.1,"y":0.2,"z":-0.3}],"image_width":640,"image_height":480,"mode":"video"}

{"landmarks":[],"image_width":640,"image_height":480}
"#;
        let frames = parse_frames(input.as_bytes()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].mode, RunningMode::Video);
        assert_eq!(frames[0].landmarks[0].z, -0.3);
        assert!(frames[1].is_empty());
    }

    #[test]
    fn test_parse_frames_reports_line() {
        let input = "{\"landmarks\":[],\"image_width\":1,\"image_height\":1}\nnot json\n";
        let err = parse_frames(input.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.png");
        let canvas = PixelCanvas::new(8, 4, Color::RED);
        save_png(&canvas, &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (8, 4));
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }
}
