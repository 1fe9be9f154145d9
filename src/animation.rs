//! Animated summaries of a capture directory via an external encoder.
//!
//! Images are fed to ffmpeg's concat demuxer in file-name order, which is
//! capture order thanks to the sequence prefix.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tokio::process::Command;
use tracing::{debug, info};

use crate::constants::DEFAULT_ANIMATION_FPS;
use crate::error::{Error, Result};

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationFormat {
    Gif,
    Mp4,
}

impl AnimationFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for AnimationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AnimationFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gif" => Ok(Self::Gif),
            "mp4" => Ok(Self::Mp4),
            other => Err(format!("unknown format '{other}': expected gif or mp4")),
        }
    }
}

/// ffmpeg invocation settings.
#[derive(Debug, Clone)]
pub struct Encoder {
    program: String,
    fps: u32,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            fps: DEFAULT_ANIMATION_FPS,
        }
    }
}

impl Encoder {
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.max(1),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Concat demuxer input listing every image for `1/fps` seconds.
    pub fn concat_list(&self, images: &[PathBuf]) -> String {
        let duration = 1.0 / f64::from(self.fps);
        images
            .iter()
            .map(|image| {
                let quoted = image.display().to_string().replace('\'', r"'\''");
                format!("file '{quoted}'\nduration {duration}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Argument lists for each encoder pass.
    ///
    /// GIF needs two passes (palette generation, then palette use); MP4 one.
    pub fn passes(
        &self,
        format: AnimationFormat,
        list: &Path,
        palette: &Path,
        output: &Path,
    ) -> Vec<Vec<String>> {
        let fps = self.fps;
        let concat = |args: &mut Vec<String>| {
            args.extend(
                ["-y", "-f", "concat", "-safe", "0", "-i"]
                    .iter()
                    .map(ToString::to_string),
            );
            args.push(list.display().to_string());
        };

        match format {
            AnimationFormat::Gif => {
                let mut palette_pass = Vec::new();
                concat(&mut palette_pass);
                palette_pass.extend([
                    "-vf".to_string(),
                    format!("fps={fps},scale=640:-1:flags=lanczos,palettegen"),
                    palette.display().to_string(),
                ]);

                let mut render_pass = Vec::new();
                concat(&mut render_pass);
                render_pass.extend([
                    "-i".to_string(),
                    palette.display().to_string(),
                    "-lavfi".to_string(),
                    format!("fps={fps},scale=640:-1:flags=lanczos[x];[x][1:v]paletteuse"),
                    output.display().to_string(),
                ]);

                vec![palette_pass, render_pass]
            },
            AnimationFormat::Mp4 => {
                let mut pass = Vec::new();
                concat(&mut pass);
                pass.extend([
                    "-vf".to_string(),
                    format!("fps={fps},scale=1280:-2"),
                    "-c:v".to_string(),
                    "libx264".to_string(),
                    "-pix_fmt".to_string(),
                    "yuv420p".to_string(),
                    output.display().to_string(),
                ]);
                vec![pass]
            },
        }
    }

    /// Encode `images` into `output`.
    ///
    /// Returns `Ok(false)` without running the encoder when there are no
    /// images.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoder`] if the encoder cannot be started or exits
    /// unsuccessfully.
    pub async fn encode(
        &self,
        images: &[PathBuf],
        output: &Path,
        format: AnimationFormat,
    ) -> Result<bool> {
        if images.is_empty() {
            info!(output = %output.display(), "No images found, skipping");
            return Ok(false);
        }

        let absolute: Vec<PathBuf> = images
            .iter()
            .map(|image| std::path::absolute(image).unwrap_or_else(|_| image.clone()))
            .collect();

        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(format!("creating {}", parent.display()), e))?;

        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("animation");
        let list = parent.join(format!("{stem}.list.txt"));
        let palette = parent.join(format!("{stem}.palette.png"));

        tokio::fs::write(&list, self.concat_list(&absolute))
            .await
            .map_err(|e| Error::io(format!("writing {}", list.display()), e))?;

        info!(
            images = images.len(),
            fps = self.fps,
            format = %format,
            output = %output.display(),
            "Encoding animation"
        );

        let mut result = Ok(true);
        for args in self.passes(format, &list, &palette, output) {
            if let Err(err) = self.run(&args).await {
                result = Err(err);
                break;
            }
        }

        for temp in [&list, &palette] {
            if let Err(e) = tokio::fs::remove_file(temp).await {
                debug!(path = %temp.display(), error = %e, "Temporary file not removed");
            }
        }

        result
    }

    async fn run(&self, args: &[String]) -> Result<()> {
        debug!(program = %self.program, args = ?args, "Running encoder");
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::Encoder {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Encoder {
                program: self.program.clone(),
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_concat_list() {
        let encoder = Encoder::new(4);
        let list = encoder.concat_list(&[
            PathBuf::from("/c/001.png"),
            PathBuf::from("/c/it's.png"),
        ]);
        assert_eq!(
            list,
            "file '/c/001.png'\nduration 0.25\nfile '/c/it'\\''s.png'\nduration 0.25"
        );
    }

    #[test]
    fn test_gif_has_two_passes() {
        let encoder = Encoder::new(4);
        let passes = encoder.passes(
            AnimationFormat::Gif,
            Path::new("l.txt"),
            Path::new("p.png"),
            Path::new("out.gif"),
        );
        assert_eq!(passes.len(), 2);
        assert!(passes[0].contains(&"fps=4,scale=640:-1:flags=lanczos,palettegen".to_string()));
        assert_eq!(passes[1].last().unwrap(), "out.gif");
        assert!(passes[1].contains(&"p.png".to_string()));
    }

    #[test]
    fn test_mp4_pass() {
        let encoder = Encoder::new(10);
        let passes = encoder.passes(
            AnimationFormat::Mp4,
            Path::new("l.txt"),
            Path::new("p.png"),
            Path::new("out.mp4"),
        );
        assert_eq!(passes.len(), 1);
        let args = &passes[0];
        assert_eq!(&args[..7], ["-y", "-f", "concat", "-safe", "0", "-i", "l.txt"]);
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"yuv420p".to_string()));
        assert!(args.contains(&"fps=10,scale=1280:-2".to_string()));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("GIF".parse::<AnimationFormat>(), Ok(AnimationFormat::Gif));
        assert_eq!("mp4".parse::<AnimationFormat>(), Ok(AnimationFormat::Mp4));
        assert!("avi".parse::<AnimationFormat>().is_err());
    }

    #[tokio::test]
    async fn test_empty_input_skips_encoder() {
        let temp = TempDir::new().unwrap();
        let encoder = Encoder::new(4).with_program("definitely-not-an-encoder");
        let produced = encoder
            .encode(&[], &temp.path().join("out.gif"), AnimationFormat::Gif)
            .await
            .unwrap();
        assert!(!produced);
    }

    #[tokio::test]
    async fn test_missing_encoder_is_an_error() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("001.png");
        std::fs::write(&image, b"x").unwrap();

        let encoder = Encoder::new(4).with_program("definitely-not-an-encoder");
        let err = encoder
            .encode(&[image], &temp.path().join("out.mp4"), AnimationFormat::Mp4)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Encoder { .. }));
        // Temporary list file is cleaned up.
        assert!(!temp.path().join("out.list.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_encoder() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("001.png");
        std::fs::write(&image, b"x").unwrap();

        let encoder = Encoder::new(4).with_program("true");
        let produced = encoder
            .encode(&[image], &temp.path().join("out.gif"), AnimationFormat::Gif)
            .await
            .unwrap();
        assert!(produced);
    }
}
