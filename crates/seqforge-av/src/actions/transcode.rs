//! Frame sequence to movie encoding with ffmpeg.

use crate::{CancelToken, Result, ToolCommand};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;

/// Output encoding of generated movies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieCodec {
    /// H.264 main profile in MP4.
    #[default]
    H264,
    /// H.265 in MP4, tagged `hvc1` for QuickTime.
    H265,
    /// Palette-optimized looping GIF.
    Gif,
}

impl MovieCodec {
    /// File extension of the encoded output.
    pub fn extension(&self) -> &'static str {
        match self {
            MovieCodec::H264 | MovieCodec::H265 => "mp4",
            MovieCodec::Gif => "gif",
        }
    }

    /// Constant rate factor used when none is configured.
    pub fn default_crf(&self) -> u32 {
        match self {
            MovieCodec::H264 => 25,
            MovieCodec::H265 => 30,
            MovieCodec::Gif => 0,
        }
    }
}

impl std::str::FromStr for MovieCodec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "h264" | "x264" | "avc" => Ok(MovieCodec::H264),
            "h265" | "x265" | "hevc" => Ok(MovieCodec::H265),
            "gif" => Ok(MovieCodec::Gif),
            _ => Err(format!("Unknown movie codec: {}", s)),
        }
    }
}

/// Encoding parameters for one movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieSettings {
    /// Frames in one pass over the sequence.
    pub frames: u32,
    /// Passes over the sequence in the output.
    pub loops: u32,
    pub input_fps: u32,
    pub output_fps: u32,
    /// Target width; `-1` keeps the aspect ratio or the source size.
    pub width: i32,
    /// Target height; `-1` keeps the aspect ratio or the source size.
    pub height: i32,
    /// Constant rate factor; codec default when unset.
    pub crf: Option<u32>,
    pub codec: MovieCodec,
}

impl Default for MovieSettings {
    fn default() -> Self {
        Self {
            frames: 300,
            loops: 1,
            input_fps: 25,
            output_fps: 25,
            width: -1,
            height: -1,
            crf: None,
            codec: MovieCodec::H264,
        }
    }
}

impl MovieSettings {
    fn crf(&self) -> u32 {
        self.crf.unwrap_or_else(|| self.codec.default_crf())
    }

    fn scales(&self) -> bool {
        self.width > 0 || self.height > 0
    }

    fn encoder_args(&self) -> Vec<String> {
        let color = [
            "-pix_fmt",
            "yuv420p",
            "-color_range",
            "tv",
            "-colorspace",
            "bt709",
            "-color_primaries",
            "bt709",
            "-color_trc",
            "bt709",
            "-movflags",
            "+faststart",
        ];
        let mut args: Vec<String> = match self.codec {
            MovieCodec::H264 => vec![
                "-c:v".into(),
                "libx264".into(),
                "-profile:v".into(),
                "main".into(),
                "-level:v".into(),
                "6".into(),
                "-crf".into(),
                self.crf().to_string(),
                "-preset".into(),
                "veryslow".into(),
            ],
            MovieCodec::H265 => vec![
                "-c:v".into(),
                "libx265".into(),
                "-crf".into(),
                self.crf().to_string(),
                "-preset".into(),
                "medium".into(),
                "-tag:v".into(),
                "hvc1".into(),
            ],
            MovieCodec::Gif => {
                return vec![
                    "-vf".into(),
                    format!(
                        "fps={},scale={}:{}:flags=lanczos,split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse",
                        self.output_fps, self.width, self.height
                    ),
                    "-loop".into(),
                    "0".into(),
                ];
            }
        };
        args.extend(color.iter().map(|s| s.to_string()));
        args
    }
}

/// ffmpeg arguments that encode the image sequence `pattern` into `target`.
pub fn ffmpeg_args(pattern: &Path, target: &Path, settings: &MovieSettings) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-f".into(), "image2".into()];

    if settings.codec == MovieCodec::Gif {
        args.push("-framerate".into());
        args.push(settings.input_fps.to_string().into());
        args.push("-i".into());
        args.push(pattern.into());
        args.extend(settings.encoder_args().into_iter().map(OsString::from));
        args.push(target.into());
        return args;
    }

    // Loop the stills and cut at the requested length.
    let total_frames = settings.frames.saturating_mul(settings.loops);
    args.extend(
        [
            "-loop".to_string(),
            "1".to_string(),
            "-framerate".to_string(),
            settings.input_fps.to_string(),
        ]
        .map(OsString::from),
    );
    args.push("-i".into());
    args.push(pattern.into());
    args.extend(
        [
            "-r".to_string(),
            settings.output_fps.to_string(),
            "-frames:v".to_string(),
            total_frames.to_string(),
        ]
        .map(OsString::from),
    );
    args.extend(settings.encoder_args().into_iter().map(OsString::from));
    if settings.scales() {
        args.push("-filter:v".into());
        args.push(
            format!(
                "scale={}:{}:force_divisible_by=2:force_original_aspect_ratio=decrease",
                settings.width, settings.height
            )
            .into(),
        );
    }
    args.push(target.into());
    args
}

/// Encode one frame sequence.
pub fn encode_movie(
    ffmpeg: &Path,
    pattern: &Path,
    target: &Path,
    settings: &MovieSettings,
    cancel: &CancelToken,
) -> Result<()> {
    tracing::info!("Encoding {:?} -> {:?}", pattern, target);
    ToolCommand::new(ffmpeg)
        .args(ffmpeg_args(pattern, target, settings))
        .execute(cancel)?;
    Ok(())
}
