// ── Video stream encoding ──

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use super::require;
use crate::error::CoreError;

pub const BITRATE_MIN_KBPS: u32 = 512;
pub const BITRATE_MAX_KBPS: u32 = 16384;
pub const BITRATE_STEP_KBPS: u32 = 512;
pub const FRAMERATE_MAX: u32 = 30;
const BITRATE_STEP: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum StreamKind {
    Main,
    Second,
}

impl StreamKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Main => "Main stream",
            Self::Second => "Second stream",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum VideoProfile {
    Baseline,
    Main,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum Resolution {
    R1920x1080,
    R1280x720,
    R720x576,
    R704x576,
    R640x480,
    R640x360,
}

impl Resolution {
    pub fn dimensions(self) -> (u16, u16) {
        match self {
            Self::R1920x1080 => (1920, 1080),
            Self::R1280x720 => (1280, 720),
            Self::R720x576 => (720, 576),
            Self::R704x576 => (704, 576),
            Self::R640x480 => (640, 480),
            Self::R640x360 => (640, 360),
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "{w}x{h}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum BitrateMode {
    Vbr,
    Cbr,
    Cvbr,
    Avbr,
    FixQp,
    Qvbr,
}

impl std::fmt::Display for VideoProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Baseline => "Baseline",
            Self::Main => "Main",
            Self::High => "High",
        })
    }
}

/// Every selectable bitrate, in kbit/s.
pub fn bitrate_options() -> Vec<u32> {
    (BITRATE_MIN_KBPS..=BITRATE_MAX_KBPS)
        .step_by(BITRATE_STEP)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Fixed by the encoder; shown read-only.
    pub codec: String,
    pub profile: VideoProfile,
    pub resolution: Resolution,
    pub framerate: String,
    pub bitrate_mode: BitrateMode,
    pub bitrate_kbps: u32,
    pub keyframe_interval: String,
}

impl StreamSettings {
    pub fn main_default() -> Self {
        Self {
            codec: "H264".into(),
            profile: VideoProfile::Baseline,
            resolution: Resolution::R1920x1080,
            framerate: "22".into(),
            bitrate_mode: BitrateMode::Vbr,
            bitrate_kbps: 4096,
            keyframe_interval: "11".into(),
        }
    }

    pub fn second_default() -> Self {
        Self {
            resolution: Resolution::R640x480,
            framerate: "15".into(),
            bitrate_kbps: 1024,
            ..Self::main_default()
        }
    }

    pub fn validate(&self, kind: StreamKind) -> Result<(), CoreError> {
        let label = kind.label();
        require(&format!("{label}: frame rate"), &self.framerate)?;
        let fps = self.framerate.trim().parse::<u32>().unwrap_or(0);
        if !(1..=FRAMERATE_MAX).contains(&fps) {
            return Err(CoreError::validation(format!(
                "{label}: frame rate must be between 1 and {FRAMERATE_MAX}"
            )));
        }
        if !bitrate_options().contains(&self.bitrate_kbps) {
            return Err(CoreError::validation(format!(
                "{label}: bitrate must be a multiple of {BITRATE_STEP_KBPS} up to {BITRATE_MAX_KBPS}"
            )));
        }
        let interval = self.keyframe_interval.trim().parse::<u32>().unwrap_or(0);
        if interval == 0 {
            return Err(CoreError::validation(format!(
                "{label}: I-frame interval must be a positive number"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSettings {
    pub main: StreamSettings,
    pub second: StreamSettings,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            main: StreamSettings::main_default(),
            second: StreamSettings::second_default(),
        }
    }
}

impl VideoSettings {
    pub fn stream(&self, kind: StreamKind) -> &StreamSettings {
        match kind {
            StreamKind::Main => &self.main,
            StreamKind::Second => &self.second,
        }
    }

    pub fn stream_mut(&mut self, kind: StreamKind) -> &mut StreamSettings {
        match kind {
            StreamKind::Main => &mut self.main,
            StreamKind::Second => &mut self.second,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for kind in StreamKind::iter() {
            self.stream(kind).validate(kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bitrate_list_covers_the_range() {
        let options = bitrate_options();
        assert_eq!(options.len(), 32);
        assert_eq!(options.first(), Some(&512));
        assert_eq!(options.last(), Some(&16384));
    }

    #[test]
    fn defaults_validate() {
        let video = VideoSettings::default();
        assert!(video.validate().is_ok());
        assert_eq!(video.second.resolution.to_string(), "640x480");
        assert_eq!(video.main.bitrate_mode.to_string(), "VBR");
    }

    #[test]
    fn framerate_bounds() {
        let mut video = VideoSettings::default();
        video.stream_mut(StreamKind::Second).framerate = "31".into();
        assert_eq!(
            video.validate(),
            Err(CoreError::validation(
                "Second stream: frame rate must be between 1 and 30"
            ))
        );
    }

    #[test]
    fn bitrate_must_be_on_the_grid() {
        let mut stream = StreamSettings::main_default();
        stream.bitrate_kbps = 1000;
        assert!(stream.validate(StreamKind::Main).is_err());
    }
}
