//! Named transition styles and the timing of a crossfade step.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Blend styles understood by the engine's `xfade` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TransitionKind {
    #[default]
    Fade,
    FadeBlack,
    FadeWhite,
    Distance,
    WipeLeft,
    WipeRight,
    WipeUp,
    WipeDown,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    SmoothLeft,
    SmoothRight,
    SmoothUp,
    SmoothDown,
    CircleCrop,
    RectCrop,
    CircleClose,
    CircleOpen,
    HorzClose,
    HorzOpen,
    VertClose,
    VertOpen,
    DiagBl,
    DiagBr,
    DiagTl,
    DiagTr,
    HlSlice,
    HrSlice,
    VuSlice,
    VdSlice,
    Dissolve,
    Pixelize,
    Radial,
    HBlur,
    WipeTl,
    WipeTr,
    WipeBl,
    WipeBr,
    ZoomIn,
    FadeGrays,
    SqueezeV,
    SqueezeH,
    HlWind,
    HrWind,
    VuWind,
    VdWind,
    CoverLeft,
    CoverRight,
    CoverUp,
    CoverDown,
}

impl TransitionKind {
    /// Every supported style, in documentation order.
    pub const ALL: &'static [TransitionKind] = &[
        TransitionKind::Fade,
        TransitionKind::FadeBlack,
        TransitionKind::FadeWhite,
        TransitionKind::Distance,
        TransitionKind::WipeLeft,
        TransitionKind::WipeRight,
        TransitionKind::WipeUp,
        TransitionKind::WipeDown,
        TransitionKind::SlideLeft,
        TransitionKind::SlideRight,
        TransitionKind::SlideUp,
        TransitionKind::SlideDown,
        TransitionKind::SmoothLeft,
        TransitionKind::SmoothRight,
        TransitionKind::SmoothUp,
        TransitionKind::SmoothDown,
        TransitionKind::CircleCrop,
        TransitionKind::RectCrop,
        TransitionKind::CircleClose,
        TransitionKind::CircleOpen,
        TransitionKind::HorzClose,
        TransitionKind::HorzOpen,
        TransitionKind::VertClose,
        TransitionKind::VertOpen,
        TransitionKind::DiagBl,
        TransitionKind::DiagBr,
        TransitionKind::DiagTl,
        TransitionKind::DiagTr,
        TransitionKind::HlSlice,
        TransitionKind::HrSlice,
        TransitionKind::VuSlice,
        TransitionKind::VdSlice,
        TransitionKind::Dissolve,
        TransitionKind::Pixelize,
        TransitionKind::Radial,
        TransitionKind::HBlur,
        TransitionKind::WipeTl,
        TransitionKind::WipeTr,
        TransitionKind::WipeBl,
        TransitionKind::WipeBr,
        TransitionKind::ZoomIn,
        TransitionKind::FadeGrays,
        TransitionKind::SqueezeV,
        TransitionKind::SqueezeH,
        TransitionKind::HlWind,
        TransitionKind::HrWind,
        TransitionKind::VuWind,
        TransitionKind::VdWind,
        TransitionKind::CoverLeft,
        TransitionKind::CoverRight,
        TransitionKind::CoverUp,
        TransitionKind::CoverDown,
    ];

    /// Name of the style as the `xfade` filter spells it.
    pub fn name(&self) -> &'static str {
        match self {
            TransitionKind::Fade => "fade",
            TransitionKind::FadeBlack => "fadeblack",
            TransitionKind::FadeWhite => "fadewhite",
            TransitionKind::Distance => "distance",
            TransitionKind::WipeLeft => "wipeleft",
            TransitionKind::WipeRight => "wiperight",
            TransitionKind::WipeUp => "wipeup",
            TransitionKind::WipeDown => "wipedown",
            TransitionKind::SlideLeft => "slideleft",
            TransitionKind::SlideRight => "slideright",
            TransitionKind::SlideUp => "slideup",
            TransitionKind::SlideDown => "slidedown",
            TransitionKind::SmoothLeft => "smoothleft",
            TransitionKind::SmoothRight => "smoothright",
            TransitionKind::SmoothUp => "smoothup",
            TransitionKind::SmoothDown => "smoothdown",
            TransitionKind::CircleCrop => "circlecrop",
            TransitionKind::RectCrop => "rectcrop",
            TransitionKind::CircleClose => "circleclose",
            TransitionKind::CircleOpen => "circleopen",
            TransitionKind::HorzClose => "horzclose",
            TransitionKind::HorzOpen => "horzopen",
            TransitionKind::VertClose => "vertclose",
            TransitionKind::VertOpen => "vertopen",
            TransitionKind::DiagBl => "diagbl",
            TransitionKind::DiagBr => "diagbr",
            TransitionKind::DiagTl => "diagtl",
            TransitionKind::DiagTr => "diagtr",
            TransitionKind::HlSlice => "hlslice",
            TransitionKind::HrSlice => "hrslice",
            TransitionKind::VuSlice => "vuslice",
            TransitionKind::VdSlice => "vdslice",
            TransitionKind::Dissolve => "dissolve",
            TransitionKind::Pixelize => "pixelize",
            TransitionKind::Radial => "radial",
            TransitionKind::HBlur => "hblur",
            TransitionKind::WipeTl => "wipetl",
            TransitionKind::WipeTr => "wipetr",
            TransitionKind::WipeBl => "wipebl",
            TransitionKind::WipeBr => "wipebr",
            TransitionKind::ZoomIn => "zoomin",
            TransitionKind::FadeGrays => "fadegrays",
            TransitionKind::SqueezeV => "squeezev",
            TransitionKind::SqueezeH => "squeezeh",
            TransitionKind::HlWind => "hlwind",
            TransitionKind::HrWind => "hrwind",
            TransitionKind::VuWind => "vuwind",
            TransitionKind::VdWind => "vdwind",
            TransitionKind::CoverLeft => "coverleft",
            TransitionKind::CoverRight => "coverright",
            TransitionKind::CoverUp => "coverup",
            TransitionKind::CoverDown => "coverdown",
        }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for TransitionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TransitionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| format!("Unknown transition type: {}", s))
    }
}

impl TryFrom<String> for TransitionKind {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransitionKind> for String {
    fn from(kind: TransitionKind) -> Self {
        kind.name().to_string()
    }
}

/// The transition applied between every pair of adjacent clips.
///
/// Deserialization goes through [`TransitionSpec::new`], so a bad duration
/// is rejected there too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTransitionSpec")]
pub struct TransitionSpec {
    /// Blend style.
    pub kind: TransitionKind,
    /// Length of the overlap in seconds.
    pub duration_secs: f64,
}

impl TransitionSpec {
    /// Default overlap length in seconds.
    pub const DEFAULT_DURATION_SECS: f64 = 2.0;

    /// Build a spec, rejecting non-positive or non-finite durations.
    pub fn new(kind: TransitionKind, duration_secs: f64) -> Result<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "transition duration must be a positive number of seconds, got {}",
                duration_secs
            )));
        }
        Ok(Self {
            kind,
            duration_secs,
        })
    }

    /// Parse a style name and duration supplied by a caller.
    pub fn parse(style: &str, duration_secs: f64) -> Result<Self> {
        let kind = style.parse::<TransitionKind>().map_err(Error::InvalidInput)?;
        Self::new(kind, duration_secs)
    }

    /// Timestamp in the first input at which this transition starts.
    pub fn offset_for(&self, first_duration_secs: f64) -> f64 {
        transition_offset(first_duration_secs, self.duration_secs)
    }
}

#[derive(Deserialize)]
struct RawTransitionSpec {
    kind: TransitionKind,
    duration_secs: f64,
}

impl TryFrom<RawTransitionSpec> for TransitionSpec {
    type Error = Error;

    fn try_from(raw: RawTransitionSpec) -> Result<Self> {
        Self::new(raw.kind, raw.duration_secs)
    }
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            kind: TransitionKind::Fade,
            duration_secs: Self::DEFAULT_DURATION_SECS,
        }
    }
}

/// Start of a transition of `transition_secs` at the end of a clip lasting
/// `clip_secs`, clamped to zero for clips shorter than the transition.
pub fn transition_offset(clip_secs: f64, transition_secs: f64) -> f64 {
    (clip_secs - transition_secs).max(0.0)
}
