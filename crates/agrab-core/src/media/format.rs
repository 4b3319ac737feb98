//! Stream variants and best-audio selection.

/// What a stream variant carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Audio only (no video track).
    Audio,
    /// Video only.
    Video,
    /// Audio and video muxed together.
    Muxed,
    /// Storyboards, manifests and anything else.
    Other,
}

/// One variant offered by the extraction service.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatDescriptor {
    pub kind: FormatKind,
    /// Average audio bitrate in kbit/s, if known.
    pub bitrate: Option<f64>,
    /// Size in bytes (exact or approximate), if known.
    pub filesize: Option<u64>,
}

impl FormatDescriptor {
    pub fn audio(bitrate: f64, filesize: Option<u64>) -> Self {
        Self {
            kind: FormatKind::Audio,
            bitrate: Some(bitrate),
            filesize,
        }
    }

    pub fn is_audio(&self) -> bool {
        self.kind == FormatKind::Audio
    }
}

/// Picks the audio-only variant with the highest bitrate.
///
/// Entries with an unknown bitrate rank below any known bitrate. On ties the
/// earlier entry wins. Returns `None` iff there is no audio-only entry.
pub fn select_best_audio(formats: &[FormatDescriptor]) -> Option<&FormatDescriptor> {
    let rank = |f: &FormatDescriptor| f.bitrate.unwrap_or(f64::NEG_INFINITY);

    formats
        .iter()
        .filter(|f| f.is_audio())
        .fold(None, |best: Option<&FormatDescriptor>, f| match best {
            Some(b) if rank(f) <= rank(b) => Some(b),
            _ => Some(f),
        })
}
