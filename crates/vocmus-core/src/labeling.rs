//! Filename-based class assignment
//!
//! Labels are a naming convention, not a prediction: training and ground-truth
//! labels both come from here.

use crate::config::LabelingConfig;
use std::path::Path;
use vocmus_data::ClassLabel;

/// Assigns a class from a file name
pub trait Labeler: Send + Sync {
    fn label(&self, filename: &str) -> ClassLabel;

    /// Label from the final path component
    fn label_path(&self, path: &Path) -> ClassLabel {
        self.label(&display_name(path))
    }
}

impl<F> Labeler for F
where
    F: Fn(&str) -> ClassLabel + Send + Sync,
{
    fn label(&self, filename: &str) -> ClassLabel {
        self(filename)
    }
}

/// Speech when the name contains a marker substring (case-sensitive)
#[derive(Debug, Clone)]
pub struct SubstringLabeler {
    marker: String,
}

impl SubstringLabeler {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn from_config(config: &LabelingConfig) -> Self {
        Self::new(config.speech_marker.clone())
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl Labeler for SubstringLabeler {
    fn label(&self, filename: &str) -> ClassLabel {
        if filename.contains(&self.marker) {
            ClassLabel::Speech
        } else {
            ClassLabel::Music
        }
    }
}

/// File name as written to ground-truth and report files
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_marker() {
        let labeler = SubstringLabeler::new("sp");
        assert_eq!(labeler.label("sp01.wav"), ClassLabel::Speech);
        assert_eq!(labeler.label("radio_sports.mp3"), ClassLabel::Speech);
        assert_eq!(labeler.label("mu01.wav"), ClassLabel::Music);
        // Case-sensitive
        assert_eq!(labeler.label("SP01.wav"), ClassLabel::Music);
    }

    #[test]
    fn test_label_uses_file_name_only() {
        let labeler = SubstringLabeler::new("sp");
        assert_eq!(
            labeler.label_path(Path::new("/data/speech_set/mu3.wav")),
            ClassLabel::Music
        );
        assert_eq!(
            labeler.label_path(Path::new("clips/sp3.wav")),
            ClassLabel::Speech
        );
    }

    #[test]
    fn test_closure_labeler() {
        let labeler = |name: &str| {
            if name.starts_with("voice") {
                ClassLabel::Speech
            } else {
                ClassLabel::Music
            }
        };
        assert_eq!(labeler.label("voice1.wav"), ClassLabel::Speech);
        assert_eq!(Labeler::label(&labeler, "song.wav"), ClassLabel::Music);
    }

    #[test]
    fn test_from_config() {
        let labeler = SubstringLabeler::from_config(&LabelingConfig::default());
        assert_eq!(labeler.marker(), "sp");
    }
}
