use serde::{Deserialize, Serialize};

/// Line terminator style of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detects the style from the first terminator in `text`; LF when there is none.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(idx) if idx > 0 && text.as_bytes()[idx - 1] == b'\r' => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Rewrites every terminator in `text` to this style. A lone `\r` counts
    /// as a terminator, as it does for `LineIndex`.
    pub fn normalize(self, text: &str) -> String {
        let lf = text.replace("\r\n", "\n").replace('\r', "\n");
        match self {
            LineEnding::Lf => lf,
            LineEnding::CrLf => lf.replace('\n', "\r\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_first_terminator() {
        assert_eq!(LineEnding::detect("a\r\nb\nc"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\nb\r\nc"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("single line"), LineEnding::Lf);
    }

    #[test]
    fn normalize_is_stable_for_mixed_input() {
        assert_eq!(LineEnding::CrLf.normalize("a\nb\r\nc"), "a\r\nb\r\nc");
        assert_eq!(LineEnding::Lf.normalize("a\r\nb\nc"), "a\nb\nc");
    }

    #[test]
    fn lone_carriage_returns_are_terminators() {
        assert_eq!(LineEnding::CrLf.normalize("a\r\r\n"), "a\r\n\r\n");
        assert_eq!(LineEnding::Lf.normalize("\n\r\r\n"), "\n\n\n");
        let once = LineEnding::Lf.normalize("\n\r\r\n");
        assert_eq!(LineEnding::Lf.normalize(&once), once);
    }
}
