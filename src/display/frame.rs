use crate::config::DisplaySettings;
use crate::domain::model::Board;
use std::time::Duration;

/// Pixels per character cell of the matrix font.
pub const GLYPH_WIDTH: u32 = 6;
pub const GLYPH_HEIGHT: u32 = 8;

/// Text capacity of the whole panel chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub cols: usize,
    pub rows: usize,
}

impl FrameGeometry {
    pub fn from_settings(settings: &DisplaySettings) -> Self {
        let width = settings.matrix_cols.saturating_mul(settings.matrix_series.max(1));
        let height = settings.matrix_rows.saturating_mul(settings.matrix_parallel.max(1));
        Self {
            cols: (width / GLYPH_WIDTH).max(1) as usize,
            rows: (height / GLYPH_HEIGHT).max(1) as usize,
        }
    }
}

/// One screen of text for a board.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub board: Board,
    pub geometry: FrameGeometry,
    lines: Vec<String>,
    /// How long to keep this frame up; `None` uses the board default.
    pub hold: Option<Duration>,
}

impl Frame {
    pub fn new(board: Board, geometry: FrameGeometry) -> Self {
        Self {
            board,
            geometry,
            lines: Vec::with_capacity(geometry.rows),
            hold: None,
        }
    }

    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = Some(hold);
        self
    }

    /// Adds a centered line, truncated to the frame width. Lines past the
    /// last row are dropped.
    pub fn push_line(&mut self, text: &str) -> &mut Self {
        if self.lines.len() < self.geometry.rows {
            let line = fit(text, self.geometry.cols);
            self.lines.push(line);
        }
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All rows, blank-padded to the full frame height.
    pub fn rows(&self) -> Vec<String> {
        let blank = " ".repeat(self.geometry.cols);
        (0..self.geometry.rows)
            .map(|i| self.lines.get(i).cloned().unwrap_or_else(|| blank.clone()))
            .collect()
    }
}

fn fit(text: &str, cols: usize) -> String {
    let trimmed: String = text.trim().chars().take(cols).collect();
    let len = trimmed.chars().count();
    let left = (cols - len) / 2;
    let right = cols - len - left;
    format!("{}{}{}", " ".repeat(left), trimmed, " ".repeat(right))
}

/// Greedy word wrap to `cols`; words longer than a line are split.
pub fn wrap(text: &str, cols: usize) -> Vec<String> {
    let cols = cols.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: String = word.to_string();
        while word.chars().count() > cols {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(cols).collect();
            word = word.chars().skip(cols).collect();
            lines.push(head);
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > cols {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_from_default_panel() {
        let geometry = FrameGeometry::from_settings(&DisplaySettings::default());
        assert_eq!(geometry, FrameGeometry { cols: 10, rows: 4 });

        let chained = DisplaySettings {
            matrix_series: 2,
            matrix_parallel: 2,
            ..DisplaySettings::default()
        };
        assert_eq!(
            FrameGeometry::from_settings(&chained),
            FrameGeometry { cols: 21, rows: 8 }
        );
    }

    #[test]
    fn test_geometry_saturates_on_huge_chains() {
        let huge = DisplaySettings {
            matrix_cols: 3_000_000_000,
            matrix_series: 2,
            ..DisplaySettings::default()
        };
        let geometry = FrameGeometry::from_settings(&huge);
        assert_eq!(geometry.cols, (u32::MAX / GLYPH_WIDTH) as usize);
        assert_eq!(geometry.rows, 4);
    }

    #[test]
    fn test_push_line_centers_truncates_and_caps_rows() {
        let mut frame = Frame::new(Board::Clock, FrameGeometry { cols: 6, rows: 2 });
        frame.push_line("ab").push_line("abcdefghij").push_line("dropped");

        assert_eq!(frame.lines(), &["  ab  ".to_string(), "abcdef".to_string()]);
        assert_eq!(frame.rows().len(), 2);
    }

    #[test]
    fn test_rows_pad_missing_lines() {
        let mut frame = Frame::new(Board::Weather, FrameGeometry { cols: 3, rows: 3 });
        frame.push_line("72°");
        assert_eq!(frame.rows(), vec!["72°", "   ", "   "]);
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(wrap("Hello World!", 10), vec!["Hello", "World!"]);
        assert_eq!(wrap("Go team go", 10), vec!["Go team go"]);
        assert_eq!(wrap("Supercalifragilistic", 8), vec!["Supercal", "ifragili", "stic"]);
        assert!(wrap("   ", 8).is_empty());
    }
}
