use crate::display::frame::Frame;
use crate::display::Display;
use crate::utils::error::{Result, ScoreboardError};
use std::io::Write;

/// Emulates the matrix on a terminal (or any writer) for hosts without
/// the panel attached.
pub struct TerminalDisplay<W: Write + Send> {
    out: W,
}

impl TerminalDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, frame: &Frame) -> std::io::Result<()> {
        let border = format!("+{}+", "-".repeat(frame.geometry.cols));
        writeln!(self.out, "{}", border)?;
        for row in frame.rows() {
            writeln!(self.out, "|{}|", row)?;
        }
        writeln!(self.out, "{}", border)?;
        self.out.flush()
    }
}

impl<W: Write + Send> Display for TerminalDisplay<W> {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        self.draw(frame).map_err(|e| ScoreboardError::DisplayError {
            message: format!("could not draw {} board: {}", frame.board, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::frame::FrameGeometry;
    use crate::domain::model::Board;

    #[test]
    fn test_frame_is_drawn_inside_a_border() {
        let mut frame = Frame::new(Board::Clock, FrameGeometry { cols: 4, rows: 2 });
        frame.push_line("12");

        let mut display = TerminalDisplay::new(Vec::new());
        display.show(&frame).unwrap();

        let drawn = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(drawn, "+----+\n| 12 |\n|    |\n+----+\n");
    }
}
