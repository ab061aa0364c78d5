pub mod boards;
pub mod frame;
pub mod terminal;

pub use boards::{render_board, RenderContext};
pub use frame::{Frame, FrameGeometry};
pub use terminal::TerminalDisplay;

use crate::utils::error::Result;

/// Output device for rendered frames. LED panel drivers plug in here.
pub trait Display: Send {
    fn show(&mut self, frame: &Frame) -> Result<()>;
}
