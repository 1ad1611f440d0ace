pub mod html;
pub mod terminal;

pub use html::{render_page, PageControls};
pub use terminal::{render_board, TerminalSink};
