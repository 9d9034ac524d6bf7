//! Status bar protocol (i3bar / swaybar)

mod protocol;
mod writer;

pub use protocol::{parse_click_line, Block};
pub use writer::BarWriter;
