//! Terminal input: event types and the raw byte decoder.

pub mod keyboard;
pub mod mouse;
pub mod parser;

pub use keyboard::{KeyCode, KeyEvent, KeyModifiers};
pub use mouse::{MouseButton, MouseInput, MouseInputKind};
pub use parser::{InputEvent, InputParser};
