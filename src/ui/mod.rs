pub mod json;
pub mod message;
pub mod renderer;
pub mod terminal;
pub mod theme;

pub use json::JsonSink;
pub use message::{report_error, MessageBlock};
pub use renderer::{OutputSink, UiError, UiResult};
pub use terminal::{stdout_stream, TerminalRenderer, DEFAULT_PRINT_TIME_MS};
pub use theme::{Mark, MarkKind, OutputMode, Theme};
