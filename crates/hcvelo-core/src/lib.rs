//! Core types: club events, occurrence windows, output rendering, logging

pub mod event;
pub mod format;
pub mod logging;
pub mod time;

pub use event::{ClubEvent, EventSet, unescape_html};
pub use format::{
    DEFAULT_MARKDOWN_TEMPLATE, EventView, FormatError, FormatOptions, OutputFormat,
    OutputFormatter, event_url,
};
pub use time::{OccurrenceParseError, UpcomingWindow, parse_occurrence};
pub use logging::{LogConfig, LogError, LogFormat, init_logging};
