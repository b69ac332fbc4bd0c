//! GRBL protocol support: response parsing and `$` settings

pub mod response_parser;
pub mod settings;

pub use response_parser::{GrblResponse, GrblResponseParser, ProbeReport};
pub use settings::{query_setting, read_settings, FREE_MOVE_FEEDRATE_SETTING};
