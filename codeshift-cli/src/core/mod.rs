pub mod config;
pub mod error;
pub mod output;

pub use self::config::Settings;
pub use self::error::{CodeshiftError, Result};
pub use self::output::{OutputFormat, OutputWriter};
