use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Diagnostics go to stderr so they never mix with pipeline output.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
	let config = ConfigBuilder::new()
		.set_time_level(LevelFilter::Off)
		.set_target_level(LevelFilter::Off)
		.build();
	TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
}
