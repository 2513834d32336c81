use clap::{ArgAction, Parser};
use log::LevelFilter;

use crate::tokenizer::{Limits, MAX_LINE_CHARS, MAX_LINE_WORDS};

pub const PROMPT: &str = "psh> ";

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Parser, Debug, Clone)]
#[command(name = "psh", version, about = "Runs pipelines of external commands, one line at a time")]
pub struct Config {
	/// Run a single line and exit
	#[arg(short = 'c', long = "command", value_name = "LINE")]
	pub command: Option<String>,

	/// Prompt printed before each line (default: "psh> " on a terminal)
	#[arg(long, value_name = "TEXT", conflicts_with = "no_prompt")]
	pub prompt: Option<String>,

	/// Never print a prompt
	#[arg(long)]
	pub no_prompt: bool,

	/// Reject '<' after the first stage and '>' before the last one
	#[arg(long)]
	pub strict: bool,

	/// Stop reading input when a pipe or process cannot be created
	#[arg(long)]
	pub exit_on_error: bool,

	#[arg(long, value_name = "BYTES", default_value_t = MAX_LINE_CHARS)]
	pub max_line: usize,

	#[arg(long, value_name = "N", default_value_t = MAX_LINE_WORDS)]
	pub max_words: usize,

	/// More log output on stderr (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = ArgAction::Count)]
	pub verbose: u8,

	/// Log level, overrides -v
	#[arg(long, env = "PSH_LOG", value_name = "LEVEL", value_parser = LOG_LEVELS, ignore_case = true)]
	pub log_level: Option<String>,
}

impl Config {
	pub fn level_filter(&self) -> LevelFilter {
		if let Some(level) = self.log_level.as_ref().and_then(|l| l.parse::<LevelFilter>().ok()) {
			return level;
		}
		match self.verbose {
			0 => LevelFilter::Warn,
			1 => LevelFilter::Info,
			2 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		}
	}

	pub fn limits(&self) -> Limits {
		Limits { max_line: self.max_line, max_words: self.max_words }
	}

	pub fn prompt(&self, interactive: bool) -> Option<&str> {
		if self.no_prompt {
			None
		} else if let Some(ref p) = self.prompt {
			Some(p.as_str())
		} else if interactive {
			Some(PROMPT)
		} else {
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(args: &[&str]) -> Config {
		Config::try_parse_from(std::iter::once("psh").chain(args.iter().cloned())).unwrap()
	}

	#[test]
	fn defaults() {
		let c = config(&[]);
		assert_eq!(c.command, None);
		assert!(!c.strict);
		assert!(!c.exit_on_error);
		assert_eq!(c.limits(), Limits::default());
		assert_eq!(c.prompt(true), Some(PROMPT));
		assert_eq!(c.prompt(false), None);
	}

	#[test]
	fn flags() {
		let c = config(&["-c", "ls | wc", "--strict", "--exit-on-error", "--max-words", "5", "--max-line", "64"]);
		assert_eq!(c.command.as_deref(), Some("ls | wc"));
		assert!(c.strict);
		assert!(c.exit_on_error);
		assert_eq!(c.limits(), Limits { max_line: 64, max_words: 5 });
	}

	#[test]
	fn prompt_choice() {
		assert_eq!(config(&["--prompt", "$ "]).prompt(false), Some("$ "));
		assert_eq!(config(&["--no-prompt"]).prompt(true), None);
		assert!(Config::try_parse_from(&["psh", "--no-prompt", "--prompt", "x"]).is_err());
	}

	#[test]
	fn verbosity() {
		assert_eq!(config(&["-v"]).level_filter(), LevelFilter::Info);
		assert_eq!(config(&["-vv"]).level_filter(), LevelFilter::Debug);
		assert_eq!(config(&["-vvvv"]).level_filter(), LevelFilter::Trace);
		assert_eq!(config(&["-vv", "--log-level", "off"]).level_filter(), LevelFilter::Off);
		assert!(Config::try_parse_from(&["psh", "--log-level", "loud"]).is_err());
	}
}
