use std::io;
use std::io::IsTerminal;
use std::process;

use clap::Parser;

use psh::config::Config;
use psh::{driver, logging};

fn main() {
	let config = Config::parse();
	let _ = logging::init(config.level_filter());

	let status = match config.command {
		Some(ref line) => match driver::run_line(&config, line.as_bytes()) {
			Ok(()) => 0,
			Err(e) => {
				eprintln!("psh: {}", e);
				e.exit_status()
			},
		},
		None => {
			let stdin = io::stdin();
			let prompt = config.prompt(stdin.is_terminal());
			match driver::run_loop(&config, stdin.lock(), io::stdout(), prompt) {
				Ok(()) => 0,
				Err(_) => 1,
			}
		},
	};
	process::exit(status);
}
