use std::io::{BufRead, Write};

use log::{debug, error};

use crate::config::Config;
use crate::error::{Error, ErrorKind};
use crate::{eval, parser, tokenizer};

/// Parses and runs one line. A blank line does nothing.
pub fn run_line(config: &Config, line: &[u8]) -> Result<(), Error> {
	let words = tokenizer::split_line(line, config.limits())?;
	if words.is_empty() {
		return Ok(());
	}
	let pipeline = parser::parse(&words)?;
	if config.strict {
		parser::check_redirects(&pipeline)?;
	}
	eval::execute(&pipeline)?;
	Ok(())
}

/// Runs lines until end of input. A bad line is reported and skipped; with
/// `exit_on_error` a pipe or fork failure ends the loop and is returned.
pub fn run_loop<R: BufRead, W: Write>(config: &Config, mut input: R, mut out: W, prompt: Option<&str>) -> Result<(), Error> {
	let mut line: Vec<u8> = vec![];
	loop {
		if let Some(p) = prompt {
			let _ = out.write_all(p.as_bytes());
			let _ = out.flush();
		}
		line.clear();
		match input.read_until(b'\n', &mut line) {
			Ok(0) => { break; },
			Ok(_) => {},
			Err(e) => {
				error!("reading input: {}", e);
				break;
			},
		}
		if let Err(e) = run_line(config, &line) {
			eprintln!("psh: {}", e);
			if config.exit_on_error && e.kind() == ErrorKind::ResourceExhaustion {
				return Err(e);
			}
		}
	}
	debug!("end of input");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;
	use clap::Parser;
	use crate::error::ParseError;
	use crate::types::RedirectType;

	fn config(args: &[&str]) -> Config {
		Config::try_parse_from(std::iter::once("psh").chain(args.iter().cloned())).unwrap()
	}

	#[test]
	fn blank_lines_do_nothing() {
		let c = config(&[]);
		assert!(run_line(&c, b"").is_ok());
		assert!(run_line(&c, b"   \t\n").is_ok());
	}

	#[test]
	fn malformed_lines_are_reported() {
		let c = config(&[]);
		match run_line(&c, b"| ls") {
			Err(Error::Parse(ParseError::MissingCommand { position: 0 })) => {},
			other => panic!("unexpected {:?}", other),
		}
		match run_line(&config(&["--max-words", "2"]), b"ls -l -a") {
			Err(Error::Parse(ParseError::TooManyWords { limit: 2 })) => {},
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn strict_mode_checks_placement() {
		let c = config(&["--strict"]);
		match run_line(&c, b"ls > a.txt | wc") {
			Err(Error::Parse(ParseError::MisplacedRedirect { stage: 0, kind: RedirectType::Output, .. })) => {},
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn loop_survives_bad_lines() {
		let c = config(&["--exit-on-error"]);
		let input = Cursor::new(&b"\n| ls\ncat <\necho \"x\n"[..]);
		let mut out: Vec<u8> = vec![];
		assert!(run_loop(&c, input, &mut out, Some("> ")).is_ok());
		assert_eq!(out, b"> > > > > ");
	}

	#[test]
	fn file_names_are_bytes() {
		use std::ffi::OsStr;
		use std::os::unix::ffi::OsStrExt;

		let dir = tempfile::tempdir().unwrap();
		let mut line = b"touch ".to_vec();
		line.extend_from_slice(dir.path().as_os_str().as_bytes());
		line.extend_from_slice(b"/caf\xe9.txt\n");
		assert!(run_line(&config(&[]), &line).is_ok());
		assert!(dir.path().join(OsStr::from_bytes(b"caf\xe9.txt")).exists());
	}

	#[test]
	fn no_prompt_writes_nothing() {
		let c = config(&[]);
		let mut out: Vec<u8> = vec![];
		assert!(run_loop(&c, Cursor::new(&b"| x\n"[..]), &mut out, None).is_ok());
		assert!(out.is_empty());
	}
}
