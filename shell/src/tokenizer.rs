use crate::error::ParseError;

pub const MAX_LINE_CHARS: usize = 1024;
pub const MAX_LINE_WORDS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
	pub max_line: usize,
	pub max_words: usize,
}

impl Default for Limits {
	fn default() -> Limits {
		Limits { max_line: MAX_LINE_CHARS, max_words: MAX_LINE_WORDS }
	}
}

fn is_whitespace(c: u8) -> bool {
	match c {
		b' ' | b'\t' | b'\n' | b'\r' => true,
		_ => false,
	}
}

fn trim_line_end(mut line: &[u8]) -> &[u8] {
	while let Some((&last, rest)) = line.split_last() {
		if last != b'\n' && last != b'\r' {
			break;
		}
		line = rest;
	}
	line
}

/// Splits one line into words. Operators have to be surrounded by whitespace.
/// Words are raw bytes; nothing here cares about the encoding.
pub fn split_line(line: &[u8], limits: Limits) -> Result<Vec<&[u8]>, ParseError> {
	let line = trim_line_end(line);
	if line.len() > limits.max_line {
		return Err(ParseError::LineTooLong { limit: limits.max_line });
	}
	let words: Vec<&[u8]> = line.split(|&c| is_whitespace(c)).filter(|w| !w.is_empty()).collect();
	if words.len() > limits.max_words {
		return Err(ParseError::TooManyWords { limit: limits.max_words });
	}
	Ok(words)
}
