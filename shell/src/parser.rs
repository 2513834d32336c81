use std::mem;

use log::debug;

use crate::error::ParseError;
use crate::operator::{classify, Operator};
use crate::types::*;

type ParseResult<T> = Result<T, ParseError>;

/// What the next word may be. The stage being built travels with the state.
#[derive(Debug)]
enum State<'a> {
	Command,
	Argument(CommandDescriptor<'a>),
	/// Word position of the pending `<` or `>`.
	Target(CommandDescriptor<'a>, RedirectType, usize),
}

struct Parser<'a> {
	stages: Vec<CommandDescriptor<'a>>,
	state: State<'a>,
}

/// Removes one matching pair of leading and trailing quotes.
/// Returns `None` when the closing quote is missing.
pub fn strip_quotes(token: &[u8]) -> Option<&[u8]> {
	match token.first() {
		Some(&q) if q == b'"' || q == b'\'' => {
			if token.len() >= 2 && token[token.len() - 1] == q {
				Some(&token[1 .. token.len() - 1])
			} else {
				None
			}
		},
		_ => Some(token),
	}
}

fn unquote(position: usize, token: &[u8]) -> ParseResult<&[u8]> {
	strip_quotes(token).ok_or_else(|| ParseError::UnbalancedQuote {
		position: position,
		token: String::from_utf8_lossy(token).into_owned(),
	})
}

impl<'a> Parser<'a> {
	fn new(size_hint: usize) -> Parser<'a> {
		Parser { stages: Vec::with_capacity(size_hint), state: State::Command }
	}

	fn step(&mut self, position: usize, token: &'a [u8]) -> ParseResult<()> {
		let op = classify(token);
		let state = mem::replace(&mut self.state, State::Command);
		if let Some(kind) = op.redirect_type() {
			self.state = match state {
				State::Command => {
					return Err(ParseError::RedirectBeforeCommand { position: position, kind: kind });
				},
				State::Argument(stage) => State::Target(stage, kind, position),
				State::Target(_, pending, at) => {
					return Err(ParseError::MissingTarget { position: at, kind: pending });
				},
			};
			return Ok(());
		}

		// only `Plain` and `Pipe` get here
		self.state = match (state, op) {
			(State::Command, Operator::Plain(word)) => State::Argument(CommandDescriptor::new(unquote(position, word)?)),
			(State::Argument(mut stage), Operator::Plain(word)) => {
				stage.arguments.push(unquote(position, word)?);
				State::Argument(stage)
			},
			(State::Target(mut stage, kind, _), Operator::Plain(word)) => {
				stage.set_redirect(kind, unquote(position, word)?);
				State::Argument(stage)
			},
			(State::Command, _) => {
				return Err(ParseError::MissingCommand { position: position });
			},
			(State::Argument(stage), _) => {
				self.stages.push(stage);
				State::Command
			},
			(State::Target(_, kind, at), _) => {
				return Err(ParseError::MissingTarget { position: at, kind: kind });
			},
		};
		Ok(())
	}

	fn finish(mut self) -> ParseResult<Pipeline<'a>> {
		match self.state {
			State::Argument(stage) => self.stages.push(stage),
			State::Command if self.stages.is_empty() => { return Err(ParseError::EmptyPipeline); },
			State::Command => { return Err(ParseError::TrailingPipe); },
			State::Target(_, kind, at) => { return Err(ParseError::MissingTarget { position: at, kind: kind }); },
		}
		Ok(Pipeline { stages: self.stages })
	}
}

pub fn parse<'a>(tokens: &[&'a [u8]]) -> ParseResult<Pipeline<'a>> {
	let pipes = tokens.iter().filter(|&&t| classify(t) == Operator::Pipe).count();
	let mut parser: Parser<'a> = Parser::new(pipes + 1);
	for (position, &token) in tokens.iter().enumerate() {
		parser.step(position, token)?;
	}
	let pipeline = parser.finish()?;
	debug!("parsed {} stage(s) from {} word(s)", pipeline.len(), tokens.len());
	Ok(pipeline)
}

/// Only the first stage may read a file and only the last may write one.
/// The parser itself accepts redirects anywhere; this is the stricter check.
pub fn check_redirects(pipeline: &Pipeline) -> ParseResult<()> {
	let last = pipeline.len().saturating_sub(1);
	for (i, stage) in pipeline.stages.iter().enumerate() {
		if i != 0 && stage.input.is_some() {
			return Err(ParseError::MisplacedRedirect { stage: i, kind: RedirectType::Input, allowed: "first" });
		}
		if i != last && stage.output.is_some() {
			return Err(ParseError::MisplacedRedirect { stage: i, kind: RedirectType::Output, allowed: "last" });
		}
	}
	Ok(())
}
