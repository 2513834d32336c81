//! Error types for parsing and running pipelines.
//!
//! Parse errors abandon the current line. Executor errors abandon the current
//! pipeline. Stage errors happen inside a forked child and only ever end that
//! child.

use std::ffi::NulError;

use nix::errno::Errno;
use thiserror::Error;

use crate::types::RedirectType;

/// Coarse classification shared by every error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	MalformedInput,
	ResourceExhaustion,
	RedirectionFailure,
	ExecImageReplaceFailure,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
	#[error("empty pipeline")]
	EmptyPipeline,

	#[error("missing command before '|' at word {position}")]
	MissingCommand { position: usize },

	#[error("missing command after trailing '|'")]
	TrailingPipe,

	#[error("'{kind}' at word {position} has no command to apply to")]
	RedirectBeforeCommand { position: usize, kind: RedirectType },

	#[error("'{kind}' at word {position} has no target file")]
	MissingTarget { position: usize, kind: RedirectType },

	#[error("unbalanced quote in word {position}: {token}")]
	UnbalancedQuote { position: usize, token: String },

	#[error("'{kind}' redirect is only allowed on the {allowed} stage (found on stage {stage})")]
	MisplacedRedirect { stage: usize, kind: RedirectType, allowed: &'static str },

	#[error("line longer than {limit} bytes")]
	LineTooLong { limit: usize },

	#[error("more than {limit} words on one line")]
	TooManyWords { limit: usize },
}

impl ParseError {
	pub fn kind(&self) -> ErrorKind {
		ErrorKind::MalformedInput
	}
}

/// Failure to set up a pipeline in the parent.
#[derive(Error, Debug)]
pub enum ExecError {
	#[error("argument contains a NUL byte: {0}")]
	Nul(#[from] NulError),

	#[error("could not create pipe: {0}")]
	Pipe(#[source] Errno),

	#[error("could not fork stage {stage}: {source}")]
	Fork { stage: usize, #[source] source: Errno },

	#[error("could not close pipe in parent: {0}")]
	Close(#[source] Errno),
}

impl ExecError {
	pub fn kind(&self) -> ErrorKind {
		match *self {
			ExecError::Nul(_) => ErrorKind::MalformedInput,
			ExecError::Pipe(_) | ExecError::Fork { .. } | ExecError::Close(_) => ErrorKind::ResourceExhaustion,
		}
	}
}

/// Why a forked stage did not become its target program.
#[derive(Error, Debug)]
pub enum StageError {
	#[error("could not open {} file {path}: {source}", .kind.name())]
	Redirect { path: String, kind: RedirectType, #[source] source: Errno },

	#[error("could not wire {what}: {source}")]
	Wire { what: &'static str, #[source] source: Errno },

	#[error("{program}: {source}")]
	Exec { program: String, #[source] source: Errno },
}

impl StageError {
	pub fn kind(&self) -> ErrorKind {
		match *self {
			StageError::Redirect { .. } | StageError::Wire { .. } => ErrorKind::RedirectionFailure,
			StageError::Exec { .. } => ErrorKind::ExecImageReplaceFailure,
		}
	}

	/// Status the child exits with.
	pub fn exit_code(&self) -> i32 {
		match *self {
			StageError::Redirect { .. } | StageError::Wire { .. } => 1,
			StageError::Exec { source: Errno::ENOENT, .. } => 127,
			StageError::Exec { .. } => 126,
		}
	}
}

/// Why one input line did not run.
#[derive(Error, Debug)]
pub enum Error {
	#[error(transparent)]
	Parse(#[from] ParseError),

	#[error(transparent)]
	Exec(#[from] ExecError),
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match *self {
			Error::Parse(ref e) => e.kind(),
			Error::Exec(ref e) => e.kind(),
		}
	}

	/// Interpreter exit status when a `-c` line fails.
	pub fn exit_status(&self) -> i32 {
		match self.kind() {
			ErrorKind::MalformedInput => 2,
			_ => 1,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn line_error_status() {
		let parse: Error = ParseError::TrailingPipe.into();
		assert_eq!(parse.exit_status(), 2);
		let exec: Error = ExecError::Pipe(Errno::ENFILE).into();
		assert_eq!(exec.exit_status(), 1);
		assert!(exec.to_string().starts_with("could not create pipe: ENFILE"));
	}

	#[test]
	fn parse_errors_are_malformed_input() {
		let e = ParseError::MissingCommand { position: 0 };
		assert_eq!(e.kind(), ErrorKind::MalformedInput);
		assert_eq!(e.to_string(), "missing command before '|' at word 0");
	}

	#[test]
	fn exec_error_kinds() {
		assert_eq!(ExecError::Pipe(Errno::EMFILE).kind(), ErrorKind::ResourceExhaustion);
		assert_eq!(ExecError::Fork { stage: 1, source: Errno::EAGAIN }.kind(), ErrorKind::ResourceExhaustion);
	}

	#[test]
	fn stage_exit_codes() {
		let missing = StageError::Exec { program: "nope".to_string(), source: Errno::ENOENT };
		assert_eq!(missing.exit_code(), 127);
		assert_eq!(missing.kind(), ErrorKind::ExecImageReplaceFailure);
		let denied = StageError::Exec { program: "/etc".to_string(), source: Errno::EACCES };
		assert_eq!(denied.exit_code(), 126);
		let redirect = StageError::Redirect { path: "x".to_string(), kind: RedirectType::Input, source: Errno::ENOENT };
		assert_eq!(redirect.exit_code(), 1);
		assert_eq!(redirect.kind(), ErrorKind::RedirectionFailure);
	}
}
