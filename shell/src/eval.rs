//! Runs a parsed pipeline: one forked process per stage.
//!
//! The parent allocates every pipe up front, forks the stages in order,
//! closes every pipe end it holds and then reaps all children. Each child
//! wires its redirects and pipe ends onto stdin/stdout, closes the whole
//! pipe set and execs. A child that cannot exec prints why and exits
//! nonzero; the parent only ever learns that through `waitpid`.

use std::convert::Infallible;
use std::ffi::{CStr, CString, NulError};
use std::io;
use std::io::Write;
use std::os::unix::io::RawFd;

use log::{debug, trace, warn};
use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{self, ForkResult};

use crate::error::{ExecError, StageError};
use crate::job::{Job, JobBuilder};
use crate::pipes::PipeSet;
use crate::types::{CommandDescriptor, Pipeline, RedirectType};

/// Owned C strings for one stage, built before anything is forked.
#[derive(Debug)]
struct PreparedStage {
	program: CString,
	argv: Vec<CString>,
	input: Option<CString>,
	output: Option<CString>,
}

impl PreparedStage {
	fn new(stage: &CommandDescriptor) -> Result<PreparedStage, NulError> {
		let argv: Result<Vec<CString>, NulError> = stage.arguments.iter().map(|&s| CString::new(s)).collect();
		Ok(PreparedStage {
			program: CString::new(stage.name)?,
			argv: argv?,
			input: stage.input.map(CString::new).transpose()?,
			output: stage.output.map(CString::new).transpose()?,
		})
	}
}

fn prepare(pipeline: &Pipeline) -> Result<Vec<PreparedStage>, ExecError> {
	let stages: Result<Vec<PreparedStage>, NulError> = pipeline.stages.iter().map(PreparedStage::new).collect();
	Ok(stages?)
}

/// A pipe end replaces a file redirect on the same stream.
fn warn_overridden(pipeline: &Pipeline) {
	let last = pipeline.len().saturating_sub(1);
	for (i, stage) in pipeline.stages.iter().enumerate() {
		if i != 0 && stage.input.is_some() {
			warn!("stage {} ({}): stdin comes from the pipe, '<' target is opened but not read",
			      i, String::from_utf8_lossy(stage.name));
		}
		if i != last && stage.output.is_some() {
			warn!("stage {} ({}): stdout goes to the pipe, '>' target is truncated but not written",
			      i, String::from_utf8_lossy(stage.name));
		}
	}
}

fn redirect(path: &CStr, typ: RedirectType, target: RawFd) -> Result<(), StageError> {
	let (oflag, mode) = match typ {
		RedirectType::Input => (OFlag::O_RDONLY, Mode::empty()),
		RedirectType::Output => (OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
		                         Mode::S_IRWXU | Mode::S_IRWXG | Mode::S_IRWXO),
	};
	let err = |source| StageError::Redirect { path: path.to_string_lossy().into_owned(), kind: typ, source: source };
	let fd = fcntl::open(path, oflag, mode).map_err(err)?;
	if fd != target {
		unistd::dup2(fd, target).map_err(err)?;
		unistd::close(fd).map_err(err)?;
	}
	Ok(())
}

fn wire(fd: RawFd, target: RawFd, what: &'static str) -> Result<(), StageError> {
	unistd::dup2(fd, target).map(drop).map_err(|source| StageError::Wire { what: what, source: source })
}

/// Puts stage `i`'s redirects and pipe ends on stdin/stdout, then closes
/// every pipe end it was handed. On an early return `pipes` is dropped, which
/// closes all of it too.
fn wire_stage(i: usize, stage: &PreparedStage, pipes: PipeSet) -> Result<(), StageError> {
	if let Some(ref path) = stage.output {
		redirect(path, RedirectType::Output, libc::STDOUT_FILENO)?;
	}
	if let Some(ref path) = stage.input {
		redirect(path, RedirectType::Input, libc::STDIN_FILENO)?;
	}
	if i != 0 {
		wire(pipes.read_end(i - 1), libc::STDIN_FILENO, "stdin to pipe")?;
	}
	if i != pipes.len() {
		wire(pipes.write_end(i), libc::STDOUT_FILENO, "stdout to pipe")?;
	}
	pipes.close_all().map(drop).map_err(|source| StageError::Wire { what: "pipe ends", source: source })
}

/// Child side of stage `i`. Only returns if the program image was not replaced.
fn run_stage(i: usize, stage: &PreparedStage, pipes: PipeSet) -> Result<Infallible, StageError> {
	wire_stage(i, stage, pipes)?;
	unistd::execvp(&stage.program, &stage.argv).map_err(|source| StageError::Exec {
		program: stage.program.to_string_lossy().into_owned(),
		source: source,
	})
}

fn exec_stage(i: usize, stage: &PreparedStage, pipes: PipeSet) -> ! {
	let code = match run_stage(i, stage, pipes) {
		Ok(never) => match never {},
		Err(e) => {
			let _ = writeln!(&mut io::stderr(), "psh: {}", e);
			e.exit_code()
		},
	};
	unsafe { libc::_exit(code) }
}

/// Starts every stage and returns without waiting.
///
/// If a fork fails, the stages already started are still reaped before the
/// error is returned.
pub fn spawn(pipeline: &Pipeline) -> Result<Job, ExecError> {
	if pipeline.is_empty() {
		return Ok(JobBuilder::new(0).build());
	}
	let stages = prepare(pipeline)?;
	warn_overridden(pipeline);
	let pipes = PipeSet::allocate(pipeline.pipe_count()).map_err(ExecError::Pipe)?;

	let mut job_builder = JobBuilder::new(stages.len());
	let mut fork_err = None;
	for (i, stage) in stages.iter().enumerate() {
		// SAFETY: the interpreter is single threaded, and the child only
		// duplicates and closes descriptors before it execs or exits.
		match unsafe { job_builder.push_fork() } {
			Ok(ForkResult::Parent { child }) => {
				trace!("stage {} ({}) is pid {}", i, stage.program.to_string_lossy(), child);
			},
			Ok(ForkResult::Child) => exec_stage(i, stage, pipes),
			Err(e) => {
				fork_err = Some(ExecError::Fork { stage: i, source: e });
				break;
			},
		}
	}

	debug!("spawned {} of {} stage(s)", job_builder.len(), stages.len());
	let closed = pipes.close_all();
	let job = job_builder.build();
	if let Some(e) = fork_err {
		job.wait();
		return Err(e);
	}
	match closed {
		Ok(n) => trace!("parent closed {} pipe end(s)", n),
		Err(e) => {
			job.wait();
			return Err(ExecError::Close(e));
		},
	}
	Ok(job)
}

/// Spawns the pipeline and reaps every stage, keeping their statuses.
pub fn run(pipeline: &Pipeline) -> Result<Job, ExecError> {
	Ok(spawn(pipeline)?.wait())
}

/// Stage exit codes are not errors; only setup failures are.
pub fn execute(pipeline: &Pipeline) -> Result<(), ExecError> {
	run(pipeline).map(drop)
}
