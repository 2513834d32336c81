use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{self, Pid};

pub trait WaitStatusExt {
	/// Shell-style code: the exit status, or 128 + signal number.
	fn code(self) -> Option<i32>;
	fn is_terminated(self) -> bool;
}

impl WaitStatusExt for WaitStatus {
	fn code(self) -> Option<i32> {
		match self {
			WaitStatus::Exited(_, code) => Some(code),
			WaitStatus::Signaled(_, sig, _) => Some(128 + sig as i32),
			_ => None,
		}
	}
	fn is_terminated(self) -> bool {
		match self {
			WaitStatus::Exited(..) | WaitStatus::Signaled(..) => true,
			_ => false,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Process {
	pub pid: Pid,
	pub status: WaitStatus,
}

/// The stage processes of one pipeline, in stage order.
#[derive(Debug)]
pub struct Job {
	pub processes: Vec<Process>,
}

impl Job {
	pub fn is_terminated(&self) -> bool {
		self.processes.iter().all(|pr| pr.status.is_terminated())
	}

	/// Reaps every process. Exit codes are recorded, never turned into errors.
	pub fn wait(mut self) -> Job {
		for pr in self.processes.iter_mut() {
			loop {
				match waitpid(pr.pid, None) {
					Ok(status) => {
						pr.status = status;
						break;
					},
					Err(Errno::EINTR) => continue,
					Err(e) => {
						warn!("waitpid {}: {}", pr.pid, e);
						break;
					},
				}
			}
			debug!("reaped {}: {:?}", pr.pid, pr.status);
		}
		if !self.is_terminated() {
			warn!("job left processes without a final status: {:?}", self.processes);
		}
		self
	}
}

#[derive(Debug)]
pub struct JobBuilder {
	imp: Job,
}

impl JobBuilder {
	pub fn new(size_hint: usize) -> JobBuilder {
		JobBuilder {
			imp: Job { processes: Vec::with_capacity(size_hint) }
		}
	}

	/// Forks and records the child's pid on the parent side.
	///
	/// # Safety
	///
	/// Same contract as `nix::unistd::fork`: the child may only do
	/// async-signal-safe work before it execs or exits.
	pub unsafe fn push_fork(&mut self) -> nix::Result<unistd::ForkResult> {
		let r = unistd::fork()?;
		if let unistd::ForkResult::Parent { child: pid } = r {
			self.imp.processes.push(Process { pid: pid, status: WaitStatus::StillAlive });
		}
		Ok(r)
	}

	pub fn len(&self) -> usize {
		self.imp.processes.len()
	}

	pub fn build(self) -> Job {
		self.imp
	}
}
