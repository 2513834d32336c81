//! Pipes joining the stages of one pipeline.
//!
//! Every process that holds a `PipeSet` (the parent and each forked stage)
//! must close all of it once its own stdin/stdout are wired. A write end that
//! stays open anywhere keeps the downstream reader from ever seeing EOF.

use std::os::unix::io::{AsRawFd, IntoRawFd, OwnedFd, RawFd};

use log::trace;
use nix::fcntl::OFlag;
use nix::unistd;

#[derive(Debug)]
pub struct Pipe {
	read: OwnedFd,
	write: OwnedFd,
}

/// Pipe `i` carries the output of stage `i` to stage `i + 1`.
#[derive(Debug)]
pub struct PipeSet {
	pipes: Vec<Pipe>,
}

impl PipeSet {
	/// On failure the pipes made so far are dropped, which closes them.
	/// Ends are close-on-exec, so a process forked for some other pipeline
	/// never carries them into its program; `dup2` onto stdin/stdout clears
	/// the flag on the copy a stage keeps.
	pub fn allocate(count: usize) -> nix::Result<PipeSet> {
		let mut pipes = Vec::with_capacity(count);
		for _ in 0 .. count {
			let (read, write) = unistd::pipe2(OFlag::O_CLOEXEC)?;
			trace!("pipe {}: read {} write {}", pipes.len(), read.as_raw_fd(), write.as_raw_fd());
			pipes.push(Pipe { read: read, write: write });
		}
		Ok(PipeSet { pipes: pipes })
	}

	pub fn len(&self) -> usize {
		self.pipes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pipes.is_empty()
	}

	pub fn read_end(&self, i: usize) -> RawFd {
		self.pipes[i].read.as_raw_fd()
	}

	pub fn write_end(&self, i: usize) -> RawFd {
		self.pipes[i].write.as_raw_fd()
	}

	/// Closes both ends of every pipe and returns how many ends were closed.
	/// Keeps going after a failed close; the first error is returned.
	pub fn close_all(self) -> nix::Result<usize> {
		let mut closed = 0;
		let mut first_err = None;
		for pipe in self.pipes {
			for fd in [pipe.read.into_raw_fd(), pipe.write.into_raw_fd()] {
				match unistd::close(fd) {
					Ok(()) => closed += 1,
					Err(e) => { first_err.get_or_insert(e); },
				}
			}
		}
		match first_err {
			Some(e) => Err(e),
			None => Ok(closed),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use nix::fcntl::{fcntl, FcntlArg};

	fn is_open(fd: RawFd) -> bool {
		fcntl(fd, FcntlArg::F_GETFD).is_ok()
	}

	#[test]
	fn no_pipes_for_a_single_stage() {
		let pipes = PipeSet::allocate(0).unwrap();
		assert!(pipes.is_empty());
		assert_eq!(pipes.close_all(), Ok(0));
	}

	#[test]
	fn close_all_closes_every_end() {
		for n in 1 .. 6 {
			let pipes = PipeSet::allocate(n).unwrap();
			assert_eq!(pipes.len(), n);
			let fds: Vec<RawFd> = (0 .. n).flat_map(|i| vec![pipes.read_end(i), pipes.write_end(i)]).collect();
			assert!(fds.iter().all(|&fd| is_open(fd)));
			assert_eq!(pipes.close_all(), Ok(2 * n));
		}
	}

	#[test]
	fn ends_are_connected() {
		use std::fs::File;
		use std::io::{Read, Write};

		let pipes = PipeSet::allocate(1).unwrap();
		let mut w = File::from(pipes.pipes[0].write.try_clone().unwrap());
		let mut r = File::from(pipes.pipes[0].read.try_clone().unwrap());
		w.write_all(b"hi").unwrap();
		let mut buf = [0u8; 2];
		r.read_exact(&mut buf).unwrap();
		assert_eq!(&buf, b"hi");
		assert_eq!(pipes.close_all(), Ok(2));
	}
}
