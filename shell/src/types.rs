use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectType { Input, Output }

impl RedirectType {
	pub fn name(self) -> &'static str {
		match self {
			RedirectType::Input => "input",
			RedirectType::Output => "output",
		}
	}
}

impl fmt::Display for RedirectType {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			RedirectType::Input => f.write_str("<"),
			RedirectType::Output => f.write_str(">"),
		}
	}
}

/// One pipeline stage. Every word borrows the input line, which may hold any
/// bytes but NUL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor<'a> {
	pub name: &'a [u8],
	/// `arguments[0]` is always `name`.
	pub arguments: Vec<&'a [u8]>,
	pub input: Option<&'a [u8]>,
	pub output: Option<&'a [u8]>,
}

impl<'a> CommandDescriptor<'a> {
	pub fn new(name: &'a [u8]) -> CommandDescriptor<'a> {
		CommandDescriptor { name: name, arguments: vec![name], input: None, output: None }
	}

	pub fn set_redirect(&mut self, typ: RedirectType, target: &'a [u8]) {
		match typ {
			RedirectType::Input => self.input = Some(target),
			RedirectType::Output => self.output = Some(target),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline<'a> {
	pub stages: Vec<CommandDescriptor<'a>>,
}

impl<'a> Pipeline<'a> {
	pub fn len(&self) -> usize {
		self.stages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.stages.is_empty()
	}

	/// Number of pipes joining the stages.
	pub fn pipe_count(&self) -> usize {
		self.stages.len().saturating_sub(1)
	}
}
