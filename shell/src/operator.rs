use crate::types::RedirectType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator<'a> {
	Pipe,
	RedirectIn,
	RedirectOut,
	Plain(&'a [u8]),
}

impl<'a> Operator<'a> {
	pub fn redirect_type(self) -> Option<RedirectType> {
		match self {
			Operator::RedirectIn => Some(RedirectType::Input),
			Operator::RedirectOut => Some(RedirectType::Output),
			_ => None,
		}
	}
}

/// Operators must stand alone as a word; `a|b` is a plain word.
pub fn classify(token: &[u8]) -> Operator {
	match token {
		b"|" => Operator::Pipe,
		b"<" => Operator::RedirectIn,
		b">" => Operator::RedirectOut,
		_ => Operator::Plain(token),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn operators() {
		assert_eq!(classify(b"|"), Operator::Pipe);
		assert_eq!(classify(b"<"), Operator::RedirectIn);
		assert_eq!(classify(b">"), Operator::RedirectOut);
	}

	#[test]
	fn everything_else_is_plain() {
		for &word in &["ls", "", "||", ">>", "2>", "a|b", "\"|\"", "<in"] {
			assert_eq!(classify(word.as_bytes()), Operator::Plain(word.as_bytes()));
		}
		assert_eq!(classify(b"\xff|"), Operator::Plain(b"\xff|"));
	}

	#[test]
	fn redirect_types() {
		assert_eq!(classify(b"<").redirect_type(), Some(RedirectType::Input));
		assert_eq!(classify(b">").redirect_type(), Some(RedirectType::Output));
		assert_eq!(classify(b"|").redirect_type(), None);
		assert_eq!(classify(b"x").redirect_type(), None);
	}
}
