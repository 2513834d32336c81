//! psh: reads lines of `cmd args [< in] | cmd args [> out]` and runs each
//! line as a pipeline of external programs.

pub mod config;
pub mod driver;
pub mod error;
pub mod eval;
pub mod job;
pub mod logging;
pub mod operator;
pub mod parser;
pub mod pipes;
pub mod tokenizer;
pub mod types;
