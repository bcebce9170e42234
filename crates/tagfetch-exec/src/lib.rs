pub mod runner;
pub mod shell;

pub use runner::{CommandRunner, ShellRunner};
pub use shell::{run_captured, strip_trailing_newline, CommandOutput, ShellError};

pub type Result<T> = std::result::Result<T, ShellError>;
