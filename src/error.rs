//! Crate-level error for the file and configuration glue around the compiler.

use std::fmt;
use std::io;

use crate::dsl::CompileError;

#[derive(Debug)]
pub enum Error {
    /// Reading the source or config, or writing the artifact, failed.
    Io(io::Error),
    /// The configuration file is not valid YAML for [`crate::config::Config`].
    Config(serde_yaml::Error),
    /// The source did not compile.
    Compile(CompileError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Config(e) => write!(f, "config error: {e}"),
            Error::Compile(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Config(e) => Some(e),
            Error::Compile(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err)
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Error::Compile(err)
    }
}
