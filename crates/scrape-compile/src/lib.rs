//! Scrape Compile - turning extracted GLSL into SPIR-V
//!
//! This crate provides:
//! - The `ShaderCompiler` seam used by the driver
//! - A `glslc` subprocess implementation with a wall-clock budget
//! - SPIR-V word stream decoding
//! - A recording mock compiler for tests

pub mod glslc;
pub mod mock;
pub mod words;

pub use glslc::{DEFAULT_TIMEOUT, Glslc};
pub use mock::{MockBehavior, MockCompiler};
pub use words::DecodeError;

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use scrape_core::{Compiled, Shader};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to run shader compiler {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader compiler exited with {status}:\n{diagnostics}")]
    Failed {
        status: ExitStatus,
        diagnostics: String,
    },

    #[error("shader compiler did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("I/O error talking to shader compiler: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid SPIR-V from shader compiler: {0}")]
    Decode(#[from] DecodeError),

    #[error("shader compiler produced non-UTF-8 disassembly")]
    Disassembly,

    #[error("{0}")]
    Rejected(String),
}

impl CompileError {
    /// Whether the error means the compiler broke its output contract.
    ///
    /// Such errors end the run; everything else is an ordinary compile
    /// failure that the driver may degrade around.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompileError::Decode(_))
    }
}

/// Compiles one shader to SPIR-V plus a human-readable disassembly
pub trait ShaderCompiler {
    fn compile(&self, shader: &Shader) -> Result<Compiled, CompileError>;
}

impl<C: ShaderCompiler + ?Sized> ShaderCompiler for &C {
    fn compile(&self, shader: &Shader) -> Result<Compiled, CompileError> {
        (**self).compile(shader)
    }
}

impl<C: ShaderCompiler + ?Sized> ShaderCompiler for Box<C> {
    fn compile(&self, shader: &Shader) -> Result<Compiled, CompileError> {
        (**self).compile(shader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_decode_errors_are_fatal() {
        assert!(CompileError::Decode(DecodeError::Misaligned(3)).is_fatal());
        assert!(!CompileError::TimedOut(Duration::from_secs(30)).is_fatal());
        assert!(!CompileError::Disassembly.is_fatal());
        assert!(!CompileError::Rejected("nope".to_string()).is_fatal());
    }

    #[test]
    fn compilers_work_through_references_and_boxes() {
        let shader = Shader::new(scrape_core::Stage::Vertex, "void main() {}".into(), 1);
        let mock = MockCompiler::new(MockBehavior::Succeed);

        let by_ref: &dyn ShaderCompiler = &mock;
        assert!(by_ref.compile(&shader).is_ok());

        let boxed: Box<dyn ShaderCompiler> = Box::new(MockCompiler::new(MockBehavior::Fail));
        assert!(boxed.compile(&shader).is_err());
    }
}
