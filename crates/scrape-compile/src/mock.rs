//! Mock compiler for testing
//!
//! Produces canned results without spawning anything and records which
//! shaders it was asked to compile, so tests can check ordering and that
//! compilation stopped where it should.

use std::cell::RefCell;

use scrape_core::{Compiled, Shader};

use crate::{CompileError, ShaderCompiler};

/// What the mock does when asked to compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Every shader compiles
    Succeed,
    /// Every shader fails
    Fail,
    /// Only the shader ending on this line fails
    FailOnLine(usize),
    /// Every shader yields a misaligned binary
    Corrupt,
}

#[derive(Debug)]
pub struct MockCompiler {
    behavior: MockBehavior,
    /// Lines of the shaders passed to `compile`, in call order
    calls: RefCell<Vec<usize>>,
}

impl MockCompiler {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<usize> {
        self.calls.borrow().clone()
    }

    /// Deterministic fake binary: SPIR-V magic, stage index, line
    pub fn words_for(shader: &Shader) -> Vec<u32> {
        vec![0x0723_0203, shader.stage().index() as u32, shader.line() as u32]
    }
}

impl ShaderCompiler for MockCompiler {
    fn compile(&self, shader: &Shader) -> Result<Compiled, CompileError> {
        self.calls.borrow_mut().push(shader.line());

        let fail = match self.behavior {
            MockBehavior::Succeed => false,
            MockBehavior::Fail => true,
            MockBehavior::FailOnLine(line) => line == shader.line(),
            MockBehavior::Corrupt => {
                return Err(crate::words::DecodeError::Misaligned(3).into());
            }
        };

        if fail {
            return Err(CompileError::Rejected(format!(
                "<stdin>:1: error: mock failure for shader on line {}",
                shader.line()
            )));
        }

        Ok(Compiled {
            words: Self::words_for(shader),
            disassembly: format!("; mock SPIR-V for {} shader", shader.stage()),
        })
    }
}
