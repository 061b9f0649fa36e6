//! Run orchestration: extract, compile, emit
//!
//! A run extracts every shader in a single pass, then compiles them in
//! order. The first compile failure either aborts the run or switches it to
//! source-only mode, depending on the configured policy. In source-only
//! mode no shader in the output carries SPIR-V: a pipeline must not mix a
//! SPIR-V stage with a GLSL one.

use scrape_compile::{CompileError, ShaderCompiler};
use scrape_config::CompileFailurePolicy;
use scrape_core::{Shader, SyntaxError, extract};
use thiserror::Error;

use crate::emit::{self, EmitOptions};

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("malformed shader macro: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("shader on line {line} failed to compile")]
    Compile {
        line: usize,
        #[source]
        source: CompileError,
    },
}

/// Run-wide output mode, decided once every compile attempt has resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    pub fallback_to_source_only: bool,
}

/// Knobs for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip compilation entirely
    pub glsl_only: bool,
    pub policy: CompileFailurePolicy,
    pub emit: EmitOptions,
}

/// First compile failure of a run that fell back to source-only output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileFailure {
    pub line: usize,
    pub message: String,
}

/// Result of a finished run, ready to be rendered
#[derive(Debug)]
pub struct Run {
    shaders: Vec<Shader>,
    mode: RunMode,
    failure: Option<CompileFailure>,
    emit: EmitOptions,
}

impl Run {
    pub fn shaders(&self) -> &[Shader] {
        &self.shaders
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn failure(&self) -> Option<&CompileFailure> {
        self.failure.as_ref()
    }

    /// Generated C source for this run
    pub fn render(&self) -> String {
        emit::render(
            &self.shaders,
            self.mode.fallback_to_source_only,
            self.emit,
        )
    }
}

/// Compile `shaders` in order and attach the results.
///
/// Under [`CompileFailurePolicy::Fallback`], the first failure stops the batch and
/// strips every binary already attached, so the batch comes back uniformly
/// source-only. Under [`CompileFailurePolicy::Abort`], and for fatal errors under
/// either policy, the error is returned instead.
pub fn compile_all<C: ShaderCompiler + ?Sized>(
    shaders: &mut [Shader],
    compiler: &C,
    policy: CompileFailurePolicy,
) -> Result<(RunMode, Option<CompileFailure>), DriverError> {
    for index in 0..shaders.len() {
        let line = shaders[index].line();
        let error = match compiler.compile(&shaders[index]) {
            Ok(compiled) => {
                shaders[index].set_compiled(compiled);
                continue;
            }
            Err(error) => error,
        };

        if error.is_fatal() || policy == CompileFailurePolicy::Abort {
            return Err(DriverError::Compile {
                line,
                source: error,
            });
        }

        log::warn!(
            "Shader on line {} failed to compile, emitting GLSL only for all {} shader(s): {}",
            line,
            shaders.len(),
            error
        );
        for shader in shaders.iter_mut() {
            shader.clear_compiled();
        }

        let failure = CompileFailure {
            line,
            message: error.to_string(),
        };
        return Ok((
            RunMode {
                fallback_to_source_only: true,
            },
            Some(failure),
        ));
    }

    Ok((RunMode::default(), None))
}

/// Extract every shader from `input` and compile them unless `glsl_only`
pub fn run<C: ShaderCompiler + ?Sized>(
    input: &str,
    compiler: &C,
    options: RunOptions,
) -> Result<Run, DriverError> {
    let mut shaders = extract(input)?;
    log::info!("Found {} shader(s)", shaders.len());

    let (mode, failure) = if options.glsl_only {
        (
            RunMode {
                fallback_to_source_only: true,
            },
            None,
        )
    } else {
        compile_all(&mut shaders, compiler, options.policy)?
    };

    Ok(Run {
        shaders,
        mode,
        failure,
        emit: options.emit,
    })
}
