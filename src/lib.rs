//! Scrape - embed inline GLSL and its SPIR-V in generated C
//!
//! Scans a C source file for `qoShaderCreateInfoGLSL` and
//! `qoCreateShaderGLSL` invocations, compiles each embedded program with
//! `glslc`, and writes a C file holding the GLSL string tables, the SPIR-V
//! word arrays and the `QoShaderCreateInfo` structs the macros expand to.

pub mod driver;
pub mod emit;
pub mod files;

pub use driver::{CompileFailure, DriverError, Run, RunMode, RunOptions, compile_all, run};
pub use emit::{EmitOptions, Preamble, render};
pub use files::{Location, OutputSink, read_input};

pub use scrape_compile::{CompileError, Glslc, ShaderCompiler};
pub use scrape_config::{CompileFailurePolicy, Config};
pub use scrape_core::{Shader, Stage, SyntaxError};
