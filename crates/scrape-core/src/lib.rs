//! Scrape Core - finding GLSL embedded in C sources
//!
//! This crate provides:
//! - A line-tracking lexer for the two shader macros
//! - Extraction of each invocation into a `Shader` record
//! - The shader data model shared by the compiler and emitter

pub mod dedent;
pub mod extract;
pub mod lexer;
pub mod shader;

pub use dedent::dedent;
pub use extract::{Extractor, SyntaxError, extract};
pub use lexer::{Lexer, MacroKind, Token};
pub use shader::{Compiled, Shader, Stage, UnknownStage};
