//! Shader records produced by the extractor

use std::fmt;
use std::str::FromStr;

/// Pipeline stage named by a macro's stage argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
    Compute,
}

impl Stage {
    /// Every stage, in tag order
    pub const ALL: [Stage; 6] = [
        Stage::Vertex,
        Stage::TessControl,
        Stage::TessEvaluation,
        Stage::Geometry,
        Stage::Fragment,
        Stage::Compute,
    ];

    /// Spelling used in the host source and in the generated tag macros
    pub fn name(self) -> &'static str {
        match self {
            Stage::Vertex => "VERTEX",
            Stage::TessControl => "TESS_CONTROL",
            Stage::TessEvaluation => "TESS_EVALUATION",
            Stage::Geometry => "GEOMETRY",
            Stage::Fragment => "FRAGMENT",
            Stage::Compute => "COMPUTE",
        }
    }

    /// Value for the compiler's `-fshader-stage=` flag
    pub fn glslc_name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::TessControl => "tesscontrol",
            Stage::TessEvaluation => "tesseval",
            Stage::Geometry => "geometry",
            Stage::Fragment => "fragment",
            Stage::Compute => "compute",
        }
    }

    /// Vulkan stage enumerator, for struct layouts that carry the stage
    pub fn vk_stage(self) -> &'static str {
        match self {
            Stage::Vertex => "VK_SHADER_STAGE_VERTEX",
            Stage::TessControl => "VK_SHADER_STAGE_TESS_CONTROL",
            Stage::TessEvaluation => "VK_SHADER_STAGE_TESS_EVALUATION",
            Stage::Geometry => "VK_SHADER_STAGE_GEOMETRY",
            Stage::Fragment => "VK_SHADER_STAGE_FRAGMENT",
            Stage::Compute => "VK_SHADER_STAGE_COMPUTE",
        }
    }

    /// Position in the binary-format tag table (0..=5)
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a stage argument is not one of the six known names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStage(pub String);

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

/// Output of a successful compile: the SPIR-V words and their disassembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    pub words: Vec<u32>,
    pub disassembly: String,
}

/// One embedded program found in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    stage: Stage,
    source: String,
    line: usize,
    compiled: Option<Compiled>,
}

impl Shader {
    pub fn new(stage: Stage, source: String, line: usize) -> Self {
        Self {
            stage,
            source,
            line,
            compiled: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// De-indented program text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Line of the invocation's closing parenthesis.
    ///
    /// Generated symbols are named after this line, and the preamble macros
    /// rebuild the same name from `__LINE__` at the call site.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Prefix shared by every symbol generated for this shader
    pub fn symbol_prefix(&self) -> String {
        format!("__qonos_shader{}", self.line)
    }

    pub fn compiled(&self) -> Option<&Compiled> {
        self.compiled.as_ref()
    }

    pub fn set_compiled(&mut self, compiled: Compiled) {
        self.compiled = Some(compiled);
    }

    /// Drop any attached binary, returning the shader to source-only form
    pub fn clear_compiled(&mut self) {
        self.compiled = None;
    }

    /// Source lines that end up in the string table; blank lines are skipped
    pub fn table_lines(&self) -> impl Iterator<Item = &str> {
        self.source.lines().filter(|line| !line.trim().is_empty())
    }
}
