//! Generated C source
//!
//! The output is a fixed preamble followed by one block per shader. The
//! preamble's macros rebuild `__qonos_shader<line>_info` from `__LINE__` at
//! each call site, so the names emitted here must be derived from the line
//! the extractor recorded and nothing else.

use std::fmt::{self, Display, Write};

use scrape_core::{Shader, Stage};

/// Version pragma placed ahead of every GLSL string table
const GLSL_VERSION_LINE: &str = "#version 330";

/// SPIR-V words per row of the generated array
const WORDS_PER_ROW: usize = 6;

/// Formatting switches that do not depend on the input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Add `.stage = VK_SHADER_STAGE_*` to each create info
    pub emit_stage_field: bool,
}

/// Banner, tag constants and the two public macros
pub struct Preamble;

impl Display for Preamble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(
            "/* ==========================  DO NOT EDIT!  ==========================\n \
             *             This file is autogenerated by scrape.\n \
             */\n\
             \n\
             #include <stdint.h>\n\
             \n\
             #define __QO_SPIRV_MAGIC \"\\x03\\x02\\x23\\x07\\0\\0\\0\\0\"\n\
             \n",
        )?;

        for stage in Stage::ALL {
            writeln!(
                f,
                "#define {:<30} __QO_SPIRV_MAGIC \"\\{}\\0\\0\\0\"",
                tag_macro(stage),
                stage.index()
            )?;
        }

        f.write_str(
            "\n\
             #define __QO_SHADER_INFO_VAR2(_line) __qonos_shader ## _line ## _info\n\
             #define __QO_SHADER_INFO_VAR(_line) __QO_SHADER_INFO_VAR2(_line)\n\
             \n\
             #define qoShaderCreateInfoGLSL(stage, ...)  \\\n    \
             __QO_SHADER_INFO_VAR(__LINE__)\n\
             \n\
             #define qoCreateShaderGLSL(dev, stage, ...) \\\n    \
             __qoCreateShader((dev), &__QO_SHADER_INFO_VAR(__LINE__))\n",
        )
    }
}

fn tag_macro(stage: Stage) -> String {
    format!("__QO_SPIRV_{}", stage.name())
}

/// Escape a line for use inside a C string literal
fn c_string_body(line: &str) -> String {
    let mut escaped = String::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Everything generated for one shader
pub struct ShaderBlock<'a> {
    shader: &'a Shader,
    with_binary: bool,
    options: EmitOptions,
}

impl<'a> ShaderBlock<'a> {
    pub fn new(shader: &'a Shader, source_only: bool, options: EmitOptions) -> Self {
        Self {
            shader,
            with_binary: !source_only && shader.compiled().is_some(),
            options,
        }
    }

    fn write_glsl(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        write!(f, "static const char {}_glsl_src[] =", prefix)?;
        write!(f, "\n{}", tag_macro(self.shader.stage()))?;
        write!(f, "\n\"{}\\n\"", GLSL_VERSION_LINE)?;
        for line in self.shader.table_lines() {
            write!(f, "\n\"{}\\n\"", c_string_body(line))?;
        }
        f.write_str(";\n\n")
    }

    fn write_spirv(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        let Some(compiled) = self.shader.compiled() else {
            return Ok(());
        };

        f.write_str("/* SPIR-V Assembly:\n *\n")?;
        for line in compiled.disassembly.lines() {
            writeln!(f, " * {}", line)?;
        }
        f.write_str(" */\n")?;

        write!(f, "static const uint32_t {}_spir_v_src[] = {{", prefix)?;
        for row in compiled.words.chunks(WORDS_PER_ROW) {
            f.write_str("\n    ")?;
            for word in row {
                write!(f, " 0x{:08x},", word)?;
            }
        }
        f.write_str("\n};\n")
    }
}

impl Display for ShaderBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.shader.symbol_prefix();

        f.write_str("\n\n")?;
        self.write_glsl(f, &prefix)?;
        if self.with_binary {
            self.write_spirv(f, &prefix)?;
        }

        writeln!(f, "static const QoShaderCreateInfo {}_info = {{", prefix)?;
        writeln!(f, "    .glslSize = sizeof({}_glsl_src),", prefix)?;
        writeln!(f, "    .pGlsl = {}_glsl_src,", prefix)?;
        if self.with_binary {
            writeln!(f, "    .spirvSize = sizeof({}_spir_v_src),", prefix)?;
            writeln!(f, "    .pSpirv = {}_spir_v_src,", prefix)?;
        }
        if self.options.emit_stage_field {
            writeln!(f, "    .stage = {},", self.shader.stage().vk_stage())?;
        }
        f.write_str("};")
    }
}

/// A complete generated file
pub struct Generated<'a> {
    shaders: &'a [Shader],
    source_only: bool,
    options: EmitOptions,
}

impl<'a> Generated<'a> {
    pub fn new(shaders: &'a [Shader], source_only: bool, options: EmitOptions) -> Self {
        Self {
            shaders,
            source_only,
            options,
        }
    }
}

impl Display for Generated<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Preamble.fmt(f)?;
        for shader in self.shaders {
            ShaderBlock::new(shader, self.source_only, self.options).fmt(f)?;
        }
        f.write_char('\n')
    }
}

/// Render the whole output file
pub fn render(shaders: &[Shader], source_only: bool, options: EmitOptions) -> String {
    Generated::new(shaders, source_only, options).to_string()
}
