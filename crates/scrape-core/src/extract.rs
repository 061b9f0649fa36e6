//! Macro invocation extraction
//!
//! Walks the token stream once, and for every `qoShaderCreateInfoGLSL` or
//! `qoCreateShaderGLSL` invocation captures the stage argument and the raw
//! program text up to the invocation's closing parenthesis.
//!
//! Parenthesis depth is tracked over every `(`/`)` token in the program
//! text, including ones inside GLSL comments. Unbalanced parentheses in the
//! embedded text therefore push the capture past the real end of the
//! invocation; that is a known limitation of scanning without a grammar.

use std::collections::HashSet;

use thiserror::Error;

use crate::dedent::dedent;
use crate::lexer::{Lexer, MacroKind, Token};
use crate::shader::{Shader, Stage};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("line {line}: expected '(' after {macro_name}, found {found:?}")]
    ExpectedOpenParen {
        line: usize,
        macro_name: &'static str,
        found: String,
    },

    #[error("line {line}: expected ',' after {after}, found {found:?}")]
    ExpectedComma {
        line: usize,
        after: &'static str,
        found: String,
    },

    #[error("line {line}: unknown shader stage {name:?}")]
    UnknownStage { line: usize, name: String },

    #[error("line {line}: unexpected end of input while reading {context}")]
    UnexpectedEof { line: usize, context: &'static str },

    #[error("line {line}: shader source is empty")]
    EmptySource { line: usize },

    #[error("line {line}: two shader invocations end on the same line")]
    DuplicateLine { line: usize },
}

/// Pulls shaders out of a token stream
pub struct Extractor<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Extractor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    fn next_token(&mut self, context: &'static str) -> Result<Token, SyntaxError> {
        self.lexer.next().ok_or(SyntaxError::UnexpectedEof {
            line: self.lexer.line(),
            context,
        })
    }

    fn expect_comma(&mut self, after: &'static str) -> Result<(), SyntaxError> {
        match self.next_token(after)? {
            Token::Comma => Ok(()),
            other => Err(SyntaxError::ExpectedComma {
                line: self.lexer.line(),
                after,
                found: other.to_string(),
            }),
        }
    }

    /// Parse the argument list of one invocation; the macro token is consumed
    fn invocation(&mut self, kind: MacroKind) -> Result<Shader, SyntaxError> {
        match self.next_token("macro arguments")? {
            Token::OpenParen => {}
            other => {
                return Err(SyntaxError::ExpectedOpenParen {
                    line: self.lexer.line(),
                    macro_name: kind.name(),
                    found: other.to_string(),
                });
            }
        }

        if kind.takes_device() {
            self.next_token("device argument")?;
            self.expect_comma("device argument")?;
        }

        let stage_token = self.next_token("stage argument")?;
        let name = stage_token.as_str().trim();
        let stage: Stage = name.parse().map_err(|_| SyntaxError::UnknownStage {
            line: self.lexer.line(),
            name: name.to_string(),
        })?;

        self.expect_comma("stage argument")?;

        let source = self.capture_source()?;
        let line = self.lexer.line();
        let source = dedent(&source);

        if source.trim().is_empty() {
            return Err(SyntaxError::EmptySource { line });
        }

        log::debug!("Extracted {} shader ending on line {}", stage, line);
        Ok(Shader::new(stage, source, line))
    }

    /// Collect raw text up to the close paren that balances the invocation's
    /// open paren. That close paren is consumed but not captured.
    fn capture_source(&mut self) -> Result<String, SyntaxError> {
        let mut depth = 1usize;
        let mut text = String::new();

        loop {
            let token = self.next_token("shader source")?;
            match token {
                Token::OpenParen => depth += 1,
                Token::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(text);
                    }
                }
                _ => {}
            }
            text.push_str(token.as_str());
        }
    }

    /// Run over the whole input, returning shaders in input order
    pub fn extract_all(mut self) -> Result<Vec<Shader>, SyntaxError> {
        let mut shaders = Vec::new();
        let mut seen = HashSet::new();

        while let Some(token) = self.lexer.next() {
            let Token::Macro(kind) = token else {
                continue;
            };

            let shader = self.invocation(kind)?;
            if !seen.insert(shader.line()) {
                return Err(SyntaxError::DuplicateLine {
                    line: shader.line(),
                });
            }
            shaders.push(shader);
        }

        log::debug!("Extracted {} shader(s)", shaders.len());
        Ok(shaders)
    }
}

/// Extract every embedded shader from `input`
pub fn extract(input: &str) -> Result<Vec<Shader>, SyntaxError> {
    Extractor::new(input).extract_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_single_line() {
        let shaders = extract("x = qoShaderCreateInfoGLSL(VERTEX, void main(){});").unwrap();
        assert_eq!(shaders.len(), 1);
        assert_eq!(shaders[0].stage(), Stage::Vertex);
        assert_eq!(shaders[0].source(), "void main(){}");
        assert_eq!(shaders[0].line(), 1);
    }

    #[test]
    fn device_form_discards_device_argument() {
        let shaders =
            extract("VkShader s = qoCreateShaderGLSL(dev, FRAGMENT, void main(){});").unwrap();
        assert_eq!(shaders.len(), 1);
        assert_eq!(shaders[0].stage(), Stage::Fragment);
        assert_eq!(shaders[0].source(), "void main(){}");
    }

    #[test]
    fn multi_line_invocation_records_closing_line() {
        let input = "\
static void
test(void)
{
    VkShader vs = qoCreateShaderGLSL(t_device, VERTEX,
        layout(location = 0) in vec4 a_position;
        void main()
        {
            gl_Position = a_position;
        }
    );
}
";
        let shaders = extract(input).unwrap();
        assert_eq!(shaders.len(), 1);
        assert_eq!(shaders[0].line(), 10);
        assert_eq!(
            shaders[0].source(),
            "\nlayout(location = 0) in vec4 a_position;\nvoid main()\n{\n    gl_Position = a_position;\n}\n"
        );
    }

    #[test]
    fn balanced_inner_parens_and_commas_are_captured() {
        let shaders = extract(
            "qoShaderCreateInfoGLSL(COMPUTE, void main() { f((a), (b, (c))); })",
        )
        .unwrap();
        assert_eq!(shaders[0].source(), "void main() { f((a), (b, (c))); }");
    }

    #[test]
    fn shaders_come_out_in_input_order() {
        let input = "\
a = qoShaderCreateInfoGLSL(VERTEX, void main() {});
b = qoShaderCreateInfoGLSL(  GEOMETRY  , void main() {});
c = qoCreateShaderGLSL(d, TESS_EVALUATION, void main() {});
";
        let shaders = extract(input).unwrap();
        let stages: Vec<Stage> = shaders.iter().map(|s| s.stage()).collect();
        let lines: Vec<usize> = shaders.iter().map(|s| s.line()).collect();
        assert_eq!(
            stages,
            vec![Stage::Vertex, Stage::Geometry, Stage::TessEvaluation]
        );
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn input_without_macros_yields_nothing() {
        assert!(extract("int main(void) { return f(1, 2); }\n").unwrap().is_empty());
        assert!(extract("").unwrap().is_empty());
    }

    #[test]
    fn missing_open_paren_is_an_error() {
        let err = extract("qoShaderCreateInfoGLSL VERTEX").unwrap_err();
        assert!(matches!(err, SyntaxError::ExpectedOpenParen { line: 1, .. }));
    }

    #[test]
    fn missing_comma_after_stage_is_an_error() {
        let err = extract("qoShaderCreateInfoGLSL(VERTEX void main() {})").unwrap_err();
        assert!(matches!(err, SyntaxError::UnknownStage { .. }));

        let err = extract("qoShaderCreateInfoGLSL(VERTEX)").unwrap_err();
        assert!(matches!(
            err,
            SyntaxError::ExpectedComma {
                after: "stage argument",
                ..
            }
        ));
    }

    #[test]
    fn missing_comma_after_device_is_an_error() {
        let err = extract("qoCreateShaderGLSL(dev( VERTEX, x)").unwrap_err();
        assert!(matches!(
            err,
            SyntaxError::ExpectedComma {
                after: "device argument",
                ..
            }
        ));
    }

    #[test]
    fn unknown_stage_is_an_error() {
        let err = extract("\n\nqoShaderCreateInfoGLSL(PIXEL, void main() {})").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::UnknownStage {
                line: 3,
                name: "PIXEL".to_string()
            }
        );
    }

    #[test]
    fn unterminated_invocation_is_an_error() {
        let err = extract("qoShaderCreateInfoGLSL(VERTEX, void main() {\n").unwrap_err();
        assert!(matches!(
            err,
            SyntaxError::UnexpectedEof {
                context: "shader source",
                ..
            }
        ));
    }

    #[test]
    fn empty_source_is_an_error() {
        let err = extract("qoShaderCreateInfoGLSL(VERTEX,   \n  )").unwrap_err();
        assert_eq!(err, SyntaxError::EmptySource { line: 2 });
    }

    #[test]
    fn two_shaders_closing_on_one_line_collide() {
        let input = "qoShaderCreateInfoGLSL(VERTEX, a) qoShaderCreateInfoGLSL(FRAGMENT, b)";
        let err = extract(input).unwrap_err();
        assert_eq!(err, SyntaxError::DuplicateLine { line: 1 });
    }

    #[test]
    fn unmatched_close_paren_in_comment_ends_invocation_early() {
        let input = "\
qoShaderCreateInfoGLSL(VERTEX,
    // note )
    void main() {}
);
";
        let shaders = extract(input).unwrap();
        assert_eq!(shaders.len(), 1);
        assert_eq!(shaders[0].line(), 2);
        assert_eq!(shaders[0].source(), "\n// note ");
    }

    #[test]
    fn unmatched_open_paren_in_comment_runs_off_the_end() {
        let input = "\
qoShaderCreateInfoGLSL(VERTEX,
    // note (
    void main() {}
);
int after(void);
";
        let err = extract(input).unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedEof { .. }));
    }
}
