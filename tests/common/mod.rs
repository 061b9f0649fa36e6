//! Common test utilities and harness
//!
//! Provides reusable utilities for functional testing including:
//! - Test environment setup (temp directories, inputs, configs)
//! - Fake `glslc` scripts run through /bin/sh
//! - A builder for invoking the scrape binary

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::io::Write;

use tempfile::TempDir;

/// C test file with three shaders closing on lines 12, 20 and 25
pub const SAMPLE_SOURCE: &str = r#"#include "tapi/t.h"

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

    VkShader fs = qoCreateShaderGLSL(t_device, FRAGMENT,
        layout(location = 0) out vec4 f_color;
        void main()
        {
            f_color = vec4(1.0, 0.0, 0.0, 1.0);
        }
    );

    QoShaderCreateInfo cs = qoShaderCreateInfoGLSL(COMPUTE,
        layout(local_size_x = 1) in;
        void main() {}
    );
}
"#;

/// Lines on which the shaders in [`SAMPLE_SOURCE`] end
pub const SAMPLE_LINES: [usize; 3] = [12, 20, 25];

/// Emits three SPIR-V words, or a short assembly listing with -S
pub const PASSING_GLSLC: &str = r#"
asm=0
stage=
for arg in "$@"; do
    case "$arg" in
        -S) asm=1 ;;
        -fshader-stage=*) stage=${arg#-fshader-stage=} ;;
    esac
done
cat > /dev/null
if [ $asm = 1 ]; then
    printf '; SPIR-V\n; Version: 1.0\n; Stage: %s\n' "$stage"
else
    printf '\003\002\043\007\000\000\001\000\001\000\000\000'
fi
"#;

/// Rejects everything, glslc style
pub const FAILING_GLSLC: &str = r#"
cat > /dev/null
echo "<stdin>:3: error: 'a_position' : undeclared identifier" >&2
echo "1 error generated." >&2
exit 1
"#;

/// Succeeds for vertex shaders only
pub const VERTEX_ONLY_GLSLC: &str = r#"
cat > /dev/null
case "$*" in
    *-fshader-stage=vertex*) ;;
    *) echo "<stdin>: error: unsupported stage" >&2; exit 1 ;;
esac
case "$*" in
    *-S*) echo "; vertex" ;;
    *) printf '\003\002\043\007' ;;
esac
"#;

/// Test environment with an isolated working directory
pub struct TestEnvironment {
    /// Temporary directory holding inputs, outputs and scripts
    pub temp_dir: TempDir,
    /// Path to the temporary directory
    pub root: PathBuf,
}

impl TestEnvironment {
    /// Create a new isolated test environment
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// Write a file relative to the environment root
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Read a file relative to the environment root
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.root.join(name)).expect("Failed to read test file")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write a fake compiler script plus a config that runs it via /bin/sh
    pub fn fake_compiler_config(&self, script: &str) -> PathBuf {
        let script_path = self.write("fake-glslc.sh", script);
        self.write(
            "scrape.toml",
            &format!(
                "[compiler]\npath = \"/bin/sh\"\nextra_args = [{:?}]\ntimeout_secs = 10\n",
                script_path.display().to_string()
            ),
        )
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one invocation of the scrape binary
pub struct ScrapeCommand {
    command: Command,
    stdin: Option<String>,
}

impl ScrapeCommand {
    pub fn new(env: &TestEnvironment) -> Self {
        let mut command = Command::new(env!("CARGO_BIN_EXE_scrape"));
        command.current_dir(&env.root).env("RUST_LOG", "warn");
        Self {
            command,
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<std::ffi::OsStr>) -> Self {
        self.command.arg(arg);
        self
    }

    pub fn config(self, path: &Path) -> Self {
        self.arg("--config").arg(path)
    }

    pub fn stdin(mut self, input: &str) -> Self {
        self.stdin = Some(input.to_string());
        self
    }

    /// Run to completion and capture everything
    pub fn output(mut self) -> Output {
        self.command
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = self.command.spawn().expect("Failed to spawn scrape");
        if let Some(input) = self.stdin.take() {
            let mut stdin = child.stdin.take().expect("stdin should be piped");
            stdin
                .write_all(input.as_bytes())
                .expect("Failed to write stdin");
        }
        child.wait_with_output().expect("Failed to wait for scrape")
    }
}

/// Count of generated SPIR-V arrays in an output file
pub fn spirv_array_count(output: &str) -> usize {
    output.matches("_spir_v_src[] = {").count()
}

/// Count of generated GLSL string tables in an output file
pub fn glsl_table_count(output: &str) -> usize {
    output.matches("_glsl_src[] =").count()
}
