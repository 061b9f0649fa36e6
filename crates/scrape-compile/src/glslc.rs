//! `glslc` subprocess compiler
//!
//! Each compile runs the external compiler twice: once for the SPIR-V
//! binary and once (`-S`) for its textual assembly. The program text goes
//! in on stdin and the artifact comes back on stdout. Stdin is fed and both
//! output pipes are drained on helper threads, so a compiler that writes a
//! lot of diagnostics before reading its input cannot deadlock us.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use scrape_core::{Compiled, Shader, Stage};

use crate::{CompileError, ShaderCompiler, words};

/// Wall-clock budget for a single compiler invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Language profile passed as `-std=`
pub const DEFAULT_STD: &str = "430core";

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// External `glslc`-compatible compiler
#[derive(Debug, Clone)]
pub struct Glslc {
    path: PathBuf,
    std: String,
    timeout: Duration,
    extra_args: Vec<String>,
}

impl Default for Glslc {
    fn default() -> Self {
        Self::new("glslc")
    }
}

impl Glslc {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            std: DEFAULT_STD.to_string(),
            timeout: DEFAULT_TIMEOUT,
            extra_args: Vec::new(),
        }
    }

    pub fn with_std(mut self, std: impl Into<String>) -> Self {
        self.std = std.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments placed before everything else on the command line
    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args = args.into_iter().collect();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Command line (minus the executable) for one invocation
    pub fn args(&self, stage: Stage, assembly: bool) -> Vec<String> {
        let mut args = self.extra_args.clone();
        if assembly {
            args.push("-S".to_string());
        }
        args.push(format!("-fshader-stage={}", stage.glslc_name()));
        args.push(format!("-std={}", self.std));
        args.extend(["-o", "-", "-"].map(String::from));
        args
    }

    /// Run the compiler once and return its stdout
    fn run(&self, shader: &Shader, assembly: bool) -> Result<Vec<u8>, CompileError> {
        let args = self.args(shader.stage(), assembly);
        log::debug!(
            "Running {} {} for shader on line {}",
            self.path.display(),
            args.join(" "),
            shader.line()
        );

        let mut child = Command::new(&self.path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CompileError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        let input = shader.source().as_bytes().to_vec();
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || -> io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input)?;
            }
            Ok(())
        });
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let Some(status) = wait_with_deadline(&mut child, self.timeout)? else {
            log::debug!("Killing shader compiler after {:?}", self.timeout);
            let _ = child.kill();
            let _ = child.wait();
            return Err(CompileError::TimedOut(self.timeout));
        };

        match join(writer) {
            // The compiler may exit without reading all of stdin
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            other => other?,
        }
        let stdout = join(stdout)?;
        let stderr = join(stderr)?;

        if !status.success() {
            let mut diagnostics = String::from_utf8_lossy(&stdout).into_owned();
            diagnostics.push_str(&String::from_utf8_lossy(&stderr));
            return Err(CompileError::Failed {
                status,
                diagnostics: diagnostics.trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

impl ShaderCompiler for Glslc {
    fn compile(&self, shader: &Shader) -> Result<Compiled, CompileError> {
        let binary = self.run(shader, false)?;
        let words = words::decode(&binary)?;

        let assembly = self.run(shader, true)?;
        let disassembly = String::from_utf8(assembly).map_err(|_| CompileError::Disassembly)?;

        log::debug!(
            "Compiled {} shader on line {} to {} words",
            shader.stage(),
            shader.line(),
            words.len()
        );
        Ok(Compiled { words, disassembly })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .map_err(|_| io::Error::other("compiler pipe thread panicked"))?
}

/// Poll the child until it exits or the deadline passes (`None`)
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
