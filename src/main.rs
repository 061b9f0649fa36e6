//! scrape command line
//!
//! Reads a C file, compiles the GLSL embedded in its shader macros, and
//! writes the generated C file the macros resolve against.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use scrape::{CompileFailurePolicy, Config, EmitOptions, Glslc, Location, OutputSink, RunOptions};

#[derive(Parser)]
#[command(name = "scrape")]
#[command(version)]
#[command(
    about = "Scrape GLSL out of qoShaderCreateInfoGLSL/qoCreateShaderGLSL macros and embed it, plus SPIR-V, in a C file",
    long_about = "Scans a C file for qoShaderCreateInfoGLSL and qoCreateShaderGLSL \
                  invocations, grabs the GLSL source, and compiles it to SPIR-V. \
                  The GLSL and SPIR-V are written to another C file as string \
                  tables and arrays of 32-bit words.\n\n\
                  If '-' is passed as the input or output file, stdin or stdout \
                  is used instead of a file on disk."
)]
struct Cli {
    /// Input C file ('-' for stdin)
    #[arg(value_name = "INFILE")]
    infile: String,

    /// Output to the given file ('-' for stdout)
    #[arg(short, long, default_value = "-")]
    outfile: String,

    /// Full path to the glslc shader compiler
    #[arg(long = "with-glslc", value_name = "PATH")]
    glslc: Option<PathBuf>,

    /// Skip compilation and emit GLSL only
    #[arg(long)]
    glsl_only: bool,

    /// What to do when a shader fails to compile
    #[arg(long, value_name = "POLICY")]
    on_compile_error: Option<CompileFailurePolicy>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

impl Cli {
    /// Load the config file, then let flags override it
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;

        if let Some(path) = &self.glslc {
            config.compiler.path = path.clone();
        }
        if self.glsl_only {
            config.output.glsl_only = true;
        }
        if let Some(policy) = self.on_compile_error {
            config.output.on_compile_error = policy;
        }

        Ok(config)
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.print_default_config {
        print!("{}", Config::generate_default()?);
        return Ok(());
    }

    let config = cli.resolve_config()?;

    let input_location = Location::from(cli.infile.as_str());
    let output_location = Location::from(cli.outfile.as_str());

    let input = scrape::read_input(&input_location)
        .with_context(|| format!("Failed to read {}", input_location))?;
    let sink = OutputSink::open(&output_location)
        .with_context(|| format!("Failed to open {}", output_location))?;

    let compiler = Glslc::new(&config.compiler.path)
        .with_std(config.compiler.std.clone())
        .with_timeout(config.compiler.timeout())
        .with_extra_args(config.compiler.extra_args.clone());

    let options = RunOptions {
        glsl_only: config.output.glsl_only,
        policy: config.output.on_compile_error,
        emit: EmitOptions {
            emit_stage_field: config.output.emit_stage_field,
        },
    };

    let run = scrape::run(&input, &compiler, options)
        .with_context(|| format!("Failed to process {}", input_location))?;

    if let Some(failure) = run.failure() {
        log::warn!(
            "Emitted GLSL only: shader on line {} did not compile",
            failure.line
        );
    }
    log::info!(
        "Generated {} shader(s) from {} ({})",
        run.shaders().len(),
        input_location,
        if run.mode().fallback_to_source_only {
            "GLSL only"
        } else {
            "GLSL + SPIR-V"
        }
    );

    sink.commit(&run.render())
        .with_context(|| format!("Failed to write {}", output_location))?;

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,scrape=info"))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("scrape: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
