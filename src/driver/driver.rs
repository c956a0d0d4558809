use std::{
    env,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    process::Command,
    rc::Rc,
    time::Instant,
};

use inkwell::context::Context;
use thiserror::Error;
use tracing::info;

use crate::{
    compiler::{compiler::compile, runtime::link_runtime},
    display_error,
    errors::errors::{CodegenError, Error},
    ir::builder::generate_ir,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{analyze, Analysis},
};

/// Environment variable overriding the `llc` binary.
pub const LLC_ENV: &str = "PULSEC_LLC";
/// Environment variable overriding the `clang` binary.
pub const CLANG_ENV: &str = "PULSEC_CLANG";

pub const USAGE: &str = "usage: pulsec <file> [--ir | --llvm | -c] [-o <output>]";

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{0}\n{usage}", usage = USAGE)]
    Usage(String),
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Syntax(Error),
    #[error("compilation failed with {0} error(s)")]
    Semantic(usize),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
    #[error("{tool} failed: {message}")]
    Toolchain { tool: String, message: String },
}

/// Last stage of the pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// Three-address IR listing
    Ir,
    /// Textual LLVM module of the program
    Llvm,
    /// Native object file, runtime included
    Object,
    /// Native executable
    Executable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub input: PathBuf,
    /// Defaults next to the input, except for `Emit::Ir` which prints to
    /// stdout.
    pub output: Option<PathBuf>,
    pub emit: Emit,
    pub llc: String,
    pub clang: String,
}

impl Options {
    pub fn new(input: PathBuf, emit: Emit) -> Self {
        Options {
            input,
            output: None,
            emit,
            llc: env::var(LLC_ENV).unwrap_or_else(|_| String::from("llc")),
            clang: env::var(CLANG_ENV).unwrap_or_else(|_| String::from("clang")),
        }
    }

    /// Parses the arguments following the program name.
    pub fn parse_args<I>(args: I) -> Result<Self, DriverError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();

        let mut input = None;
        let mut output = None;
        let mut emit = Emit::Executable;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--ir" => emit = Emit::Ir,
                "--llvm" => emit = Emit::Llvm,
                "-c" => emit = Emit::Object,
                "-o" => match args.next() {
                    Some(path) => output = Some(PathBuf::from(path)),
                    None => {
                        return Err(DriverError::Usage(String::from(
                            "missing file name after '-o'",
                        )))
                    }
                },
                flag if flag.starts_with('-') => {
                    return Err(DriverError::Usage(format!("invalid flag '{}'", flag)))
                }
                path => {
                    if input.is_some() {
                        return Err(DriverError::Usage(format!("unexpected argument '{}'", path)));
                    }
                    input = Some(PathBuf::from(path));
                }
            }
        }

        let Some(input) = input else {
            return Err(DriverError::Usage(String::from("no input file")));
        };

        let mut options = Options::new(input, emit);
        options.output = output;
        Ok(options)
    }

    /// Name of the LLVM module: the input's file stem.
    pub fn module_name(&self) -> String {
        self.input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("main"))
    }

    /// Where the final artifact goes. `None` means stdout.
    pub fn output_path(&self) -> Option<PathBuf> {
        if let Some(output) = &self.output {
            return Some(output.clone());
        }

        match self.emit {
            Emit::Ir => None,
            Emit::Llvm => Some(self.input.with_extension("ll")),
            Emit::Object => Some(self.input.with_extension("o")),
            Emit::Executable => Some(self.input.with_extension("")),
        }
    }
}

/// Tokenizes, parses and checks `source`.
///
/// A syntax error aborts immediately; semantic errors are left in the
/// returned analysis for the caller to report.
pub fn analyze_source(source: &str, file_name: &str) -> Result<Analysis, DriverError> {
    let file = Rc::new(file_name.to_string());

    let start = Instant::now();
    let tokens = tokenize(source.to_string(), Some(file_name.to_string()))
        .map_err(DriverError::Syntax)?;
    info!(elapsed = ?start.elapsed(), tokens = tokens.len(), "tokenized");

    let parse_start = Instant::now();
    let program = parse(tokens, Rc::clone(&file)).map_err(DriverError::Syntax)?;
    info!(elapsed = ?parse_start.elapsed(), statements = program.len(), "parsed");

    let check_start = Instant::now();
    let analysis = analyze(&program, Some(file));
    info!(
        elapsed = ?check_start.elapsed(),
        errors = analysis.diagnostics.count(),
        "type checked"
    );

    Ok(analysis)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<(), DriverError> {
    match path {
        Some(path) => fs::write(path, text).map_err(|source| DriverError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}

fn run_tool(tool: &str, args: &[&OsStr]) -> Result<(), DriverError> {
    let start = Instant::now();

    let output = Command::new(tool)
        .args(args)
        .output()
        .map_err(|err| DriverError::Toolchain {
            tool: tool.to_string(),
            message: err.to_string(),
        })?;

    if !output.status.success() {
        return Err(DriverError::Toolchain {
            tool: tool.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    info!(tool, elapsed = ?start.elapsed(), "toolchain step finished");
    Ok(())
}

/// Compiles `options.input` down to the requested stage.
///
/// Syntax errors are rendered against the source and semantic diagnostics
/// are printed one per line, both to stderr, before the error is returned.
pub fn run(options: &Options) -> Result<(), DriverError> {
    let start = Instant::now();

    let source = fs::read_to_string(&options.input).map_err(|source| DriverError::Read {
        path: options.input.clone(),
        source,
    })?;
    let file_name = options
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| options.input.display().to_string());

    let analysis = match analyze_source(&source, &file_name) {
        Ok(analysis) => analysis,
        Err(DriverError::Syntax(error)) => {
            display_error(&error, &source);
            return Err(DriverError::Syntax(error));
        }
        Err(error) => return Err(error),
    };

    if analysis.diagnostics.has_errors() {
        for diagnostic in &analysis.diagnostics {
            eprintln!("{}", diagnostic);
        }
        return Err(DriverError::Semantic(analysis.diagnostics.count()));
    }

    let ir_start = Instant::now();
    let program = generate_ir(&analysis);
    info!(
        elapsed = ?ir_start.elapsed(),
        functions = program.functions.len(),
        "generated IR"
    );

    let output = options.output_path();

    if options.emit == Emit::Ir {
        return write_output(output.as_deref(), &program.to_string());
    }

    let compile_start = Instant::now();
    let context = Context::create();
    let compiler = compile(&program, &options.module_name(), &context)?;
    compiler.configure_target()?;
    info!(elapsed = ?compile_start.elapsed(), "emitted LLVM module");

    match options.emit {
        Emit::Ir => unreachable!(),
        Emit::Llvm => match output {
            Some(path) => compiler.save_module_to_file(&path)?,
            None => print!("{}", compiler.print_to_string()),
        },
        Emit::Object | Emit::Executable => {
            link_runtime(&compiler)?;

            let output = output.unwrap_or_else(|| PathBuf::from(options.module_name()));
            let object = match options.emit {
                Emit::Object => output.clone(),
                _ => output.with_extension("o"),
            };
            let module_file = object.with_extension("ll");

            compiler.save_module_to_file(&module_file)?;

            run_tool(
                &options.llc,
                &[
                    OsStr::new("-filetype=obj"),
                    OsStr::new("-relocation-model=pic"),
                    module_file.as_os_str(),
                    OsStr::new("-o"),
                    object.as_os_str(),
                ],
            )?;

            if options.emit == Emit::Executable {
                run_tool(
                    &options.clang,
                    &[
                        OsStr::new("-fPIE"),
                        OsStr::new("-pie"),
                        OsStr::new("-o"),
                        output.as_os_str(),
                        object.as_os_str(),
                    ],
                )?;
            }
        }
    }

    info!(elapsed = ?start.elapsed(), "total");
    Ok(())
}
