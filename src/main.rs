use std::{
    ffi::OsString,
    fmt::Display,
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use color_print::ceprintln;

use crate::{assembler::assemble, error::AsmError};

mod assembler;
mod encoding;
mod error;
mod parsing;
mod symbols;

const SOURCE_EXTENSION: &str = "asm";
const BINARY_EXTENSION: &str = "hack";

/// Assemble a Hack `.asm` program into `.hack` machine code
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Source file, must end in `.asm`
    input: PathBuf,

    /// Output file [default: input path with a `.hack` extension]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the machine code instead of writing a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Report each assembly stage on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn report(&self, msg: impl Display) {
        if self.verbose {
            ceprintln!("<s>{}</>", msg);
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ceprintln!("<r,s>error</>: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let input = &args.input;
    check_extension(input)?;
    if !input.is_file() {
        return Err(AsmError::InputNotFound(input.clone()).into());
    }

    args.report(format!("1. Read {}", input.display()));
    let asm_src = fs::read_to_string(input).map_err(|e| AsmError::Read(input.clone(), e))?;

    args.report("2. Resolve symbols & generate binary");
    let assembly =
        assemble(&asm_src).with_context(|| format!("failed to assemble {}", input.display()))?;
    args.report(format!(
        "   {} lines, {} instructions, {} symbols",
        assembly.parsed_lines,
        assembly.binary.len(),
        assembly.symbols.len()
    ));

    if args.stdout {
        print!("{}", assembly.to_hack());
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| output_path(input));
    args.report(format!("3. Write {}", output.display()));
    write_output(&output, &assembly.binary)?;
    Ok(())
}

fn check_extension(path: &Path) -> Result<(), AsmError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(SOURCE_EXTENSION) => Ok(()),
        other => Err(AsmError::BadExtension {
            path: path.to_path_buf(),
            found: other.unwrap_or_default().to_string(),
        }),
    }
}

fn output_path(input: &Path) -> PathBuf {
    input.with_extension(BINARY_EXTENSION)
}

/// Write every word to `<path>.tmp`, then move it into place.
/// Nothing is left at `path` if writing fails.
fn write_output(path: &Path, binary: &[String]) -> Result<(), AsmError> {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    write_lines(&tmp, binary)
        .and_then(|()| fs::rename(&tmp, path))
        .map_err(|e| {
            let _ = fs::remove_file(&tmp);
            AsmError::Write(path.to_path_buf(), e)
        })
}

fn write_lines(path: &Path, binary: &[String]) -> io::Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    for word in binary {
        writeln!(out, "{word}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hack-asm-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn args(input: PathBuf) -> Args {
        Args {
            input,
            output: None,
            stdout: false,
            verbose: false,
        }
    }

    #[test]
    fn cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn derive_output_path() {
        assert_eq!(
            output_path(Path::new("projects/06/add/Add.asm")),
            PathBuf::from("projects/06/add/Add.hack")
        );
    }

    #[test]
    fn reject_wrong_extension() {
        let res = check_extension(Path::new("Add.txt"));
        assert!(
            matches!(&res, Err(AsmError::BadExtension { found, .. }) if found == "txt"),
            "{res:?}"
        );
        assert!(check_extension(Path::new("Add")).is_err());
        assert!(check_extension(Path::new("Add.asm")).is_ok());
    }

    #[test]
    fn missing_input() {
        let dir = scratch_dir("missing");
        let res = run(&args(dir.join("Nope.asm")));
        let err = res.unwrap_err();
        assert!(
            matches!(err.downcast_ref::<AsmError>(), Some(AsmError::InputNotFound(_))),
            "{err:?}"
        );
        assert!(!dir.join("Nope.hack").exists());
    }

    #[test]
    fn assemble_file() {
        let dir = scratch_dir("ok");
        let input = dir.join("Add.asm");
        fs::write(&input, include_str!("../test_resources/Add.asm")).unwrap();

        run(&args(input)).unwrap();

        let out = fs::read_to_string(dir.join("Add.hack")).unwrap();
        assert_eq!(out, include_str!("../test_resources/Add.hack"));
        assert!(!dir.join("Add.hack.tmp").exists());
    }

    #[test]
    fn failed_assembly_writes_nothing() {
        let dir = scratch_dir("bad");
        let input = dir.join("Bad.asm");
        fs::write(&input, "@1\nD=D*A\n").unwrap();

        let err = run(&args(input)).unwrap_err();
        assert!(
            matches!(err.downcast_ref::<AsmError>(), Some(AsmError::Encode { line_nr: 2, .. })),
            "{err:?}"
        );
        assert!(!dir.join("Bad.hack").exists());
        assert!(!dir.join("Bad.hack.tmp").exists());
    }

    #[test]
    fn explicit_output_path() {
        let dir = scratch_dir("explicit");
        let input = dir.join("Max.asm");
        let output = dir.join("out.bin");
        fs::write(&input, include_str!("../test_resources/Max.asm")).unwrap();

        let mut args = args(input);
        args.output = Some(output.clone());
        run(&args).unwrap();

        let out = fs::read_to_string(output).unwrap();
        assert_eq!(out, include_str!("../test_resources/Max.hack"));
    }
}
