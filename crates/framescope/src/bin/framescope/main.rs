//! framescope CLI - frame field session driven by text commands.
//!
//! Usage: framescope <MESH> [--output-dir DIR] [--script FILE] [-c CMD]...
//!
//! Without `--script` or `-c`, commands are read from standard input.
//! Type `help` for the command list.

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use framescope::{supported_formats, GeogramExporter, Outcome, TextViewer};

#[derive(Parser)]
#[command(name = "framescope")]
#[command(author, version, about = "Frame fields and their singularities on triangle meshes", long_about = None)]
struct Cli {
    /// Input surface mesh (.obj, .mesh, .off, .stl, .geogram_ascii)
    mesh: PathBuf,

    /// Directory for exported files
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// File with one command per line
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Command to run, may be repeated; runs after the script
    #[arg(short = 'c', long = "command")]
    commands: Vec<String>,
}

fn main() -> ExitCode {
    framescope::init_logging();
    let cli = Cli::parse();

    let mut session = match framescope::open_session(&cli.mesh) {
        Ok(session) => session,
        Err(err) => {
            log::error!("{err}");
            eprintln!(
                "Could not load input mesh '{}'. Supported formats are {}",
                cli.mesh.display(),
                supported_formats()
            );
            return ExitCode::FAILURE;
        }
    };
    session.set_output_dir(&cli.output_dir);

    let mut viewer = TextViewer::new(io::stdout());
    let mut exporter = GeogramExporter::new();

    let interactive = cli.script.is_none() && cli.commands.is_empty();
    if let Some(script) = &cli.script {
        let text = match fs::read_to_string(script) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("Could not read script '{}': {err}", script.display());
                return ExitCode::FAILURE;
            }
        };
        if session.run_lines(text.lines(), &mut viewer, &mut exporter) == Outcome::Quit {
            return ExitCode::SUCCESS;
        }
    }
    if session.run_lines(&cli.commands, &mut viewer, &mut exporter) == Outcome::Quit {
        return ExitCode::SUCCESS;
    }

    if interactive {
        let stdin = io::stdin();
        let lines = stdin.lock().lines().map_while(Result::ok);
        session.run_lines(lines, &mut viewer, &mut exporter);
    }
    ExitCode::SUCCESS
}
