use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use protoboil_compiler::{default_catalog, run_plugin, BoilError, Failure, Orchestrator};
use protoboil_ir::{Ir, TemplateSpec};
use tracing::info;

#[derive(Parser)]
#[command(name = "protoc-gen-boil")]
#[command(about = "protoc plugin turning proto definitions into boilerplate", long_about = None)]
struct Cli {
    /// Read the encoded CodeGeneratorRequest from this file instead of stdin
    #[arg(short, long)]
    request: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run generators against a saved IR snapshot, outside of protoc
    Boil {
        /// Snapshot written by an earlier plugin run
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Directory receiving the artifacts
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Template patterns to use instead of the snapshot's TEMPLATE_LIST
        #[arg(short, long)]
        template: Vec<String>,
    },
}

fn report(failures: &[Failure]) {
    for failure in failures {
        match &failure.module {
            Some(module) => eprintln!("protoc-gen-boil: {} skipped: {}", module, failure.error),
            None => eprintln!("protoc-gen-boil: {}: {}", failure.pattern, failure.error),
        }
    }
}

/// Plugin mode: request in, response out. Failed generators are reported
/// on stderr and do not change the exit status.
fn plugin(request: Option<&Path>) -> Result<ExitCode, BoilError> {
    let input = match request {
        Some(path) => fs::read(path)?,
        None => {
            let mut buffer = Vec::new();
            io::stdin().lock().read_to_end(&mut buffer)?;
            buffer
        }
    };

    let output = run_plugin(&input)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&output.response)?;
    stdout.flush()?;

    report(&output.failures);
    Ok(ExitCode::SUCCESS)
}

fn boil(snapshot: &Path, output: &Path, template: &[String]) -> Result<ExitCode, BoilError> {
    let ir = Ir::load(snapshot)?;
    let specs: Vec<TemplateSpec> = if template.is_empty() {
        ir.config().template_list.clone()
    } else {
        template.iter().cloned().map(TemplateSpec::Pattern).collect()
    };

    let catalog = default_catalog(ir.config());
    let batch = Orchestrator::new(&catalog).run(&specs, snapshot)?;

    for artifact in &batch.artifacts {
        let path = output.join(&artifact.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &artifact.content)?;
        info!("Wrote \"{}\"", path.display());
        println!("Boiled {} → {}", artifact.module, path.display());
    }

    report(&batch.failures);
    Ok(if batch.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> Result<ExitCode, BoilError> {
    let cli = Cli::parse();

    match &cli.command {
        None => plugin(cli.request.as_deref()),
        Some(Commands::Boil { snapshot, output, template }) => boil(snapshot, output, template),
    }
}
