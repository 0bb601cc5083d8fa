use clap::{ArgAction, Args, Parser, Subcommand};
use solbind::{Abigen, Project, ProjectCompileOutput, Result, Solc, SolcError};
use std::{fs, path::PathBuf, process::ExitCode};
use tracing::{info, Level};
use yansi::Paint;

/// Compile solidity contracts with solc and generate bindings with abigen
#[derive(Debug, Parser)]
#[command(name = "solbind", version, about)]
struct Cli {
    /// Increase logging verbosity, `-v` for debug and `-vv` for trace output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile contract source files and generate their bindings
    #[command(visible_aliases = ["build", "generate"])]
    Compile(CompileArgs),
}

#[derive(Debug, Args)]
struct CompileArgs {
    /// The project root, containing the `contracts` directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Path to the solc executable, defaults to `$SOLC_PATH` or `solc`
    #[arg(long)]
    solc: Option<PathBuf>,

    /// Path to the abigen executable, defaults to `$ABIGEN_PATH` or `abigen`
    #[arg(long)]
    abigen: Option<PathBuf>,

    /// Package name of the generated bindings
    #[arg(long, default_value = solbind::bindings::DEFAULT_PACKAGE)]
    pkg: String,

    /// Stop after writing the build artifacts
    #[arg(long)]
    skip_bindings: bool,
}

impl CompileArgs {
    fn run(self) -> Result<()> {
        let root = fs::canonicalize(&self.root).map_err(|err| SolcError::io(err, &self.root))?;
        let solc = self.solc.map(Solc::new).unwrap_or_default();
        let abigen = self.abigen.map(Abigen::new).unwrap_or_default().package(self.pkg);
        let project = Project::builder().root(root).solc(solc).abigen(abigen).build()?;

        if self.skip_bindings {
            let artifacts = project.compile_contracts()?;
            info!(contracts = artifacts.len(), "compiled without bindings");
            return Ok(());
        }

        let ProjectCompileOutput { artifacts, bindings, triage } = project.compile()?;
        info!(
            contracts = artifacts.len(),
            bindings = bindings.len(),
            warnings = triage.warnings,
            "done"
        );
        Ok(())
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let res = match cli.command {
        Command::Compile(args) => args.run(),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
