use crate::{
    artifact_output::{self, ContractArtifact},
    artifacts::{CompilerInput, Settings, Source},
    bindings::Abigen,
    config::ProjectPathsConfig,
    error::{Result, SolcError},
    process::Interrupt,
    report::{self, Triage},
    solc::Solc,
};
use std::{
    io::{self, Write},
    path::PathBuf,
};

/// Represents a project workspace and handles `solc` compiling and binding generation of all
/// contracts in that workspace.
#[derive(Clone, Debug)]
pub struct Project {
    /// The layout of the project
    pub paths: ProjectPathsConfig,
    /// The compiler used to compile all sources
    pub solc: Solc,
    /// Generates the bindings from the artifacts
    pub abigen: Abigen,
    /// Settings sent to the compiler with every request
    pub settings: Settings,
}

impl Project {
    /// Convenience function to call `ProjectBuilder::default()`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use solbind::Project;
    ///
    /// let project = Project::builder().root("./my-project").build()?;
    /// let output = project.compile()?;
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn builder() -> ProjectBuilder {
        ProjectBuilder::default()
    }

    /// Compiles all contracts and generates their bindings, diagnostics are printed to stdout.
    pub fn compile(&self) -> Result<ProjectCompileOutput> {
        self.compile_with_diagnostics(io::stdout().lock())
    }

    /// Same as [`Self::compile()`], but writes the compiler diagnostics to `diagnostics`.
    pub fn compile_with_diagnostics<W: Write>(
        &self,
        diagnostics: W,
    ) -> Result<ProjectCompileOutput> {
        let (artifacts, triage) = self.compile_contracts_with_diagnostics(diagnostics)?;
        let bindings = self.generate_bindings()?;
        Ok(ProjectCompileOutput { artifacts, bindings, triage })
    }

    /// Compiles all contracts and writes their artifacts, without generating bindings.
    pub fn compile_contracts(&self) -> Result<Vec<ContractArtifact>> {
        let (artifacts, _) = self.compile_contracts_with_diagnostics(io::stdout().lock())?;
        Ok(artifacts)
    }

    /// Runs every step up to writing the artifacts:
    ///
    /// 1. read all sources, failing if there are none
    /// 2. make sure the compiler can be found
    /// 3. compile with `--standard-json`
    /// 4. write all diagnostics and abort if any of them is fatal
    /// 5. write `.abi`, `.bin` and `.link` files for every contract
    #[instrument(level = "debug", skip_all, fields(root = %self.paths.root.display()))]
    pub fn compile_contracts_with_diagnostics<W: Write>(
        &self,
        diagnostics: W,
    ) -> Result<(Vec<ContractArtifact>, Triage)> {
        let sources = Source::read_all_from(&self.paths.sources)?;
        if sources.is_empty() {
            return Err(SolcError::NoContracts(self.paths.sources.clone()));
        }
        trace!(count = sources.len(), "read sources");

        // fail on a missing compiler before doing anything with the sources
        let solc = self.solc.resolve()?;
        debug!(solc = %solc.display(), "resolved compiler");

        let input = CompilerInput::with_sources(&sources).settings(self.settings.clone());
        let output = self.solc.compile_output_with(&solc, &input)?.decode()?;

        let triage = report::report_diagnostics(&output.errors, diagnostics)?;
        let artifacts = artifact_output::on_output(&output, &self.paths.artifacts)?;
        info!(contracts = artifacts.len(), warnings = triage.warnings, "compiled");
        Ok((artifacts, triage))
    }

    /// Generates a binding for every artifact in the artifacts directory.
    pub fn generate_bindings(&self) -> Result<Vec<PathBuf>> {
        let bindings = self.abigen.generate_all(&self.paths.artifacts, &self.paths.bindings)?;
        info!(bindings = bindings.len(), "generated bindings");
        Ok(bindings)
    }
}

/// The result of a successful [`Project::compile()`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectCompileOutput {
    /// The artifacts written for every compiled contract
    pub artifacts: Vec<ContractArtifact>,
    /// The generated binding files
    pub bindings: Vec<PathBuf>,
    /// Counts of the reported diagnostics, all of them warnings
    pub triage: Triage,
}

impl ProjectCompileOutput {
    /// Finds the artifact of the contract with the given name
    pub fn find(&self, name: impl AsRef<str>) -> Option<&ContractArtifact> {
        let name = name.as_ref();
        self.artifacts.iter().find(|artifact| artifact.name == name)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProjectBuilder {
    paths: Option<ProjectPathsConfig>,
    root: Option<PathBuf>,
    solc: Option<Solc>,
    abigen: Option<Abigen>,
    settings: Option<Settings>,
    interrupt: Option<Interrupt>,
}

impl ProjectBuilder {
    /// Uses the given layout, takes precedence over [`Self::root()`]
    #[must_use]
    pub fn paths(mut self, paths: ProjectPathsConfig) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Uses the default layout rooted at `root`
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    #[must_use]
    pub fn solc(mut self, solc: Solc) -> Self {
        self.solc = Some(solc);
        self
    }

    #[must_use]
    pub fn abigen(mut self, abigen: Abigen) -> Self {
        self.abigen = Some(abigen);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Kills the running `solc` or `abigen` process once `interrupt` is raised
    #[must_use]
    pub fn interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn build(self) -> Result<Project> {
        let Self { paths, root, solc, abigen, settings, interrupt } = self;

        let paths = match (paths, root) {
            (Some(paths), _) => paths,
            (None, Some(root)) => ProjectPathsConfig::new(root),
            (None, None) => ProjectPathsConfig::current()?,
        };

        let mut solc = solc.unwrap_or_default();
        let mut abigen = abigen.unwrap_or_default();
        if let Some(interrupt) = interrupt {
            solc = solc.with_interrupt(interrupt.clone());
            abigen = abigen.with_interrupt(interrupt);
        }

        Ok(Project { paths, solc, abigen, settings: settings.unwrap_or_default() })
    }
}
