//! Command dispatch

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, OutputFormat, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;
use crate::tree_traits::{breakdown_tree, TreeNodeConvert};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let dir = working_dir(cli.dir.as_deref())?;

    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => execute_config(command, &dir),
        Some(command) => {
            let settings = Settings::load(Some(&dir))?;
            let container = ServiceContainer::new(settings);
            match command {
                Commands::Distribute { files, rate, json } => {
                    distribute(&container, files, *rate, *json)
                }
                Commands::Breakdown { file, rate } => breakdown(&container, file, *rate),
                Commands::Volume { file, office } => volume(&container, file, office.as_deref()),
                Commands::Tree { file } => tree(&container, file),
                Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
            }
        }
        None => Ok(()),
    }
}

fn working_dir(dir: Option<&Path>) -> CliResult<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("resolve current directory", e))),
    }
}

#[instrument(skip(container))]
fn distribute(
    container: &ServiceContainer,
    files: &[PathBuf],
    rate: Option<Decimal>,
    json: bool,
) -> CliResult<()> {
    let service = container
        .distribution
        .with_rate(rate.unwrap_or(container.settings.overall_rate));
    let as_json = json || container.settings.output == OutputFormat::Json;
    debug!(
        "overall_rate={} json={}",
        service.allocator().overall_rate(),
        as_json
    );

    let results = service.distribute_many(files);
    let total = results.len();
    let mut failed = 0;
    let mut by_source: BTreeMap<String, BTreeMap<String, Decimal>> = BTreeMap::new();

    for result in results {
        match result {
            Ok(out) => {
                for name in &out.duplicates {
                    output::warning(&format!(
                        "{}: office name '{}' occurs more than once",
                        out.source.display(),
                        name
                    ));
                }
                if as_json {
                    by_source.insert(out.source.display().to_string(), out.shares);
                } else {
                    if total > 1 {
                        output::header(&out.source.display());
                    }
                    let width = out.shares.keys().map(|k| k.len()).max().unwrap_or(0);
                    for (name, amount) in &out.shares {
                        output::share(name, *amount, width);
                    }
                }
            }
            Err(e) => {
                failed += 1;
                output::error(&e);
            }
        }
    }

    if as_json {
        if let Some(rendered) = render_shares_json(by_source, total > 1)? {
            output::info(&rendered);
        }
    }

    if failed > 0 {
        return Err(CliError::Failed { failed, total });
    }
    Ok(())
}

/// JSON for the shares of a distribute run.
///
/// With `keyed` the maps are nested under their source path, otherwise the
/// single map is emitted bare. Returns None when nothing is left to print.
pub fn render_shares_json(
    by_source: BTreeMap<String, BTreeMap<String, Decimal>>,
    keyed: bool,
) -> CliResult<Option<String>> {
    let rendered = if keyed {
        serde_json::to_string_pretty(&by_source).map(Some)
    } else {
        by_source
            .into_values()
            .next()
            .map(|shares| serde_json::to_string_pretty(&shares))
            .transpose()
    };
    rendered.map_err(|e| CliError::Output(format!("cannot render JSON: {e}")))
}

#[instrument(skip(container))]
fn breakdown(container: &ServiceContainer, file: &Path, rate: Option<Decimal>) -> CliResult<()> {
    let service = container
        .distribution
        .with_rate(rate.unwrap_or(container.settings.overall_rate));
    let hierarchy = service.load_hierarchy(file)?;
    let out = service.distribute_tree(&hierarchy, file)?;

    output::header(&format!(
        "grand total {} x {} = pool {}",
        out.allocation.grand_total,
        service.allocator().overall_rate(),
        out.allocation.pool
    ));
    output::info(&breakdown_tree(&hierarchy, &out.allocation));
    output::info(&format!("credited {}", out.allocation.credited_total()));
    Ok(())
}

#[instrument(skip(container))]
fn volume(container: &ServiceContainer, file: &Path, office: Option<&str>) -> CliResult<()> {
    let report = container.distribution.volume(file, office)?;
    output::header(&report.office);
    output::info(&format!("total:       {}", report.total));
    output::info(&format!("descendants: {}", report.descendants));
    Ok(())
}

#[instrument(skip(container))]
fn tree(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let hierarchy = container.distribution.load_hierarchy(file)?;
    output::info(&hierarchy.to_tree_string());
    Ok(())
}

fn execute_config(command: &ConfigCommands, dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(dir))?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info("global: <unavailable>"),
            }
            output::info(&format!("local:  {}", local_config_path(dir).display()));
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::InvalidArgs("cannot determine global config directory".into())
                })?
            } else {
                local_config_path(dir)
            };
            let fs = RealFileSystem;
            if fs.exists(&path) {
                return Err(CliError::InvalidArgs(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
            fs.write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
    }
}
