use std::path::PathBuf;

use clap::Parser;

pub mod execution;

pub use execution::ExecutionModeArg;

/// Top-level CLI parser for the `tfmigrate` binary.
///
/// Every migration step is opt-in; steps run in a fixed order regardless of
/// flag order.
#[derive(Debug, Parser)]
#[command(
    name = "tfmigrate",
    version,
    about = "Copy teams, workspaces, variables, state and modules between Terraform Cloud/Enterprise organizations"
)]
pub struct Cli {
    /// Create source teams, memberships and team access on the target
    #[arg(long)]
    pub migrate_teams: bool,

    /// Create source workspaces on the target
    #[arg(long)]
    pub migrate_workspaces: bool,

    /// Create target workspace variables from the CSV at --var-file-path
    #[arg(long)]
    pub create_workspace_vars: bool,

    /// Delete every variable of every target workspace (asks first)
    #[arg(long)]
    pub delete_workspace_vars: bool,

    /// Write source workspace variables to the CSV at --output-file-path
    #[arg(long)]
    pub create_workspace_vars_csv: bool,

    /// Set the execution mode of target workspaces matching --workspace-identifier
    #[arg(long)]
    pub update_workspace_execution: bool,

    /// Attach the configured variable sets to matching target workspaces
    #[arg(long)]
    pub update_workspace_varsets: bool,

    /// Copy each workspace's current state version
    #[arg(long)]
    pub migrate_current_state: bool,

    /// Publish source registry modules on the target from VCS
    #[arg(long)]
    pub migrate_registry_modules: bool,

    /// CSV file read by --create-workspace-vars
    #[arg(long, default_value = "./variables.csv")]
    pub var_file_path: PathBuf,

    /// CSV file written by --create-workspace-vars-csv
    #[arg(long, default_value = "./variables.csv")]
    pub output_file_path: PathBuf,

    /// Execution mode applied by --update-workspace-execution
    #[arg(long, value_enum, default_value = "agent")]
    pub execution_mode: ExecutionModeArg,

    /// Substring selecting workspaces (and the agent pool) for --update-workspace-execution
    #[arg(long, default_value = "onprem")]
    pub workspace_identifier: String,

    /// Explicit config file layered over tfmigrate.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(long)]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "debug")]
    pub quiet: bool,
}

impl Cli {
    /// Reject empty values for the options the requested steps need.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.create_workspace_vars_csv && self.output_file_path.as_os_str().is_empty() {
            anyhow::bail!("missing file path for workspace variables [--output-file-path]");
        }
        if self.create_workspace_vars && self.var_file_path.as_os_str().is_empty() {
            anyhow::bail!("missing file path for workspace variables [--var-file-path]");
        }
        if self.update_workspace_execution && self.workspace_identifier.trim().is_empty() {
            anyhow::bail!("missing workspace identifier [--workspace-identifier]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::{CommandFactory, Parser};

    use super::{Cli, ExecutionModeArg};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["tfmigrate"]).expect("cli should parse");
        assert_eq!(cli.var_file_path, Path::new("./variables.csv"));
        assert_eq!(cli.output_file_path, Path::new("./variables.csv"));
        assert_eq!(cli.execution_mode, ExecutionModeArg::Agent);
        assert_eq!(cli.workspace_identifier, "onprem");
        assert!(!cli.migrate_teams);
        assert!(cli.config.is_none());
    }

    #[test]
    fn step_switches_parse() {
        let cli = Cli::try_parse_from([
            "tfmigrate",
            "--migrate-teams",
            "--migrate-current-state",
            "--update-workspace-execution",
            "--execution-mode",
            "remote",
            "--workspace-identifier",
            "legacy",
            "--debug",
        ])
        .expect("cli should parse");

        assert!(cli.migrate_teams);
        assert!(cli.migrate_current_state);
        assert!(!cli.migrate_workspaces);
        assert_eq!(cli.execution_mode, ExecutionModeArg::Remote);
        assert_eq!(cli.workspace_identifier, "legacy");
        assert!(cli.debug);
    }

    #[test]
    fn execution_mode_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["tfmigrate", "--execution-mode", "cloud"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn quiet_and_debug_conflict() {
        assert!(Cli::try_parse_from(["tfmigrate", "--quiet", "--debug"]).is_err());
    }

    #[test]
    fn validate_rejects_empty_identifier() {
        let cli = Cli::try_parse_from([
            "tfmigrate",
            "--update-workspace-execution",
            "--workspace-identifier",
            "",
        ])
        .expect("cli should parse");
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["tfmigrate", "--workspace-identifier", ""])
            .expect("cli should parse");
        assert!(cli.validate().is_ok());
    }
}
