//! # tfm-migrate
//!
//! The migration steps that copy one Terraform Cloud/Enterprise organization
//! into another. Each step:
//! - talks to both organizations only through [`tfm_api::TfcApi`]
//! - correlates resources by natural key (name, email, name + provider)
//! - skips what already exists, so re-running is the recovery path
//! - logs single-item failures and moves on, returning a [`StepReport`]
//!
//! Fatal API errors (see [`tfm_api::ApiError::is_fatal`]) and configuration
//! problems surface as [`MigrateError`] and end the run.

mod error;
pub mod execution;
pub mod identity;
pub mod registry;
mod report;
pub mod state;
pub mod teams;
pub mod variable_file;
pub mod variable_sets;
pub mod variables;
pub mod vcs;
pub mod workspaces;

#[cfg(test)]
mod test_support;

pub use error::MigrateError;
pub use execution::update_execution_mode;
pub use identity::{IdentityMap, UserMapping};
pub use registry::migrate_registry_modules;
pub use report::StepReport;
pub use state::migrate_current_state;
pub use teams::{migrate_memberships, migrate_team_access, migrate_teams};
pub use variable_sets::apply_variable_sets;
pub use variables::{confirm_deletion, delete_variables, export_variables, import_variables};
pub use workspaces::migrate_workspaces;

pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeOrg, variable};
    use tfm_api::teams::OWNERS_TEAM;
    use tfm_api::workspaces::WorkspaceAttributes;
    use tfm_api::{MembershipStatus, OrganizationAccess, VariableCategory, VcsRepo};
    use tfm_config::{MigrateConfig, RetryConfig, VariableSetBinding};

    fn seeded() -> (FakeOrg, FakeOrg, MigrateConfig) {
        let source = FakeOrg::new("acme-legacy");
        let target = FakeOrg::terraform_cloud("acme");
        source.add_team(OWNERS_TEAM, OrganizationAccess::default());
        target.add_team(OWNERS_TEAM, OrganizationAccess::default());
        let devs = source.add_team("developers", OrganizationAccess::default());
        source.add_member("dev@example.com", MembershipStatus::Active, &[devs.as_str()]);
        target.add_account("dev@example.com");

        let ws = source.add_workspace(WorkspaceAttributes {
            name: "prod-aws-01".into(),
            vcs_repo: Some(VcsRepo {
                identifier: "acme/prod".into(),
                oauth_token_id: Some("ot-src-gh".into()),
                ..VcsRepo::default()
            }),
            ..WorkspaceAttributes::default()
        });
        source.add_team_access(&ws, &devs, tfm_api::AccessLevel::Write, Default::default());
        source.add_variable(&ws, variable("region", "us-east-1", VariableCategory::Terraform));
        source.add_state(
            "prod-aws-01",
            3,
            Some(br#"{"serial":3,"lineage":"l-1"}"#.to_vec()),
        );
        source.add_module(
            "vpc",
            "aws",
            Some(VcsRepo {
                identifier: "acme/terraform-aws-vpc".into(),
                oauth_token_id: Some("ot-src-gh".into()),
                ..VcsRepo::default()
            }),
        );

        let mut config = MigrateConfig::default();
        config.source.vcs_tokens.insert("github".into(), "ot-src-gh".into());
        config.target.vcs_tokens.insert("github".into(), "ot-dst-gh".into());
        config.workspace_retry = RetryConfig {
            attempts: 1,
            delay_secs: 0,
        };
        config.variable_sets = vec![VariableSetBinding {
            identifier: "aws".into(),
            id: "varset-aws".into(),
        }];
        (source, target, config)
    }

    async fn run_all(source: &FakeOrg, target: &FakeOrg, config: &MigrateConfig, csv: &std::path::Path) -> usize {
        let mut identity = IdentityMap::new();
        let reports = vec![
            migrate_teams(source, target, &mut identity).await.unwrap(),
            migrate_memberships(source, target, &mut identity).await.unwrap(),
            migrate_registry_modules(source, target, config).await.unwrap(),
            migrate_workspaces(source, target, config).await.unwrap(),
            migrate_team_access(source, target, &identity).await.unwrap(),
            export_variables(source, &config.variables, csv).await.unwrap(),
            import_variables(target, csv).await.unwrap(),
            migrate_current_state(source, target).await.unwrap(),
        ];
        assert!(reports.iter().all(|report| report.failed == 0), "{reports:?}");
        reports
            .iter()
            .filter(|report| report.step != "export variables")
            .map(|report| report.created)
            .sum()
    }

    #[tokio::test]
    async fn second_run_creates_nothing() {
        let (source, target, config) = seeded();
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("variables.csv");

        // team, invite, module, workspace, access grant, variable, state
        assert_eq!(run_all(&source, &target, &config, &csv).await, 7);
        assert_eq!(run_all(&source, &target, &config, &csv).await, 0);

        let report = apply_variable_sets(&target, &config.variable_sets).await.unwrap();
        assert_eq!(report.updated, 1);
        let state = target.state();
        assert_eq!(state.varset_links[0].0, "varset-aws");
    }
}
