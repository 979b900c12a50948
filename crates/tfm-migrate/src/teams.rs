//! Teams, organization memberships and workspace team access.
//!
//! Run in that order: memberships and team access translate source team IDs
//! through the [`IdentityMap`] the team pass fills in.

use std::collections::HashMap;

use tfm_api::teams::OWNERS_TEAM;
use tfm_api::{MembershipInvite, MembershipStatus, TeamAccessCreate, TeamCreate, TfcApi};

use crate::error::non_fatal;
use crate::identity::{IdentityMap, UserMapping};
use crate::{MigrateError, Result, StepReport};

/// Create every source team missing on the target and record the team map.
///
/// The built-in owners team is never created; it maps onto the target's.
///
/// # Errors
///
/// Fails when either team list cannot be fetched or an API call returns a
/// fatal error.
pub async fn migrate_teams(source: &dyn TfcApi, target: &dyn TfcApi, identity: &mut IdentityMap) -> Result<StepReport> {
    let mut report = StepReport::new("teams");
    let source_teams = source
        .list_teams()
        .await
        .map_err(|e| MigrateError::api("list source teams", e))?;
    let target_teams: HashMap<String, String> = target
        .list_teams()
        .await
        .map_err(|e| MigrateError::api("list target teams", e))?
        .into_iter()
        .map(|team| (team.attributes.name, team.id))
        .collect();

    let total = source_teams.len();
    for (index, team) in source_teams.iter().enumerate() {
        let name = &team.attributes.name;
        let position = format!("{}/{total}", index + 1);

        if let Some(target_id) = target_teams.get(name) {
            tracing::info!(%position, team = %name, "team already exists on target, skipped");
            identity.map_team(&team.id, target_id);
            report.skipped += 1;
            continue;
        }
        if name == OWNERS_TEAM {
            tracing::warn!(%position, "target has no owners team; owners is never created");
            report.skipped += 1;
            continue;
        }

        tracing::info!(%position, team = %name, "creating team on target");
        let payload = TeamCreate {
            name: name.clone(),
            organization_access: team.attributes.organization_access,
        };
        match target.create_team(&payload).await {
            Ok(created) => {
                identity.map_team(&team.id, created.id);
                report.created += 1;
            }
            Err(e) => {
                let e = non_fatal(format!("create team '{name}'"), e)?;
                tracing::error!(team = %name, error = %e, "failed to create team");
                report.failed += 1;
            }
        }
    }

    report.log();
    Ok(report)
}

/// Invite every active source member whose email is not yet on the target.
///
/// Invites carry the member's teams translated through the team map; teams
/// without a mapping are dropped from the invite.
///
/// # Errors
///
/// Fails when a membership list cannot be fetched or an API call returns a
/// fatal error.
pub async fn migrate_memberships(source: &dyn TfcApi, target: &dyn TfcApi, identity: &mut IdentityMap) -> Result<StepReport> {
    let mut report = StepReport::new("memberships");
    let source_members = source
        .list_memberships(Some(MembershipStatus::Active))
        .await
        .map_err(|e| MigrateError::api("list source memberships", e))?;
    let target_members: HashMap<String, Option<String>> = target
        .list_memberships(None)
        .await
        .map_err(|e| MigrateError::api("list target memberships", e))?
        .iter()
        .map(|m| (m.attributes.email.clone(), m.user_id().map(String::from)))
        .collect();

    for member in &source_members {
        let email = &member.attributes.email;
        let Some(source_user) = member.user_id() else {
            tracing::warn!(%email, "active membership without a user account, skipped");
            report.skipped += 1;
            continue;
        };

        if let Some(target_user) = target_members.get(email) {
            let mapping = target_user
                .clone()
                .map_or(UserMapping::Unresolved, UserMapping::Resolved);
            identity.map_user(source_user, mapping);
            tracing::info!(%email, "org member already exists on target, skipped");
            report.skipped += 1;
            continue;
        }

        let mut teams = Vec::new();
        for source_team in member.team_ids() {
            match identity.team(source_team) {
                Some(target_team) => teams.push(target_team.to_string()),
                None => tracing::warn!(%email, team = source_team, "team not migrated; dropped from invite"),
            }
        }

        match target.invite_member(&MembershipInvite::invite(email, teams)).await {
            Ok(invited) => {
                let mapping = invited
                    .user_id()
                    .map_or(UserMapping::Unresolved, |id| UserMapping::Resolved(id.to_string()));
                identity.map_user(source_user, mapping);
                tracing::info!(%email, "invited org member");
                report.created += 1;
            }
            Err(e) => {
                let e = non_fatal(format!("invite '{email}'"), e)?;
                identity.map_user(source_user, UserMapping::Unresolved);
                tracing::info!(%email, error = %e, "no target user account for email, skipped");
                report.skipped += 1;
            }
        }
    }

    report.log();
    Ok(report)
}

/// Copy each source workspace's team access grants onto the same-named
/// target workspace.
///
/// # Errors
///
/// Fails when the source workspace list cannot be fetched or an API call
/// returns a fatal error.
pub async fn migrate_team_access(source: &dyn TfcApi, target: &dyn TfcApi, identity: &IdentityMap) -> Result<StepReport> {
    let mut report = StepReport::new("team access");
    let workspaces = source
        .list_workspaces()
        .await
        .map_err(|e| MigrateError::api("list source workspaces", e))?;

    let total = workspaces.len();
    for (index, workspace) in workspaces.iter().enumerate() {
        let name = &workspace.attributes.name;
        let position = format!("{}/{total}", index + 1);

        let grants = match source.list_team_access(&workspace.id).await {
            Ok(grants) => grants,
            Err(e) => {
                let e = non_fatal(format!("list team access of '{name}'"), e)?;
                tracing::error!(workspace = %name, error = %e, "failed to read source team access");
                report.failed += 1;
                continue;
            }
        };

        let target_ws = match target.show_workspace(name).await {
            Ok(ws) => ws,
            Err(e) if e.is_not_found() => {
                tracing::error!(%position, workspace = %name, "workspace does not exist on target, skipped");
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                let e = non_fatal(format!("show target workspace '{name}'"), e)?;
                tracing::error!(workspace = %name, error = %e, "failed to read target workspace");
                report.failed += 1;
                continue;
            }
        };

        let mut existing: Vec<String> = match target.list_team_access(&target_ws.id).await {
            Ok(entries) => entries
                .iter()
                .filter_map(|entry| entry.team_id().map(String::from))
                .collect(),
            Err(e) => {
                let e = non_fatal(format!("list team access of target '{name}'"), e)?;
                tracing::error!(workspace = %name, error = %e, "failed to read target team access");
                report.failed += 1;
                continue;
            }
        };

        for grant in &grants {
            let Some(source_team) = grant.team_id() else {
                continue;
            };
            let Some(target_team) = identity.team(source_team) else {
                tracing::error!(workspace = %name, team = source_team, "source team has no target mapping, skipped");
                report.failed += 1;
                continue;
            };
            if existing.iter().any(|id| id == target_team) {
                tracing::info!(%position, workspace = %name, team = target_team, "team access exists, skipped");
                report.skipped += 1;
                continue;
            }

            tracing::info!(%position, workspace = %name, team = target_team, access = ?grant.attributes.access, "adding team access");
            let payload = TeamAccessCreate::grant(
                &target_ws.id,
                target_team,
                grant.attributes.access,
                &grant.attributes.permissions,
            );
            match target.add_team_access(&payload).await {
                Ok(_) => {
                    existing.push(target_team.to_string());
                    report.created += 1;
                }
                Err(e) => {
                    let e = non_fatal(format!("add team access to '{name}'"), e)?;
                    tracing::error!(workspace = %name, error = %e, "failed to add team access");
                    report.failed += 1;
                }
            }
        }
    }

    report.log();
    Ok(report)
}
