//! Organization memberships and invitations.

use serde::{Deserialize, Serialize};

use crate::jsonapi::{Document, NewResource, Relationship, Resource, ResourceRef, with_filter};
use crate::{Result, TfcClient};

pub type Membership = Resource<MembershipAttributes, MembershipRelationships>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    #[default]
    Active,
    Invited,
}

impl MembershipStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Invited => "invited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct MembershipAttributes {
    pub email: String,
    #[serde(default)]
    pub status: MembershipStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct MembershipRelationships {
    #[serde(default)]
    pub user: Relationship<Option<ResourceRef>>,
    #[serde(default)]
    pub teams: Relationship<Vec<ResourceRef>>,
}

impl Membership {
    /// ID of the user account behind this membership, if it exists yet.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.relationships.user.data.as_ref().map(|user| user.id.as_str())
    }

    /// IDs of the teams this member belongs to.
    pub fn team_ids(&self) -> impl Iterator<Item = &str> {
        self.relationships.teams.data.iter().map(|team| team.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteAttributes {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteRelationships {
    pub teams: Relationship<Vec<ResourceRef>>,
}

/// Body for `POST /organizations/{org}/organization-memberships`.
pub type MembershipInvite = NewResource<InviteAttributes, InviteRelationships>;

impl MembershipInvite {
    /// Invite `email` into the given target team IDs.
    #[must_use]
    pub fn invite(email: &str, team_ids: Vec<String>) -> Self {
        let teams = team_ids
            .into_iter()
            .map(|id| ResourceRef::new("teams", id))
            .collect();
        Self::with_relationships(
            "organization-memberships",
            InviteAttributes {
                email: email.to_string(),
            },
            InviteRelationships {
                teams: Relationship::new(teams),
            },
        )
    }
}

impl TfcClient {
    /// List organization memberships, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError`] if any page request fails.
    pub async fn list_memberships(&self, status: Option<MembershipStatus>) -> Result<Vec<Membership>> {
        let mut path = format!("{}/organization-memberships", self.org_path());
        if let Some(status) = status {
            path = with_filter(&path, &["status"], status.as_str());
        }
        self.list_all(&path).await
    }

    /// Invite a user by email.
    ///
    /// # Errors
    ///
    /// Fails when no user account exists for the email, among other reasons.
    pub async fn invite_member(&self, invite: &MembershipInvite) -> Result<Membership> {
        let path = format!("{}/organization-memberships", self.org_path());
        let doc: Document<Membership> = self.post_json(&path, &Document::new(invite)).await?;
        Ok(doc.data)
    }
}
