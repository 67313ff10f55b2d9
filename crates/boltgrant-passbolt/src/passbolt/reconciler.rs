//! Folder grant reconciliation.
//!
//! A grant intent names a folder, a subject and a desired level. The
//! reconciler resolves the names against fresh server snapshots, compares the
//! intent with the folder's permission entries and issues at most one share
//! call per intent.

use crate::passbolt::backend::ShareBackend;
use crate::passbolt::context::OperationContext;
use crate::passbolt::error::Result;
use crate::passbolt::level::PermissionLevel;
use crate::passbolt::resolver;
use crate::passbolt::sharing::PassboltSharing;
use crate::passbolt::types::*;
use log::{debug, info};
use std::fmt;

// ── Intent & plan ───────────────────────────────────────────────────

/// Desired state of one folder grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantIntent {
    pub folder: String,
    pub subject_kind: AroKind,
    pub subject_name: String,
    /// Level code to enforce; `None` removes the grant.
    pub level: Option<String>,
}

impl GrantIntent {
    pub fn present(
        folder: impl Into<String>,
        subject_kind: AroKind,
        subject_name: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            folder: folder.into(),
            subject_kind,
            subject_name: subject_name.into(),
            level: Some(level.into()),
        }
    }

    pub fn absent(
        folder: impl Into<String>,
        subject_kind: AroKind,
        subject_name: impl Into<String>,
    ) -> Self {
        Self {
            folder: folder.into(),
            subject_kind,
            subject_name: subject_name.into(),
            level: None,
        }
    }
}

/// The single operation needed to converge a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAction {
    NoOp,
    Create,
    UpdateLevel,
    Delete,
}

impl fmt::Display for ShareAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShareAction::NoOp => "no-op",
            ShareAction::Create => "create",
            ShareAction::UpdateLevel => "update-level",
            ShareAction::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Decide the action for an observed entry and a desired level.
///
/// `desired == None` means the grant must be absent.
pub fn plan_action(existing: Option<&Permission>, desired: Option<PermissionLevel>) -> ShareAction {
    match (existing, desired) {
        (None, Some(_)) => ShareAction::Create,
        (Some(entry), Some(level)) if entry.permission_type == level.encode() => ShareAction::NoOp,
        (Some(_), Some(_)) => ShareAction::UpdateLevel,
        (Some(_), None) => ShareAction::Delete,
        (None, None) => ShareAction::NoOp,
    }
}

/// A computed but not yet applied change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantPlan {
    pub action: ShareAction,
    pub folder_id: String,
    pub subject_kind: AroKind,
    pub subject_id: String,
    /// The entry found on the folder for this subject, if any.
    pub existing: Option<Permission>,
    /// Entries to send; empty for `NoOp`.
    pub changes: Vec<Permission>,
}

/// Result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub action: ShareAction,
    pub folder_id: String,
    pub subject_id: String,
    /// Whether the share call was issued.
    pub applied: bool,
}

// ── Reconciler ──────────────────────────────────────────────────────

/// Drives grant intents against a [`ShareBackend`].
pub struct GrantReconciler<'a, B: ShareBackend + ?Sized> {
    backend: &'a B,
    ctx: OperationContext,
}

struct Target {
    folder: Folder,
    subject_id: String,
}

impl<'a, B: ShareBackend + ?Sized> GrantReconciler<'a, B> {
    pub fn new(backend: &'a B, ctx: OperationContext) -> Self {
        Self { backend, ctx }
    }

    /// Grant `subject` access at `level` on `folder`.
    pub async fn ensure_grant(
        &self,
        folder: &str,
        subject_kind: AroKind,
        subject: &str,
        level: &str,
    ) -> Result<ReconcileOutcome> {
        self.reconcile(&GrantIntent::present(folder, subject_kind, subject, level))
            .await
    }

    /// Remove whatever grant `subject` holds on `folder`.
    pub async fn remove_grant(
        &self,
        folder: &str,
        subject_kind: AroKind,
        subject: &str,
    ) -> Result<ReconcileOutcome> {
        self.reconcile(&GrantIntent::absent(folder, subject_kind, subject))
            .await
    }

    /// Current level of the grant, `None` when the subject has no entry.
    pub async fn read_grant(
        &self,
        folder: &str,
        subject_kind: AroKind,
        subject: &str,
    ) -> Result<Option<PermissionLevel>> {
        let target = self.resolve_target(folder, subject_kind, subject).await?;
        find_entry(&target.folder, subject_kind, &target.subject_id)
            .map(|entry| PermissionLevel::from_code(entry.permission_type))
            .transpose()
    }

    /// Compute the action for `intent` without touching the server's state.
    pub async fn plan_grant(&self, intent: &GrantIntent) -> Result<GrantPlan> {
        let desired = intent
            .level
            .as_deref()
            .map(PermissionLevel::decode)
            .transpose()?;

        let target = self
            .resolve_target(&intent.folder, intent.subject_kind, &intent.subject_name)
            .await?;
        let folder_id = target.folder.id.clone();
        let existing = find_entry(&target.folder, intent.subject_kind, &target.subject_id).cloned();
        let action = plan_action(existing.as_ref(), desired);

        let changes = match (action, existing.as_ref(), desired) {
            (ShareAction::Create, _, Some(level)) => vec![PassboltSharing::build_folder_grant(
                &folder_id,
                intent.subject_kind,
                &target.subject_id,
                level.encode(),
            )],
            (ShareAction::UpdateLevel, Some(entry), Some(level)) => {
                vec![PassboltSharing::build_level_change(entry, level.encode())]
            }
            (ShareAction::Delete, Some(entry), _) => {
                vec![PassboltSharing::build_delete_permission(entry)]
            }
            _ => Vec::new(),
        };

        debug!(
            "Planned {} for {} {} on folder {}",
            action, intent.subject_kind, target.subject_id, folder_id
        );

        Ok(GrantPlan {
            action,
            folder_id,
            subject_kind: intent.subject_kind,
            subject_id: target.subject_id,
            existing,
            changes,
        })
    }

    /// Converge one grant. Issues at most one share call.
    pub async fn reconcile(&self, intent: &GrantIntent) -> Result<ReconcileOutcome> {
        let plan = self.plan_grant(intent).await?;
        self.apply(plan).await
    }

    /// Send a plan's changes. `NoOp` plans send nothing.
    pub async fn apply(&self, plan: GrantPlan) -> Result<ReconcileOutcome> {
        let applied = !plan.changes.is_empty();
        if applied {
            info!(
                "Applying {} for {} {} on folder {}",
                plan.action, plan.subject_kind, plan.subject_id, plan.folder_id
            );
            self.ctx
                .run(
                    &format!("share folder {}", plan.folder_id),
                    self.backend
                        .apply_folder_permissions(&plan.folder_id, &plan.changes),
                )
                .await?;
        }
        Ok(ReconcileOutcome {
            action: plan.action,
            folder_id: plan.folder_id,
            subject_id: plan.subject_id,
            applied,
        })
    }

    /// Users and groups that can be named in a grant.
    pub async fn share_targets(&self, search: Option<&str>) -> Result<Vec<ShareTarget>> {
        self.ctx
            .run(
                "search share targets",
                self.backend.search_share_targets(search),
            )
            .await
    }

    async fn resolve_target(
        &self,
        folder_name: &str,
        subject_kind: AroKind,
        subject_name: &str,
    ) -> Result<Target> {
        let filter = FolderListParams::named_with_permissions(folder_name);
        let folders = self
            .ctx
            .run(
                &format!("list folders matching {:?}", folder_name),
                self.backend.list_folders(&filter),
            )
            .await?;
        let folder = resolver::resolve_folder(&folders, folder_name)?.clone();

        let subject_id = match subject_kind {
            AroKind::Group => {
                let groups = self
                    .ctx
                    .run("list groups", self.backend.list_groups())
                    .await?;
                resolver::resolve_group(&groups, subject_name)?.to_string()
            }
            AroKind::User => {
                let users = self
                    .ctx
                    .run("list users", self.backend.list_users())
                    .await?;
                resolver::resolve_user(&users, subject_name)?.to_string()
            }
        };

        Ok(Target { folder, subject_id })
    }
}

fn find_entry<'f>(folder: &'f Folder, aro: AroKind, aro_id: &str) -> Option<&'f Permission> {
    folder
        .permissions()
        .iter()
        .find(|p| p.matches_folder_grant(&folder.id, aro, aro_id))
}

// ── Tests ───────────────────────────────────────────────────────────
