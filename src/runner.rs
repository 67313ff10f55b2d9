//! Drives the subcommands: load inputs, connect, reconcile, report.

use crate::cli::{Cli, Command};
use anyhow::Context;
use boltgrant_passbolt::passbolt::{
    AroKind, ErrorClass, GrantIntent, GrantManifest, GrantReconciler, OperationContext,
    PassboltService, ReconcileOutcome, ShareBackend, ShareError,
};
use std::fmt;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How a batch of grants is driven.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Plan only; never call the share endpoint.
    pub dry_run: bool,
    /// Deadline applied to each grant separately.
    pub operation_timeout: Option<Duration>,
    /// Shared by every grant of the run.
    pub cancel: CancellationToken,
}

impl RunOptions {
    fn context(&self) -> OperationContext {
        let ctx = match self.operation_timeout {
            Some(timeout) => OperationContext::with_timeout(timeout),
            None => OperationContext::new(),
        };
        ctx.with_cancellation(self.cancel.clone())
    }
}

/// Result of one declared grant.
#[derive(Debug)]
pub struct GrantReport {
    pub intent: GrantIntent,
    pub result: Result<ReconcileOutcome, ShareError>,
}

impl fmt::Display for GrantReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = format!(
            "{} -> {} {}",
            self.intent.folder, self.intent.subject_kind, self.intent.subject_name
        );
        match &self.result {
            Ok(o) if o.applied => write!(f, "{:<13} {} (applied)", o.action.to_string(), target),
            Ok(o) => write!(f, "{:<13} {}", o.action.to_string(), target),
            Err(e) => write!(f, "{:<13} {}: {}", "error", target, e),
        }
    }
}

/// Reports for a whole manifest, in declaration order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<GrantReport>,
    /// Grants not attempted because the run was cancelled.
    pub skipped: usize,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.result.is_err()).count()
    }

    pub fn applied(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(&r.result, Ok(o) if o.applied))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.skipped == 0
    }
}

/// Reconcile every grant in order. A failed grant does not stop the run;
/// cancellation does.
pub async fn reconcile_manifest<B>(
    backend: &B,
    manifest: &GrantManifest,
    options: &RunOptions,
) -> RunSummary
where
    B: ShareBackend + ?Sized,
{
    let intents = manifest.intents();
    let mut summary = RunSummary::default();

    for (i, intent) in intents.iter().enumerate() {
        let reconciler = GrantReconciler::new(backend, options.context());
        let result = if options.dry_run {
            reconciler.plan_grant(intent).await.map(|plan| ReconcileOutcome {
                action: plan.action,
                folder_id: plan.folder_id,
                subject_id: plan.subject_id,
                applied: false,
            })
        } else {
            reconciler.reconcile(intent).await
        };

        let cancelled = matches!(&result, Err(e) if e.class() == ErrorClass::Cancelled);
        if let Err(e) = &result {
            error!("Grant on folder {:?} failed: {}", intent.folder, e);
        }
        summary.reports.push(GrantReport {
            intent: intent.clone(),
            result,
        });
        if cancelled {
            summary.skipped = intents.len() - i - 1;
            warn!("Run cancelled; {} grants not attempted", summary.skipped);
            break;
        }
    }

    info!(
        "Reconciled {} grants: {} applied, {} failed",
        summary.reports.len(),
        summary.applied(),
        summary.failed()
    );
    summary
}

/// Current level of one grant, as printed by `show`.
pub async fn describe_grant<B>(
    backend: &B,
    folder: &str,
    kind: AroKind,
    subject: &str,
    ctx: OperationContext,
) -> Result<String, ShareError>
where
    B: ShareBackend + ?Sized,
{
    let level = GrantReconciler::new(backend, ctx)
        .read_grant(folder, kind, subject)
        .await?;
    Ok(match level {
        Some(level) => format!(
            "{} -> {} {}: {} ({})",
            folder,
            kind,
            subject,
            level,
            level.name()
        ),
        None => format!("{} -> {} {}: no grant", folder, kind, subject),
    })
}

/// Users and groups a grant can name, one line each, as printed by `targets`.
pub async fn list_targets<B>(
    backend: &B,
    search: Option<&str>,
    ctx: OperationContext,
) -> Result<Vec<String>, ShareError>
where
    B: ShareBackend + ?Sized,
{
    let targets = GrantReconciler::new(backend, ctx)
        .share_targets(search)
        .await?;
    Ok(targets
        .iter()
        .map(|t| {
            let kind = t.kind().to_string();
            let mut line = format!("{:<5} {} {}", kind, t.id, t.lookup_name());
            if t.deleted {
                line.push_str(" (deleted)");
            } else if t.active == Some(false) {
                line.push_str(" (inactive)");
            }
            line
        })
        .collect())
}

fn print_summary(summary: &RunSummary) {
    for report in &summary.reports {
        println!("{}", report);
    }
    if summary.skipped > 0 {
        println!("{} grants skipped after cancellation", summary.skipped);
    }
}

/// A subcommand with its offline inputs already loaded.
#[derive(Debug)]
enum Job {
    Grants {
        manifest: GrantManifest,
        dry_run: bool,
    },
    Show {
        folder: String,
        kind: AroKind,
        subject: String,
    },
    Targets {
        search: Option<String>,
    },
}

impl Job {
    /// Reads the manifest before anything connects so bad input fails offline.
    fn load(command: Command) -> anyhow::Result<Self> {
        let (path, dry_run) = match command {
            Command::Apply { manifest, dry_run } => (manifest, dry_run),
            Command::Plan { manifest } => (manifest, true),
            Command::Show {
                folder,
                kind,
                subject,
            } => {
                return Ok(Job::Show {
                    folder,
                    kind,
                    subject,
                })
            }
            Command::Targets { search } => return Ok(Job::Targets { search }),
        };
        let manifest = GrantManifest::load(&path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        Ok(Job::Grants { manifest, dry_run })
    }
}

/// Entry point for a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.resolve_config().context("failed to load configuration")?;
    let job = Job::load(cli.command)?;

    let service = PassboltService::connect(config.clone())
        .await
        .with_context(|| format!("failed to connect to {}", config.server_url))?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    let mut options = RunOptions {
        dry_run: false,
        operation_timeout: config.operation_timeout(),
        cancel,
    };

    let outcome = match job {
        Job::Grants { manifest, dry_run } => {
            options.dry_run = dry_run;
            let summary = reconcile_manifest(&service, &manifest, &options).await;
            print_summary(&summary);
            Ok(if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Job::Show {
            folder,
            kind,
            subject,
        } => describe_grant(&service, &folder, kind, &subject, options.context())
            .await
            .map(|line| {
                println!("{}", line);
                ExitCode::SUCCESS
            })
            .map_err(anyhow::Error::from),
        Job::Targets { search } => {
            list_targets(&service, search.as_deref(), options.context())
                .await
                .map(|lines| {
                    for line in lines {
                        println!("{}", line);
                    }
                    ExitCode::SUCCESS
                })
                .map_err(anyhow::Error::from)
        }
    };

    service.disconnect().await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use boltgrant_passbolt::passbolt::{
        AcoKind, Folder, FolderListParams, Group, PassboltError, Permission, ShareAction,
        ShareTarget, User,
    };
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Minimal backend: one shared folder "Finance" and two groups.
    #[derive(Default)]
    struct Directory {
        permissions: Mutex<Vec<Permission>>,
        applies: Mutex<usize>,
    }

    #[async_trait]
    impl ShareBackend for Directory {
        async fn list_folders(
            &self,
            _filter: &FolderListParams,
        ) -> Result<Vec<Folder>, PassboltError> {
            Ok(vec![Folder {
                id: "F1".into(),
                name: Some("Finance".into()),
                created: None,
                modified: None,
                folder_parent_id: None,
                personal: Some(false),
                permissions: Some(self.permissions.lock().unwrap().clone()),
            }])
        }

        async fn list_groups(&self) -> Result<Vec<Group>, PassboltError> {
            Ok(vec![
                Group {
                    id: "G9".into(),
                    name: "Accounting".into(),
                    deleted: false,
                },
                Group {
                    id: "G2".into(),
                    name: "Audit".into(),
                    deleted: false,
                },
            ])
        }

        async fn list_users(&self) -> Result<Vec<User>, PassboltError> {
            Ok(Vec::new())
        }

        async fn apply_folder_permissions(
            &self,
            _folder_id: &str,
            permissions: &[Permission],
        ) -> Result<(), PassboltError> {
            *self.applies.lock().unwrap() += 1;
            let mut stored = self.permissions.lock().unwrap();
            for p in permissions {
                stored.retain(|e| e.aro_foreign_key != p.aro_foreign_key);
                if !p.delete {
                    stored.push(Permission {
                        id: Some(format!("P-{}", p.aro_foreign_key)),
                        ..p.clone()
                    });
                }
            }
            Ok(())
        }

        async fn search_share_targets(
            &self,
            search: Option<&str>,
        ) -> Result<Vec<ShareTarget>, PassboltError> {
            let ada = ShareTarget {
                id: "U1".into(),
                username: Some("ada@example.com".into()),
                name: None,
                role_id: None,
                active: Some(false),
                deleted: false,
                created: None,
                modified: None,
            };
            let groups = self.list_groups().await?.into_iter().map(|g| ShareTarget {
                id: g.id,
                username: None,
                name: Some(g.name),
                role_id: None,
                active: None,
                deleted: g.deleted,
                created: None,
                modified: None,
            });
            Ok(std::iter::once(ada)
                .chain(groups)
                .filter(|t| search.map_or(true, |s| t.lookup_name().contains(s)))
                .collect())
        }
    }

    const MANIFEST: &str = r#"
grants:
  - folder: Finance
    subject: { kind: Group, name: Accounting }
    level: "7"
  - folder: Finance
    subject: { kind: User, name: ghost@example.com }
    level: "1"
  - folder: Finance
    subject: { kind: Group, name: Audit }
    level: "1"
"#;

    #[tokio::test]
    async fn test_failed_grant_does_not_stop_run() {
        let backend = Directory::default();
        let manifest = GrantManifest::from_yaml_str(MANIFEST).unwrap();
        let summary = reconcile_manifest(&backend, &manifest, &RunOptions::default()).await;

        assert_eq!(summary.reports.len(), 3);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.applied(), 2);
        assert!(!summary.is_success());
        assert_eq!(*backend.applies.lock().unwrap(), 2);
        assert!(summary.reports[1].to_string().starts_with("error"));
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let backend = Directory::default();
        let manifest = GrantManifest::from_yaml_str(
            "grants:\n  - folder: Finance\n    subject: { kind: Group, name: Accounting }\n    \
             level: \"7\"\n",
        )
        .unwrap();
        reconcile_manifest(&backend, &manifest, &RunOptions::default()).await;
        let second = reconcile_manifest(&backend, &manifest, &RunOptions::default()).await;

        assert!(second.is_success());
        let outcome = second.reports[0].result.as_ref().unwrap();
        assert_eq!(outcome.action, ShareAction::NoOp);
        assert_eq!(*backend.applies.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_never_applies() {
        let backend = Directory::default();
        let manifest = GrantManifest::from_yaml_str(MANIFEST).unwrap();
        let options = RunOptions {
            dry_run: true,
            ..Default::default()
        };
        let summary = reconcile_manifest(&backend, &manifest, &options).await;
        assert_eq!(summary.applied(), 0);
        assert_eq!(*backend.applies.lock().unwrap(), 0);
        let first = summary.reports[0].result.as_ref().unwrap();
        assert_eq!(first.action, ShareAction::Create);
    }

    #[tokio::test]
    async fn test_cancelled_run_skips_remaining() {
        let backend = Directory::default();
        let manifest = GrantManifest::from_yaml_str(MANIFEST).unwrap();
        let options = RunOptions::default();
        options.cancel.cancel();
        let summary = reconcile_manifest(&backend, &manifest, &options).await;
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(*backend.applies.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_describe_grant() {
        let backend = Directory::default();
        backend.permissions.lock().unwrap().push(Permission {
            id: Some("P1".into()),
            aco: AcoKind::Folder,
            aco_foreign_key: "F1".into(),
            aro: AroKind::Group,
            aro_foreign_key: "G9".into(),
            permission_type: 15,
            created: None,
            modified: None,
            delete: false,
        });
        let line = describe_grant(
            &backend,
            "Finance",
            AroKind::Group,
            "Accounting",
            OperationContext::new(),
        )
        .await
        .unwrap();
        assert_eq!(line, "Finance -> Group Accounting: 15 (owner)");

        let line = describe_grant(
            &backend,
            "Finance",
            AroKind::Group,
            "Audit",
            OperationContext::new(),
        )
        .await
        .unwrap();
        assert_eq!(line, "Finance -> Group Audit: no grant");
    }

    #[tokio::test]
    async fn test_list_targets() {
        let backend = Directory::default();
        let lines = list_targets(&backend, None, OperationContext::new())
            .await
            .unwrap();
        assert_eq!(
            lines,
            vec![
                "User  U1 ada@example.com (inactive)",
                "Group G9 Accounting",
                "Group G2 Audit",
            ]
        );

        let lines = list_targets(&backend, Some("Aud"), OperationContext::new())
            .await
            .unwrap();
        assert_eq!(lines, vec!["Group G2 Audit"]);
    }

    #[test]
    fn test_job_loads_manifest_before_connecting() {
        let err = Job::load(Command::Plan {
            manifest: PathBuf::from("/nonexistent/grants.yaml"),
        })
        .unwrap_err();
        assert!(err.to_string().contains("failed to load"));

        let job = Job::load(Command::Targets {
            search: Some("Acc".into()),
        })
        .unwrap();
        assert!(matches!(job, Job::Targets { search: Some(s) } if s == "Acc"));
    }

    #[test]
    fn test_plan_job_is_dry_run() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, MANIFEST.as_bytes()).unwrap();
        let job = Job::load(Command::Plan {
            manifest: file.path().to_path_buf(),
        })
        .unwrap();
        match job {
            Job::Grants { manifest, dry_run } => {
                assert!(dry_run);
                assert_eq!(manifest.grants.len(), 3);
            }
            other => panic!("unexpected job {:?}", other),
        }
    }
}
