//! Subcommand implementations

use anyhow::{bail, Context as _};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use votrex_access::{
    AccessGate, GateVerdict, OrganizationDashboard, RequiredRoles, RoleResolver, SessionRouter,
};
use votrex_ledger::{HttpLedgerGateway, InMemoryLedger, LedgerGateway};
use votrex_linkage::{ConfigMutator, InvalidationBus, LinkageConsole};
use votrex_types::{ConfigTarget, ConfigTargetKind, OrgId, WalletAddress};

use crate::config::{CliConfig, LedgerConfig};

/// Role requirement accepted by `check`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Requirement {
    SystemAdmin,
    OrgAdmin,
    Member,
}

impl Requirement {
    /// Gate preset for this requirement.
    pub fn roles(self) -> RequiredRoles {
        match self {
            Requirement::SystemAdmin => RequiredRoles::system_admin_only(),
            Requirement::OrgAdmin => RequiredRoles::organization_admin(),
            Requirement::Member => RequiredRoles::any_member(),
        }
    }
}

/// Shared state for one CLI invocation.
pub struct Context {
    pub resolver: Arc<RoleResolver>,
    pub ledger: Arc<dyn LedgerGateway>,
}

impl Context {
    /// Build the ledger backend and resolver from `config`.
    pub fn new(config: &CliConfig, sender: Option<&WalletAddress>) -> anyhow::Result<Self> {
        let ledger: Arc<dyn LedgerGateway> = match &config.ledger {
            LedgerConfig::Memory { fixture: Some(path) } => Arc::new(
                InMemoryLedger::from_fixture_file(path)
                    .with_context(|| format!("loading ledger fixture {}", path.display()))?,
            ),
            LedgerConfig::Memory { fixture: None } => Arc::new(InMemoryLedger::new()),
            LedgerConfig::Http {
                endpoint,
                timeout_secs,
            } => {
                let mut gateway =
                    HttpLedgerGateway::new(endpoint, Duration::from_secs(*timeout_secs))?;
                if let Some(sender) = sender {
                    gateway = gateway.with_sender(sender.clone());
                }
                Arc::new(gateway)
            }
        };

        let resolver = Arc::new(RoleResolver::new(ledger.clone(), config.access()));
        Ok(Self { resolver, ledger })
    }
}

/// An omitted address means no wallet; a blank one is rejected.
pub fn parse_identity(address: Option<&str>) -> anyhow::Result<Option<WalletAddress>> {
    Ok(address.map(WalletAddress::parse).transpose()?)
}

/// Print the notice and destination for a login.
pub async fn login(
    ctx: &Context,
    org: &OrgId,
    identity: Option<WalletAddress>,
) -> anyhow::Result<()> {
    let router = SessionRouter::new(ctx.resolver.clone());
    let Some(outcome) = router.login(identity, org).await else {
        bail!("login superseded");
    };

    println!("{}", outcome.notice);
    println!("Destination: {}", outcome.destination);
    if outcome.notice.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

/// Print whether `identity` passes `require`.
pub async fn check(
    ctx: &Context,
    org: OrgId,
    identity: Option<WalletAddress>,
    require: Requirement,
) -> anyhow::Result<()> {
    let gate = AccessGate::new(ctx.resolver.clone(), org, require.roles());

    match gate.refresh(identity).await {
        GateVerdict::Allowed(role) => {
            println!("allowed ({})", role);
            Ok(())
        }
        GateVerdict::Denied(reason) => {
            println!("denied: {}", reason);
            std::process::exit(1);
        }
        GateVerdict::Pending => bail!("resolution did not settle"),
    }
}

/// Submit a linkage write through the system admin console.
pub async fn link(
    ctx: &Context,
    org: OrgId,
    identity: Option<WalletAddress>,
    kind: ConfigTargetKind,
    destination: &str,
) -> anyhow::Result<()> {
    let bus = InvalidationBus::new();
    let mutator = Arc::new(ConfigMutator::new(ctx.ledger.clone(), bus));
    let console = LinkageConsole::new(ctx.resolver.clone(), org, mutator);

    let notice = console
        .submit(identity, ConfigTarget::new(kind, destination))
        .await?;

    info!(target_kind = %kind, failed = notice.is_error(), "Linkage submitted");
    println!("{}", notice);
    if notice.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

/// Print the organization summary as JSON.
pub async fn members(
    ctx: &Context,
    org: OrgId,
    identity: Option<WalletAddress>,
) -> anyhow::Result<()> {
    let dashboard = OrganizationDashboard::new(ctx.resolver.clone(), org);
    let summary = dashboard.summary(identity).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use votrex_types::Role;

    #[test]
    fn test_requirement_presets() {
        assert!(Requirement::Member.roles().permits(Role::Voter));
        assert!(!Requirement::OrgAdmin.roles().permits(Role::Voter));
        assert!(Requirement::OrgAdmin.roles().permits(Role::SystemAdmin));
        assert!(!Requirement::SystemAdmin.roles().permits(Role::OrganizationAdmin));
    }

    #[test]
    fn test_parse_identity() {
        assert_eq!(parse_identity(None).unwrap(), None);
        assert_eq!(
            parse_identity(Some("0xABC")).unwrap(),
            Some(WalletAddress::new("0xabc"))
        );
        assert!(parse_identity(Some("   ")).is_err());
    }

    #[tokio::test]
    async fn test_memory_context_resolves_demo_fixture() {
        let config = CliConfig {
            ledger: LedgerConfig::Memory {
                fixture: Some(
                    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/ledger.json"),
                ),
            },
            ..CliConfig::default()
        };
        let ctx = Context::new(&config, None).unwrap();

        let role = ctx
            .resolver
            .resolve(
                Some(&WalletAddress::new("0xabc0000000000000000000000000000000000001")),
                &OrgId::new("ORG1").unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(role, Role::OrganizationAdmin);
    }

    #[test]
    fn test_missing_fixture_is_reported() {
        let config = CliConfig {
            ledger: LedgerConfig::Memory {
                fixture: Some("/nonexistent/ledger.json".into()),
            },
            ..CliConfig::default()
        };
        let err = Context::new(&config, None).err().unwrap();
        assert!(err.to_string().contains("loading ledger fixture"));
    }
}
