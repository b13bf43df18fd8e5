//! StallBoard console
//!
//! Main application entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use StallBoard::{
    config::Settings,
    database::{DataStore, RestStore},
    forms::AddressFields,
    models::{Decision, FormType, MemberRole},
    services::{LineLoginClient, LineProfile, LoginProvider, LookupOutcome, ServiceFactory},
    state::OrganizerView,
    utils::{helpers::format_timestamp, logging},
};

#[derive(Parser)]
#[command(name = "stallboard", version, about = "Market event back office")]
struct Cli {
    /// LINE access token of the acting user
    #[arg(long, global = true, env = "STALLBOARD_LINE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Configuration file to load instead of ./config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Administrator console
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Organizer console
    #[command(subcommand)]
    Organizer(OrganizerCommand),
    /// Store (exhibitor) console
    #[command(subcommand)]
    Store(StoreCommand),
    /// Look up an address by postal code
    Postal { code: String },
    /// Inspect or remove saved form drafts
    #[command(subcommand)]
    Draft(DraftCommand),
    /// Check configuration and store connectivity
    Health,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// List organizers, pending approval first
    Organizers {
        #[arg(long)]
        pending: bool,
    },
    Approve { organizer_id: String },
    /// Withdraw an organizer's approval
    Revoke { organizer_id: String },
}

#[derive(Subcommand)]
enum OrganizerCommand {
    Events,
    Applications,
    Decide {
        application_id: String,
        #[arg(value_enum)]
        decision: DecisionArg,
    },
    /// Issue an invitation code
    Invite {
        #[arg(long, value_enum, default_value = "member")]
        role: RoleArg,
    },
    /// Join an organizer with an invitation code
    Redeem { code: String },
}

#[derive(Subcommand)]
enum StoreCommand {
    /// Events open for applications
    Events,
    Apply {
        event_id: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    Applications,
}

#[derive(Subcommand)]
enum DraftCommand {
    Show { form_type: String },
    Clear { form_type: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum DecisionArg {
    Approve,
    Reject,
}

impl From<DecisionArg> for Decision {
    fn from(arg: DecisionArg) -> Self {
        match arg {
            DecisionArg::Approve => Decision::Approve,
            DecisionArg::Reject => Decision::Reject,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    Member,
}

impl From<RoleArg> for MemberRole {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => MemberRole::Admin,
            RoleArg::Member => MemberRole::Member,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Settings::new().context("failed to load configuration")?,
    };
    settings.validate()?;

    // Initialize logging
    let _guard = logging::init_logging(&settings.logging)?;
    info!("Starting {}", StallBoard::info());

    let store: Arc<dyn DataStore> = Arc::new(RestStore::new(&settings.supabase)?);
    let login: Arc<dyn LoginProvider> = Arc::new(LineLoginClient::new(settings.line.clone())?);
    let services = ServiceFactory::new(settings, store, login)?;

    if let Err(e) = run(cli, &services).await {
        error!(error = %e, "Command failed");
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli, services: &ServiceFactory) -> anyhow::Result<()> {
    match cli.command {
        Command::Postal { code } => postal(services, &code).await,
        Command::Health => health(services).await,
        command => {
            let token = cli
                .token
                .ok_or_else(|| anyhow!("a LINE access token is required (--token or STALLBOARD_LINE_TOKEN)"))?;
            let session = services.auth_service.authenticate(&token).await?;
            let profile = session.require()?.clone();

            match command {
                Command::Admin(command) => admin(services, &session, command).await,
                Command::Organizer(command) => organizer(services, &session, &profile, command).await,
                Command::Store(command) => store(services, &profile, command).await,
                Command::Draft(command) => draft(services, &profile, command).await,
                Command::Postal { .. } | Command::Health => Ok(()),
            }
        }
    }
}

async fn admin(services: &ServiceFactory, session: &StallBoard::Session, command: AdminCommand) -> anyhow::Result<()> {
    let approvals = &services.approval_service;
    let organizers = match command {
        AdminCommand::Organizers { pending: true } => approvals.pending_organizers(session).await?,
        AdminCommand::Organizers { pending: false } => approvals.list_organizers(session).await?,
        AdminCommand::Approve { organizer_id } => approvals.set_organizer_approval(session, &organizer_id, true).await?,
        AdminCommand::Revoke { organizer_id } => approvals.set_organizer_approval(session, &organizer_id, false).await?,
    };

    for organizer in organizers {
        println!(
            "{}  {:<8}  {}  ({})",
            organizer.id,
            if organizer.is_approved { "approved" } else { "pending" },
            organizer.organization_name,
            format_timestamp(organizer.created_at)
        );
    }
    Ok(())
}

async fn organizer(
    services: &ServiceFactory,
    session: &StallBoard::Session,
    profile: &LineProfile,
    command: OrganizerCommand,
) -> anyhow::Result<()> {
    if let OrganizerCommand::Redeem { code } = &command {
        let member = services.registration_service.redeem_invitation(profile, code).await?;
        println!("Joined organizer {} as {}", member.organizer_id, member.role.as_str());
        return Ok(());
    }

    let access = match services.organizer_view(session).await? {
        OrganizerView::Dashboard(access) => access,
        OrganizerView::PendingApproval(organizer) => {
            bail!("{} is still awaiting approval", organizer.organization_name)
        }
        OrganizerView::Registration | OrganizerView::Login => {
            bail!("this LINE account is not registered as an organizer")
        }
    };
    let organizer_id = access.organizer.id.as_str();

    match command {
        OrganizerCommand::Events => {
            for event in services.event_service.list_for_organizer(profile, organizer_id).await? {
                println!(
                    "{}  {} .. {}  {}  {}",
                    event.id,
                    event.start_date,
                    event.end_date,
                    if event.is_published { "published" } else { "draft" },
                    event.name
                );
            }
        }
        OrganizerCommand::Applications => {
            print_applications(&services.approval_service.list_applications(profile, organizer_id).await?);
        }
        OrganizerCommand::Decide { application_id, decision } => {
            let views = services
                .approval_service
                .decide_application(profile, &application_id, decision.into())
                .await?;
            print_applications(&views);
        }
        OrganizerCommand::Invite { role } => {
            let invitation = services
                .invitation_service
                .create(profile, organizer_id, role.into())
                .await?;
            println!(
                "{}  role={}  expires {}",
                invitation.code,
                invitation.role.as_str(),
                format_timestamp(invitation.expires_at)
            );
        }
        OrganizerCommand::Redeem { .. } => {}
    }
    Ok(())
}

fn print_applications(views: &[StallBoard::services::ApplicationView]) {
    for view in views {
        let shop = view
            .exhibitor
            .as_ref()
            .map(|e| e.shop_name.as_str())
            .unwrap_or("(unknown exhibitor)");
        println!(
            "{}  {:<8}  {}  {}",
            view.application.id, view.application.status, view.event.name, shop
        );
    }
}

async fn store(services: &ServiceFactory, profile: &LineProfile, command: StoreCommand) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let applications = match command {
        StoreCommand::Events => {
            for event in services.event_service.open_events(today).await? {
                let deadline = event
                    .application_deadline
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| event.start_date.to_string());
                println!("{}  {}  apply by {}  {}", event.id, event.start_date, deadline, event.name);
            }
            return Ok(());
        }
        StoreCommand::Apply { event_id, message } => {
            services.event_service.apply(profile, &event_id, &message, today).await?
        }
        StoreCommand::Applications => services.event_service.my_applications(profile).await?,
    };

    for entry in applications {
        let event = entry.event.as_ref().map(|e| e.name.as_str()).unwrap_or("(deleted event)");
        println!("{}  {:<8}  {}", entry.application.id, entry.application.status, event);
    }
    Ok(())
}

async fn draft(services: &ServiceFactory, profile: &LineProfile, command: DraftCommand) -> anyhow::Result<()> {
    let parse = |raw: &str| raw.parse::<FormType>().map_err(|e| anyhow!(e));
    match command {
        DraftCommand::Show { form_type } => {
            let form_type = parse(&form_type)?;
            match services.database.drafts.fetch(&profile.user_id, &form_type).await? {
                Some(draft) => println!("{}", serde_json::to_string_pretty(&draft.payload)?),
                None => println!("No draft saved for {}", form_type),
            }
        }
        DraftCommand::Clear { form_type } => {
            let form_type = parse(&form_type)?;
            let removed = services.database.drafts.delete(&profile.user_id, &form_type).await?;
            println!("Removed {} draft(s)", removed);
        }
    }
    Ok(())
}

async fn postal(services: &ServiceFactory, code: &str) -> anyhow::Result<()> {
    let mut fields = AddressFields {
        postal_code: code.to_string(),
        ..Default::default()
    };
    match services.postal_service.fill_address(&mut fields).await {
        LookupOutcome::Filled(_) => {
            println!("{} {}{}{}", fields.postal_code, fields.prefecture, fields.city, fields.address_line);
            Ok(())
        }
        LookupOutcome::Alert(message) => Err(anyhow!(message)),
    }
}

async fn health(services: &ServiceFactory) -> anyhow::Result<()> {
    let status = services.health_check().await;
    for issue in status.get_issues() {
        println!("- {}", issue);
    }
    if !status.is_healthy() {
        bail!("service is not healthy");
    }
    println!("ok");
    Ok(())
}
