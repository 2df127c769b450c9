use std::path::PathBuf;

use chrono::Utc;
use clap::ArgMatches;
use tracing::{error, info, warn};

use reaper_config::ReaperConfig;
use reaper_core::{
    CloudClient, CriteriaSpec, Interval, JsonFileStore, LifecycleRequest, MailTransport,
    OpenStackCli, ResourceKind, RunContext, RunRequest, SendmailTransport, SmtpRelayTransport,
    default_state_dir, events, execute,
};

use super::format_partial_failure_error;
use crate::{color, table};

/// Settings resolved from flags, then config, then the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunSettings {
    pub cloud: Option<String>,
    pub openstack_bin: String,
    pub sendmail: String,
    /// Set means submit over SMTP instead of piping to `sendmail`.
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub state_dir: PathBuf,
    pub json: bool,
}

pub(crate) fn handle_run_command(
    kind: ResourceKind,
    matches: &ArgMatches,
    config: &ReaperConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = build_request(kind, matches, config)?;
    let settings = resolve_settings(matches, config);

    info!(
        event = "cli.run_started",
        kind = %kind,
        phase = ?request.phase,
        force = request.force,
        email = request.email,
        cloud = ?settings.cloud,
        state_dir = %settings.state_dir.display()
    );

    if let Some(age) = &request.criteria.age
        && Interval::parse(age).is_zero()
    {
        eprintln!(
            "{} --age '{}' has no recognized unit (h, d, w, m, y) and matches every {}",
            color::warning("Warning:"),
            age,
            kind.noun()
        );
    }

    let client = OpenStackCli::new(&settings.openstack_bin, settings.cloud.clone());
    if !client.is_available() {
        warn!(
            event = "cli.run_client_not_found",
            binary = %settings.openstack_bin
        );
    }
    let store = JsonFileStore::new(&settings.state_dir, client.identity(), kind);
    let transport = mail_transport(&settings);

    let context = RunContext {
        client: &client,
        store: &store,
        transport: transport.as_ref(),
        now: Utc::now(),
    };

    let report = match execute(&request, &context) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {}", color::error("Run failed:"), e);
            error!(event = "cli.run_failed", kind = %kind, error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        table::print_report(&report);
    }

    info!(
        event = "cli.run_completed",
        kind = %kind,
        mode = %report.mode,
        dry_run = report.dry_run,
        selected = report.selected.len(),
        deleted = report.deleted.len(),
        failed = report.failed.len()
    );

    if report.is_partial_failure() {
        let total = report.deleted.len() + report.failed.len();
        return Err(format_partial_failure_error("delete", report.failed.len(), total).into());
    }

    Ok(())
}

pub(crate) fn mail_transport(settings: &RunSettings) -> Box<dyn MailTransport> {
    match &settings.smtp_host {
        Some(host) => Box::new(SmtpRelayTransport::new(host, settings.smtp_port)),
        None => Box::new(SendmailTransport::new(&settings.sendmail)),
    }
}

pub(crate) fn build_request(
    kind: ResourceKind,
    matches: &ArgMatches,
    config: &ReaperConfig,
) -> Result<RunRequest, String> {
    // Resource-specific args only exist on their own subcommand.
    let text = |id: &str| matches.try_get_one::<String>(id).ok().flatten().cloned();
    let flag = |id: &str| {
        matches
            .try_get_one::<bool>(id)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false)
    };

    let criteria = CriteriaSpec {
        age: text("age"),
        name: text("name"),
        skip_name: text("skip-name"),
        with_attached: flag("with-attached"),
        floating_subnet: text("floating-subnet"),
        static_subnet: text("static-subnet"),
    };

    let phase = text("phase")
        .map(|p| p.parse::<LifecycleRequest>())
        .transpose()?;

    Ok(RunRequest {
        kind,
        criteria,
        phase,
        force: flag("force"),
        email: flag("email"),
        sender: text("sender").or_else(|| config.notify.sender.clone()),
        recipient: text("recipient").or_else(|| config.notify.recipient.clone()),
    })
}

pub(crate) fn resolve_settings(matches: &ArgMatches, config: &ReaperConfig) -> RunSettings {
    let cloud = matches
        .get_one::<String>("os-cloud")
        .cloned()
        .or_else(|| config.cloud.name.clone())
        .or_else(|| std::env::var("OS_CLOUD").ok())
        .filter(|c| !c.trim().is_empty());

    let state_dir = matches
        .get_one::<String>("state-dir")
        .map(PathBuf::from)
        .or_else(|| config.state.dir.clone())
        .unwrap_or_else(default_state_dir);

    let smtp_host = matches
        .try_get_one::<String>("smtp-host")
        .ok()
        .flatten()
        .cloned()
        .or_else(|| config.notify.smtp_host.clone())
        .filter(|h| !h.trim().is_empty());
    let smtp_port = matches
        .try_get_one::<u16>("smtp-port")
        .ok()
        .flatten()
        .copied()
        .unwrap_or(config.notify.smtp_port);

    RunSettings {
        cloud,
        openstack_bin: config.cloud.openstack_bin.clone(),
        sendmail: config.notify.sendmail.clone(),
        smtp_host,
        smtp_port,
        state_dir,
        json: matches.get_flag("json"),
    }
}
