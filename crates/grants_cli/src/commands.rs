//! Command handlers.

use crate::cli::{Cli, Command};
use anyhow::{bail, Context};
use chrono::Local;
use grants_core::db::migrations::{current_version, latest_version};
use grants_core::db::open_db;
use grants_core::{
    core_version, dashboard_summary, init_logging, seed_sample_grants, upcoming_deadlines,
    AppConfig, AttachmentService, AuthService, AuthenticatedUser, DashboardSummary,
    DeleteConfirmation, FundingAnalytics, Grant, GrantDraft, GrantId, GrantService,
    MutationOutcome, SqliteAttachmentRepository, SqliteAuditRepository, SqliteGrantRepository,
    SqliteUserRepository,
};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

type Grants<'c> = GrantService<SqliteGrantRepository<'c>, SqliteAuditRepository<'c>>;
type Attachments<'c> =
    AttachmentService<SqliteAttachmentRepository<'c>, SqliteGrantRepository<'c>>;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load config `{}`", cli.config.display()))?;
    start_logging(&config)?;

    let conn = open_db(&config.database_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.database_path.display()
        )
    })?;

    let auth = AuthService::new(SqliteUserRepository::new(&conn));
    let grants = GrantService::new(
        SqliteGrantRepository::new(&conn),
        SqliteAuditRepository::new(&conn),
    );

    match &cli.command {
        Command::Migrate => {
            println!("{}", schema_report(&conn)?);
            return Ok(());
        }
        Command::Register {
            username,
            new_password,
        } => {
            auth.register(username, new_password)?;
            println!("account created: {}", username.trim());
            return Ok(());
        }
        _ => {}
    }

    let user = login(&auth, cli.user.as_deref(), cli.password.as_deref())?;
    let attachments = AttachmentService::new(
        SqliteAttachmentRepository::new(&conn),
        SqliteGrantRepository::new(&conn),
        &config.upload_dir,
        &config.allowed_extensions,
    );

    match cli.command {
        Command::Migrate | Command::Register { .. } => Ok(()),
        Command::Seed => {
            let inserted = seed_sample_grants(&grants)?;
            println!("inserted {inserted} sample grants");
            Ok(())
        }
        Command::List => {
            let all = grants.list()?;
            if cli.json {
                return print_json(&all);
            }
            print_grant_table(&all);
            Ok(())
        }
        Command::Show { grant } => show(&grants, &attachments, &grant, cli.json),
        Command::Add { fields, attach } => {
            let draft = fields.apply_to(GrantDraft::default());
            let outcome = grants.create(&user, draft)?;
            report_saved(&outcome);
            attach_if_given(&attachments, outcome.value.id, attach.as_deref())
        }
        Command::Edit { id, fields, attach } => {
            let current = grants.get(id)?;
            let outcome = grants.update(&user, id, fields.apply_to(current.to_draft()))?;
            report_saved(&outcome);
            attach_if_given(&attachments, id, attach.as_deref())
        }
        Command::Delete { id, yes } => {
            let outcome = grants.delete(&user, id, DeleteConfirmation::from(yes))?;
            warn_unaudited(&outcome);
            println!("grant {} deleted", outcome.value);
            Ok(())
        }
        Command::Attach { id, file } => attach_if_given(&attachments, id, Some(&file)),
        Command::Upcoming { days } => {
            let window = days.unwrap_or(config.upcoming_window_days);
            let upcoming = upcoming_deadlines(&grants.list()?, Local::now().date_naive(), window);
            if cli.json {
                return print_json(&upcoming);
            }
            println!("Upcoming deadlines ({window} days)");
            print_grant_table(&upcoming);
            Ok(())
        }
        Command::Analytics => {
            let all = grants.list()?;
            let summary = dashboard_summary(&all);
            let analytics = FundingAnalytics::compute(&all);
            if cli.json {
                return print_json(&serde_json::json!({
                    "summary": summary,
                    "analytics": analytics,
                }));
            }
            print_analytics(&summary, &analytics);
            Ok(())
        }
        Command::Audit { limit } => {
            let entries = grants.audit().list_recent(limit)?;
            if cli.json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("No audit trail entries yet.");
            }
            for entry in entries {
                println!(
                    "{}  grant={:<5} {:<8} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.grant_id,
                    entry.action,
                    entry.user
                );
            }
            Ok(())
        }
    }
}

fn schema_report(conn: &Connection) -> anyhow::Result<String> {
    Ok(format!(
        "grants_core {}: schema version {} (latest {})",
        core_version(),
        current_version(conn)?,
        latest_version()
    ))
}

fn start_logging(config: &AppConfig) -> anyhow::Result<()> {
    let Some(log_dir) = &config.log_dir else {
        return Ok(());
    };
    let log_dir = if log_dir.is_absolute() {
        log_dir.clone()
    } else {
        std::env::current_dir()?.join(log_dir)
    };
    init_logging(&config.log_level, &log_dir)?;
    Ok(())
}

fn login(
    auth: &AuthService<SqliteUserRepository<'_>>,
    user: Option<&str>,
    password: Option<&str>,
) -> anyhow::Result<AuthenticatedUser> {
    let (Some(user), Some(password)) = (user, password) else {
        bail!("login required: pass --user and --password (or GRANTS_USER/GRANTS_PASSWORD)");
    };
    match auth.login(user, password)? {
        Some(user) => Ok(user),
        None => bail!("invalid credentials"),
    }
}

fn show(
    grants: &Grants<'_>,
    attachments: &Attachments<'_>,
    selector: &str,
    json: bool,
) -> anyhow::Result<()> {
    let grant = match selector.parse::<GrantId>() {
        Ok(id) => grants.get(id)?,
        Err(_) => grants.find_by_title(selector)?,
    };
    let files = attachments.list_for_grant(grant.id)?;
    let history = grants.audit().list_for_grant(grant.id)?;

    if json {
        return print_json(&serde_json::json!({
            "grant": grant,
            "attachments": files,
            "history": history,
        }));
    }

    println!("#{} {}", grant.id, grant.title);
    println!("  funder:        {}", grant.funder);
    println!("  amount:        {} {}", grant.funding_amount, grant.currency);
    println!("  theme:         {}", grant.theme);
    println!("  status:        {}", grant.status);
    println!("  deadline:      {}", date_or_dash(grant.deadline));
    println!("  submitted:     {}", date_or_dash(grant.submitted_date));
    println!("  organizations: {}", grant.organization_involved);
    println!("  created:       {}", grant.created_at.format("%Y-%m-%d %H:%M"));
    println!("\nDescription\n{}", grant.description);
    println!("\nKey Personnel\n{}", grant.key_personnel);
    if !files.is_empty() {
        println!("\nAttachments");
        for file in files {
            println!("  {} ({})", file.file_name, file.file_path.display());
        }
    }
    println!("\nHistory");
    for entry in history {
        println!(
            "  {} {} by {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action,
            entry.user
        );
    }
    Ok(())
}

fn attach_if_given(
    attachments: &Attachments<'_>,
    grant_id: GrantId,
    file: Option<&Path>,
) -> anyhow::Result<()> {
    let Some(file) = file else {
        return Ok(());
    };
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("`{}` has no usable file name", file.display()))?;
    if !attachments.is_allowed(file_name) {
        bail!("`{file_name}` is not an accepted attachment type");
    }
    let bytes =
        std::fs::read(file).with_context(|| format!("failed to read `{}`", file.display()))?;
    let attachment = attachments.attach(grant_id, file_name, &bytes)?;
    println!(
        "attached {} to grant {grant_id}",
        attachment.file_path.display()
    );
    Ok(())
}

fn report_saved(outcome: &MutationOutcome<Grant>) {
    warn_unaudited(outcome);
    println!("saved grant {} ({})", outcome.value.id, outcome.value.title);
}

fn warn_unaudited<T>(outcome: &MutationOutcome<T>) {
    if let Some(warning) = &outcome.audit_warning {
        eprintln!("warning: {warning}");
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_grant_table(grants: &[Grant]) {
    if grants.is_empty() {
        println!("(none)");
        return;
    }
    println!(
        "{:>4}  {:<36} {:<24} {:>14} {:<4} {:<10} {:<10}",
        "id", "title", "funder", "amount", "cur", "status", "deadline"
    );
    for grant in grants {
        println!(
            "{:>4}  {:<36} {:<24} {:>14} {:<4} {:<10} {:<10}",
            grant.id,
            truncate(&grant.title, 36),
            truncate(&grant.funder, 24),
            grant.funding_amount.to_string(),
            grant.currency.as_str(),
            grant.status.as_str(),
            date_or_dash(grant.deadline)
        );
    }
}

fn print_analytics(summary: &DashboardSummary, analytics: &FundingAnalytics) {
    println!("Total grants: {}", summary.total);
    if analytics.is_empty() {
        println!("No grants available yet. Add some grants to see analytics.");
        return;
    }
    for (status, count) in &summary.by_status {
        println!("  {status:<10} {count}");
    }

    println!("\nFunding by status");
    for (status, total) in &analytics.funding_by_status {
        println!("  {status:<10} {total}");
    }
    println!("\nFunding by deadline year");
    for (year, total) in &analytics.funding_by_year {
        println!("  {year:<10} {total}");
    }
    println!("\nTop funders");
    for row in &analytics.funding_by_funder {
        println!("  {:<32} {}", truncate(&row.funder, 32), row.total);
    }
    println!("\nAverage funding by theme");
    for row in &analytics.average_funding_by_theme {
        println!("  {:<32} {}", truncate(&row.theme, 32), row.average);
    }
}

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

#[cfg(test)]
mod tests {
    use super::{schema_report, truncate};
    use grants_core::db::migrations::latest_version;
    use grants_core::db::open_db_in_memory;

    #[test]
    fn schema_report_names_core_version_and_schema() {
        let conn = open_db_in_memory().unwrap();
        let report = schema_report(&conn).unwrap();
        assert!(report.starts_with(&format!("grants_core {}", grants_core::core_version())));
        let latest = latest_version();
        assert!(report.ends_with(&format!("schema version {latest} (latest {latest})")));
    }

    #[test]
    fn truncate_marks_cut_values() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd~");
    }
}
