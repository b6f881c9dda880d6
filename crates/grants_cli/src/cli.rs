//! Command-line surface.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use grants_core::{Currency, GrantDraft, GrantStatus};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "grants", version, about = "Track grant applications, deadlines and funding")]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = grants_core::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Username for commands that require login.
    #[arg(long, global = true, env = "GRANTS_USER")]
    pub user: Option<String>,

    #[arg(long, global = true, env = "GRANTS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or upgrade the database schema.
    Migrate,
    /// Create a login.
    Register {
        username: String,
        #[arg(value_name = "PASSWORD")]
        new_password: String,
    },
    /// Insert sample grants into an empty database.
    Seed,
    /// List all grants.
    List,
    /// Show one grant by id or exact title, with attachments and history.
    Show { grant: String },
    /// Add a grant.
    Add {
        #[command(flatten)]
        fields: GrantFields,
        /// File to attach after saving.
        #[arg(long)]
        attach: Option<PathBuf>,
    },
    /// Edit a grant; omitted fields keep their current value.
    Edit {
        id: i64,
        #[command(flatten)]
        fields: GrantFields,
        #[arg(long)]
        attach: Option<PathBuf>,
    },
    /// Delete a grant.
    Delete {
        id: i64,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Attach a file to a grant.
    Attach { id: i64, file: PathBuf },
    /// Grants due soon.
    Upcoming {
        /// Look-ahead in days (defaults to the configured window).
        #[arg(long)]
        days: Option<u32>,
    },
    /// Dashboard counts and funding breakdowns.
    Analytics,
    /// Recent audit trail entries.
    Audit {
        #[arg(long, default_value_t = grants_core::RECENT_AUDIT_LIMIT)]
        limit: u32,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct GrantFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub funder: Option<String>,
    #[arg(long)]
    pub amount: Option<Decimal>,
    /// USD, GBP, EUR or TZS.
    #[arg(long)]
    pub currency: Option<Currency>,
    #[arg(long)]
    pub theme: Option<String>,
    /// Draft, Submitted or Funded.
    #[arg(long)]
    pub status: Option<GrantStatus>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub deadline: Option<NaiveDate>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub submitted: Option<NaiveDate>,
    /// Remove the deadline.
    #[arg(long, conflicts_with = "deadline")]
    pub clear_deadline: bool,
    /// Remove the submission date.
    #[arg(long, conflicts_with = "submitted")]
    pub clear_submitted: bool,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub organizations: Option<String>,
    #[arg(long)]
    pub personnel: Option<String>,
}

impl GrantFields {
    /// Overlays the provided flags onto `base`.
    pub fn apply_to(self, mut base: GrantDraft) -> GrantDraft {
        if let Some(title) = self.title {
            base.title = title;
        }
        if let Some(funder) = self.funder {
            base.funder = funder;
        }
        if let Some(amount) = self.amount {
            base.funding_amount = amount;
        }
        if let Some(currency) = self.currency {
            base.currency = currency;
        }
        if let Some(theme) = self.theme {
            base.theme = theme;
        }
        if let Some(status) = self.status {
            base.status = status;
        }
        if self.clear_deadline {
            base.deadline = None;
        } else if self.deadline.is_some() {
            base.deadline = self.deadline;
        }
        if self.clear_submitted {
            base.submitted_date = None;
        } else if self.submitted.is_some() {
            base.submitted_date = self.submitted;
        }
        if let Some(description) = self.description {
            base.description = description;
        }
        if let Some(organizations) = self.organizations {
            base.organization_involved = organizations;
        }
        if let Some(personnel) = self.personnel {
            base.key_personnel = personnel;
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, GrantFields};
    use chrono::NaiveDate;
    use clap::{CommandFactory, Parser};
    use grants_core::{GrantDraft, GrantStatus};
    use rust_decimal::Decimal;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn edit_flags_overlay_only_given_fields() {
        let base = GrantDraft::new("Old", "UKRI", Decimal::from(10));
        let fields = GrantFields {
            title: Some("New".to_string()),
            status: Some(GrantStatus::Funded),
            ..GrantFields::default()
        };
        let merged = fields.apply_to(base);
        assert_eq!(merged.title, "New");
        assert_eq!(merged.funder, "UKRI");
        assert_eq!(merged.status, GrantStatus::Funded);
        assert_eq!(merged.funding_amount, Decimal::from(10));
    }

    #[test]
    fn edit_can_clear_dates() {
        let mut base = GrantDraft::new("Old", "UKRI", Decimal::from(10));
        base.deadline = NaiveDate::from_ymd_opt(2026, 3, 20);
        base.submitted_date = NaiveDate::from_ymd_opt(2026, 2, 5);

        let cli = Cli::try_parse_from(["grants", "edit", "3", "--clear-deadline"]).unwrap();
        let Command::Edit { id, fields, .. } = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(id, 3);
        let merged = fields.apply_to(base);
        assert_eq!(merged.deadline, None);
        assert_eq!(merged.submitted_date, NaiveDate::from_ymd_opt(2026, 2, 5));
    }

    #[test]
    fn clearing_and_setting_the_same_date_is_rejected() {
        let result = Cli::try_parse_from([
            "grants",
            "edit",
            "3",
            "--deadline",
            "2026-05-01",
            "--clear-deadline",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn add_parses_typed_flags() {
        let cli = Cli::try_parse_from([
            "grants", "add", "--title", "X", "--amount", "1000.50", "--currency", "gbp",
            "--deadline", "2026-11-01",
        ])
        .unwrap();
        match cli.command {
            Command::Add { fields, .. } => {
                assert_eq!(fields.amount, Some(Decimal::new(100050, 2)));
                assert_eq!(fields.currency, Some(grants_core::Currency::Gbp));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
