//! Grant domain model.
//!
//! # Responsibility
//! - Define the canonical grant record and its editable field set.
//! - Provide closed enums for currency and lifecycle status.
//!
//! # Invariants
//! - `title` is never empty after trimming.
//! - `funding_amount` is never negative.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Storage-assigned grant identifier (SQLite rowid).
pub type GrantId = i64;

/// Currency the funding amount is denominated in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Gbp,
    Eur,
    /// Tanzanian shilling.
    Tzs,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Self::Usd, Self::Gbp, Self::Eur, Self::Tzs];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Gbp => "GBP",
            Self::Eur => "EUR",
            Self::Tzs => "TZS",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = GrantValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|currency| currency.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| GrantValidationError::UnknownCurrency(value.to_string()))
    }
}

/// Lifecycle state of a grant application: Draft -> Submitted -> Funded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GrantStatus {
    #[default]
    Draft,
    Submitted,
    Funded,
}

impl GrantStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [GrantStatus; 3] = [Self::Draft, Self::Submitted, Self::Funded];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Funded => "Funded",
        }
    }
}

impl Display for GrantStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantStatus {
    type Err = GrantValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| GrantValidationError::UnknownStatus(value.to_string()))
    }
}

/// Input-side validation failures for grant fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantValidationError {
    EmptyTitle,
    NegativeFundingAmount(Decimal),
    UnknownCurrency(String),
    UnknownStatus(String),
}

impl Display for GrantValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "grant title cannot be empty"),
            Self::NegativeFundingAmount(amount) => {
                write!(f, "funding amount cannot be negative, got {amount}")
            }
            Self::UnknownCurrency(value) => {
                write!(f, "unknown currency `{value}`; expected USD|GBP|EUR|TZS")
            }
            Self::UnknownStatus(value) => {
                write!(f, "unknown status `{value}`; expected Draft|Submitted|Funded")
            }
        }
    }
}

impl Error for GrantValidationError {}

/// Every user-editable grant field.
///
/// Used for both create and update: updates replace the whole field set,
/// while `id` and `created_at` stay with the stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantDraft {
    pub title: String,
    pub funder: String,
    pub funding_amount: Decimal,
    pub currency: Currency,
    pub theme: String,
    pub status: GrantStatus,
    pub deadline: Option<NaiveDate>,
    pub submitted_date: Option<NaiveDate>,
    pub description: String,
    pub organization_involved: String,
    pub key_personnel: String,
}

impl GrantDraft {
    /// Creates a draft with the required headline fields; everything else
    /// starts empty, in `USD` and `Draft` status.
    pub fn new(
        title: impl Into<String>,
        funder: impl Into<String>,
        funding_amount: Decimal,
    ) -> Self {
        Self {
            title: title.into(),
            funder: funder.into(),
            funding_amount,
            ..Self::default()
        }
    }

    /// Checks boundary invariants before anything reaches storage.
    pub fn validate(&self) -> Result<(), GrantValidationError> {
        if self.title.trim().is_empty() {
            return Err(GrantValidationError::EmptyTitle);
        }
        if self.funding_amount < Decimal::ZERO {
            return Err(GrantValidationError::NegativeFundingAmount(
                self.funding_amount,
            ));
        }
        Ok(())
    }
}

/// Canonical stored grant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub id: GrantId,
    pub title: String,
    pub funder: String,
    pub funding_amount: Decimal,
    pub currency: Currency,
    pub theme: String,
    pub status: GrantStatus,
    /// `None` when never set or when the stored text was not a date.
    pub deadline: Option<NaiveDate>,
    pub submitted_date: Option<NaiveDate>,
    pub description: String,
    pub organization_involved: String,
    pub key_personnel: String,
    pub created_at: DateTime<Utc>,
}

impl Grant {
    /// Combines storage-assigned identity with the editable fields.
    pub fn from_draft(id: GrantId, created_at: DateTime<Utc>, draft: GrantDraft) -> Self {
        Self {
            id,
            title: draft.title,
            funder: draft.funder,
            funding_amount: draft.funding_amount,
            currency: draft.currency,
            theme: draft.theme,
            status: draft.status,
            deadline: draft.deadline,
            submitted_date: draft.submitted_date,
            description: draft.description,
            organization_involved: draft.organization_involved,
            key_personnel: draft.key_personnel,
            created_at,
        }
    }

    /// Returns the editable field set, e.g. to prefill an edit form.
    pub fn to_draft(&self) -> GrantDraft {
        GrantDraft {
            title: self.title.clone(),
            funder: self.funder.clone(),
            funding_amount: self.funding_amount,
            currency: self.currency,
            theme: self.theme.clone(),
            status: self.status,
            deadline: self.deadline,
            submitted_date: self.submitted_date,
            description: self.description.clone(),
            organization_involved: self.organization_involved.clone(),
            key_personnel: self.key_personnel.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Currency, GrantDraft, GrantStatus, GrantValidationError};
    use rust_decimal::Decimal;

    #[test]
    fn validate_rejects_blank_title() {
        let draft = GrantDraft::new("   ", "UKRI", Decimal::new(100, 0));
        assert_eq!(draft.validate(), Err(GrantValidationError::EmptyTitle));
    }

    #[test]
    fn validate_rejects_negative_amount_but_allows_zero() {
        let negative = GrantDraft::new("x", "f", Decimal::new(-1, 2));
        assert!(matches!(
            negative.validate(),
            Err(GrantValidationError::NegativeFundingAmount(_))
        ));

        let zero = GrantDraft::new("x", "f", Decimal::ZERO);
        assert!(zero.validate().is_ok());
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("tzs".parse::<Currency>().unwrap(), Currency::Tzs);
        assert_eq!(" funded ".parse::<GrantStatus>().unwrap(), GrantStatus::Funded);
        assert!("YEN".parse::<Currency>().is_err());
    }
}
