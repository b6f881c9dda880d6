//! Sample data for a fresh database.

use crate::model::grant::{Currency, GrantDraft, GrantStatus};
use crate::repo::audit_repo::AuditRepository;
use crate::repo::grant_repo::GrantRepository;
use crate::service::auth_service::AuthenticatedUser;
use crate::service::grant_service::{GrantService, GrantServiceError};
use chrono::NaiveDate;
use log::{info, warn};
use rust_decimal::Decimal;

/// Inserts the sample grants when the grants table is empty.
///
/// Each insert is audited as `Created` by `system`. Returns how many grants
/// were inserted (zero when data already exists).
pub fn seed_sample_grants<G: GrantRepository, A: AuditRepository>(
    service: &GrantService<G, A>,
) -> Result<usize, GrantServiceError> {
    if service.count()? > 0 {
        info!("event=seed module=seed status=skipped reason=not_empty");
        return Ok(0);
    }

    let system = AuthenticatedUser::system();
    let samples = sample_grants();
    let inserted = samples.len();
    for draft in samples {
        let outcome = service.create(&system, draft)?;
        if let Some(warning) = outcome.audit_warning {
            warn!(
                "event=seed module=seed status=audit_warning grant_id={} warning={warning}",
                outcome.value.id
            );
        }
    }

    info!("event=seed module=seed status=ok inserted={inserted}");
    Ok(inserted)
}

/// The three sample grants shipped with the dashboard.
pub fn sample_grants() -> Vec<GrantDraft> {
    vec![
        GrantDraft {
            currency: Currency::Gbp,
            theme: "AI & Climate".to_string(),
            status: GrantStatus::Submitted,
            deadline: NaiveDate::from_ymd_opt(2026, 3, 20),
            submitted_date: NaiveDate::from_ymd_opt(2026, 2, 5),
            description:
                "Machine learning and IoT for optimizing irrigation for smallholder farmers."
                    .to_string(),
            organization_involved: "DLab Tanzania".to_string(),
            key_personnel: "PI: Dr A. Jongo | Data Scientist: T. Mer | Email: ajongo@dlab.or.tz"
                .to_string(),
            ..GrantDraft::new(
                "AI for Climate-Smart Irrigation",
                "UKRI",
                Decimal::from(250_000),
            )
        },
        GrantDraft {
            currency: Currency::Usd,
            theme: "Health Data".to_string(),
            status: GrantStatus::Draft,
            deadline: NaiveDate::from_ymd_opt(2026, 4, 15),
            submitted_date: None,
            description: "Using big data to track health trends in Tanzania.".to_string(),
            organization_involved: "University of Dar es Salaam".to_string(),
            key_personnel: "PI: Dr S. Mwanga | Data Analyst: T. Mer | Email: smwanga@uni.tz"
                .to_string(),
            ..GrantDraft::new(
                "Digital Health Analytics",
                "Bill & Melinda Gates Foundation",
                Decimal::from(150_000),
            )
        },
        GrantDraft {
            currency: Currency::Usd,
            theme: "Blue Economy".to_string(),
            status: GrantStatus::Funded,
            deadline: NaiveDate::from_ymd_opt(2026, 1, 30),
            submitted_date: NaiveDate::from_ymd_opt(2026, 1, 10),
            description: "Improving coastal fisheries management using data-driven models."
                .to_string(),
            organization_involved: "Coastal Research Institute".to_string(),
            key_personnel: "PI: Dr N. Mkapa | Data Scientist: T. Mer | Email: nmkapa@uni.tz"
                .to_string(),
            ..GrantDraft::new(
                "Sustainable Fisheries Project",
                "FAO",
                Decimal::from(200_000),
            )
        },
    ]
}
