use chrono::NaiveDate;
use grants_core::db::open_db_in_memory;
use grants_core::{
    Currency, GrantDraft, GrantRepository, GrantStatus, GrantValidationError, RepoError,
    SqliteGrantRepository,
};
use rust_decimal_macros::dec;

fn full_draft() -> GrantDraft {
    GrantDraft {
        title: "AI for Climate-Smart Irrigation".to_string(),
        funder: "UKRI".to_string(),
        funding_amount: dec!(250000.50),
        currency: Currency::Gbp,
        theme: "AI & Climate".to_string(),
        status: GrantStatus::Submitted,
        deadline: NaiveDate::from_ymd_opt(2026, 3, 20),
        submitted_date: NaiveDate::from_ymd_opt(2026, 2, 5),
        description: "Machine learning for irrigation.".to_string(),
        organization_involved: "DLab Tanzania".to_string(),
        key_personnel: "PI: Dr A. Jongo".to_string(),
    }
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGrantRepository::new(&conn);

    let draft = full_draft();
    let created = repo.create_grant(&draft).unwrap();
    let loaded = repo.get_grant(created.id).unwrap().unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.to_draft(), draft);
    assert_eq!(loaded.funding_amount.to_string(), "250000.50");
}

#[test]
fn ids_are_assigned_in_insertion_order_and_listing_follows_them() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGrantRepository::new(&conn);

    let first = repo.create_grant(&GrantDraft::new("B", "F", dec!(1))).unwrap();
    let second = repo.create_grant(&GrantDraft::new("A", "F", dec!(2))).unwrap();
    assert!(second.id > first.id);

    let ids: Vec<_> = repo.list_grants().unwrap().iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert_eq!(repo.count_grants().unwrap(), 2);
}

#[test]
fn create_rejects_empty_title_and_negative_amount() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGrantRepository::new(&conn);

    let err = repo.create_grant(&GrantDraft::new("  ", "F", dec!(1))).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(GrantValidationError::EmptyTitle)
    ));

    let err = repo
        .create_grant(&GrantDraft::new("X", "F", dec!(-0.01)))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(GrantValidationError::NegativeFundingAmount(_))
    ));

    assert_eq!(repo.count_grants().unwrap(), 0);
}

#[test]
fn update_replaces_fields_but_keeps_id_and_created_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGrantRepository::new(&conn);

    let created = repo.create_grant(&full_draft()).unwrap();

    let mut changes = full_draft();
    changes.title = "Renamed".to_string();
    changes.status = GrantStatus::Funded;
    changes.funding_amount = dec!(99);
    changes.deadline = None;
    let updated = repo.update_grant(created.id, &changes).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.to_draft(), changes);
}

#[test]
fn update_and_delete_missing_grant_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGrantRepository::new(&conn);

    let err = repo.update_grant(42, &full_draft()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));

    let err = repo.delete_grant(42).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
}

#[test]
fn delete_then_get_yields_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGrantRepository::new(&conn);

    let created = repo.create_grant(&full_draft()).unwrap();
    repo.delete_grant(created.id).unwrap();

    assert!(repo.get_grant(created.id).unwrap().is_none());
    assert!(repo.list_grants().unwrap().is_empty());
}

#[test]
fn find_by_title_prefers_lowest_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGrantRepository::new(&conn);

    let first = repo.create_grant(&GrantDraft::new("Same", "A", dec!(1))).unwrap();
    repo.create_grant(&GrantDraft::new("Same", "B", dec!(2))).unwrap();

    let found = repo.find_grant_by_title("Same").unwrap().unwrap();
    assert_eq!(found.id, first.id);
    assert!(repo.find_grant_by_title("Other").unwrap().is_none());
}

#[test]
fn unparsable_stored_dates_read_back_as_missing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGrantRepository::new(&conn);

    let created = repo.create_grant(&full_draft()).unwrap();
    conn.execute(
        "UPDATE grants SET deadline = 'soon', submitted_date = '2026-02-05T00:00:00' WHERE id = ?1;",
        [created.id],
    )
    .unwrap();

    let loaded = repo.get_grant(created.id).unwrap().unwrap();
    assert_eq!(loaded.deadline, None);
    assert_eq!(loaded.submitted_date, NaiveDate::from_ymd_opt(2026, 2, 5));
}

#[test]
fn legacy_real_amounts_are_read_as_decimals() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO grants (title, funding_amount, created_at)
         VALUES ('Legacy', 150000.0, '2026-01-10T09:30:00');",
        [],
    )
    .unwrap();

    let repo = SqliteGrantRepository::new(&conn);
    let grants = repo.list_grants().unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].funding_amount, dec!(150000));
    assert_eq!(grants[0].currency, Currency::Usd);
    assert_eq!(grants[0].status, GrantStatus::Draft);
}

#[test]
fn unknown_status_text_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO grants (title, status, created_at)
         VALUES ('Odd', 'Rejected', '2026-01-10T09:30:00Z');",
        [],
    )
    .unwrap();

    let repo = SqliteGrantRepository::new(&conn);
    let err = repo.list_grants().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
