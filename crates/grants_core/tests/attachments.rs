use grants_core::db::open_db_in_memory;
use grants_core::{
    AttachmentError, AttachmentService, ErrorKind, GrantDraft, GrantRepository,
    SqliteAttachmentRepository, SqliteGrantRepository,
};
use rust_decimal_macros::dec;

fn allow_list() -> Vec<String> {
    vec!["pdf".to_string(), ".DOCX".to_string()]
}

#[test]
fn attach_writes_bytes_and_records_metadata() {
    let conn = open_db_in_memory().unwrap();
    let grant = SqliteGrantRepository::new(&conn)
        .create_grant(&GrantDraft::new("X", "F", dec!(1)))
        .unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let store = AttachmentService::new(
        SqliteAttachmentRepository::new(&conn),
        SqliteGrantRepository::new(&conn),
        uploads.path().join("files"),
        &allow_list(),
    );

    let attachment = store.attach(grant.id, "proposal.pdf", b"%PDF-1.7").unwrap();

    assert_eq!(attachment.grant_id, grant.id);
    assert_eq!(attachment.file_name, "proposal.pdf");
    assert_eq!(attachment.file_path, uploads.path().join("files").join("proposal.pdf"));
    assert_eq!(std::fs::read(&attachment.file_path).unwrap(), b"%PDF-1.7");

    let listed = store.list_for_grant(grant.id).unwrap();
    assert_eq!(listed, vec![attachment]);
}

#[test]
fn same_file_name_overwrites_bytes_but_keeps_both_records() {
    let conn = open_db_in_memory().unwrap();
    let grant = SqliteGrantRepository::new(&conn)
        .create_grant(&GrantDraft::new("X", "F", dec!(1)))
        .unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let store = AttachmentService::new(
        SqliteAttachmentRepository::new(&conn),
        SqliteGrantRepository::new(&conn),
        uploads.path(),
        &allow_list(),
    );

    let first = store.attach(grant.id, "budget.docx", b"v1").unwrap();
    let second = store.attach(grant.id, "budget.docx", b"v2").unwrap();

    assert_eq!(first.file_path, second.file_path);
    assert_eq!(std::fs::read(&second.file_path).unwrap(), b"v2");
    assert_eq!(store.list_for_grant(grant.id).unwrap().len(), 2);
}

#[test]
fn attach_to_missing_grant_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let store = AttachmentService::new(
        SqliteAttachmentRepository::new(&conn),
        SqliteGrantRepository::new(&conn),
        uploads.path(),
        &allow_list(),
    );

    let err = store.attach(5, "proposal.pdf", b"x").unwrap_err();
    assert!(matches!(err, AttachmentError::GrantNotFound(5)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(std::fs::read_dir(uploads.path()).unwrap().count(), 0);
}

#[test]
fn traversal_names_stay_inside_upload_dir() {
    let conn = open_db_in_memory().unwrap();
    let grant = SqliteGrantRepository::new(&conn)
        .create_grant(&GrantDraft::new("X", "F", dec!(1)))
        .unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let store = AttachmentService::new(
        SqliteAttachmentRepository::new(&conn),
        SqliteGrantRepository::new(&conn),
        uploads.path(),
        &allow_list(),
    );

    let attachment = store.attach(grant.id, "../../escape.pdf", b"x").unwrap();
    assert_eq!(attachment.file_path, uploads.path().join("escape.pdf"));

    let err = store.attach(grant.id, "..", b"x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn allow_list_matches_extension_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let store = AttachmentService::new(
        SqliteAttachmentRepository::new(&conn),
        SqliteGrantRepository::new(&conn),
        "uploads",
        &allow_list(),
    );

    assert!(store.is_allowed("Proposal.PDF"));
    assert!(store.is_allowed("notes.docx"));
    assert!(!store.is_allowed("script.exe"));
    assert!(!store.is_allowed("pdf"));
}
