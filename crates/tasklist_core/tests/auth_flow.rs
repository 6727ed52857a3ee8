use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

use rusqlite::Connection;
use tasklist_core::db::{open_db, open_db_in_memory};
use tasklist_core::{
    AuthService, ErrorKind, PasswordHasher, ServiceError, SqliteTaskRepository,
    SqliteUserRepository, TaskService, TokenError, TokenSecret, TokenService, MIN_HASH_COST,
    TOKEN_TTL_SECS,
};

const SECRET: &str = "integration-secret";

fn tokens() -> TokenService {
    TokenService::new(&TokenSecret::new(SECRET).unwrap())
}

fn auth_service(conn: &Connection) -> AuthService<SqliteUserRepository<'_>> {
    AuthService::new(
        SqliteUserRepository::try_new(conn).unwrap(),
        PasswordHasher::with_cost(MIN_HASH_COST),
        tokens(),
    )
}

#[test]
fn sign_up_then_log_in_yields_verifiable_token() {
    let conn = open_db_in_memory().unwrap();
    let auth = auth_service(&conn);

    let user = auth.sign_up("a@x.com", "secret123").unwrap();
    assert_eq!(user.email, "a@x.com");

    let token = auth.log_in("a@x.com", "secret123").unwrap();
    assert_eq!(tokens().verify(&token).unwrap(), user.id);
}

#[test]
fn duplicate_sign_up_fails_with_duplicate_email() {
    let conn = open_db_in_memory().unwrap();
    let auth = auth_service(&conn);

    auth.sign_up("a@x.com", "secret123").unwrap();
    let err = auth.sign_up("a@x.com", "other").unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateEmail));
    assert_eq!(err.kind().status_code(), 409);
}

#[test]
fn wrong_password_fails_with_invalid_credentials() {
    let conn = open_db_in_memory().unwrap();
    let auth = auth_service(&conn);
    auth.sign_up("a@x.com", "secret123").unwrap();

    let err = auth.log_in("a@x.com", "wrong").unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCredentials));
    assert_eq!(err.kind(), ErrorKind::InvalidCredentials);

    let unknown = auth.log_in("nobody@x.com", "secret123").unwrap_err();
    assert!(matches!(unknown, ServiceError::InvalidCredentials));
}

#[test]
fn malformed_input_fails_validation_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let auth = auth_service(&conn);

    for (email, password) in [("", "secret123"), ("not-an-email", "secret123"), ("a@x.com", "")] {
        let err = auth.sign_up(email, password).unwrap_err();
        assert!(
            matches!(err, ServiceError::Validation(_)),
            "sign up with {email:?} should fail validation"
        );
        assert_eq!(err.kind().status_code(), 400);
    }

    let users: i64 = conn
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 0);
}

#[test]
fn stored_password_is_a_hash() {
    let conn = open_db_in_memory().unwrap();
    auth_service(&conn).sign_up("a@x.com", "secret123").unwrap();

    let stored: String = conn
        .query_row(
            "SELECT password_hash FROM users WHERE email = 'a@x.com';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_ne!(stored, "secret123");
    assert!(bcrypt::verify("secret123", &stored).unwrap());
}

#[test]
fn token_expires_twelve_hours_after_issue() {
    let tokens = tokens();
    let issued_at = 1_700_000_000;
    let token = tokens.issue_at(3, issued_at).unwrap();

    assert_eq!(tokens.verify_at(&token, issued_at).unwrap(), 3);
    assert!(matches!(
        tokens.verify_at(&token, issued_at + TOKEN_TTL_SECS),
        Err(TokenError::Expired)
    ));
}

#[test]
fn authenticated_caller_drives_task_flows() {
    let conn = open_db_in_memory().unwrap();
    let auth = auth_service(&conn);
    auth.sign_up("a@x.com", "secret123").unwrap();
    let token = auth.log_in("a@x.com", "secret123").unwrap();
    let caller = auth.authenticate(&token).unwrap();

    let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let created = tasks.create_task(&caller, "first").unwrap();
    assert_eq!(tasks.list_tasks(&caller).unwrap(), vec![created]);
}

#[test]
fn expired_or_foreign_tokens_do_not_authenticate() {
    let conn = open_db_in_memory().unwrap();
    let auth = auth_service(&conn);

    let stale = tokens().issue_at(1, 0).unwrap();
    assert!(matches!(
        auth.authenticate(&stale),
        Err(ServiceError::Token(TokenError::Expired))
    ));

    let foreign = TokenService::new(&TokenSecret::new("someone-else").unwrap())
        .issue(1)
        .unwrap();
    let err = auth.authenticate(&foreign).unwrap_err();
    assert!(matches!(err, ServiceError::Token(TokenError::InvalidSignature)));
    assert_eq!(err.kind().status_code(), 401);
}

#[test]
fn concurrent_duplicate_sign_ups_have_exactly_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");
    drop(open_db(&path).unwrap());

    const CONTENDERS: usize = 4;
    let barrier = Arc::new(Barrier::new(CONTENDERS));
    let handles: Vec<_> = (0..CONTENDERS)
        .map(|_| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || sign_up_on(&path, &barrier))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|kind| *kind == ErrorKind::DuplicateEmail));
}

fn sign_up_on(path: &Path, barrier: &Barrier) -> Result<u64, ErrorKind> {
    let conn = open_db(path).unwrap();
    let auth = auth_service(&conn);
    barrier.wait();
    auth.sign_up("race@x.com", "secret123")
        .map(|user| user.id)
        .map_err(|err| err.kind())
}
