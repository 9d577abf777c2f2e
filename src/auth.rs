//! Account registration and login.
//!
//! Passwords are stored as a single encoded text column:
//! `pbkdf2-sha256$<iterations>$<salt>$<hash>` (base64url, no padding).
//! Verification re-derives with the iteration count stored in the string,
//! so old rows keep verifying after the default is raised.

use base64::Engine;
use chrono::NaiveDateTime;
use pbkdf2::pbkdf2_hmac;
use rusqlite::Connection;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::enums::Role;
use crate::models::User;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 16;

const SCHEME: &str = "pbkdf2-sha256";

/// Username seeded into an empty database so the first operator can log in.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "change-me";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("All fields are required")]
    EmptyField,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("No account with username {0}")]
    UnknownUser(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

// ─── Password hashing ─────────────────────────────────────────────────────────

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    hash_password_with_iterations(password, PBKDF2_ITERATIONS)
}

fn hash_password_with_iterations(password: &str, iterations: u32) -> String {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut hash);

    let b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{SCHEME}${iterations}${}${}",
        b64.encode(salt),
        b64.encode(hash)
    )
}

/// Verify a password against an encoded hash. Comparison of the derived
/// hash is constant-time; a malformed stored value verifies as false
/// rather than erroring (matches the legacy tool, which treated any
/// mismatch as "incorrect credentials").
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let Some((iterations, salt, expected)) = decode_hash(encoded) else {
        return false;
    };

    let mut derived = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut derived);

    derived.ct_eq(&expected).into()
}

fn decode_hash(encoded: &str) -> Option<(u32, Vec<u8>, [u8; HASH_LENGTH])> {
    let mut parts = encoded.split('$');
    if parts.next()? != SCHEME {
        return None;
    }
    let iterations: u32 = parts.next()?.parse().ok()?;
    let b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let salt = b64.decode(parts.next()?).ok()?;
    let hash: [u8; HASH_LENGTH] = b64.decode(parts.next()?).ok()?.try_into().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((iterations, salt, hash))
}

// ─── Account operations ───────────────────────────────────────────────────────

/// Register a new account. The UNIQUE constraint on `username` is the
/// arbiter of "taken" — no separate existence check, so two concurrent
/// registrations cannot both win.
pub fn register(
    conn: &Connection,
    username: &str,
    password: &str,
    password_confirm: &str,
    role: Role,
    email: Option<&str>,
    now: NaiveDateTime,
) -> Result<User, AuthError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AuthError::EmptyField);
    }
    if password != password_confirm {
        return Err(AuthError::PasswordMismatch);
    }

    let user = User {
        id: Uuid::new_v4(),
        username: username.trim().to_string(),
        password_hash: hash_password(password),
        role,
        email: email.map(|e| e.to_string()),
        created_at: now,
    };

    match db::insert_user(conn, &user) {
        Ok(()) => {
            tracing::info!(username = %user.username, role = user.role.as_str(), "account registered");
            Ok(user)
        }
        Err(e) if e.is_unique_violation() => Err(AuthError::UsernameTaken),
        Err(e) => Err(e.into()),
    }
}

/// Check credentials and return the account on success.
pub fn authenticate(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    let user = db::get_user_by_username(conn, username)?
        .ok_or(AuthError::InvalidCredentials)?;

    if verify_password(password, &user.password_hash) {
        Ok(user)
    } else {
        tracing::warn!(username, "failed login attempt");
        Err(AuthError::InvalidCredentials)
    }
}

/// Set a new password for an existing account (the "forgot password"
/// page). The legacy tool required no proof of identity here and neither
/// do we; the clinic runs this on a closed workstation.
pub fn reset_password(
    conn: &Connection,
    username: &str,
    new_password: &str,
    new_password_confirm: &str,
) -> Result<(), AuthError> {
    if new_password.is_empty() {
        return Err(AuthError::EmptyField);
    }
    if new_password != new_password_confirm {
        return Err(AuthError::PasswordMismatch);
    }
    if db::get_user_by_username(conn, username)?.is_none() {
        return Err(AuthError::UnknownUser(username.to_string()));
    }

    db::update_user_password(conn, username, &hash_password(new_password))?;
    tracing::info!(username, "password reset");
    Ok(())
}

/// Seed a default admin account when the users table is empty, so a
/// fresh install has something to log in with.
pub fn ensure_default_admin(conn: &Connection, now: NaiveDateTime) -> Result<(), AuthError> {
    if db::count_users(conn)? > 0 {
        return Ok(());
    }

    register(
        conn,
        DEFAULT_ADMIN_USERNAME,
        DEFAULT_ADMIN_PASSWORD,
        DEFAULT_ADMIN_PASSWORD,
        Role::Admin,
        None,
        now,
    )?;
    tracing::warn!(
        "seeded default admin account '{DEFAULT_ADMIN_USERNAME}' — change its password before first use"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-03-01 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn hash_then_verify_succeeds() {
        let encoded = hash_password_with_iterations("correct horse", 1_000);
        assert!(verify_password("correct horse", &encoded));
        assert!(!verify_password("wrong horse", &encoded));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password_with_iterations("same password", 1_000);
        let b = hash_password_with_iterations("same password", 1_000);
        assert_ne!(a, b);
    }

    #[test]
    fn verify_respects_stored_iteration_count() {
        // A legacy row hashed with fewer rounds still verifies
        let encoded = hash_password_with_iterations("pw", 1_000);
        assert!(encoded.starts_with("pbkdf2-sha256$1000$"));
        assert!(verify_password("pw", &encoded));
    }

    #[test]
    fn malformed_hash_verifies_false() {
        assert!(!verify_password("pw", "not-a-hash"));
        assert!(!verify_password("pw", "pbkdf2-sha256$abc$xx$yy"));
        assert!(!verify_password("pw", ""));
    }

    #[test]
    fn default_iterations_take_meaningful_time() {
        let start = std::time::Instant::now();
        let _ = hash_password("test_password");
        let elapsed = start.elapsed();
        assert!(
            elapsed.as_millis() > 100,
            "PBKDF2 too fast: {}ms — brute force protection insufficient",
            elapsed.as_millis()
        );
    }

    #[test]
    fn register_then_login() {
        let conn = open_memory_database().unwrap();
        let user = register(
            &conn,
            "klessard",
            "s3cret-pw",
            "s3cret-pw",
            Role::Midwife,
            Some("k@clinic.example"),
            now(),
        )
        .unwrap();
        assert_eq!(user.role, Role::Midwife);

        let logged_in = authenticate(&conn, "klessard", "s3cret-pw").unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[test]
    fn wrong_password_rejected() {
        let conn = open_memory_database().unwrap();
        register(&conn, "klessard", "s3cret-pw", "s3cret-pw", Role::Midwife, None, now()).unwrap();

        let err = authenticate(&conn, "klessard", "guess").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn unknown_user_rejected_with_same_error() {
        let conn = open_memory_database().unwrap();
        let err = authenticate(&conn, "nobody", "pw").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn second_registration_of_username_fails() {
        let conn = open_memory_database().unwrap();
        register(&conn, "klessard", "pw-one", "pw-one", Role::Midwife, None, now()).unwrap();

        let err =
            register(&conn, "klessard", "pw-two", "pw-two", Role::Nurse, None, now()).unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[test]
    fn mismatched_confirmation_rejected_before_insert() {
        let conn = open_memory_database().unwrap();
        let err =
            register(&conn, "klessard", "pw-one", "pw-two", Role::Midwife, None, now()).unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));
        assert_eq!(db::count_users(&conn).unwrap(), 0);
    }

    #[test]
    fn empty_fields_rejected() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            register(&conn, "  ", "pw", "pw", Role::Midwife, None, now()),
            Err(AuthError::EmptyField)
        ));
        assert!(matches!(
            register(&conn, "klessard", "", "", Role::Midwife, None, now()),
            Err(AuthError::EmptyField)
        ));
    }

    #[test]
    fn reset_password_changes_credentials() {
        let conn = open_memory_database().unwrap();
        register(&conn, "klessard", "old-pw", "old-pw", Role::Midwife, None, now()).unwrap();

        reset_password(&conn, "klessard", "new-pw", "new-pw").unwrap();

        assert!(authenticate(&conn, "klessard", "old-pw").is_err());
        assert!(authenticate(&conn, "klessard", "new-pw").is_ok());
    }

    #[test]
    fn reset_password_unknown_user_fails() {
        let conn = open_memory_database().unwrap();
        let err = reset_password(&conn, "nobody", "pw", "pw").unwrap_err();
        assert!(matches!(err, AuthError::UnknownUser(_)));
    }

    #[test]
    fn default_admin_seeded_only_once() {
        let conn = open_memory_database().unwrap();
        ensure_default_admin(&conn, now()).unwrap();
        assert_eq!(db::count_users(&conn).unwrap(), 1);

        // Second call is a no-op; so is a call after other accounts exist
        ensure_default_admin(&conn, now()).unwrap();
        assert_eq!(db::count_users(&conn).unwrap(), 1);

        let admin = authenticate(&conn, DEFAULT_ADMIN_USERNAME, "change-me").unwrap();
        assert_eq!(admin.role, Role::Admin);
    }
}
