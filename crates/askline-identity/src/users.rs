//! Account storage and password checks.

use askline_types::{validate_content, User};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use crate::IdentityError;

/// Registers an account and returns it.
///
/// # Errors
///
/// Returns [`IdentityError::Validation`] if any field is blank, and
/// [`IdentityError::Conflict`] if the email or username is taken.
pub fn create_user(
    conn: &Connection,
    username: &str,
    email: &str,
    password: &str,
    is_admin: bool,
) -> Result<User, IdentityError> {
    validate_content("Username", username)?;
    validate_content("Email", email)?;
    validate_content("Password", password)?;

    let password_hash = hash_password(password)?;
    let res = conn.execute(
        "INSERT INTO users (username, email, password_hash, is_admin) VALUES (?1, ?2, ?3, ?4)",
        params![username, email, password_hash, is_admin],
    );

    match res {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(err, msg))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            let field = match msg.as_deref() {
                Some(m) if m.contains("users.username") => "username",
                _ => "email",
            };
            return Err(IdentityError::Conflict(field));
        }
        Err(e) => return Err(IdentityError::Database(e)),
    }

    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, is_admin, "user registered");
    get_user(conn, id)
}

/// Checks an email/password pair.
///
/// An unknown email and a wrong password both yield
/// [`IdentityError::InvalidCredentials`].
pub fn authenticate(conn: &Connection, email: &str, password: &str) -> Result<User, IdentityError> {
    let found = conn
        .query_row(
            "SELECT id, username, email, is_admin, password_hash FROM users WHERE email = ?1",
            [email],
            |row| Ok((map_row_to_user(row)?, row.get::<_, String>(4)?)),
        )
        .optional()?;

    match found {
        Some((user, stored)) if verify_password(password, &stored) => Ok(user),
        _ => Err(IdentityError::InvalidCredentials),
    }
}

pub fn get_user(conn: &Connection, id: i64) -> Result<User, IdentityError> {
    conn.query_row(
        "SELECT id, username, email, is_admin FROM users WHERE id = ?1",
        [id],
        map_row_to_user,
    )
    .optional()?
    .ok_or(IdentityError::NotFound(id))
}

fn map_row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        is_admin: row.get(3)?,
    })
}

/// Argon2id with default parameters; the PHC string carries salt and params.
fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| IdentityError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use askline_types::ValidationError;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        askline_db::run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn password_hash_round_trip() {
        let stored = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("correct horse ", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn stored_hash_is_argon2id_phc() {
        let stored = hash_password("pw").unwrap();
        assert!(stored.starts_with("$argon2id$"), "unexpected format: {stored}");
        assert_ne!(stored, hash_password("pw").unwrap(), "salt must differ per hash");
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("pw", "no-separator"));
        assert!(!verify_password("pw", "zz$zz"));
        assert!(!verify_password("pw", ""));
    }

    #[test]
    fn users_table_holds_phc_string() {
        let conn = test_db();
        let user = create_user(&conn, "ada", "ada@example.com", "s3cret", false).unwrap();
        let stored: String = conn
            .query_row(
                "SELECT password_hash FROM users WHERE id = ?1",
                [user.id],
                |row| row.get(0),
            )
            .unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("s3cret", &stored));
    }

    #[test]
    fn create_then_authenticate() {
        let conn = test_db();
        let user = create_user(&conn, "ada", "ada@example.com", "s3cret", true).unwrap();
        assert_eq!(user.username, "ada");
        assert!(user.is_admin);

        let authed = authenticate(&conn, "ada@example.com", "s3cret").unwrap();
        assert_eq!(authed, user);
        assert_eq!(get_user(&conn, user.id).unwrap(), user);
    }

    #[test]
    fn wrong_password_and_unknown_email_look_the_same() {
        let conn = test_db();
        create_user(&conn, "ada", "ada@example.com", "s3cret", false).unwrap();

        assert!(matches!(
            authenticate(&conn, "ada@example.com", "wrong"),
            Err(IdentityError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&conn, "nobody@example.com", "s3cret"),
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[test]
    fn duplicate_email_and_username_conflict() {
        let conn = test_db();
        create_user(&conn, "ada", "ada@example.com", "pw", false).unwrap();

        assert!(matches!(
            create_user(&conn, "other", "ada@example.com", "pw", false),
            Err(IdentityError::Conflict("email"))
        ));
        assert!(matches!(
            create_user(&conn, "ada", "other@example.com", "pw", false),
            Err(IdentityError::Conflict("username"))
        ));
    }

    #[test]
    fn blank_fields_are_rejected() {
        let conn = test_db();
        assert!(matches!(
            create_user(&conn, " ", "a@example.com", "pw", false),
            Err(IdentityError::Validation(ValidationError::EmptyContent("Username")))
        ));
        assert!(matches!(
            create_user(&conn, "ada", "a@example.com", "", false),
            Err(IdentityError::Validation(ValidationError::EmptyContent("Password")))
        ));
    }

    #[test]
    fn unknown_user_is_not_found() {
        let conn = test_db();
        assert!(matches!(get_user(&conn, 3), Err(IdentityError::NotFound(3))));
    }
}
