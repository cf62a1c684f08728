//! # User Repository
//!
//! User accounts and the employee records behind them.
//!
//! ## User + Employee Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │         create_with_employee(): two rows, one transaction              │
//! │                                                                         │
//! │  validate → hash password (argon2, BEFORE any SQL)                     │
//! │  BEGIN                                                                  │
//! │    INSERT employees                                                     │
//! │    INSERT users (password_hash, employee_id)                           │
//! │         └─ duplicate username ──► UniqueViolation, ROLLBACK            │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A failed username never leaves an orphan employee row behind.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The plaintext password is hashed before it touches the database and
//! never appears in logs or error text; the hash itself stays out of
//! serialized payloads (`UserAccount` skips it).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use almoxa_core::validation::validate_new_user_account;
use almoxa_core::{generate_id, Employee, NewUserAccount, UserAccount};

const USER_COLUMNS: &str = "id, username, password_hash, employee_id, is_admin, \
     created_at, created_by, updated_at, updated_by, deleted_at, deleted_by, is_deleted";

const EMPLOYEE_COLUMNS: &str = "id, full_name, role, registration, \
     created_at, created_by, updated_at, updated_by, deleted_at, deleted_by, is_deleted";

/// Repository for user and employee database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates an employee record and its login account atomically.
    ///
    /// ## Errors
    /// - `Validation` - bad username, short password, blank name
    /// - `UniqueViolation` - username or badge registration taken; the
    ///   transaction rolls back so no orphan employee survives
    pub async fn create_with_employee(&self, input: NewUserAccount) -> DbResult<UserAccount> {
        let input = validate_new_user_account(&input)?;

        debug!(username = %input.username, "Creating user with employee record");

        // Hash outside the transaction span; argon2 is deliberately slow
        // and must not hold a connection while it runs.
        let password_hash = hash_password(&input.password)?;

        let employee_id = generate_id();
        let user_id = generate_id();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let inserts = async {
            sqlx::query(
                r#"
                INSERT INTO employees (
                    id, full_name, role, registration,
                    created_at, created_by, updated_at, is_deleted
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?5, 0)
                "#,
            )
            .bind(&employee_id)
            .bind(&input.full_name)
            .bind(&input.role)
            .bind(&input.registration)
            .bind(now)
            .bind(&input.created_by)
            .execute(&mut *tx)
            .await
            .map_err(|e| refine_unique(e, "registration", &input.registration))?;

            sqlx::query(
                r#"
                INSERT INTO users (
                    id, username, password_hash, employee_id, is_admin,
                    created_at, created_by, updated_at, is_deleted
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?6, 0)
                "#,
            )
            .bind(&user_id)
            .bind(&input.username)
            .bind(&password_hash)
            .bind(&employee_id)
            .bind(input.is_admin)
            .bind(now)
            .bind(&input.created_by)
            .execute(&mut *tx)
            .await
            .map_err(|e| refine_unique(e, "username", &Some(input.username.clone())))?;

            Ok::<(), DbError>(())
        }
        .await;

        if let Err(e) = inserts {
            let _ = tx.rollback().await;
            return Err(e);
        }

        tx.commit().await?;

        let user = self.get_by_id(&user_id).await?;
        user.ok_or_else(|| DbError::Internal(format!("user {} vanished after commit", user_id)))
    }

    /// Gets a user by id (soft-deleted included; callers inspect).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<UserAccount>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);

        let user = sqlx::query_as::<_, UserAccount>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets a non-deleted user by username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<UserAccount>> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = ?1 AND is_deleted = 0",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, UserAccount>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Lists non-deleted employees by name.
    pub async fn list_employees(&self, limit: u32) -> DbResult<Vec<Employee>> {
        let sql = format!(
            "SELECT {} FROM employees WHERE is_deleted = 0 ORDER BY full_name LIMIT ?1",
            EMPLOYEE_COLUMNS
        );

        let employees = sqlx::query_as::<_, Employee>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(employees)
    }

    /// Gets an employee by id.
    pub async fn get_employee(&self, id: &str) -> DbResult<Option<Employee>> {
        let sql = format!("SELECT {} FROM employees WHERE id = ?1", EMPLOYEE_COLUMNS);

        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(employee)
    }

    /// Soft-deletes a user account. Same zero-rows disambiguation as the
    /// stock repository: NotFound for an unknown id, AlreadyDeleted for a
    /// repeat.
    pub async fn soft_delete_user(&self, id: &str, deleted_by: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting user");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE users SET
                is_deleted = 1,
                deleted_at = ?2,
                deleted_by = ?3
            WHERE id = ?1 AND is_deleted = 0
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(deleted_by)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let flagged: Option<i64> =
                sqlx::query_scalar("SELECT is_deleted FROM users WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;

            return match flagged {
                None => Err(DbError::not_found("user", id)),
                Some(_) => Err(DbError::already_deleted("user", id)),
            };
        }

        Ok(())
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Provided for the (out-of-scope) session layer; constant-time via
    /// argon2's own verifier.
    pub fn verify_password(password: &str, password_hash: &str) -> bool {
        use argon2::{Argon2, PasswordHash, PasswordVerifier};

        let parsed = match PasswordHash::new(password_hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Hashes a password with argon2id and a fresh salt.
///
/// The error path never includes the password.
fn hash_password(password: &str) -> DbResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Refines a generic unique violation with the value we know was bound,
/// instead of the driver's "unknown".
fn refine_unique(err: sqlx::Error, field: &str, value: &Option<String>) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field: raw, .. } if raw.contains(field) => {
            DbError::UniqueViolation {
                field: field.to_string(),
                value: value.clone().unwrap_or_default(),
            }
        }
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn almir() -> NewUserAccount {
        NewUserAccount {
            username: "almir.santos".to_string(),
            password: "correto-cavalo-bateria".to_string(),
            is_admin: false,
            full_name: "Almir Santos".to_string(),
            role: Some("almoxarife".to_string()),
            registration: Some("M-0042".to_string()),
            created_by: "system".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_links_user_to_employee() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = db.users().create_with_employee(almir()).await.unwrap();

        assert_eq!(user.username, "almir.santos");
        assert!(!user.is_admin);

        let employee_id = user.employee_id.expect("user must be linked");
        let employee = db.users().get_employee(&employee_id).await.unwrap().unwrap();
        assert_eq!(employee.full_name, "Almir Santos");
        assert_eq!(employee.registration.as_deref(), Some("M-0042"));
    }

    #[tokio::test]
    async fn test_password_is_hashed_and_verifiable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = db.users().create_with_employee(almir()).await.unwrap();

        assert!(user.password_hash.starts_with("$argon2"));
        assert!(!user.password_hash.contains("correto-cavalo-bateria"));

        assert!(UserRepository::verify_password(
            "correto-cavalo-bateria",
            &user.password_hash
        ));
        assert!(!UserRepository::verify_password("wrong", &user.password_hash));
    }

    #[tokio::test]
    async fn test_duplicate_username_leaves_no_orphan_employee() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.users().create_with_employee(almir()).await.unwrap();

        let mut second = almir();
        second.full_name = "Outro Almir".to_string();
        second.registration = Some("M-0043".to_string());

        let err = db.users().create_with_employee(second).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "username"));

        // The error message carries the username but never the password.
        let msg = err.to_string();
        assert!(msg.contains("almir.santos"));
        assert!(!msg.contains("correto-cavalo-bateria"));

        // Rollback: exactly one employee row exists.
        let employees = db.users().list_employees(10).await.unwrap();
        assert_eq!(employees.len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_username_skips_deleted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = db.users().create_with_employee(almir()).await.unwrap();

        assert!(db
            .users()
            .get_by_username("almir.santos")
            .await
            .unwrap()
            .is_some());

        db.users().soft_delete_user(&user.id, "admin").await.unwrap();

        assert!(db
            .users()
            .get_by_username("almir.santos")
            .await
            .unwrap()
            .is_none());

        let err = db
            .users()
            .soft_delete_user(&user.id, "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::AlreadyDeleted { .. }));
    }

    #[tokio::test]
    async fn test_weak_input_rejected_before_storage() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut bad = almir();
        bad.password = "abc".to_string();
        assert!(matches!(
            db.users().create_with_employee(bad).await.unwrap_err(),
            DbError::Validation(_)
        ));

        let mut bad = almir();
        bad.username = "has space".to_string();
        assert!(matches!(
            db.users().create_with_employee(bad).await.unwrap_err(),
            DbError::Validation(_)
        ));

        assert!(db.users().list_employees(10).await.unwrap().is_empty());
    }
}
