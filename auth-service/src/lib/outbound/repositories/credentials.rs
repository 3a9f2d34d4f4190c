use async_trait::async_trait;
use auth::OtpCode;
use auth::PasswordHasher;
use auth::PrincipalKind;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::principal::errors::AuthError;
use crate::domain::principal::models::Account;
use crate::domain::principal::models::AccountId;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::NewAccount;
use crate::domain::principal::models::OtpPurpose;
use crate::domain::principal::models::Password;
use crate::domain::principal::models::ProfileChanges;
use crate::domain::principal::models::Role;
use crate::domain::principal::ports::CredentialStore;

const ACCOUNT_COLUMNS: &str = "id, email, first_name, last_name, role, is_active, is_verified, \
     last_login, password_changed_at, created_at, updated_at";

/// Credential store backed by the `users` and `admins` tables.
pub struct PostgresCredentialStore {
    pool: PgPool,
    hasher: PasswordHasher,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            hasher: PasswordHasher::new(),
        }
    }
}

fn table(kind: PrincipalKind) -> &'static str {
    match kind {
        PrincipalKind::User => "users",
        PrincipalKind::Admin => "admins",
    }
}

fn database_error(e: sqlx::Error) -> AuthError {
    AuthError::DatabaseError(e.to_string())
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    is_active: bool,
    is_verified: bool,
    last_login: Option<DateTime<Utc>>,
    password_changed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PendingOtpRow {
    otp_code: Option<String>,
    otp_purpose: Option<String>,
    otp_expires_at: Option<DateTime<Utc>>,
}

impl PendingOtpRow {
    fn accepts(&self, code: &OtpCode, purpose: OtpPurpose, now: DateTime<Utc>) -> bool {
        match (&self.otp_code, &self.otp_purpose, self.otp_expires_at) {
            (Some(pending), Some(issued_for), Some(expires_at)) => {
                issued_for == purpose.as_str() && expires_at > now && code.matches(pending)
            }
            _ => false,
        }
    }
}

impl AccountRow {
    fn into_account(self, kind: PrincipalKind) -> Result<Account, AuthError> {
        Ok(Account {
            id: AccountId(self.id),
            email: EmailAddress::new(self.email)?,
            first_name: self.first_name,
            last_name: self.last_name,
            role: Role::from_name(kind, &self.role),
            is_active: self.is_active,
            is_verified: self.is_verified,
            last_login: self.last_login,
            password_changed_at: self.password_changed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn create(&self, account: NewAccount) -> Result<Account, AuthError> {
        let kind = account.role.kind();
        let password_hash = self.hasher.hash(account.password.as_str())?;
        let now = Utc::now();

        let sql = format!(
            "INSERT INTO {table} \
                (id, email, password_hash, first_name, last_name, role, is_active, is_verified, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8, $8) \
             RETURNING {ACCOUNT_COLUMNS}",
            table = table(kind),
        );

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(account.email.as_str())
            .bind(password_hash)
            .bind(account.first_name.as_str())
            .bind(account.last_name.as_str())
            .bind(account.role.as_str())
            .bind(account.is_verified)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return AuthError::EmailAlreadyExists(account.email.to_string());
                    }
                }
                database_error(e)
            })?;

        row.into_account(kind)
    }

    async fn find_by_id(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
    ) -> Result<Option<Account>, AuthError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM {table} WHERE id = $1",
            table = table(kind),
        );

        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(|row| row.into_account(kind))
            .transpose()
    }

    async fn find_by_email(
        &self,
        kind: PrincipalKind,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AuthError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM {table} WHERE email = $1",
            table = table(kind),
        );

        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(|row| row.into_account(kind))
            .transpose()
    }

    async fn verify_password(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        password: &str,
    ) -> Result<bool, AuthError> {
        let sql = format!("SELECT password_hash FROM {} WHERE id = $1", table(kind));

        let hash: Option<String> = sqlx::query_scalar(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        match hash {
            Some(hash) => Ok(self.hasher.verify(password, &hash)?),
            None => Ok(false),
        }
    }

    async fn set_password(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        password: &Password,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let password_hash = self.hasher.hash(password.as_str())?;
        let sql = format!(
            "UPDATE {} SET password_hash = $2, password_changed_at = $3, updated_at = $3 WHERE id = $1",
            table(kind)
        );

        let result = sqlx::query(&sql)
            .bind(id.0)
            .bind(password_hash)
            .bind(changed_at)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn set_otp(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        code: &OtpCode,
        purpose: OtpPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let sql = format!(
            "UPDATE {} \
             SET otp_code = $2, otp_purpose = $3, otp_expires_at = $4, updated_at = NOW() \
             WHERE id = $1",
            table(kind)
        );

        let result = sqlx::query(&sql)
            .bind(id.0)
            .bind(code.as_str())
            .bind(purpose.as_str())
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn consume_otp(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        code: &OtpCode,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        // The row stays locked from read to clear, so concurrent submissions
        // of the same code consume it at most once.
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let select = format!(
            "SELECT otp_code, otp_purpose, otp_expires_at FROM {} WHERE id = $1 FOR UPDATE",
            table(kind)
        );
        let pending = sqlx::query_as::<_, PendingOtpRow>(&select)
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await
            .map_err(database_error)?;

        let valid = pending.is_some_and(|row| row.accepts(code, purpose, now));
        if !valid {
            tx.rollback().await.map_err(database_error)?;
            return Ok(false);
        }

        let clear = format!(
            "UPDATE {} \
             SET otp_code = NULL, otp_purpose = NULL, otp_expires_at = NULL, \
                 is_verified = TRUE, updated_at = $2 \
             WHERE id = $1",
            table(kind)
        );
        sqlx::query(&clear)
            .bind(id.0)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;
        Ok(true)
    }

    async fn update_last_login(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let sql = format!(
            "UPDATE {} SET last_login = $2, updated_at = $2 WHERE id = $1",
            table(kind)
        );

        sqlx::query(&sql)
            .bind(id.0)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }

    async fn update_profile(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        changes: &ProfileChanges,
    ) -> Result<Account, AuthError> {
        let sql = format!(
            "UPDATE {table} \
             SET first_name = COALESCE($2, first_name), \
                 last_name = COALESCE($3, last_name), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ACCOUNT_COLUMNS}",
            table = table(kind),
        );

        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .bind(changes.first_name.as_ref().map(|name| name.as_str()))
            .bind(changes.last_name.as_ref().map(|name| name.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or_else(|| AuthError::NotFound(id.to_string()))?
            .into_account(kind)
    }
}
