#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::KindSecrets;
use auth::OtpCode;
use auth::PasswordHasher;
use auth::PrincipalKind;
use auth::TokenLifetimes;
use auth::TokenService;
use auth_service::domain::principal::errors::AuthError;
use auth_service::domain::principal::errors::EmailDeliveryError;
use auth_service::domain::principal::models::Account;
use auth_service::domain::principal::models::AccountId;
use auth_service::domain::principal::models::AdminRole;
use auth_service::domain::principal::models::EmailAddress;
use auth_service::domain::principal::models::NewAccount;
use auth_service::domain::principal::models::OtpPurpose;
use auth_service::domain::principal::models::Password;
use auth_service::domain::principal::models::PersonName;
use auth_service::domain::principal::models::ProfileChanges;
use auth_service::domain::principal::models::Role;
use auth_service::domain::principal::ports::CredentialStore;
use auth_service::domain::principal::ports::EmailSender;
use auth_service::domain::principal::service::AuthService;
use auth_service::inbound::http::cookies::CookieSettings;
use auth_service::inbound::http::router::create_router;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde_json::json;
use serde_json::Value;

pub const PASSWORD: &str = "Passw0rd!";

/// Test application that spawns a real server over in-memory adapters
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub store: Arc<InMemoryCredentialStore>,
    pub mailer: Arc<RecordingEmailSender>,
    pub tokens: Arc<TokenService>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let lifetimes = TokenLifetimes::default();
        let tokens = Arc::new(TokenService::new(
            KindSecrets {
                access: b"test-user-access-secret-at-least-32-bytes",
                refresh: b"test-user-refresh-secret-at-least-32-bytes",
            },
            KindSecrets {
                access: b"test-admin-access-secret-at-least-32-bytes",
                refresh: b"test-admin-refresh-secret-at-least-32-bytes",
            },
            lifetimes,
        ));

        let store = Arc::new(InMemoryCredentialStore::default());
        let mailer = Arc::new(RecordingEmailSender::default());
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&store),
            Arc::clone(&mailer),
            Arc::clone(&tokens),
            Duration::minutes(10),
        ));

        let router = create_router(
            auth_service,
            Arc::clone(&tokens),
            CookieSettings::new(false, &lifetimes),
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            store,
            mailer,
            tokens,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PUT request with Bearer token
    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register a user and return the code that was mailed for it
    pub async fn register(&self, email: &str) -> String {
        let response = self
            .post("/api/auth/register")
            .json(&json!({
                "email": email,
                "password": PASSWORD,
                "first_name": "Ada",
                "last_name": "Lovelace"
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        self.mailer.last_otp(email).expect("No OTP was sent")
    }

    /// Register and verify a user, returning the response body
    pub async fn register_verified_user(&self, email: &str) -> Value {
        let otp = self.register(email).await;

        self.post("/api/auth/verify-registration")
            .json(&json!({ "email": email, "otp": otp }))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse response")
    }

    /// Register and verify a user, returning its access token
    pub async fn user_token(&self, email: &str) -> String {
        let body = self.register_verified_user(email).await;
        body["data"]["tokens"]["accessToken"]
            .as_str()
            .expect("No access token")
            .to_string()
    }

    /// Insert a verified admin straight into the store
    pub async fn seed_admin(&self, email: &str, role: AdminRole) -> Account {
        self.store
            .create(NewAccount {
                email: EmailAddress::new(email.to_string()).unwrap(),
                password: Password::new(PASSWORD.to_string()).unwrap(),
                first_name: PersonName::new("Grace".to_string()).unwrap(),
                last_name: PersonName::new("Hopper".to_string()).unwrap(),
                role: Role::Admin(role),
                is_verified: true,
            })
            .await
            .expect("Failed to seed admin")
    }

    /// Run the two-step admin login and return the access token
    pub async fn admin_token(&self, email: &str, role: AdminRole) -> String {
        self.seed_admin(email, role).await;

        let response = self
            .post("/api/admin/auth/login")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let otp = self.mailer.last_otp(email).expect("No OTP was sent");
        let body: Value = self
            .post("/api/admin/auth/verify-login")
            .json(&json!({ "email": email, "otp": otp }))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse response");

        body["data"]["tokens"]["accessToken"]
            .as_str()
            .expect("No access token")
            .to_string()
    }
}

/// Every `Set-Cookie` header on a response
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

struct StoredAccount {
    account: Account,
    password_hash: String,
    otp: Option<(String, OtpPurpose, DateTime<Utc>)>,
}

/// Credential store that keeps records in a map
#[derive(Default)]
pub struct InMemoryCredentialStore {
    accounts: Mutex<HashMap<(PrincipalKind, AccountId), StoredAccount>>,
    hasher: PasswordHasher,
}

impl InMemoryCredentialStore {
    pub fn account_id(&self, kind: PrincipalKind, email: &str) -> Option<AccountId> {
        self.accounts
            .lock()
            .unwrap()
            .values()
            .find(|stored| stored.account.kind() == kind && stored.account.email.as_str() == email)
            .map(|stored| stored.account.id)
    }

    pub fn set_active(&self, kind: PrincipalKind, id: &AccountId, active: bool) {
        if let Some(stored) = self.accounts.lock().unwrap().get_mut(&(kind, *id)) {
            stored.account.is_active = active;
        }
    }

    /// Make the pending code for an account look expired
    pub fn expire_otp(&self, kind: PrincipalKind, id: &AccountId) {
        if let Some(stored) = self.accounts.lock().unwrap().get_mut(&(kind, *id)) {
            if let Some((_, _, expires_at)) = stored.otp.as_mut() {
                *expires_at = Utc::now() - Duration::seconds(1);
            }
        }
    }

    fn with_account<T>(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        f: impl FnOnce(&mut StoredAccount) -> T,
    ) -> Result<T, AuthError> {
        self.accounts
            .lock()
            .unwrap()
            .get_mut(&(kind, *id))
            .map(f)
            .ok_or_else(|| AuthError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, account: NewAccount) -> Result<Account, AuthError> {
        let kind = account.role.kind();
        let mut accounts = self.accounts.lock().unwrap();

        if accounts
            .values()
            .any(|stored| stored.account.kind() == kind && stored.account.email == account.email)
        {
            return Err(AuthError::EmailAlreadyExists(account.email.to_string()));
        }

        let now = Utc::now();
        let created = Account {
            id: AccountId::new(),
            email: account.email,
            first_name: account.first_name.as_str().to_string(),
            last_name: account.last_name.as_str().to_string(),
            role: account.role,
            is_active: true,
            is_verified: account.is_verified,
            last_login: None,
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        };

        accounts.insert(
            (kind, created.id),
            StoredAccount {
                account: created.clone(),
                password_hash: self.hasher.hash(account.password.as_str())?,
                otp: None,
            },
        );
        Ok(created)
    }

    async fn find_by_id(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
    ) -> Result<Option<Account>, AuthError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(&(kind, *id))
            .map(|stored| stored.account.clone()))
    }

    async fn find_by_email(
        &self,
        kind: PrincipalKind,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AuthError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|stored| stored.account.kind() == kind && &stored.account.email == email)
            .map(|stored| stored.account.clone()))
    }

    async fn verify_password(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        password: &str,
    ) -> Result<bool, AuthError> {
        let hash = match self.with_account(kind, id, |stored| stored.password_hash.clone()) {
            Ok(hash) => hash,
            Err(_) => return Ok(false),
        };
        Ok(self.hasher.verify(password, &hash)?)
    }

    async fn set_password(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        password: &Password,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let hash = self.hasher.hash(password.as_str())?;
        self.with_account(kind, id, |stored| {
            stored.password_hash = hash;
            stored.account.password_changed_at = Some(changed_at);
        })
    }

    async fn set_otp(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        code: &OtpCode,
        purpose: OtpPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        self.with_account(kind, id, |stored| {
            stored.otp = Some((code.as_str().to_string(), purpose, expires_at));
        })
    }

    async fn consume_otp(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        code: &OtpCode,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        self.with_account(kind, id, |stored| {
            let valid = matches!(
                &stored.otp,
                Some((pending, issued_for, expires_at))
                    if code.matches(pending) && *issued_for == purpose && *expires_at > now
            );
            if valid {
                stored.otp = None;
                stored.account.is_verified = true;
            }
            valid
        })
    }

    async fn update_last_login(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        self.with_account(kind, id, |stored| stored.account.last_login = Some(at))
    }

    async fn update_profile(
        &self,
        kind: PrincipalKind,
        id: &AccountId,
        changes: &ProfileChanges,
    ) -> Result<Account, AuthError> {
        self.with_account(kind, id, |stored| {
            if let Some(first_name) = &changes.first_name {
                stored.account.first_name = first_name.as_str().to_string();
            }
            if let Some(last_name) = &changes.last_name {
                stored.account.last_name = last_name.as_str().to_string();
            }
            stored.account.updated_at = Utc::now();
            stored.account.clone()
        })
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub otp: Option<String>,
}

/// Email sender that records instead of delivering
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingEmailSender {
    pub fn sent_to(&self, to: &str) -> Vec<SentEmail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|email| email.to == to)
            .cloned()
            .collect()
    }

    pub fn last_otp(&self, to: &str) -> Option<String> {
        self.sent_to(to).into_iter().rev().find_map(|email| email.otp)
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_otp(
        &self,
        to: &EmailAddress,
        code: &OtpCode,
        purpose: OtpPurpose,
    ) -> Result<(), EmailDeliveryError> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.as_str().to_string(),
            subject: purpose.as_str().to_string(),
            otp: Some(code.as_str().to_string()),
        });
        Ok(())
    }

    async fn send_custom_email(
        &self,
        to: &EmailAddress,
        subject: &str,
        _html: &str,
    ) -> Result<(), EmailDeliveryError> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.as_str().to_string(),
            subject: subject.to_string(),
            otp: None,
        });
        Ok(())
    }
}
