//! Email and password accounts with opaque session tokens.
#[cfg(feature = "ssr")]
mod auth_impl {
    use argon2::password_hash::{PasswordHash, SaltString};
    use argon2::{Argon2, PasswordHasher, PasswordVerifier};
    use leptos::logging::log;
    use rand::rngs::OsRng;

    use crate::db::Database;
    use crate::error::{MarketError, MarketResult};
    use crate::models::{AuthSession, Credentials, Profile, SignUp};

    pub const MIN_PASSWORD_LEN: usize = 8;

    pub fn hash_password(password: &str) -> MarketResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| MarketError::Database(format!("failed to hash password: {e}")))
    }

    pub fn verify_password(password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    fn normalize_email(email: &str) -> MarketResult<String> {
        let email = email.trim().to_lowercase();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
            _ => Err(MarketError::validation("enter a valid email address")),
        }
    }

    fn email_taken() -> MarketError {
        MarketError::Conflict("an account with this email already exists".into())
    }

    async fn open_session(db: &Database, profile: Profile) -> MarketResult<AuthSession> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        db.create_session(&token, &profile.id).await?;
        Ok(AuthSession { token, profile })
    }

    pub async fn sign_up(db: &Database, request: &SignUp) -> MarketResult<AuthSession> {
        let email = normalize_email(&request.email)?;
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(MarketError::validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let display_name = request.display_name.trim();
        if display_name.is_empty() {
            return Err(MarketError::validation("display name is required"));
        }
        if db.profile_credentials(&email).await?.is_some() {
            return Err(email_taken());
        }
        let hash = hash_password(&request.password)?;
        // A concurrent sign-up can still win the UNIQUE index.
        let profile = db
            .insert_profile(&email, &hash, display_name, request.phone.trim())
            .await
            .map_err(|e| match MarketError::from(e) {
                MarketError::Conflict(_) => email_taken(),
                other => other,
            })?;
        log!("[AUTH] Signed up {}", profile.id);
        open_session(db, profile).await
    }

    pub async fn sign_in(db: &Database, credentials: &Credentials) -> MarketResult<AuthSession> {
        let email = normalize_email(&credentials.email)?;
        match db.profile_credentials(&email).await? {
            Some((profile, hash)) if verify_password(&credentials.password, &hash) => {
                log!("[AUTH] Signed in {}", profile.id);
                open_session(db, profile).await
            }
            _ => Err(MarketError::validation("invalid email or password")),
        }
    }

    pub async fn sign_out(db: &Database, token: &str) -> MarketResult<()> {
        db.delete_session(token).await?;
        Ok(())
    }

    /// Profile behind an `Authorization: Bearer <token>` header value.
    pub async fn current_user(db: &Database, header: Option<&str>) -> MarketResult<Profile> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(MarketError::Unauthorized)?;
        db.profile_for_session(token)
            .await?
            .ok_or(MarketError::Unauthorized)
    }

}

#[cfg(feature = "ssr")]
pub use auth_impl::*;
