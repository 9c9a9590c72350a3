use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contact;

/// Public profile of a marketplace user (lender and/or renter).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub phone: String,
    pub whatsapp: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Stored avatar, or a generated one based on the display name.
    pub fn avatar(&self) -> String {
        contact::avatar_url(self.avatar_url.as_deref(), &self.display_name)
    }

    /// Number used for the WhatsApp contact button, falling back to the phone.
    pub fn whatsapp_number(&self) -> &str {
        self.whatsapp
            .as_deref()
            .filter(|w| !w.trim().is_empty())
            .unwrap_or(&self.phone)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub phone: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
}

/// Returned by sign-up and sign-in; the token goes into `Authorization: Bearer`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub profile: Profile,
}
