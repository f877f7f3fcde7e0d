use chrono::{DateTime, Utc};
use sagip_types::{LoginRequest, UserInput, UserRole};
use serde::Deserialize;

use crate::{
    backend::Backend,
    error::ClientError,
    store::{Editable, Entity, Placement},
};

const LOGIN_PATH: &str = "/api/auth/login";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub barangay_id: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub barangay_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for SystemUser {
    type Raw = RawUser;
    type Draft = UserInput;

    const NAME: &'static str = "users";
    const PATH: &'static str = "/api/users";
    const PLACEMENT: Placement = Placement::Append;

    fn from_raw(raw: RawUser) -> Self {
        Self {
            id: raw.id,
            username: raw.username,
            email: raw.email,
            role: raw.role,
            barangay_id: raw.barangay_id,
            created_at: super::timestamp(raw.created_at.as_deref()),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Editable for SystemUser {
    type Patch = UserInput;
}

#[derive(Deserialize)]
struct LoginResponse {
    user: RawUser,
}

/// Signs in with a username or an email address.
pub async fn login(
    backend: &Backend,
    username: &str,
    password: &str,
) -> Result<SystemUser, ClientError> {
    let request = LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    };
    let response: LoginResponse = backend.api_post(LOGIN_PATH, &request).await?;
    Ok(SystemUser::from_raw(response.user))
}
