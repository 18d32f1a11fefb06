//! Bearer-token authentication and role checks.
//!
//! Tokens take the form `<role>:<user_id>:<secret>`. The secret is shared by
//! every caller and compared in constant time; the role and user id are
//! attached to the request as a [`Caller`] extension for handlers to inspect.

use std::fmt;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::response::failure;

/// Portal roles, from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Applicant,
    AdmissionOfficer,
    #[serde(rename = "hoa")]
    HeadOfAdmissions,
    SuperAdmin,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "applicant" => Some(Self::Applicant),
            "admission_officer" => Some(Self::AdmissionOfficer),
            "hoa" => Some(Self::HeadOfAdmissions),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::AdmissionOfficer => "admission_officer",
            Role::HeadOfAdmissions => "hoa",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub const fn is_staff(self) -> bool {
        !matches!(self, Role::Applicant)
    }

    /// Capacity figures and the program catalog are restricted to these roles.
    pub const fn manages_capacity(self) -> bool {
        matches!(self, Role::HeadOfAdmissions | Role::SuperAdmin)
    }
}

/// Authenticated identity attached to each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Identity used when authentication is disabled.
    pub fn anonymous_admin() -> Self {
        Self::new("anonymous", Role::SuperAdmin)
    }
}

#[derive(Clone, Default)]
pub struct AuthConfig {
    secret: Option<Arc<str>>,
}

impl AuthConfig {
    pub fn with_secret(secret: impl AsRef<str>) -> Self {
        Self {
            secret: Some(Arc::from(secret.as_ref())),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_secret(secret: Option<&str>) -> Self {
        match secret {
            Some(secret) => Self::with_secret(secret),
            None => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Caller, AuthError> {
        let Some(expected) = self.secret.as_deref() else {
            return Ok(Caller::anonymous_admin());
        };

        let raw = authorization.ok_or(AuthError::MissingToken)?;
        let token = raw
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(AuthError::MalformedToken)?;

        let mut parts = token.splitn(3, ':');
        let (Some(role), Some(user_id), Some(secret)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::MalformedToken);
        };

        if user_id.trim().is_empty() {
            return Err(AuthError::MalformedToken);
        }

        let role = Role::parse(role).ok_or_else(|| AuthError::UnknownRole(role.to_string()))?;

        if !bool::from(secret.as_bytes().ct_eq(expected.as_bytes())) {
            return Err(AuthError::InvalidSecret);
        }

        Ok(Caller::new(user_id.trim(), role))
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingToken,
    #[error("authorization header is not a `Bearer role:user:secret` token")]
    MalformedToken,
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error("token secret rejected")]
    InvalidSecret,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        failure(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}

/// Rejects unauthenticated requests and attaches the [`Caller`] extension.
pub async fn auth_middleware(
    State(config): State<AuthConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match config.authenticate(authorization) {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(error) => {
            warn!(%error, path = %request.uri().path(), "rejected request");
            error.into_response()
        }
    }
}
