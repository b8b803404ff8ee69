use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Basic,
    Digest,
    Bearer,
    Ntlm,
}

impl AuthType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthType::Basic => "Basic",
            AuthType::Digest => "Digest",
            AuthType::Bearer => "Bearer",
            AuthType::Ntlm => "NTLM",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials taken from `-u`, `--digest`, `--ntlm` or `--oauth2-bearer`.
#[derive(Clone, PartialEq, Eq)]
pub struct Authentication {
    pub kind: AuthType,
    pub username: String,
    pub password: String,
    pub token: String,
}

impl Authentication {
    /// Parse `user:password`, splitting on the first colon only.
    pub fn from_credentials(kind: AuthType, credentials: &str) -> Result<Self> {
        let (username, password) = split_credentials(credentials)?;
        Ok(Self {
            kind,
            username: username.to_owned(),
            password: password.to_owned(),
            token: String::new(),
        })
    }

    pub fn basic(credentials: &str) -> Result<Self> {
        Self::from_credentials(AuthType::Basic, credentials)
    }

    pub fn digest(credentials: &str) -> Result<Self> {
        Self::from_credentials(AuthType::Digest, credentials)
    }

    pub fn ntlm(credentials: &str) -> Result<Self> {
        Self::from_credentials(AuthType::Ntlm, credentials)
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            kind: AuthType::Bearer,
            username: String::new(),
            password: String::new(),
            token: token.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self.kind {
            AuthType::Bearer => !self.token.is_empty(),
            AuthType::Basic | AuthType::Digest | AuthType::Ntlm => {
                !self.username.is_empty() && !self.password.is_empty()
            }
        }
    }

    /// The literal `Authorization` value. Only bearer tokens have one; the
    /// other schemes are negotiated by the HTTP client.
    pub fn auth_header(&self) -> Option<String> {
        match self.kind {
            AuthType::Bearer if !self.token.is_empty() => Some(format!("Bearer {}", self.token)),
            _ => None,
        }
    }
}

/// Split `user:password` on the first colon. An empty password is allowed,
/// a missing colon is not.
pub fn split_credentials(credentials: &str) -> Result<(&str, &str)> {
    credentials
        .split_once(':')
        .ok_or_else(|| Error::value(credentials, "expected user:password"))
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authentication")
            .field("kind", &self.kind)
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .field("token", &mask(&self.token))
            .finish()
    }
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AuthType::Bearer => write!(f, "Bearer {}", mask(&self.token)),
            kind => write!(f, "{kind} {}:{}", self.username, mask(&self.password)),
        }
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "****" }
}
