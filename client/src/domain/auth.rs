//! Authentication primitives: credentials and the session token.
//!
//! Keep raw form input parsing outside the client by exposing constructors
//! that validate string inputs before a login or registration call.

use std::fmt;

use zeroize::Zeroizing;

use super::error::ApiError;

/// Error returned when credential inputs are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
    /// Email did not look like `local@domain`.
    InvalidEmail,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::InvalidEmail => write!(f, "email address is not valid"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<CredentialsValidationError> for ApiError {
    fn from(error: CredentialsValidationError) -> Self {
        Self::validation(error.to_string())
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "password").unwrap();
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            username: normalise_username(username)?,
            password: validate_password(password)?,
        })
    }

    /// Username sent to the login endpoint.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated account registration request.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    username: String,
    email: String,
    password: Zeroizing<String>,
    display_name: Option<String>,
}

impl Registration {
    /// Construct a registration from raw inputs.
    ///
    /// A blank `display_name` is treated as absent.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Self, CredentialsValidationError> {
        let email = email.trim();
        let looks_valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !looks_valid {
            return Err(CredentialsValidationError::InvalidEmail);
        }

        Ok(Self {
            username: normalise_username(username)?,
            email: email.to_owned(),
            password: validate_password(password)?,
            display_name: display_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned),
        })
    }

    /// Requested username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Contact email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Chosen password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Optional display name.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Opaque bearer token identifying a session.
///
/// The text is wiped from memory on drop and never printed by `Debug`.
///
/// # Examples
/// ```
/// use client::domain::AccessToken;
///
/// let token = AccessToken::new("abc123").unwrap();
/// assert_eq!(token.bearer(), "Bearer abc123");
/// assert!(AccessToken::new("   ").is_none());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token; blank input yields `None`.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(Zeroizing::new(raw)))
        }
    }

    /// Raw token text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.as_str())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

fn normalise_username(username: &str) -> Result<String, CredentialsValidationError> {
    let normalised = username.trim();
    if normalised.is_empty() {
        return Err(CredentialsValidationError::EmptyUsername);
    }
    Ok(normalised.to_owned())
}

fn validate_password(password: &str) -> Result<Zeroizing<String>, CredentialsValidationError> {
    if password.is_empty() {
        return Err(CredentialsValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}
