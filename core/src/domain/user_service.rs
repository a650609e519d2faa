//! User application service.
//!
//! Account registration, verification, password changes, and credential
//! checks, with uniqueness guarded before any hashing work is spent.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::error::{DomainResult, Error};
use crate::domain::ports::{
    PasswordSecurity, PasswordSecurityError, UserRepository, UserRepositoryError,
};
use crate::domain::timestamps::Timestamps;
use crate::domain::user::{EmailAddress, NewUser, PersonName, User, UserId, UserValidationError};

/// Registration request as it arrives from the outer layers.
///
/// Carries the plain-text password; hashing happens inside the service via
/// the password security port.
#[derive(Debug, Clone)]
pub struct NewUserRequest {
    /// Desired unique username.
    pub username: String,
    /// Email address to register under.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Plain-text password to be hashed.
    pub password: String,
    /// Whether the account starts out verified.
    pub verified: bool,
}

/// Application service for account use-cases.
#[derive(Clone)]
pub struct UserService<U, P> {
    users: Arc<U>,
    security: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<U, P> UserService<U, P> {
    /// Create a new service over the given ports.
    pub fn new(users: Arc<U>, security: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            security,
            clock,
        }
    }
}

impl<U, P> UserService<U, P>
where
    U: UserRepository,
    P: PasswordSecurity,
{
    /// Register a new account.
    ///
    /// Email and username uniqueness are checked before the password is
    /// hashed, so a rejected registration never pays for the hash. The
    /// repository's unique constraints still back the check; losing the
    /// race to a concurrent registration surfaces as the same conflict.
    pub async fn create_user(&self, request: NewUserRequest) -> DomainResult<User> {
        let email = EmailAddress::new(request.email).map_err(map_validation_error)?;
        let first_name = PersonName::new(request.first_name).map_err(map_validation_error)?;
        let last_name = PersonName::new(request.last_name).map_err(map_validation_error)?;

        if self
            .users
            .exists_by_email(&email)
            .await
            .map_err(map_user_repo_error)?
        {
            return Err(Error::conflict(format!(
                "email {email} is already registered"
            )));
        }
        if self
            .users
            .exists_by_username(&request.username)
            .await
            .map_err(map_user_repo_error)?
        {
            return Err(Error::conflict(format!(
                "username {} is already taken",
                request.username
            )));
        }

        let hashed_password = self
            .security
            .hash_password(&request.password)
            .await
            .map_err(map_security_error)?;

        let now = self.clock.utc();
        let user = User::new(
            NewUser {
                id: UserId::random(),
                username: request.username,
                email,
                first_name,
                last_name,
                hashed_password,
                verified: request.verified,
            },
            Timestamps::at_creation(now),
        )
        .map_err(map_validation_error)?;

        match self.users.save(&user).await {
            Ok(()) => Ok(user),
            Err(UserRepositoryError::DuplicateKey { key }) => Err(Error::conflict(format!(
                "account already registered for {key}"
            ))),
            Err(err) => Err(map_user_repo_error(err)),
        }
    }

    /// Mark an account verified.
    ///
    /// A second verification attempt is a conflict, not a no-op.
    pub async fn verify_user(&self, user_id: UserId) -> DomainResult<User> {
        let mut user = self.existing_user(user_id).await?;

        match user.verify(self.clock.utc()) {
            Ok(()) => {}
            Err(UserValidationError::AlreadyVerified) => {
                return Err(Error::conflict(format!("user {user_id} is already verified")));
            }
            Err(err) => return Err(map_validation_error(err)),
        }

        self.users.save(&user).await.map_err(map_user_repo_error)?;
        Ok(user)
    }

    /// Replace an account's password with the hash of `new_password`.
    pub async fn change_password(&self, user_id: UserId, new_password: &str) -> DomainResult<User> {
        let mut user = self.existing_user(user_id).await?;

        let hashed = self
            .security
            .hash_password(new_password)
            .await
            .map_err(map_security_error)?;
        user.change_password(hashed, self.clock.utc())
            .map_err(map_validation_error)?;

        self.users.save(&user).await.map_err(map_user_repo_error)?;
        Ok(user)
    }

    /// Check credentials and return the account when they match.
    ///
    /// An unknown email and a wrong password both answer with the same
    /// unauthorized error, so callers cannot probe which addresses exist.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<User> {
        let email = EmailAddress::new(email).map_err(map_validation_error)?;

        let Some(user) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_repo_error)?
        else {
            return Err(invalid_credentials());
        };

        let matches = self
            .security
            .verify_password(password, user.hashed_password())
            .await
            .map_err(map_security_error)?;
        if !matches {
            return Err(invalid_credentials());
        }
        Ok(user)
    }

    async fn existing_user(&self, user_id: UserId) -> DomainResult<User> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

fn map_validation_error(error: UserValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateKey { key } => {
            Error::conflict(format!("account already registered for {key}"))
        }
    }
}

fn map_security_error(error: PasswordSecurityError) -> Error {
    match error {
        PasswordSecurityError::Hashing { message } => {
            Error::internal(format!("password hashing failed: {message}"))
        }
    }
}
