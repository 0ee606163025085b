//! Sign-up and login: validate the form, call the backend, update the account store.

use thiserror::Error;
use tracing::info;

use crate::{
    account::{self, AccountStore},
    api::{self, ApiClient},
    models::{AccountId, AuthSession, NewAccount, Role},
    validation::{self, SignupForm},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Invalid(#[from] validation::Error),
    #[error(transparent)]
    Api(#[from] api::Error),
    #[error(transparent)]
    Account(#[from] account::Error),
}

/// Creates the backend account, logs in and stores the new account as active.
pub async fn sign_up(
    api: &ApiClient,
    store: &mut AccountStore,
    form: &SignupForm,
) -> Result<AccountId, self::Error> {
    let request = validation::validate_signup(form)?;
    api.signup(&request).await?;
    let session = api
        .login(&api::LoginRequest {
            email: request.email.clone(),
            password: request.password.clone(),
        })
        .await?;

    // The role picked at sign-up wins until the backend has verified a driver.
    let role = match session.role {
        Role::Passenger => form.role,
        role => role,
    };
    let id = remember(store, &request.email, &request.full_name, role, session)?;
    info!("Signed up and logged in as {}", request.email);
    Ok(id)
}

/// Logs in and makes the matching stored account active, adding it if new.
pub async fn log_in(
    api: &ApiClient,
    store: &mut AccountStore,
    email: &str,
    password: &str,
) -> Result<AccountId, self::Error> {
    let request = validation::validate_login(email, password)?;
    let session = api.login(&request).await?;
    let role = session.role;
    let full_name = session.full_name.clone();
    let id = remember(store, &request.email, &full_name, role, session)?;
    info!("Logged in as {}", request.email);
    Ok(id)
}

fn remember(
    store: &mut AccountStore,
    email: &str,
    full_name: &str,
    role: Role,
    session: AuthSession,
) -> Result<AccountId, account::Error> {
    if let Some(existing) = store.find_by_email(email).map(|account| account.id) {
        store.update_account(existing, |account| {
            account.token = Some(session.token);
            account.user_id = Some(session.user_id);
            account.role = role;
            if !full_name.trim().is_empty() {
                account.full_name = full_name.to_string();
            }
            if session.driver_info.is_some() {
                account.driver_info = session.driver_info;
            }
        })?;
        store.switch_account(existing)?;
        return Ok(existing);
    }

    store.add_account(NewAccount {
        email: email.to_string(),
        full_name: full_name.to_string(),
        role,
        user_id: Some(session.user_id),
        token: Some(session.token),
        driver_info: session.driver_info,
    })
}
