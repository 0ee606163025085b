//! Driver verification for admins.

use thiserror::Error;

use crate::{
    api::{self, ApiClient},
    models::{Account, PendingDriver, Role, UserId},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Admin access required")]
    Forbidden,
    #[error(transparent)]
    Api(#[from] api::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// The list of drivers waiting for verification.
#[derive(Debug, Default)]
pub struct AdminPanel {
    pending: Vec<PendingDriver>,
}

impl AdminPanel {
    pub fn for_account(account: &Account) -> Result<Self, self::Error> {
        if account.role == Role::Admin {
            Ok(Self::default())
        } else {
            Err(Error::Forbidden)
        }
    }

    pub fn pending(&self) -> &[PendingDriver] {
        &self.pending
    }

    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), self::Error> {
        self.pending = api.unverified_drivers().await?;
        Ok(())
    }

    /// Applies the decision; the driver leaves the list only if the backend accepted it.
    pub async fn decide(
        &mut self,
        api: &ApiClient,
        driver_id: UserId,
        decision: Decision,
    ) -> Result<(), self::Error> {
        match decision {
            Decision::Approve => api.approve_driver(driver_id).await?,
            Decision::Reject => api.reject_driver(driver_id).await?,
        }
        self.pending.retain(|driver| driver.id != driver_id);
        Ok(())
    }
}
