use reqwest::Method;
use tracing::info;

use super::{ApiClient, Error};
use crate::models::{PendingDriver, UserId};

impl ApiClient {
    pub async fn unverified_drivers(&self) -> Result<Vec<PendingDriver>, Error> {
        let url = self.url("/api/admin/unverified-drivers", &[])?;
        self.get(url).await
    }

    pub async fn approve_driver(&self, driver_id: UserId) -> Result<(), Error> {
        let url = self.url(&format!("/api/admin/approve-driver/{driver_id}"), &[])?;
        self.send(self.request(Method::POST, url)).await?;
        info!("Approved driver {driver_id}");
        Ok(())
    }

    pub async fn reject_driver(&self, driver_id: UserId) -> Result<(), Error> {
        let url = self.url(&format!("/api/admin/reject-driver/{driver_id}"), &[])?;
        self.send(self.request(Method::DELETE, url)).await?;
        info!("Rejected driver {driver_id}");
        Ok(())
    }
}
