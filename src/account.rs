//! Locally persisted accounts and the active-account pointer.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Account, AccountId, HistoryEntry, NewAccount};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Corrupt account file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No account with id {0}")]
    UnknownAccount(AccountId),
    #[error("No active account")]
    NoActiveAccount,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stored {
    accounts: Vec<Account>,
    active_account_id: Option<AccountId>,
}

/// Every mutation is written through to the backing file, if there is one.
#[derive(Debug, Default)]
pub struct AccountStore {
    path: Option<PathBuf>,
    data: Stored,
}

impl AccountStore {
    pub fn in_memory() -> Self {
        Default::default()
    }

    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, self::Error> {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Stored::default(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No account file at {}, starting empty", path.display());
                Stored::default()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path: Some(path),
            data,
        })
    }

    pub fn accounts(&self) -> &[Account] {
        &self.data.accounts
    }

    pub fn active_account_id(&self) -> Option<AccountId> {
        self.data.active_account_id
    }

    pub fn active_account(&self) -> Option<&Account> {
        let id = self.data.active_account_id?;
        self.account(id)
    }

    pub fn is_logged_in(&self) -> bool {
        self.active_account().is_some()
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.data.accounts.iter().find(|account| account.id == id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&Account> {
        self.data
            .accounts
            .iter()
            .find(|account| account.email.eq_ignore_ascii_case(email.trim()))
    }

    /// Stores a new account, makes it active and returns its id.
    pub fn add_account(&mut self, account: NewAccount) -> Result<AccountId, self::Error> {
        let id = self.next_id();
        self.data.accounts.push(Account {
            id,
            email: account.email,
            full_name: account.full_name,
            role: account.role,
            user_id: account.user_id,
            token: account.token,
            driver_info: account.driver_info,
            ride_history: Vec::new(),
        });
        self.data.active_account_id = Some(id);
        self.save()?;
        info!("Added account {id}");
        Ok(id)
    }

    pub fn update_account<F>(&mut self, id: AccountId, f: F) -> Result<(), self::Error>
    where
        F: FnOnce(&mut Account),
    {
        let account = self
            .data
            .accounts
            .iter_mut()
            .find(|account| account.id == id)
            .ok_or(Error::UnknownAccount(id))?;
        f(account);
        self.save()
    }

    pub fn switch_account(&mut self, id: AccountId) -> Result<(), self::Error> {
        if self.account(id).is_none() {
            return Err(Error::UnknownAccount(id));
        }
        self.data.active_account_id = Some(id);
        self.save()
    }

    /// Removes an account. If it was active, the first remaining account (if any) takes over.
    pub fn remove_account(&mut self, id: AccountId) -> Result<(), self::Error> {
        let before = self.data.accounts.len();
        self.data.accounts.retain(|account| account.id != id);
        if self.data.accounts.len() == before {
            return Err(Error::UnknownAccount(id));
        }
        if self.data.active_account_id == Some(id) {
            self.data.active_account_id = self.data.accounts.first().map(|account| account.id);
        }
        self.save()?;
        info!("Removed account {id}");
        Ok(())
    }

    pub fn logout_active(&mut self) -> Result<(), self::Error> {
        let id = self.data.active_account_id.ok_or(Error::NoActiveAccount)?;
        self.remove_account(id)
    }

    pub fn add_ride_history(&mut self, entry: HistoryEntry) -> Result<(), self::Error> {
        let id = self.data.active_account_id.ok_or(Error::NoActiveAccount)?;
        self.update_account(id, |account| account.ride_history.push(entry))
    }

    pub fn save(&self) -> Result<(), self::Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = serde_json::to_string_pretty(&self.data)?;
        fs::write(path, contents)?;
        Ok(())
    }

    fn next_id(&self) -> AccountId {
        let newest = self
            .data
            .accounts
            .iter()
            .map(|account| account.id)
            .max()
            .unwrap_or(0);
        Utc::now().timestamp_millis().max(newest + 1)
    }
}
