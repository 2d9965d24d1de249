//! Account Registry errors

use atlas_core::{AccountId, ClientId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown client: {0}")]
    UnknownClient(ClientId),

    #[error("Unknown account: {0}")]
    UnknownAccount(AccountId),

    #[error("Client is not active: {0}")]
    InactiveClient(ClientId),

    #[error("Account {account_id} does not belong to client {client_id}")]
    AccountOwnershipMismatch {
        account_id: AccountId,
        client_id: ClientId,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
