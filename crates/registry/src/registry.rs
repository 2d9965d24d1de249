use atlas_core::{AccountId, Client, ClientId, PrimeBrokerageAccount};
use dashmap::DashMap;
use log::info;

use crate::error::{Error, Result};

/// Concurrent registry of clients and prime brokerage accounts
///
/// Lookups dominate; registration and updates are rare. Cloning on read
/// keeps callers free of map guards.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    clients: DashMap<ClientId, Client>,
    accounts: DashMap<AccountId, PrimeBrokerageAccount>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly onboarded client
    pub fn register_client(&self, client: Client) -> ClientId {
        let client_id = client.id;
        info!(
            "Registering client: id={}, institution={}",
            client_id, client.institution_name
        );
        self.clients.insert(client_id, client);
        client_id
    }

    /// Register a prime brokerage account for an existing client
    pub fn register_account(&self, account: PrimeBrokerageAccount) -> Result<AccountId> {
        if !self.clients.contains_key(&account.client_id) {
            return Err(Error::UnknownClient(account.client_id));
        }
        let account_id = account.id;
        info!(
            "Registering account: id={}, client={}, type={:?}",
            account_id, account.client_id, account.account_type
        );
        self.accounts.insert(account_id, account);
        Ok(account_id)
    }

    /// Look up a client by id
    pub fn client(&self, client_id: &ClientId) -> Result<Client> {
        self.clients
            .get(client_id)
            .map(|c| c.clone())
            .ok_or(Error::UnknownClient(*client_id))
    }

    /// Look up an account by id
    pub fn account(&self, account_id: &AccountId) -> Result<PrimeBrokerageAccount> {
        self.accounts
            .get(account_id)
            .map(|a| a.clone())
            .ok_or(Error::UnknownAccount(*account_id))
    }

    /// All accounts belonging to a client
    pub fn client_accounts(&self, client_id: &ClientId) -> Vec<PrimeBrokerageAccount> {
        self.accounts
            .iter()
            .filter(|entry| entry.client_id == *client_id)
            .map(|entry| entry.clone())
            .collect()
    }

    /// Explicit client update action
    ///
    /// The only mutation path for a client record after onboarding.
    pub fn update_client<F>(&self, client_id: &ClientId, update: F) -> Result<()>
    where
        F: FnOnce(&mut Client),
    {
        let mut entry = self
            .clients
            .get_mut(client_id)
            .ok_or(Error::UnknownClient(*client_id))?;
        update(&mut entry);
        info!("Updated client: id={}", client_id);
        Ok(())
    }

    /// Verify that a (client, account) pair exists, is active, and matches
    ///
    /// Used by request validation before any order reaches gating.
    pub fn verify_order_parties(
        &self,
        client_id: &ClientId,
        account_id: &AccountId,
    ) -> Result<()> {
        let client = self.client(client_id)?;
        if !client.is_active {
            return Err(Error::InactiveClient(*client_id));
        }
        let account = self.account(account_id)?;
        if account.client_id != *client_id {
            return Err(Error::AccountOwnershipMismatch {
                account_id: *account_id,
                client_id: *client_id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{AccountType, InstitutionType, ServiceTier};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn onboard(registry: &AccountRegistry) -> (ClientId, AccountId) {
        let client = Client::new(
            "Meridian Capital",
            InstitutionType::HedgeFund,
            ServiceTier::Premium,
            dec!(250_000_000),
            dec!(10_000_000),
            Utc::now(),
        );
        let client_id = registry.register_client(client);
        let account =
            PrimeBrokerageAccount::new(client_id, AccountType::Prime, "USD", Utc::now());
        let account_id = registry.register_account(account).unwrap();
        (client_id, account_id)
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = AccountRegistry::new();
        let (client_id, account_id) = onboard(&registry);

        assert_eq!(registry.client(&client_id).unwrap().id, client_id);
        assert_eq!(registry.account(&account_id).unwrap().client_id, client_id);
        assert_eq!(registry.client_accounts(&client_id).len(), 1);
    }

    #[test]
    fn test_account_requires_known_client() {
        let registry = AccountRegistry::new();
        let orphan = PrimeBrokerageAccount::new(
            uuid::Uuid::new_v4(),
            AccountType::Prime,
            "USD",
            Utc::now(),
        );
        assert!(matches!(
            registry.register_account(orphan),
            Err(Error::UnknownClient(_))
        ));
    }

    #[test]
    fn test_verify_order_parties() {
        let registry = AccountRegistry::new();
        let (client_id, account_id) = onboard(&registry);

        assert!(registry.verify_order_parties(&client_id, &account_id).is_ok());

        // Deactivated client is rejected
        registry
            .update_client(&client_id, |c| c.is_active = false)
            .unwrap();
        assert!(matches!(
            registry.verify_order_parties(&client_id, &account_id),
            Err(Error::InactiveClient(_))
        ));
    }

    #[test]
    fn test_ownership_mismatch() {
        let registry = AccountRegistry::new();
        let (client_a, _) = onboard(&registry);
        let (_, account_b) = onboard(&registry);

        assert!(matches!(
            registry.verify_order_parties(&client_a, &account_b),
            Err(Error::AccountOwnershipMismatch { .. })
        ));
    }
}
