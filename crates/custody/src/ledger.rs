use atlas_core::{
    AccountId, ClientId, CustodyHolding, CustodyType, HoldingId, SegregationType,
};
use atlas_ports::Clock;
use chrono::Duration;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Internal omnibus account used when a transfer credits a party that has
/// no holding for the asset yet
const OMNIBUS_SETTLEMENT_ACCOUNT: AccountId = Uuid::nil();

/// Concurrent custody holding ledger
///
/// One holding per (client, asset) pair. Quantity never goes negative and
/// holdings are never deleted: a balance drawn down to zero persists as
/// history. Migrations are serialized per holding via an in-flight
/// marker; a second concurrent attempt fails with `ConcurrencyConflict`.
pub struct CustodyLedger {
    holdings: DashMap<HoldingId, CustodyHolding>,
    by_client_asset: DashMap<(ClientId, String), HoldingId>,
    migrations_in_flight: DashMap<HoldingId, ()>,
    clock: Arc<dyn Clock>,
}

impl CustodyLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            holdings: DashMap::new(),
            by_client_asset: DashMap::new(),
            migrations_in_flight: DashMap::new(),
            clock,
        }
    }

    /// Create the holding for a (client, asset) pair
    ///
    /// Fails with `HoldingExists` if the pair already has one; custody
    /// arrangements change through `migrate`, not repeated setup.
    #[allow(clippy::too_many_arguments)]
    pub fn setup_custody(
        &self,
        client_id: ClientId,
        account_id: AccountId,
        asset: &str,
        quantity: Decimal,
        custody_type: CustodyType,
        segregation_type: SegregationType,
        insurance_coverage: Decimal,
    ) -> Result<HoldingId> {
        if quantity < Decimal::ZERO {
            return Err(Error::NonPositiveAmount(quantity));
        }
        validate_custody_type(&custody_type)?;

        let key = (client_id, asset.to_string());
        match self.by_client_asset.entry(key) {
            Entry::Occupied(_) => Err(Error::HoldingExists {
                client_id,
                asset: asset.to_string(),
            }),
            Entry::Vacant(vacant) => {
                let holding = CustodyHolding::new(
                    client_id,
                    account_id,
                    asset,
                    quantity,
                    custody_type,
                    segregation_type,
                    self.clock.now(),
                )
                .with_insurance(insurance_coverage);
                let holding_id = holding.id;
                info!(
                    "Custody holding created: id={}, client={}, asset={}, type={}, qty={}",
                    holding_id, client_id, asset, holding.custody_type, quantity
                );
                self.holdings.insert(holding_id, holding);
                vacant.insert(holding_id);
                Ok(holding_id)
            }
        }
    }

    /// Look up a holding by id
    pub fn holding(&self, holding_id: &HoldingId) -> Result<CustodyHolding> {
        self.holdings
            .get(holding_id)
            .map(|h| h.clone())
            .ok_or(Error::UnknownHolding(*holding_id))
    }

    /// Look up the holding for a (client, asset) pair
    pub fn client_holding(&self, client_id: &ClientId, asset: &str) -> Result<CustodyHolding> {
        let holding_id = self
            .by_client_asset
            .get(&(*client_id, asset.to_string()))
            .map(|id| *id)
            .ok_or_else(|| Error::NoHoldingForAsset {
                client_id: *client_id,
                asset: asset.to_string(),
            })?;
        self.holding(&holding_id)
    }

    /// All holdings of a client
    pub fn holdings_for_client(&self, client_id: &ClientId) -> Vec<CustodyHolding> {
        self.holdings
            .iter()
            .filter(|entry| entry.client_id == *client_id)
            .map(|entry| entry.clone())
            .collect()
    }

    /// Increase a holding's quantity
    pub fn credit(&self, holding_id: &HoldingId, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount(amount));
        }
        let mut entry = self
            .holdings
            .get_mut(holding_id)
            .ok_or(Error::UnknownHolding(*holding_id))?;
        entry.quantity += amount;
        entry.updated_at = self.clock.now();
        debug!(
            "Credited holding {}: +{} -> {}",
            holding_id, amount, entry.quantity
        );
        Ok(entry.quantity)
    }

    /// Decrease a holding's quantity
    ///
    /// A debit exceeding the current quantity fails with
    /// `InsufficientHolding` and leaves the holding untouched.
    pub fn debit(&self, holding_id: &HoldingId, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount(amount));
        }
        let mut entry = self
            .holdings
            .get_mut(holding_id)
            .ok_or(Error::UnknownHolding(*holding_id))?;
        if entry.quantity < amount {
            return Err(Error::InsufficientHolding {
                holding_id: *holding_id,
                available: entry.quantity,
                requested: amount,
            });
        }
        entry.quantity -= amount;
        entry.updated_at = self.clock.now();
        debug!(
            "Debited holding {}: -{} -> {}",
            holding_id, amount, entry.quantity
        );
        Ok(entry.quantity)
    }

    /// Move a holding to a new custody arrangement
    ///
    /// Serialized per holding: only one migration may be in flight for a
    /// given holding at a time, and a second concurrent attempt fails
    /// with `ConcurrencyConflict`. Returns the previous custody type and
    /// the post-migration holding.
    pub async fn migrate(
        &self,
        holding_id: &HoldingId,
        new_type: CustodyType,
    ) -> Result<(CustodyType, CustodyHolding)> {
        validate_custody_type(&new_type)?;

        if self
            .migrations_in_flight
            .insert(*holding_id, ())
            .is_some()
        {
            warn!("Rejected concurrent migration for holding {}", holding_id);
            return Err(Error::ConcurrencyConflict(*holding_id));
        }

        let result = self.migrate_inner(holding_id, new_type).await;
        self.migrations_in_flight.remove(holding_id);
        result
    }

    async fn migrate_inner(
        &self,
        holding_id: &HoldingId,
        new_type: CustodyType,
    ) -> Result<(CustodyType, CustodyHolding)> {
        // The holding must exist before any provisioning starts
        self.holding(holding_id)?;

        // Hand off to the new arrangement (vault assignment, signer
        // ceremony, device enrollment). Modeled as a yield point so the
        // in-flight marker is observable by competing migrations.
        tokio::task::yield_now().await;

        let mut entry = self
            .holdings
            .get_mut(holding_id)
            .ok_or(Error::UnknownHolding(*holding_id))?;
        let old_type = std::mem::replace(&mut entry.custody_type, new_type);

        // Arrangement change triggers a fresh audit cycle
        let now = self.clock.now();
        entry.last_audit_date = now;
        entry.next_audit_date = now + Duration::days(CustodyHolding::AUDIT_CYCLE_DAYS);
        entry.updated_at = now;

        info!(
            "Custody migrated: holding={}, {} -> {}",
            holding_id, old_type, entry.custody_type
        );
        Ok((old_type, entry.clone()))
    }

    /// Apply both legs of a bilateral trade as one atomic update
    ///
    /// The destination holding is created first (an omnibus institutional
    /// holding when the receiving party has none for the asset), then the
    /// source is debited. The final credit cannot fail once the
    /// destination exists, so either both legs apply or neither does, and
    /// no cross-holding lock is ever taken.
    pub fn transfer(
        &self,
        from_client: &ClientId,
        to_client: &ClientId,
        asset: &str,
        quantity: Decimal,
    ) -> Result<()> {
        if quantity <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount(quantity));
        }

        let from_holding = self.client_holding(from_client, asset)?;
        let to_holding_id = match self.client_holding(to_client, asset) {
            Ok(holding) => holding.id,
            Err(Error::NoHoldingForAsset { .. }) => self.setup_custody(
                *to_client,
                OMNIBUS_SETTLEMENT_ACCOUNT,
                asset,
                Decimal::ZERO,
                CustodyType::InstitutionalCustody {
                    custodian_name: "ATLAS_SETTLEMENT".to_string(),
                },
                SegregationType::Omnibus,
                Decimal::ZERO,
            )?,
            Err(err) => return Err(err),
        };

        self.debit(&from_holding.id, quantity)?;
        self.credit(&to_holding_id, quantity)
            .expect("credit of existing holding with positive amount cannot fail");

        info!(
            "Transferred {} {} from client {} to client {}",
            quantity, asset, from_client, to_client
        );
        Ok(())
    }
}

/// Check the type-specific setup data of a custody arrangement
fn validate_custody_type(custody_type: &CustodyType) -> Result<()> {
    match custody_type {
        CustodyType::HotWallet { storage_location }
        | CustodyType::ColdStorage { storage_location } => {
            if storage_location.is_empty() {
                return Err(Error::InvalidSetup(
                    "storage location must not be empty".to_string(),
                ));
            }
        }
        CustodyType::MultiSig { signers, threshold } => {
            if signers.is_empty() {
                return Err(Error::InvalidSetup(
                    "multi-sig signer set must not be empty".to_string(),
                ));
            }
            if *threshold == 0 || *threshold > signers.len() {
                return Err(Error::InvalidSetup(format!(
                    "multi-sig threshold {} out of range for {} signers",
                    threshold,
                    signers.len()
                )));
            }
        }
        CustodyType::Hsm { device_reference } => {
            if device_reference.is_empty() {
                return Err(Error::InvalidSetup(
                    "HSM device reference must not be empty".to_string(),
                ));
            }
        }
        CustodyType::InstitutionalCustody { custodian_name } => {
            if custodian_name.is_empty() {
                return Err(Error::InvalidSetup(
                    "custodian name must not be empty".to_string(),
                ));
            }
        }
        CustodyType::SelfCustody => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_ports::SystemClock;
    use rust_decimal_macros::dec;

    fn ledger() -> CustodyLedger {
        CustodyLedger::new(Arc::new(SystemClock))
    }

    fn cold(location: &str) -> CustodyType {
        CustodyType::ColdStorage {
            storage_location: location.to_string(),
        }
    }

    fn setup(ledger: &CustodyLedger, client: ClientId, asset: &str, qty: Decimal) -> HoldingId {
        ledger
            .setup_custody(
                client,
                Uuid::new_v4(),
                asset,
                qty,
                cold("vault-a"),
                SegregationType::Segregated,
                dec!(1_000_000),
            )
            .unwrap()
    }

    #[test]
    fn test_setup_and_lookup() {
        let ledger = ledger();
        let client = Uuid::new_v4();
        let id = setup(&ledger, client, "BTC", dec!(100));

        let holding = ledger.holding(&id).unwrap();
        assert_eq!(holding.quantity, dec!(100));
        assert_eq!(ledger.client_holding(&client, "BTC").unwrap().id, id);
    }

    #[test]
    fn test_duplicate_setup_rejected() {
        let ledger = ledger();
        let client = Uuid::new_v4();
        setup(&ledger, client, "BTC", dec!(100));

        let result = ledger.setup_custody(
            client,
            Uuid::new_v4(),
            "BTC",
            dec!(5),
            cold("vault-b"),
            SegregationType::Segregated,
            Decimal::ZERO,
        );
        assert!(matches!(result, Err(Error::HoldingExists { .. })));
    }

    #[test]
    fn test_credit_and_debit() {
        let ledger = ledger();
        let id = setup(&ledger, Uuid::new_v4(), "ETH", dec!(50));

        assert_eq!(ledger.credit(&id, dec!(25)).unwrap(), dec!(75));
        assert_eq!(ledger.debit(&id, dec!(75)).unwrap(), Decimal::ZERO);

        // Drawn down to zero, the holding persists as history
        assert_eq!(ledger.holding(&id).unwrap().quantity, Decimal::ZERO);
    }

    #[test]
    fn test_overdraw_rejected_without_mutation() {
        let ledger = ledger();
        let id = setup(&ledger, Uuid::new_v4(), "ETH", dec!(10));

        let err = ledger.debit(&id, dec!(11)).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientHolding {
                available, requested, ..
            } if available == dec!(10) && requested == dec!(11)
        ));
        assert_eq!(ledger.holding(&id).unwrap().quantity, dec!(10));
    }

    #[tokio::test]
    async fn test_migrate_changes_type_and_reschedules_audit() {
        let ledger = ledger();
        let id = setup(&ledger, Uuid::new_v4(), "BTC", dec!(10));
        let before = ledger.holding(&id).unwrap();

        let (old_type, after) = ledger
            .migrate(
                &id,
                CustodyType::MultiSig {
                    signers: vec!["ops-1".to_string(), "ops-2".to_string(), "ops-3".to_string()],
                    threshold: 2,
                },
            )
            .await
            .unwrap();

        assert_eq!(old_type, cold("vault-a"));
        assert!(matches!(after.custody_type, CustodyType::MultiSig { .. }));
        assert!(after.next_audit_date >= before.next_audit_date);
        // Quantity untouched by migration
        assert_eq!(after.quantity, dec!(10));
    }

    #[tokio::test]
    async fn test_concurrent_migrations_exactly_one_succeeds() {
        let ledger = Arc::new(ledger());
        let id = setup(&ledger, Uuid::new_v4(), "BTC", dec!(10));

        let (first, second) = tokio::join!(
            ledger.migrate(&id, cold("vault-b")),
            ledger.migrate(&id, cold("vault-c")),
        );

        let outcomes = [first.is_ok(), second.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);

        let conflict = if first.is_err() { first } else { second };
        assert!(matches!(
            conflict.unwrap_err(),
            Error::ConcurrencyConflict(_)
        ));
    }

    #[tokio::test]
    async fn test_sequential_migrations_both_succeed() {
        let ledger = ledger();
        let id = setup(&ledger, Uuid::new_v4(), "BTC", dec!(10));

        ledger.migrate(&id, cold("vault-b")).await.unwrap();
        ledger
            .migrate(
                &id,
                CustodyType::Hsm {
                    device_reference: "hsm-7".to_string(),
                },
            )
            .await
            .unwrap();
    }

    #[test]
    fn test_invalid_multisig_setup_rejected() {
        let ledger = ledger();
        let result = ledger.setup_custody(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "BTC",
            dec!(1),
            CustodyType::MultiSig {
                signers: vec!["ops-1".to_string()],
                threshold: 3,
            },
            SegregationType::Segregated,
            Decimal::ZERO,
        );
        assert!(matches!(result, Err(Error::InvalidSetup(_))));
    }

    #[test]
    fn test_transfer_moves_both_legs() {
        let ledger = ledger();
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        setup(&ledger, seller, "BTC", dec!(100));
        setup(&ledger, buyer, "BTC", dec!(5));

        ledger.transfer(&seller, &buyer, "BTC", dec!(40)).unwrap();

        assert_eq!(ledger.client_holding(&seller, "BTC").unwrap().quantity, dec!(60));
        assert_eq!(ledger.client_holding(&buyer, "BTC").unwrap().quantity, dec!(45));
    }

    #[test]
    fn test_transfer_creates_omnibus_holding_for_new_counterparty() {
        let ledger = ledger();
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        setup(&ledger, seller, "BTC", dec!(100));

        ledger.transfer(&seller, &buyer, "BTC", dec!(10)).unwrap();

        let created = ledger.client_holding(&buyer, "BTC").unwrap();
        assert_eq!(created.quantity, dec!(10));
        assert_eq!(created.segregation_type, SegregationType::Omnibus);
        assert!(matches!(
            created.custody_type,
            CustodyType::InstitutionalCustody { .. }
        ));
    }

    #[test]
    fn test_insufficient_transfer_mutates_nothing() {
        let ledger = ledger();
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        setup(&ledger, seller, "BTC", dec!(5));
        setup(&ledger, buyer, "BTC", dec!(1));

        let err = ledger.transfer(&seller, &buyer, "BTC", dec!(10)).unwrap_err();
        assert!(matches!(err, Error::InsufficientHolding { .. }));

        assert_eq!(ledger.client_holding(&seller, "BTC").unwrap().quantity, dec!(5));
        assert_eq!(ledger.client_holding(&buyer, "BTC").unwrap().quantity, dec!(1));
    }
}
