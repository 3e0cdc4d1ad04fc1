use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::coupons::{
    error::CouponError,
    models::{Coupon, CouponChanges, CouponHolding, HeldCoupon, NewCoupon},
    repository::CouponRepository,
};
use crate::store::StoreError;

/// Coupon ledger: definitions, per-user stock, redemption
#[derive(Clone)]
pub struct CouponLedger {
    coupons: Arc<dyn CouponRepository>,
}

impl CouponLedger {
    pub fn new(coupons: Arc<dyn CouponRepository>) -> Self {
        Self { coupons }
    }

    /// Create an available coupon with a freshly generated code
    pub async fn create_coupon(
        &self,
        issuer_id: i32,
        description: &str,
        discount: i64,
    ) -> Result<Coupon, CouponError> {
        ensure_discount(discount)?;

        let coupon = self
            .coupons
            .create(NewCoupon::new(issuer_id, description, discount))
            .await?;

        info!(
            "Created coupon {} (discount {}) issued by user {}",
            coupon.id, coupon.discount, issuer_id
        );
        Ok(coupon)
    }

    pub async fn get_coupon(&self, id: i32) -> Result<Coupon, CouponError> {
        self.coupons
            .find_by_id(id)
            .await?
            .ok_or(CouponError::CouponNotFound(id))
    }

    /// Holding of a coupon by a user; absence is not an error
    pub async fn get_holding(
        &self,
        coupon_id: i32,
        user_id: i32,
    ) -> Result<Option<CouponHolding>, CouponError> {
        Ok(self.coupons.find_holding(coupon_id, user_id).await?)
    }

    /// Resolve a coupon the user wants to spend
    ///
    /// Fails when the coupon is unknown or the user holds no unit of it.
    /// Nothing is decremented here.
    pub async fn redeemable_coupon(&self, coupon_id: i32, user_id: i32) -> Result<Coupon, CouponError> {
        let coupon = self.get_coupon(coupon_id).await?;
        match self.get_holding(coupon_id, user_id).await? {
            Some(holding) if holding.stock > 0 => Ok(coupon),
            _ => {
                debug!("User {} holds no unit of coupon {}", user_id, coupon_id);
                Err(CouponError::HoldingNotFound { coupon_id, user_id })
            }
        }
    }

    /// Every coupon defined so far
    pub async fn list_coupons(&self) -> Result<Vec<Coupon>, CouponError> {
        Ok(self.coupons.list_all().await?)
    }

    /// Edit description, discount and availability
    ///
    /// Only the admin who issued the coupon may edit it.
    pub async fn update_coupon(
        &self,
        editor_id: i32,
        coupon_id: i32,
        changes: CouponChanges,
    ) -> Result<Coupon, CouponError> {
        let coupon = self.get_coupon(coupon_id).await?;
        if coupon.issuer_id != editor_id {
            warn!(
                "User {} tried to edit coupon {} issued by user {}",
                editor_id, coupon_id, coupon.issuer_id
            );
            return Err(CouponError::NotIssuer {
                coupon_id,
                user_id: editor_id,
            });
        }
        ensure_discount(changes.discount)?;

        let updated = self
            .coupons
            .update(coupon_id, changes)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => CouponError::CouponNotFound(coupon_id),
                other => CouponError::Store(other),
            })?;

        info!(
            "Coupon {} updated by user {} (discount {}, available {})",
            coupon_id, editor_id, updated.discount, updated.availability
        );
        Ok(updated)
    }

    /// Remove a coupon and every holding of it
    pub async fn delete_coupon(&self, coupon_id: i32) -> Result<(), CouponError> {
        self.coupons.delete(coupon_id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => CouponError::CouponNotFound(coupon_id),
            other => CouponError::Store(other),
        })?;

        info!("Coupon {} deleted", coupon_id);
        Ok(())
    }

    pub async fn list_user_coupons(&self, user_id: i32) -> Result<Vec<HeldCoupon>, CouponError> {
        Ok(self.coupons.list_holdings_for_user(user_id).await?)
    }
}

fn ensure_discount(discount: i64) -> Result<(), CouponError> {
    if discount < 0 {
        return Err(CouponError::InvalidDiscount(discount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryStore;

    fn ledger(store: &InMemoryStore) -> CouponLedger {
        CouponLedger::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn test_created_coupon_is_available() {
        let store = InMemoryStore::new();
        let coupon = ledger(&store).create_coupon(1, "Welcome", 2000).await.unwrap();

        assert!(coupon.availability);
        assert_eq!(coupon.discount, 2000);
        assert_eq!(coupon.issuer_id, 1);
    }

    #[tokio::test]
    async fn test_missing_holding_is_none() {
        let store = InMemoryStore::new();
        let ledger = ledger(&store);
        let coupon = ledger.create_coupon(1, "Welcome", 2000).await.unwrap();

        assert_eq!(ledger.get_holding(coupon.id, 5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_redeemable_requires_a_holding() {
        let store = InMemoryStore::new();
        let ledger = ledger(&store);
        let coupon = ledger.create_coupon(1, "Welcome", 2000).await.unwrap();

        let result = ledger.redeemable_coupon(coupon.id, 5).await;
        assert!(matches!(result, Err(CouponError::HoldingNotFound { .. })));

        store.give_holding(coupon.id, 5, 1);
        assert_eq!(ledger.redeemable_coupon(coupon.id, 5).await.unwrap().id, coupon.id);
    }

    #[tokio::test]
    async fn test_negative_discount_is_rejected() {
        let store = InMemoryStore::new();
        let result = ledger(&store).create_coupon(1, "Surcharge", -5000).await;

        assert!(matches!(result, Err(CouponError::InvalidDiscount(-5000))));
        assert_eq!(store.coupon_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_discount_is_allowed() {
        let store = InMemoryStore::new();
        let coupon = ledger(&store).create_coupon(1, "Token of thanks", 0).await.unwrap();
        assert_eq!(coupon.discount, 0);
    }

    fn changes(discount: i64, availability: bool) -> CouponChanges {
        CouponChanges {
            description: "Spring sale".to_string(),
            discount,
            availability,
        }
    }

    #[tokio::test]
    async fn test_issuer_updates_coupon() {
        let store = InMemoryStore::new();
        let ledger = ledger(&store);
        let coupon = ledger.create_coupon(1, "Welcome", 2000).await.unwrap();

        let updated = ledger.update_coupon(1, coupon.id, changes(1500, false)).await.unwrap();

        assert_eq!(updated.description, "Spring sale");
        assert_eq!(updated.discount, 1500);
        assert!(!updated.availability);
        assert_eq!(updated.code, coupon.code);
        assert_eq!(ledger.get_coupon(coupon.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_other_admin_cannot_update_coupon() {
        let store = InMemoryStore::new();
        let ledger = ledger(&store);
        let coupon = ledger.create_coupon(1, "Welcome", 2000).await.unwrap();

        let result = ledger.update_coupon(2, coupon.id, changes(0, false)).await;

        assert!(matches!(
            result,
            Err(CouponError::NotIssuer { user_id: 2, .. })
        ));
        let unchanged = ledger.get_coupon(coupon.id).await.unwrap();
        assert_eq!(unchanged.discount, 2000);
        assert!(unchanged.availability);
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_coupon_and_negative_discount() {
        let store = InMemoryStore::new();
        let ledger = ledger(&store);

        let missing = ledger.update_coupon(1, 42, changes(100, true)).await;
        assert!(matches!(missing, Err(CouponError::CouponNotFound(42))));

        let coupon = ledger.create_coupon(1, "Welcome", 2000).await.unwrap();
        let negative = ledger.update_coupon(1, coupon.id, changes(-1, true)).await;
        assert!(matches!(negative, Err(CouponError::InvalidDiscount(-1))));
        assert_eq!(ledger.get_coupon(coupon.id).await.unwrap().discount, 2000);
    }

    #[tokio::test]
    async fn test_list_coupons_in_creation_order() {
        let store = InMemoryStore::new();
        let ledger = ledger(&store);
        assert!(ledger.list_coupons().await.unwrap().is_empty());

        let first = ledger.create_coupon(1, "Welcome", 2000).await.unwrap();
        let second = ledger.create_coupon(2, "Loyalty", 500).await.unwrap();

        let ids: Vec<i32> = ledger.list_coupons().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_delete_coupon_drops_its_holdings() {
        let store = InMemoryStore::new();
        let ledger = ledger(&store);
        let coupon = ledger.create_coupon(1, "Welcome", 2000).await.unwrap();
        store.give_holding(coupon.id, 5, 2);

        ledger.delete_coupon(coupon.id).await.unwrap();

        assert_eq!(store.coupon_count(), 0);
        assert_eq!(store.holding(coupon.id, 5), None);
        assert!(ledger.list_user_coupons(5).await.unwrap().is_empty());

        let again = ledger.delete_coupon(coupon.id).await;
        assert!(matches!(again, Err(CouponError::CouponNotFound(_))));
    }
}
