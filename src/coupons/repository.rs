use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::coupons::models::{Coupon, CouponChanges, CouponHolding, HeldCoupon, NewCoupon, RedeemOutcome};
use crate::store::{StoreError, StoreResult};

/// Persistence port for coupons and holdings
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Insert a coupon with availability set
    async fn create(&self, draft: NewCoupon) -> StoreResult<Coupon>;

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Coupon>>;

    /// Holding for (coupon, user); `None` when the user holds none
    async fn find_holding(&self, coupon_id: i32, user_id: i32) -> StoreResult<Option<CouponHolding>>;

    /// Every coupon, oldest first
    async fn list_all(&self) -> StoreResult<Vec<Coupon>>;

    /// Overwrite the editable fields; `NotFound` when the coupon is gone
    async fn update(&self, id: i32, changes: CouponChanges) -> StoreResult<Coupon>;

    /// Delete a coupon together with every holding of it
    async fn delete(&self, id: i32) -> StoreResult<()>;

    async fn list_holdings_for_user(&self, user_id: i32) -> StoreResult<Vec<HeldCoupon>>;
}

const COUPON_COLUMNS: &str = "id, code, description, issuer_id, discount, availability, created_at";

/// Insert a coupon on an open connection or transaction
pub(crate) async fn insert_coupon(conn: &mut PgConnection, draft: &NewCoupon) -> StoreResult<Coupon> {
    let coupon = sqlx::query_as::<_, Coupon>(&format!(
        r#"
        INSERT INTO coupons (code, description, issuer_id, discount, availability)
        VALUES ($1, $2, $3, $4, TRUE)
        RETURNING {}
        "#,
        COUPON_COLUMNS
    ))
    .bind(draft.code)
    .bind(&draft.description)
    .bind(draft.issuer_id)
    .bind(draft.discount)
    .fetch_one(&mut *conn)
    .await?;

    Ok(coupon)
}

/// Upsert a holding, adding one unit when it already exists
pub(crate) async fn issue_or_increment_holding(
    conn: &mut PgConnection,
    coupon_id: i32,
    user_id: i32,
) -> StoreResult<CouponHolding> {
    let holding = sqlx::query_as::<_, CouponHolding>(
        r#"
        INSERT INTO user_coupons (coupon_id, user_id, stock)
        VALUES ($1, $2, 1)
        ON CONFLICT (coupon_id, user_id) DO UPDATE SET stock = user_coupons.stock + 1
        RETURNING id, coupon_id, user_id, stock
        "#,
    )
    .bind(coupon_id)
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(holding)
}

/// Decrement a holding under a row lock, deleting it at zero
///
/// Must run inside a transaction so the lock covers the write.
pub(crate) async fn redeem_holding(
    conn: &mut PgConnection,
    coupon_id: i32,
    user_id: i32,
) -> StoreResult<RedeemOutcome> {
    let holding = sqlx::query_as::<_, CouponHolding>(
        r#"
        SELECT id, coupon_id, user_id, stock
        FROM user_coupons
        WHERE coupon_id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(coupon_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .filter(|holding| holding.stock > 0)
    .ok_or_else(|| StoreError::not_found("User coupon", format!("{}/{}", coupon_id, user_id)))?;

    let remaining = holding.stock - 1;
    if remaining == 0 {
        sqlx::query("DELETE FROM user_coupons WHERE id = $1")
            .bind(holding.id)
            .execute(&mut *conn)
            .await?;
        return Ok(RedeemOutcome::Retired { coupon_id, user_id });
    }

    let updated = sqlx::query_as::<_, CouponHolding>(
        "UPDATE user_coupons SET stock = $2 WHERE id = $1 RETURNING id, coupon_id, user_id, stock",
    )
    .bind(holding.id)
    .bind(remaining)
    .fetch_one(&mut *conn)
    .await?;

    Ok(RedeemOutcome::Remaining(updated))
}

/// Joined row for listing a user's coupons
#[derive(Debug, FromRow)]
struct HeldCouponRow {
    holding_id: i32,
    stock: i32,
    id: i32,
    code: Uuid,
    description: String,
    issuer_id: i32,
    discount: i64,
    availability: bool,
    created_at: DateTime<Utc>,
}

impl From<HeldCouponRow> for HeldCoupon {
    fn from(row: HeldCouponRow) -> Self {
        HeldCoupon {
            holding_id: row.holding_id,
            stock: row.stock,
            coupon: Coupon {
                id: row.id,
                code: row.code,
                description: row.description,
                issuer_id: row.issuer_id,
                discount: row.discount,
                availability: row.availability,
                created_at: row.created_at,
            },
        }
    }
}

/// PostgreSQL-backed coupon repository
#[derive(Clone)]
pub struct PgCouponRepository {
    pool: PgPool,
}

impl PgCouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CouponRepository for PgCouponRepository {
    async fn create(&self, draft: NewCoupon) -> StoreResult<Coupon> {
        let mut conn = self.pool.acquire().await?;
        insert_coupon(&mut *conn, &draft).await
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {} FROM coupons WHERE id = $1",
            COUPON_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    async fn find_holding(&self, coupon_id: i32, user_id: i32) -> StoreResult<Option<CouponHolding>> {
        let holding = sqlx::query_as::<_, CouponHolding>(
            "SELECT id, coupon_id, user_id, stock FROM user_coupons WHERE coupon_id = $1 AND user_id = $2",
        )
        .bind(coupon_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(holding)
    }

    async fn list_all(&self) -> StoreResult<Vec<Coupon>> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {} FROM coupons ORDER BY id",
            COUPON_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }

    async fn update(&self, id: i32, changes: CouponChanges) -> StoreResult<Coupon> {
        sqlx::query_as::<_, Coupon>(&format!(
            r#"
            UPDATE coupons
            SET description = $2, discount = $3, availability = $4
            WHERE id = $1
            RETURNING {}
            "#,
            COUPON_COLUMNS
        ))
        .bind(id)
        .bind(&changes.description)
        .bind(changes.discount)
        .bind(changes.availability)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Coupon", id))
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        // user_coupons rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Coupon", id));
        }
        Ok(())
    }

    async fn list_holdings_for_user(&self, user_id: i32) -> StoreResult<Vec<HeldCoupon>> {
        let rows = sqlx::query_as::<_, HeldCouponRow>(
            r#"
            SELECT uc.id AS holding_id, uc.stock,
                   c.id, c.code, c.description, c.issuer_id, c.discount, c.availability, c.created_at
            FROM user_coupons uc
            JOIN coupons c ON c.id = uc.coupon_id
            WHERE uc.user_id = $1 AND uc.stock > 0
            ORDER BY uc.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(HeldCoupon::from).collect())
    }
}
