// Coupon ledger module
// Coupon definitions and per-user stock

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::CouponError;
pub use models::{
    Coupon, CouponChanges, CouponHolding, CreateCouponRequest, HeldCoupon, NewCoupon, RedeemOutcome,
    UpdateCouponRequest,
};
pub use repository::{CouponRepository, PgCouponRepository};
pub use service::CouponLedger;
