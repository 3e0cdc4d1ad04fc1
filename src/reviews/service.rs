use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::MenuRepository;
use crate::reviews::{
    CreateReviewRequest, CustomerReview, NewReview, ReviewError, ReviewReceipt, ReviewRepository,
};
use crate::store::StoreError;

/// Service layer for customer reviews
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    menus: Arc<dyn MenuRepository>,
}

impl ReviewService {
    pub fn new(reviews: Arc<dyn ReviewRepository>, menus: Arc<dyn MenuRepository>) -> Self {
        Self { reviews, menus }
    }

    /// Review one order line
    ///
    /// # Validation
    /// - the rating must be between 1 and 5
    /// - the line must exist and not be reviewed yet
    /// - the reviewer must be the user who placed the order
    ///
    /// The review, the reviewed flag and the menu's running average are
    /// written together.
    pub async fn submit_review(
        &self,
        user_id: i32,
        request: CreateReviewRequest,
    ) -> Result<ReviewReceipt, ReviewError> {
        let line_id = request.order_line_id;
        if !(1..=5).contains(&request.rating) {
            return Err(ReviewError::InvalidRating(request.rating));
        }

        let target = self
            .reviews
            .find_target(line_id)
            .await?
            .ok_or(ReviewError::LineNotFound(line_id))?;

        if target.reviewed {
            debug!("Order line {} already reviewed", line_id);
            return Err(ReviewError::DuplicateReview(line_id));
        }

        if target.owner_id != user_id {
            warn!(
                "User {} tried to review order line {} owned by user {}",
                user_id, line_id, target.owner_id
            );
            return Err(ReviewError::Unauthorized(line_id));
        }

        let receipt = self
            .reviews
            .submit_review(NewReview {
                order_line_id: line_id,
                user_id,
                menu_id: target.menu_id,
                rating: request.rating,
                review: request.review,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ReviewError::DuplicateReview(line_id),
                other => ReviewError::Store(other),
            })?;

        info!(
            "Review {} recorded for order line {}; menu {} now at {:.2} over {} review(s)",
            receipt.review.id,
            line_id,
            receipt.menu_rating.menu_id,
            receipt.menu_rating.avg_rating,
            receipt.menu_rating.rating_count
        );
        Ok(receipt)
    }

    /// Reviews of a menu item, newest first
    pub async fn list_for_menu(&self, menu_id: i32) -> Result<Vec<CustomerReview>, ReviewError> {
        if self.menus.find_by_id(menu_id).await?.is_none() {
            return Err(ReviewError::MenuNotFound(menu_id));
        }
        Ok(self.reviews.find_by_menu(menu_id).await?)
    }
}
