/// Calculator for a menu item's running average rating
pub struct RatingCalculator;

impl RatingCalculator {
    /// Fold one more rating into a running average
    ///
    /// new_avg = (old_avg * old_count + rating) / (old_count + 1)
    ///
    /// A never-reviewed item has count 0, so its first review sets the
    /// average to the rating exactly.
    pub fn next_average(old_avg: f64, old_count: i32, rating: i16) -> (f64, i32) {
        let new_count = old_count + 1;
        let total = old_avg * f64::from(old_count) + f64::from(rating);
        (total / f64::from(new_count), new_count)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// The running average stays within the rating bounds
    #[test]
    fn prop_average_stays_within_bounds() {
        proptest!(|(ratings in prop::collection::vec(1i16..=5, 1..=50))| {
            let (avg, count) = ratings
                .iter()
                .fold((0.0, 0), |(avg, count), r| RatingCalculator::next_average(avg, count, *r));

            prop_assert_eq!(count as usize, ratings.len());
            prop_assert!((1.0 - 1e-9..=5.0 + 1e-9).contains(&avg), "average out of range: {}", avg);
        });
    }
}
