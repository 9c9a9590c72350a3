use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};

pub const MAX_COMMENT_LEN: usize = 1000;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Review {
    pub id: String,
    pub item_id: String,
    pub author_id: String,
    pub author_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewReview {
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    /// Checks the rating range and trims the comment.
    pub fn validate(self) -> MarketResult<NewReview> {
        if !(1..=5).contains(&self.rating) {
            return Err(MarketError::validation("rating must be between 1 and 5"));
        }
        let comment = self.comment.trim().to_string();
        if comment.chars().count() > MAX_COMMENT_LEN {
            return Err(MarketError::validation(format!(
                "comment must be at most {} characters",
                MAX_COMMENT_LEN
            )));
        }
        Ok(NewReview {
            rating: self.rating,
            comment,
        })
    }
}

/// Aggregated ratings for one item.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RatingSummary {
    pub count: usize,
    /// Rounded to one decimal; 0.0 when there are no reviews.
    pub average: f32,
    /// `distribution[0]` counts 1-star reviews, `distribution[4]` 5-star ones.
    pub distribution: [usize; 5],
}

impl RatingSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        Self::from_ratings(reviews.iter().map(|r| r.rating))
    }

    pub fn from_ratings(ratings: impl IntoIterator<Item = u8>) -> Self {
        let mut distribution = [0usize; 5];
        let mut sum = 0u32;
        let mut count = 0usize;
        for rating in ratings.into_iter().filter(|r| (1..=5).contains(r)) {
            distribution[(rating - 1) as usize] += 1;
            sum += rating as u32;
            count += 1;
        }
        let average = if count == 0 {
            0.0
        } else {
            ((sum as f32 / count as f32) * 10.0).round() / 10.0
        };
        RatingSummary {
            count,
            average,
            distribution,
        }
    }

    /// Whole stars to draw, rounding half up.
    pub fn stars(&self) -> u8 {
        self.average.round() as u8
    }
}
