//! Product reviews with helpfulness voting.

use crate::error::CommerceError;
use crate::ids::{ProductId, ReviewId};
use crate::persist::{Persisted, StateRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_kv::SessionId;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A submitted review. Never edited or deleted; vote counts only grow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    /// Reviewer display name.
    pub user: String,
    /// 1 to 5 stars.
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
    pub helpful_count: u32,
    pub not_helpful_count: u32,
}

/// Review submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewInput {
    pub rating: u8,
    pub comment: String,
    pub user: String,
}

impl ReviewInput {
    pub fn new(rating: u8, comment: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            rating,
            comment: comment.into(),
            user: user.into(),
        }
    }
}

/// Review ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewSort {
    #[default]
    Newest,
    Oldest,
    /// Most helpful votes first; ties go to fewer not-helpful votes.
    MostHelpful,
    HighestRating,
    LowestRating,
}

impl FromStr for ReviewSort {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(ReviewSort::Newest),
            "oldest" => Ok(ReviewSort::Oldest),
            "most-helpful" | "helpful" => Ok(ReviewSort::MostHelpful),
            "highest-rating" | "highest" => Ok(ReviewSort::HighestRating),
            "lowest-rating" | "lowest" => Ok(ReviewSort::LowestRating),
            other => Err(CommerceError::Validation(format!("unknown review sort: {other}"))),
        }
    }
}

/// Persisted reviews and the vote ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReviewState {
    /// Reviews per product, in submission order.
    pub reviews: BTreeMap<ProductId, Vec<Review>>,
    /// Votes cast per session, keyed `"{product_id}_{review_id}"`.
    pub votes: BTreeMap<SessionId, BTreeSet<String>>,
}

/// Vote direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vote {
    Helpful,
    NotHelpful,
}

/// Append-only review lists keyed by product.
///
/// Votes are recorded against the session the store was opened for; a
/// session gets one vote per review, whichever way it went.
pub struct ReviewStore {
    state: Persisted<ReviewState>,
    voter: SessionId,
}

impl ReviewStore {
    pub fn load(
        repo: Box<dyn StateRepository<ReviewState>>,
        voter: SessionId,
    ) -> Result<Self, CommerceError> {
        Ok(Self {
            state: Persisted::load("reviews", repo)?,
            voter,
        })
    }

    /// Append a review with a fresh id and zero votes.
    pub fn add_review(
        &mut self,
        product_id: &ProductId,
        input: ReviewInput,
    ) -> Result<Review, CommerceError> {
        if !(MIN_RATING..=MAX_RATING).contains(&input.rating) {
            return Err(CommerceError::Validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {}",
                input.rating
            )));
        }
        let comment = input.comment.trim();
        if comment.is_empty() {
            return Err(CommerceError::Validation("comment must not be empty".to_string()));
        }
        let user = match input.user.trim() {
            "" => "Anonymous",
            user => user,
        };

        let review = Review {
            id: ReviewId::generate(),
            product_id: product_id.clone(),
            user: user.to_string(),
            rating: input.rating,
            comment: comment.to_string(),
            date: Utc::now(),
            helpful_count: 0,
            not_helpful_count: 0,
        };
        self.state.update(|state| {
            state
                .reviews
                .entry(product_id.clone())
                .or_default()
                .push(review.clone());
            Ok(())
        })?;
        tracing::debug!(product_id = %product_id, review_id = %review.id, "added review");
        Ok(review)
    }

    /// Count a helpful vote. Returns `false` if this session already voted.
    pub fn vote_helpful(
        &mut self,
        product_id: &ProductId,
        review_id: &ReviewId,
    ) -> Result<bool, CommerceError> {
        self.vote(product_id, review_id, Vote::Helpful)
    }

    /// Count a not-helpful vote. Returns `false` if this session already voted.
    pub fn vote_not_helpful(
        &mut self,
        product_id: &ProductId,
        review_id: &ReviewId,
    ) -> Result<bool, CommerceError> {
        self.vote(product_id, review_id, Vote::NotHelpful)
    }

    /// Check if this session has voted on a review.
    pub fn has_voted(&self, product_id: &ProductId, review_id: &ReviewId) -> bool {
        self.state
            .get()
            .votes
            .get(&self.voter)
            .is_some_and(|votes| votes.contains(&vote_key(product_id, review_id)))
    }

    /// Reviews for a product in submission order.
    pub fn reviews(&self, product_id: &ProductId) -> &[Review] {
        self.state
            .get()
            .reviews
            .get(product_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get(&self, product_id: &ProductId, review_id: &ReviewId) -> Option<&Review> {
        self.reviews(product_id).iter().find(|r| &r.id == review_id)
    }

    /// Sorted copy of a product's reviews; equal keys keep submission
    /// order, newest-first keeps later submissions first.
    pub fn sort_reviews(&self, product_id: &ProductId, sort: ReviewSort) -> Vec<Review> {
        let mut reviews = self.reviews(product_id).to_vec();
        match sort {
            ReviewSort::Newest => {
                reviews.reverse();
                reviews.sort_by_key(|r| Reverse(r.date));
            }
            ReviewSort::Oldest => reviews.sort_by_key(|r| r.date),
            ReviewSort::MostHelpful => {
                reviews.sort_by_key(|r| (Reverse(r.helpful_count), r.not_helpful_count))
            }
            ReviewSort::HighestRating => reviews.sort_by_key(|r| Reverse(r.rating)),
            ReviewSort::LowestRating => reviews.sort_by_key(|r| r.rating),
        }
        reviews
    }

    /// Mean rating, `None` without reviews.
    pub fn average_rating(&self, product_id: &ProductId) -> Option<f64> {
        let reviews = self.reviews(product_id);
        if reviews.is_empty() {
            return None;
        }
        let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        Some(f64::from(sum) / reviews.len() as f64)
    }

    /// Review count per star rating; index 0 is one star.
    pub fn rating_histogram(&self, product_id: &ProductId) -> [usize; MAX_RATING as usize] {
        let mut histogram = [0; MAX_RATING as usize];
        for review in self.reviews(product_id) {
            if let Some(slot) = usize::from(review.rating)
                .checked_sub(1)
                .and_then(|i| histogram.get_mut(i))
            {
                *slot += 1;
            }
        }
        histogram
    }

    pub(crate) fn flush(&self) -> Result<(), CommerceError> {
        self.state.flush()
    }

    fn vote(
        &mut self,
        product_id: &ProductId,
        review_id: &ReviewId,
        vote: Vote,
    ) -> Result<bool, CommerceError> {
        if self.get(product_id, review_id).is_none() {
            return Err(CommerceError::not_found("review", review_id));
        }
        if self.has_voted(product_id, review_id) {
            tracing::debug!(review_id = %review_id, "duplicate vote ignored");
            return Ok(false);
        }

        let voter = self.voter.clone();
        self.state.update(|state| {
            let review = state
                .reviews
                .get_mut(product_id)
                .and_then(|list| list.iter_mut().find(|r| &r.id == review_id))
                .ok_or_else(|| CommerceError::not_found("review", review_id))?;
            match vote {
                Vote::Helpful => review.helpful_count = review.helpful_count.saturating_add(1),
                Vote::NotHelpful => {
                    review.not_helpful_count = review.not_helpful_count.saturating_add(1)
                }
            }
            state
                .votes
                .entry(voter)
                .or_default()
                .insert(vote_key(product_id, review_id));
            Ok(())
        })?;
        tracing::debug!(review_id = %review_id, ?vote, "vote recorded");
        Ok(true)
    }
}

impl std::fmt::Debug for ReviewStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewStore")
            .field("voter", &self.voter)
            .finish_non_exhaustive()
    }
}

fn vote_key(product_id: &ProductId, review_id: &ReviewId) -> String {
    format!("{product_id}_{review_id}")
}
