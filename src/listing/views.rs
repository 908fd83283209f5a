// region:    --- Imports
use super::model::{Bid, Category, Comment, Listing, ListingId, UserId};
use super::money::Money;
use super::rules;
use chrono::{DateTime, Utc};
use serde::Serialize;

// endregion: --- Imports

/// 목록 화면용 상품 요약
#[derive(Debug, Clone, Serialize)]
pub struct ListingSummary {
    pub id: ListingId,
    pub title: String,
    pub price: Option<Money>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
    pub closed: bool,
    pub created_at: DateTime<Utc>,
}

impl ListingSummary {
    pub fn new(listing: Listing, bids: &[Bid]) -> Self {
        Self {
            price: rules::current_price(&listing, bids),
            id: listing.id,
            title: listing.title,
            category: listing.category,
            image_url: listing.image_url,
            closed: listing.closed,
            created_at: listing.created_at,
        }
    }
}

/// 상품 상세 (파생 값 포함)
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    pub id: ListingId,
    pub title: String,
    pub description: Option<String>,
    pub starting_price: Option<Money>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
    pub owner: UserId,
    pub closed: bool,
    pub created_at: DateTime<Utc>,
    pub watcher_count: usize,
    pub price: Option<Money>,
    pub highest_bid: Option<Money>,
    pub highest_bidder: Option<UserId>,
    pub winner: Option<UserId>,
    pub bid_count: usize,
    pub bids: Vec<Bid>,
    pub comments: Vec<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_watched_by_user: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_is_highest_bidder: Option<bool>,
}

impl ListingDetail {
    pub fn new(
        listing: Listing,
        bids: Vec<Bid>,
        comments: Vec<Comment>,
        viewer: Option<UserId>,
    ) -> Self {
        let highest_bidder = rules::highest_bidder(&bids);
        Self {
            price: rules::current_price(&listing, &bids),
            highest_bid: rules::highest_bid(&bids).map(|bid| bid.amount),
            highest_bidder,
            winner: rules::winner(&listing, &bids),
            bid_count: bids.len(),
            is_watched_by_user: viewer.map(|user| listing.is_watched_by(user)),
            user_is_highest_bidder: viewer.map(|user| highest_bidder == Some(user)),
            watcher_count: listing.watchers.len(),
            id: listing.id,
            title: listing.title,
            description: listing.description,
            starting_price: listing.starting_price,
            category: listing.category,
            image_url: listing.image_url,
            owner: listing.owner,
            closed: listing.closed,
            created_at: listing.created_at,
            bids,
            comments,
        }
    }
}
