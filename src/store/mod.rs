//! 경매 상품 저장소
//!
//! 모든 변경 작업은 저장소 안에서 원자적으로 처리된다. 입찰은 상품 단위
//! 잠금을 잡은 상태에서 다시 검증한 뒤 저장되므로, 동시에 들어온 두 입찰이
//! 같은 "현재 최고가"를 보고 둘 다 통과하는 일은 없다.
// region:    --- Imports
use crate::error::Result;
use crate::listing::model::{Bid, Category, Comment, Listing, ListingId, NewListing, User, UserId};
use crate::listing::money::Amount;
use crate::listing::rules::{CloseOutcome, WatchState};
use async_trait::async_trait;
use std::sync::Arc;

// endregion: --- Imports

// region:    --- Modules
mod in_memory;
mod postgres;
mod queries;

pub use in_memory::InMemoryListingStore;
pub use postgres::PostgresListingStore;
// endregion: --- Modules

/// 상품 목록 조회 조건
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFilter {
    /// 진행 중인 상품
    Active,
    Closed,
    Category(Category),
    WatchedBy(UserId),
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        match *self {
            ListingFilter::Active => !listing.closed,
            ListingFilter::Closed => listing.closed,
            ListingFilter::Category(category) => listing.category == Some(category),
            ListingFilter::WatchedBy(user) => listing.is_watched_by(user),
        }
    }
}

/// 저장소 트레이트
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn create_user(&self, username: &str) -> Result<User>;
    async fn get_user(&self, id: UserId) -> Result<User>;

    async fn create_listing(&self, owner: UserId, new: NewListing) -> Result<Listing>;
    async fn get_listing(&self, id: ListingId) -> Result<Listing>;
    /// 최신순
    async fn list_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>>;
    async fn get_bids(&self, id: ListingId) -> Result<Vec<Bid>>;
    async fn get_comments(&self, id: ListingId) -> Result<Vec<Comment>>;

    /// 검증과 저장을 하나의 직렬화 구간에서 수행
    async fn place_bid(&self, id: ListingId, bidder: UserId, amount: Amount) -> Result<Bid>;
    async fn close_listing(&self, id: ListingId, user: UserId) -> Result<CloseOutcome>;
    async fn toggle_watch(&self, id: ListingId, user: UserId) -> Result<WatchState>;
    async fn add_comment(&self, id: ListingId, user: UserId, text: &str) -> Result<Comment>;
}

pub type SharedListingStore = Arc<dyn ListingStore>;
