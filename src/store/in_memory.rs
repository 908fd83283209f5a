use super::{ListingFilter, ListingStore};
use crate::error::{Error, Result};
use crate::listing::model::{Bid, Comment, Listing, ListingId, NewListing, User, UserId};
use crate::listing::money::{Amount, Money};
use crate::listing::rules::{self, CloseOutcome, WatchState};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, User>,
    listings: BTreeMap<ListingId, Listing>,
    bids: Vec<Bid>,
    comments: Vec<Comment>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: UserId) -> Result<&User> {
        self.users.get(&id).ok_or(Error::UserNotFound(id))
    }

    fn listing(&self, id: ListingId) -> Result<&Listing> {
        self.listings.get(&id).ok_or(Error::ListingNotFound(id))
    }

    fn listing_mut(&mut self, id: ListingId) -> Result<&mut Listing> {
        self.listings.get_mut(&id).ok_or(Error::ListingNotFound(id))
    }

    fn bids_for(&self, id: ListingId) -> Vec<Bid> {
        self.bids
            .iter()
            .filter(|bid| bid.listing_id == id)
            .cloned()
            .collect()
    }
}

/// 메모리 저장소
///
/// 테스트 및 데이터베이스 없이 실행할 때 사용. 하나의 Mutex 가 모든 변경을 직렬화한다.
#[derive(Default)]
pub struct InMemoryListingStore {
    state: Mutex<State>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn create_user(&self, username: &str) -> Result<User> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|user| user.username == username) {
            return Err(Error::UsernameTaken(username.to_string()));
        }
        let user = User {
            id: state.next_id(),
            username: username.to_string(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        self.state.lock().await.user(id).cloned()
    }

    async fn create_listing(&self, owner: UserId, new: NewListing) -> Result<Listing> {
        let mut state = self.state.lock().await;
        state.user(owner)?;
        let listing = Listing {
            id: state.next_id(),
            title: new.title,
            description: new.description,
            starting_price: new.starting_price,
            category: new.category,
            image_url: new.image_url,
            owner,
            watchers: BTreeSet::new(),
            closed: false,
            created_at: Utc::now(),
        };
        state.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn get_listing(&self, id: ListingId) -> Result<Listing> {
        self.state.lock().await.listing(id).cloned()
    }

    async fn list_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>> {
        let state = self.state.lock().await;
        // id 는 생성 순서대로 증가
        Ok(state
            .listings
            .values()
            .rev()
            .filter(|listing| filter.matches(listing))
            .cloned()
            .collect())
    }

    async fn get_bids(&self, id: ListingId) -> Result<Vec<Bid>> {
        let mut bids = self.state.lock().await.bids_for(id);
        bids.sort_by(|a, b| b.amount.amount.cmp(&a.amount.amount).then(b.id.cmp(&a.id)));
        Ok(bids)
    }

    async fn get_comments(&self, id: ListingId) -> Result<Vec<Comment>> {
        let state = self.state.lock().await;
        Ok(state
            .comments
            .iter()
            .filter(|comment| comment.listing_id == id)
            .cloned()
            .collect())
    }

    async fn place_bid(&self, id: ListingId, bidder: UserId, amount: Amount) -> Result<Bid> {
        let mut state = self.state.lock().await;
        let listing = state.listing(id)?;
        let currency = listing.currency();
        state.user(bidder)?;
        rules::check_bid(listing, &state.bids_for(id), amount)?;

        let bid = Bid {
            id: state.next_id(),
            listing_id: id,
            amount: Money::new(amount, currency),
            bidder,
            created_at: Utc::now(),
        };
        state.bids.push(bid.clone());
        Ok(bid)
    }

    async fn close_listing(&self, id: ListingId, user: UserId) -> Result<CloseOutcome> {
        let mut state = self.state.lock().await;
        Ok(rules::close(state.listing_mut(id)?, user))
    }

    async fn toggle_watch(&self, id: ListingId, user: UserId) -> Result<WatchState> {
        let mut state = self.state.lock().await;
        state.user(user)?;
        Ok(rules::toggle_watch(state.listing_mut(id)?, user))
    }

    async fn add_comment(&self, id: ListingId, user: UserId, text: &str) -> Result<Comment> {
        let mut state = self.state.lock().await;
        state.listing(id)?;
        state.user(user)?;
        let comment = Comment {
            id: state.next_id(),
            listing_id: id,
            commenter: user,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }
}
