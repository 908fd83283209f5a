// region:    --- Imports
use super::queries;
use super::{ListingFilter, ListingStore};
use crate::database::DatabaseManager;
use crate::error::{Error, Result};
use crate::listing::model::{Bid, Comment, Listing, ListingId, NewListing, User, UserId};
use crate::listing::money::{Amount, Currency, Money};
use crate::listing::rules::{self, CloseOutcome, WatchState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Rows
#[derive(FromRow)]
struct ListingRow {
    id: i64,
    title: String,
    description: Option<String>,
    starting_price: Option<i64>,
    currency: String,
    category: Option<String>,
    image_url: Option<String>,
    owner_id: i64,
    closed: bool,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct BidRow {
    id: i64,
    listing_id: i64,
    bidder_id: i64,
    amount: i64,
    currency: String,
    created_at: DateTime<Utc>,
}

/// 컬럼 값 변환 실패는 sqlx 디코드 오류로 취급
fn decode_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
    Error::Database(sqlx::Error::Decode(Box::new(e)))
}

impl ListingRow {
    fn into_listing(self, watchers: BTreeSet<UserId>) -> Result<Listing> {
        let currency: Currency = self.currency.parse().map_err(decode_error)?;
        let starting_price = self
            .starting_price
            .map(|cents| Amount::from_minor_units(cents).map(|a| Money::new(a, currency)))
            .transpose()
            .map_err(decode_error)?;
        let category = self
            .category
            .map(|c| c.parse())
            .transpose()
            .map_err(decode_error)?;

        Ok(Listing {
            id: self.id,
            title: self.title,
            description: self.description,
            starting_price,
            category,
            image_url: self.image_url,
            owner: self.owner_id,
            watchers,
            closed: self.closed,
            created_at: self.created_at,
        })
    }
}

impl TryFrom<BidRow> for Bid {
    type Error = Error;

    fn try_from(row: BidRow) -> Result<Self> {
        let currency: Currency = row.currency.parse().map_err(decode_error)?;
        let amount = Amount::from_minor_units(row.amount).map_err(decode_error)?;
        Ok(Bid {
            id: row.id,
            listing_id: row.listing_id,
            amount: Money::new(amount, currency),
            bidder: row.bidder_id,
            created_at: row.created_at,
        })
    }
}
// endregion: --- Rows

// region:    --- Helpers
async fn fetch_watchers(conn: &mut PgConnection, id: ListingId) -> Result<BTreeSet<UserId>> {
    let watchers: Vec<i64> = sqlx::query_scalar(queries::GET_WATCHERS)
        .bind(id)
        .fetch_all(conn)
        .await?;
    Ok(watchers.into_iter().collect())
}

async fn fetch_listing(conn: &mut PgConnection, id: ListingId, lock: bool) -> Result<Listing> {
    let sql = if lock {
        queries::LOCK_LISTING
    } else {
        queries::GET_LISTING
    };
    let row = sqlx::query_as::<_, ListingRow>(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(Error::ListingNotFound(id))?;
    let watchers = fetch_watchers(conn, id).await?;
    row.into_listing(watchers)
}

async fn fetch_bids(conn: &mut PgConnection, id: ListingId) -> Result<Vec<Bid>> {
    sqlx::query_as::<_, BidRow>(queries::GET_LISTING_BIDS)
        .bind(id)
        .fetch_all(conn)
        .await?
        .into_iter()
        .map(Bid::try_from)
        .collect()
}

async fn fetch_user(conn: &mut PgConnection, id: UserId) -> Result<User> {
    sqlx::query_as::<_, User>(queries::GET_USER)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(Error::UserNotFound(id))
}
// endregion: --- Helpers

// region:    --- Postgres Listing Store
/// Postgres 저장소 구현체
pub struct PostgresListingStore {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresListingStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl ListingStore for PostgresListingStore {
    async fn create_user(&self, username: &str) -> Result<User> {
        let username = username.to_string();
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, User>(queries::INSERT_USER)
                        .bind(&username)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or_else(|| Error::UsernameTaken(username.clone()))
                })
            })
            .await
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        let mut conn = self.db_manager.pool().acquire().await?;
        fetch_user(&mut conn, id).await
    }

    async fn create_listing(&self, owner: UserId, new: NewListing) -> Result<Listing> {
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    fetch_user(&mut **tx, owner).await?;
                    let currency = new
                        .starting_price
                        .map(|price| price.currency)
                        .unwrap_or_default();
                    let row = sqlx::query_as::<_, ListingRow>(queries::INSERT_LISTING)
                        .bind(&new.title)
                        .bind(&new.description)
                        .bind(new.starting_price.map(|price| price.amount.minor_units()))
                        .bind(currency.code())
                        .bind(new.category.map(|c| c.as_str()))
                        .bind(&new.image_url)
                        .bind(owner)
                        .fetch_one(&mut **tx)
                        .await?;
                    row.into_listing(BTreeSet::new())
                })
            })
            .await
    }

    async fn get_listing(&self, id: ListingId) -> Result<Listing> {
        let mut conn = self.db_manager.pool().acquire().await?;
        fetch_listing(&mut conn, id, false).await
    }

    async fn list_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>> {
        debug!("{:<12} --> 상품 목록 조회: {:?}", "Store", filter);
        let pool = self.db_manager.pool();
        let rows = match filter {
            ListingFilter::Active => {
                sqlx::query_as::<_, ListingRow>(queries::GET_ACTIVE_LISTINGS)
                    .fetch_all(pool)
                    .await?
            }
            ListingFilter::Closed => {
                sqlx::query_as::<_, ListingRow>(queries::GET_CLOSED_LISTINGS)
                    .fetch_all(pool)
                    .await?
            }
            ListingFilter::Category(category) => {
                sqlx::query_as::<_, ListingRow>(queries::GET_LISTINGS_IN_CATEGORY)
                    .bind(category.as_str())
                    .fetch_all(pool)
                    .await?
            }
            ListingFilter::WatchedBy(user) => {
                sqlx::query_as::<_, ListingRow>(queries::GET_WATCHED_LISTINGS)
                    .bind(user)
                    .fetch_all(pool)
                    .await?
            }
        };

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let pairs: Vec<(i64, i64)> = sqlx::query_as(queries::GET_WATCHERS_FOR_LISTINGS)
            .bind(&ids)
            .fetch_all(pool)
            .await?;
        let mut watchers: HashMap<ListingId, BTreeSet<UserId>> = HashMap::new();
        for (listing_id, user_id) in pairs {
            watchers.entry(listing_id).or_default().insert(user_id);
        }

        rows.into_iter()
            .map(|row| {
                let listing_watchers = watchers.remove(&row.id).unwrap_or_default();
                row.into_listing(listing_watchers)
            })
            .collect()
    }

    async fn get_bids(&self, id: ListingId) -> Result<Vec<Bid>> {
        let mut conn = self.db_manager.pool().acquire().await?;
        fetch_bids(&mut conn, id).await
    }

    async fn get_comments(&self, id: ListingId) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(queries::GET_LISTING_COMMENTS)
            .bind(id)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(comments)
    }

    async fn place_bid(&self, id: ListingId, bidder: UserId, amount: Amount) -> Result<Bid> {
        let bid = self
            .db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    // 상품 행 잠금 후 재검증
                    let listing = fetch_listing(&mut **tx, id, true).await?;
                    fetch_user(&mut **tx, bidder).await?;
                    let bids = fetch_bids(&mut **tx, id).await?;
                    rules::check_bid(&listing, &bids, amount)?;

                    let row = sqlx::query_as::<_, BidRow>(queries::INSERT_BID)
                        .bind(id)
                        .bind(bidder)
                        .bind(amount.minor_units())
                        .bind(listing.currency().code())
                        .fetch_one(&mut **tx)
                        .await?;
                    Bid::try_from(row)
                })
            })
            .await?;
        info!(
            "{:<12} --> 입찰 저장: listing={}, amount={}",
            "Store", id, bid.amount
        );
        Ok(bid)
    }

    async fn close_listing(&self, id: ListingId, user: UserId) -> Result<CloseOutcome> {
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let mut listing = fetch_listing(&mut **tx, id, true).await?;
                    let outcome = rules::close(&mut listing, user);
                    if outcome == CloseOutcome::Closed {
                        sqlx::query(queries::CLOSE_LISTING)
                            .bind(id)
                            .execute(&mut **tx)
                            .await?;
                    }
                    Ok::<_, Error>(outcome)
                })
            })
            .await
    }

    async fn toggle_watch(&self, id: ListingId, user: UserId) -> Result<WatchState> {
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let mut listing = fetch_listing(&mut **tx, id, true).await?;
                    fetch_user(&mut **tx, user).await?;
                    let state = rules::toggle_watch(&mut listing, user);
                    let sql = match state {
                        WatchState::Watching => queries::INSERT_WATCHER,
                        WatchState::NotWatching => queries::DELETE_WATCHER,
                    };
                    sqlx::query(sql)
                        .bind(id)
                        .bind(user)
                        .execute(&mut **tx)
                        .await?;
                    Ok::<_, Error>(state)
                })
            })
            .await
    }

    async fn add_comment(&self, id: ListingId, user: UserId, text: &str) -> Result<Comment> {
        let text = text.to_string();
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    fetch_listing(&mut **tx, id, false).await?;
                    fetch_user(&mut **tx, user).await?;
                    let comment = sqlx::query_as::<_, Comment>(queries::INSERT_COMMENT)
                        .bind(id)
                        .bind(user)
                        .bind(&text)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok::<_, Error>(comment)
                })
            })
            .await
    }
}
// endregion: --- Postgres Listing Store
