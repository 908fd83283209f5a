use super::money::{Currency, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type UserId = i64;
pub type ListingId = i64;
pub type BidId = i64;
pub type CommentId = i64;

// 사용자 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

// region:    --- Category
/// 상품 카테고리 (고정 목록)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Fashion,
    Toys,
    Electronics,
    Home,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown category: {0:?}")]
pub struct UnknownCategory(pub String);

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Fashion,
        Category::Toys,
        Category::Electronics,
        Category::Home,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Fashion => "Fashion",
            Category::Toys => "Toys",
            Category::Electronics => "Electronics",
            Category::Home => "Home",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
// endregion: --- Category

// region:    --- Listing
// 경매 상품 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: Option<String>,
    pub starting_price: Option<Money>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
    pub owner: UserId,
    pub watchers: BTreeSet<UserId>,
    pub closed: bool,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// 입찰에 사용되는 통화. 시작가가 없으면 USD
    pub fn currency(&self) -> Currency {
        self.starting_price
            .map(|price| price.currency)
            .unwrap_or_default()
    }

    pub fn is_watched_by(&self, user: UserId) -> bool {
        self.watchers.contains(&user)
    }
}

/// 상품 생성 입력 (검증 완료)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub title: String,
    pub description: Option<String>,
    pub starting_price: Option<Money>,
    pub category: Option<Category>,
    pub image_url: Option<String>,
}
// endregion: --- Listing

// 입찰 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub listing_id: ListingId,
    pub amount: Money,
    pub bidder: UserId,
    pub created_at: DateTime<Utc>,
}

// 댓글 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub listing_id: ListingId,
    pub commenter: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_its_name() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert_eq!("toys".parse::<Category>().unwrap(), Category::Toys);
        assert!("Garden".parse::<Category>().is_err());
    }
}
