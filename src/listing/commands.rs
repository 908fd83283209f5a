/// 경매 상품 관련 커맨드 처리
/// 1. 사용자 등록
/// 2. 상품 등록
/// 3. 입찰
/// 4. 경매 종료
/// 5. 관심 목록 토글
/// 6. 댓글 작성
// region:    --- Imports
use super::model::{Bid, Category, Comment, Listing, ListingId, NewListing, User, UserId};
use super::money::{Amount, Currency, Money};
use super::rules::{CloseOutcome, WatchState};
use crate::error::{Error, Result};
use crate::store::ListingStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

const MAX_TITLE_LEN: usize = 100;
const MAX_USERNAME_LEN: usize = 150;

// region:    --- Commands
/// 사용자 등록 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegisterUserCommand {
    pub username: String,
}

/// 상품 등록 명령 (폼 입력 그대로)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CreateListingCommand {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub starting_price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: ListingId,
    pub bidder_id: UserId,
    pub amount: String,
}

/// 경매 종료 명령
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct CloseListingCommand {
    pub listing_id: ListingId,
    pub user_id: UserId,
}

/// 관심 목록 토글 명령
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct ToggleWatchCommand {
    pub listing_id: ListingId,
    pub user_id: UserId,
}

/// 댓글 작성 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AddCommentCommand {
    pub listing_id: ListingId,
    pub commenter_id: UserId,
    #[serde(default)]
    pub text: String,
}
// endregion: --- Commands

// region:    --- Validation
/// 빈 문자열은 입력 없음으로 취급
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreateListingCommand {
    pub fn validate(self) -> Result<NewListing> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::invalid("Title is required."));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(Error::invalid(format!(
                "Title must be at most {MAX_TITLE_LEN} characters."
            )));
        }

        let currency = match non_blank(self.currency) {
            Some(code) => code
                .parse::<Currency>()
                .map_err(|_| Error::invalid(format!("Unsupported currency {code:?}.")))?,
            None => Currency::default(),
        };
        let amount = match non_blank(self.starting_price) {
            Some(text) => text
                .parse::<Amount>()
                .map_err(|_| Error::invalid("Invalid starting bid"))?,
            None => Amount::ZERO,
        };

        let category = non_blank(self.category)
            .map(|c| c.parse::<Category>())
            .transpose()
            .map_err(|e| Error::invalid(format!("{e}")))?;

        let image_url = non_blank(self.image_url)
            .map(|raw| match url::Url::parse(&raw) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(raw),
                _ => Err(Error::invalid("Enter a valid URL.")),
            })
            .transpose()?;

        Ok(NewListing {
            title,
            description: non_blank(self.description),
            starting_price: Some(Money::new(amount, currency)),
            category,
            image_url,
        })
    }
}

impl RegisterUserCommand {
    fn validate(&self) -> Result<&str> {
        let username = self.username.trim();
        if username.is_empty()
            || username.chars().count() > MAX_USERNAME_LEN
            || username.chars().any(char::is_whitespace)
        {
            return Err(Error::invalid(
                "Username must be 1 to 150 characters without spaces.",
            ));
        }
        Ok(username)
    }
}
// endregion: --- Validation

// region:    --- Command Handlers
/// 1. 사용자 등록
pub async fn handle_register_user(store: &dyn ListingStore, cmd: RegisterUserCommand) -> Result<User> {
    info!("{:<12} --> 사용자 등록 요청: {:?}", "Command", cmd);
    let user = store.create_user(cmd.validate()?).await?;
    info!("{:<12} --> 사용자 등록 완료 id: {}", "Command", user.id);
    Ok(user)
}

/// 2. 상품 등록
pub async fn handle_create_listing(
    store: &dyn ListingStore,
    owner: UserId,
    cmd: CreateListingCommand,
) -> Result<Listing> {
    info!("{:<12} --> 상품 등록 요청: {:?}", "Command", cmd);
    let new = cmd.validate()?;
    let listing = store.create_listing(owner, new).await?;
    info!("{:<12} --> 상품 등록 완료 id: {}", "Command", listing.id);
    Ok(listing)
}

/// 3. 입찰
pub async fn handle_place_bid(store: &dyn ListingStore, cmd: PlaceBidCommand) -> Result<Bid> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    let amount: Amount = cmd
        .amount
        .parse()
        .map_err(|_| Error::invalid("Enter a valid bid amount."))?;

    match store.place_bid(cmd.listing_id, cmd.bidder_id, amount).await {
        Ok(bid) => {
            info!(
                "{:<12} --> 입찰 성공: listing={}, amount={}",
                "Command", cmd.listing_id, bid.amount
            );
            Ok(bid)
        }
        Err(Error::BidRejected(rejection)) => {
            warn!(
                "{:<12} --> 입찰 거절: listing={}, amount={}, code={}",
                "Command",
                cmd.listing_id,
                amount,
                rejection.code()
            );
            Err(rejection.into())
        }
        Err(e) => Err(e),
    }
}

/// 4. 경매 종료
/// 등록자가 아닌 경우 상태는 바뀌지 않고 NotListingOwner 로 알린다.
pub async fn handle_close_listing(
    store: &dyn ListingStore,
    cmd: CloseListingCommand,
) -> Result<CloseOutcome> {
    info!("{:<12} --> 경매 종료 요청: {:?}", "Command", cmd);
    match store.close_listing(cmd.listing_id, cmd.user_id).await? {
        CloseOutcome::NotOwner => {
            warn!(
                "{:<12} --> 등록자가 아닌 사용자의 종료 요청: listing={}, user={}",
                "Command", cmd.listing_id, cmd.user_id
            );
            Err(Error::NotListingOwner)
        }
        outcome => Ok(outcome),
    }
}

/// 5. 관심 목록 토글
pub async fn handle_toggle_watch(
    store: &dyn ListingStore,
    cmd: ToggleWatchCommand,
) -> Result<WatchState> {
    info!("{:<12} --> 관심 목록 토글: {:?}", "Command", cmd);
    store.toggle_watch(cmd.listing_id, cmd.user_id).await
}

/// 6. 댓글 작성 (빈 댓글 허용)
pub async fn handle_add_comment(store: &dyn ListingStore, cmd: AddCommentCommand) -> Result<Comment> {
    info!("{:<12} --> 댓글 작성: listing={}", "Command", cmd.listing_id);
    store
        .add_comment(cmd.listing_id, cmd.commenter_id, &cmd.text)
        .await
}
// endregion: --- Command Handlers

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BidRejection;
    use crate::store::InMemoryListingStore;

    fn create(title: &str) -> CreateListingCommand {
        CreateListingCommand {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn listing_only_needs_a_title() {
        let new = create("thing").validate().unwrap();
        assert_eq!(new.title, "thing");
        assert_eq!(new.starting_price, Some(Money::zero(Currency::Usd)));
        assert_eq!(new.category, None);
    }

    #[test]
    fn validates_listing_fields() {
        assert!(create("   ").validate().is_err());
        assert!(create(&"x".repeat(101)).validate().is_err());

        let cmd = CreateListingCommand {
            starting_price: Some("2x".to_string()),
            ..create("thing")
        };
        assert_eq!(
            cmd.validate().unwrap_err().to_string(),
            "Invalid starting bid"
        );

        let cmd = CreateListingCommand {
            image_url: Some("not a url".to_string()),
            ..create("thing")
        };
        assert!(cmd.validate().is_err());

        let cmd = CreateListingCommand {
            category: Some("Garden".to_string()),
            ..create("thing")
        };
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn accepts_full_listing_form() {
        let new = CreateListingCommand {
            title: "Sweet Thing".to_string(),
            description: Some("cool gadget".to_string()),
            starting_price: Some("2".to_string()),
            currency: Some("eur".to_string()),
            category: Some("Fashion".to_string()),
            image_url: Some("https://image.com".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(new.starting_price.unwrap().to_string(), "2.00 EUR");
        assert_eq!(new.category, Some(Category::Fashion));
        assert_eq!(new.image_url.as_deref(), Some("https://image.com"));
    }

    #[tokio::test]
    async fn non_owner_close_is_reported_and_listing_stays_open() {
        let store = InMemoryListingStore::new();
        let joe = handle_register_user(&store, RegisterUserCommand { username: "joe".into() })
            .await
            .unwrap();
        let max = handle_register_user(&store, RegisterUserCommand { username: "max".into() })
            .await
            .unwrap();
        let listing = handle_create_listing(&store, joe.id, create("thing"))
            .await
            .unwrap();

        let err = handle_close_listing(
            &store,
            CloseListingCommand {
                listing_id: listing.id,
                user_id: max.id,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotListingOwner));
        assert!(!store.get_listing(listing.id).await.unwrap().closed);

        let outcome = handle_close_listing(
            &store,
            CloseListingCommand {
                listing_id: listing.id,
                user_id: joe.id,
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome, CloseOutcome::Closed);

        let err = handle_place_bid(
            &store,
            PlaceBidCommand {
                listing_id: listing.id,
                bidder_id: max.id,
                amount: "100".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::BidRejected(BidRejection::ListingClosed)));
    }

    #[tokio::test]
    async fn malformed_bid_amount_is_invalid_input() {
        let store = InMemoryListingStore::new();
        let err = handle_place_bid(
            &store,
            PlaceBidCommand {
                listing_id: 1,
                bidder_id: 1,
                amount: "lots".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }
}
