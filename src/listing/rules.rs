/// 경매 상품 도메인 규칙
/// 1. 입찰 검증
/// 2. 현재가 / 최고 입찰자 / 낙찰자 계산
/// 3. 경매 종료
/// 4. 관심 목록 토글
///
/// 파생 값은 저장하지 않고 (상품, 입찰 목록)에서 매번 계산한다.
// region:    --- Imports
use super::model::{Bid, Listing, UserId};
use super::money::{Amount, Money};
use crate::error::BidRejection;
use serde::Serialize;

// endregion: --- Imports

// region:    --- Bid Acceptance
/// 1. 입찰 검증
/// 종료된 상품이면 ListingClosed, 시작가 이하 또는 기존 입찰가 이하이면 BidTooLow
pub fn check_bid(listing: &Listing, bids: &[Bid], amount: Amount) -> Result<(), BidRejection> {
    if listing.closed {
        return Err(BidRejection::ListingClosed);
    }
    if let Some(starting_price) = listing.starting_price {
        if amount <= starting_price.amount {
            return Err(BidRejection::BidTooLow);
        }
    }
    if bids.iter().any(|bid| bid.amount.amount >= amount) {
        return Err(BidRejection::BidTooLow);
    }
    Ok(())
}
// endregion: --- Bid Acceptance

// region:    --- Derived Values
/// 최고 입찰
pub fn highest_bid(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().max_by_key(|bid| bid.amount.amount)
}

/// 2. 현재가: 최고 입찰가, 입찰이 없으면 시작가
pub fn current_price(listing: &Listing, bids: &[Bid]) -> Option<Money> {
    highest_bid(bids)
        .map(|bid| bid.amount)
        .or(listing.starting_price)
}

pub fn highest_bidder(bids: &[Bid]) -> Option<UserId> {
    highest_bid(bids).map(|bid| bid.bidder)
}

/// 낙찰자는 종료된 상품에서만 확인 가능
pub fn winner(listing: &Listing, bids: &[Bid]) -> Option<UserId> {
    if listing.closed {
        highest_bidder(bids)
    } else {
        None
    }
}
// endregion: --- Derived Values

// region:    --- Close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloseOutcome {
    Closed,
    AlreadyClosed,
    /// 상태 변경 없음
    NotOwner,
}

/// 3. 경매 종료 (등록자만 가능, 한번 종료되면 다시 열리지 않음)
pub fn close(listing: &mut Listing, user: UserId) -> CloseOutcome {
    if listing.owner != user {
        return CloseOutcome::NotOwner;
    }
    if listing.closed {
        return CloseOutcome::AlreadyClosed;
    }
    listing.closed = true;
    CloseOutcome::Closed
}
// endregion: --- Close

// region:    --- Watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WatchState {
    Watching,
    NotWatching,
}

impl WatchState {
    pub fn is_watching(self) -> bool {
        matches!(self, WatchState::Watching)
    }
}

/// 4. 관심 목록 토글
pub fn toggle_watch(listing: &mut Listing, user: UserId) -> WatchState {
    if listing.watchers.remove(&user) {
        WatchState::NotWatching
    } else {
        listing.watchers.insert(user);
        WatchState::Watching
    }
}
// endregion: --- Watch
