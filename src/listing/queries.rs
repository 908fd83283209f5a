// region:    --- Imports
use super::model::{ListingId, UserId};
use super::views::{ListingDetail, ListingSummary};
use crate::error::Result;
use crate::store::{ListingFilter, ListingStore};
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// 상품 상세 조회
pub async fn get_listing_detail(
    store: &dyn ListingStore,
    id: ListingId,
    viewer: Option<UserId>,
) -> Result<ListingDetail> {
    info!("{:<12} --> 상품 상세 조회 id: {}", "Query", id);
    let listing = store.get_listing(id).await?;
    let bids = store.get_bids(id).await?;
    let comments = store.get_comments(id).await?;
    Ok(ListingDetail::new(listing, bids, comments, viewer))
}

/// 상품 목록 조회
pub async fn get_listing_summaries(
    store: &dyn ListingStore,
    filter: ListingFilter,
) -> Result<Vec<ListingSummary>> {
    info!("{:<12} --> 상품 목록 조회: {:?}", "Query", filter);
    let listings = store.list_listings(filter).await?;
    let mut summaries = Vec::with_capacity(listings.len());
    for listing in listings {
        let bids = store.get_bids(listing.id).await?;
        summaries.push(ListingSummary::new(listing, &bids));
    }
    Ok(summaries)
}

// endregion: --- Query Handlers
