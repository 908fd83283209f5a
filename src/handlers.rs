// region:    --- Imports
use crate::error::{Error, Result};
use crate::listing::commands::{
    self, AddCommentCommand, CloseListingCommand, CreateListingCommand, PlaceBidCommand,
    RegisterUserCommand, ToggleWatchCommand,
};
use crate::listing::model::{Category, ListingId, UserId};
use crate::listing::queries;
use crate::listing::rules;
use crate::store::{ListingFilter, SharedListingStore};
use axum::async_trait;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

// region:    --- State & Extractors
#[derive(Clone)]
pub struct AppState {
    pub store: SharedListingStore,
}

impl AppState {
    pub fn new(store: SharedListingStore) -> Self {
        Self { store }
    }
}

/// 현재 사용자 식별 헤더 (인증 계층 대신 사용)
pub const USER_ID_HEADER: &str = "x-user-id";

fn user_id_from(parts: &Parts) -> Option<UserId> {
    parts
        .headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// 로그인 필수
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        user_id_from(parts)
            .map(CurrentUser)
            .ok_or(Error::Unauthenticated)
    }
}

/// 로그인 선택
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<UserId>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_id_from(parts)))
    }
}
// endregion: --- State & Extractors

// region:    --- Request Bodies
#[derive(Debug, Deserialize)]
pub struct BidForm {
    pub amount: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}
// endregion: --- Request Bodies

// region:    --- Command Handlers

/// 사용자 등록
pub async fn handle_register(
    State(state): State<AppState>,
    Json(cmd): Json<RegisterUserCommand>,
) -> Result<impl IntoResponse> {
    let user = commands::handle_register_user(state.store.as_ref(), cmd).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// 상품 등록
pub async fn handle_create_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(cmd): Json<CreateListingCommand>,
) -> Result<impl IntoResponse> {
    let listing = commands::handle_create_listing(state.store.as_ref(), user, cmd).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// 입찰 요청 처리
pub async fn handle_bid(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(listing_id): Path<ListingId>,
    Json(form): Json<BidForm>,
) -> Result<impl IntoResponse> {
    // 문자열("5.50")과 숫자(5.5) 모두 허용
    let amount = match form.amount {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    };
    let cmd = PlaceBidCommand {
        listing_id,
        bidder_id: user,
        amount,
    };
    let bid = commands::handle_place_bid(state.store.as_ref(), cmd).await?;
    let bids = state.store.get_bids(listing_id).await?;
    let listing = state.store.get_listing(listing_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Bid placed.",
            "bid": bid,
            "current_price": rules::current_price(&listing, &bids),
        })),
    ))
}

/// 경매 종료
pub async fn handle_close(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(listing_id): Path<ListingId>,
) -> Result<impl IntoResponse> {
    let cmd = CloseListingCommand {
        listing_id,
        user_id: user,
    };
    let outcome = commands::handle_close_listing(state.store.as_ref(), cmd).await?;
    let detail = queries::get_listing_detail(state.store.as_ref(), listing_id, Some(user)).await?;
    Ok(Json(serde_json::json!({
        "outcome": outcome,
        "closed": detail.closed,
        "winner": detail.winner,
    })))
}

/// 관심 목록 토글
pub async fn handle_watch(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(listing_id): Path<ListingId>,
) -> Result<impl IntoResponse> {
    let cmd = ToggleWatchCommand {
        listing_id,
        user_id: user,
    };
    let watch_state = commands::handle_toggle_watch(state.store.as_ref(), cmd).await?;
    Ok(Json(serde_json::json!({ "watching": watch_state.is_watching() })))
}

/// 댓글 작성
pub async fn handle_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(listing_id): Path<ListingId>,
    Json(form): Json<CommentForm>,
) -> Result<impl IntoResponse> {
    let cmd = AddCommentCommand {
        listing_id,
        commenter_id: user,
        text: form.text,
    };
    let comment = commands::handle_add_comment(state.store.as_ref(), cmd).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 진행 중인 상품 조회
pub async fn handle_get_active_listings(State(state): State<AppState>) -> Result<impl IntoResponse> {
    info!("{:<12} --> 진행 중인 상품 조회", "HandlerQuery");
    let listings = queries::get_listing_summaries(state.store.as_ref(), ListingFilter::Active).await?;
    Ok(Json(listings))
}

/// 종료된 상품 조회
pub async fn handle_get_closed_listings(State(state): State<AppState>) -> Result<impl IntoResponse> {
    info!("{:<12} --> 종료된 상품 조회", "HandlerQuery");
    let listings = queries::get_listing_summaries(state.store.as_ref(), ListingFilter::Closed).await?;
    Ok(Json(listings))
}

/// 상품 조회
pub async fn handle_get_listing(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(listing_id): Path<ListingId>,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 상품 조회 id: {}", "HandlerQuery", listing_id);
    let detail = queries::get_listing_detail(state.store.as_ref(), listing_id, viewer).await?;
    Ok(Json(detail))
}

/// 관심 상품 조회
pub async fn handle_get_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 관심 상품 조회 user: {}", "HandlerQuery", user);
    let listings =
        queries::get_listing_summaries(state.store.as_ref(), ListingFilter::WatchedBy(user)).await?;
    Ok(Json(listings))
}

/// 카테고리 목록
pub async fn handle_get_categories() -> impl IntoResponse {
    Json(Category::ALL.map(Category::as_str))
}

/// 카테고리별 상품 조회
pub async fn handle_get_listings_in_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 카테고리별 상품 조회: {}", "HandlerQuery", category);
    let category = category
        .parse::<Category>()
        .map_err(|e| Error::invalid(format!("{e}")))?;
    let listings =
        queries::get_listing_summaries(state.store.as_ref(), ListingFilter::Category(category))
            .await?;
    Ok(Json(listings))
}

// endregion: --- Query Handlers
