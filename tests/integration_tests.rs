use auction_listings::config::Config;
use auction_listings::database::DatabaseManager;
use auction_listings::handlers::{AppState, USER_ID_HEADER};
use auction_listings::listing::model::NewListing;
use auction_listings::routes;
use auction_listings::store::{InMemoryListingStore, ListingStore, PostgresListingStore};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// 트레이싱 초기화
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// 메모리 저장소로 서버 실행 후 주소 반환
async fn spawn_app() -> String {
    init_tracing();
    let store = Arc::new(InMemoryListingStore::new());
    let app = routes::app(AppState::new(store));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    format!("http://{}", addr)
}

struct TestClient {
    base: String,
    client: Client,
}

impl TestClient {
    async fn new() -> Self {
        Self {
            base: spawn_app().await,
            client: Client::new(),
        }
    }

    async fn register(&self, username: &str) -> i64 {
        let response = self
            .client
            .post(format!("{}/users", self.base))
            .json(&json!({ "username": username }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
    }

    async fn post(&self, user: Option<i64>, path: &str, body: Value) -> (StatusCode, Value) {
        let mut request = self.client.post(format!("{}{}", self.base, path)).json(&body);
        if let Some(user) = user {
            request = request.header(USER_ID_HEADER, user.to_string());
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn get(&self, user: Option<i64>, path: &str) -> (StatusCode, Value) {
        let mut request = self.client.get(format!("{}{}", self.base, path));
        if let Some(user) = user {
            request = request.header(USER_ID_HEADER, user.to_string());
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn create_listing(&self, owner: i64, body: Value) -> i64 {
        let (status, listing) = self.post(Some(owner), "/listings", body).await;
        assert_eq!(status, StatusCode::CREATED, "{listing}");
        listing["id"].as_i64().unwrap()
    }

    async fn bid(&self, user: i64, listing: i64, amount: &str) -> (StatusCode, Value) {
        self.post(
            Some(user),
            &format!("/listings/{listing}/bids"),
            json!({ "amount": amount }),
        )
        .await
    }
}

/// 입찰 시나리오 테스트
#[tokio::test]
async fn test_bid_sequence() {
    let app = TestClient::new().await;
    let joe = app.register("joe").await;
    let max = app.register("max").await;
    let listing = app
        .create_listing(joe, json!({ "title": "Sweet Thing", "starting_price": "5.00" }))
        .await;

    let (status, body) = app.bid(max, listing, "4.00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BID_TOO_LOW");

    let (status, _) = app.bid(max, listing, "5.00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.bid(max, listing, "5.50").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["current_price"]["amount"], "5.50");

    let (status, _) = app.bid(joe, listing, "5.50").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.bid(joe, listing, "6.00").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, detail) = app.get(Some(joe), &format!("/listings/{listing}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["price"]["amount"], "6.00");
    assert_eq!(detail["price"]["currency"], "USD");
    assert_eq!(detail["bid_count"], 2);
    assert_eq!(detail["highest_bidder"], joe);
    assert_eq!(detail["user_is_highest_bidder"], true);
    assert!(detail["winner"].is_null());
}

/// 경매 종료 및 낙찰자 테스트
#[tokio::test]
async fn test_close_listing() {
    let app = TestClient::new().await;
    let joe = app.register("joe").await;
    let max = app.register("max").await;

    // 입찰 없이 종료
    let empty = app.create_listing(joe, json!({ "title": "nobody wants" })).await;
    let (status, body) = app.post(Some(joe), &format!("/listings/{empty}/close"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["closed"], true);
    assert!(body["winner"].is_null());

    // 한 명 입찰 후 종료
    let listing = app.create_listing(joe, json!({ "title": "thing" })).await;
    let (status, _) = app.bid(max, listing, "4.00").await;
    assert_eq!(status, StatusCode::CREATED);

    // 등록자가 아닌 사용자의 종료 요청
    let (status, body) = app.post(Some(max), &format!("/listings/{listing}/close"), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_LISTING_OWNER");
    let (_, detail) = app.get(None, &format!("/listings/{listing}")).await;
    assert_eq!(detail["closed"], false);

    let (status, body) = app.post(Some(joe), &format!("/listings/{listing}/close"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "CLOSED");
    assert_eq!(body["winner"], max);

    // 두 번 종료해도 동일
    let (status, body) = app.post(Some(joe), &format!("/listings/{listing}/close"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "ALREADY_CLOSED");
    assert_eq!(body["winner"], max);

    // 종료된 상품 입찰 불가
    let (status, body) = app.bid(joe, listing, "1000.00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "LISTING_CLOSED");
    assert_eq!(body["error"], "You cannot place a bid on a closed listing.");

    // 종료 목록 / 진행 목록
    let (_, closed) = app.get(None, "/listings/closed").await;
    assert_eq!(closed.as_array().unwrap().len(), 2);
    let (_, active) = app.get(None, "/listings").await;
    assert!(active.as_array().unwrap().is_empty());
}

/// 관심 목록 테스트
#[tokio::test]
async fn test_watchlist_toggle() {
    let app = TestClient::new().await;
    let joe = app.register("joe").await;
    let max = app.register("max").await;
    let listing = app.create_listing(joe, json!({ "title": "thing" })).await;

    let (_, watchlist) = app.get(Some(max), "/watchlist").await;
    assert!(watchlist.as_array().unwrap().is_empty());

    let (status, body) = app.post(Some(max), &format!("/listings/{listing}/watch"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["watching"], true);

    let (_, watchlist) = app.get(Some(max), "/watchlist").await;
    assert_eq!(watchlist[0]["id"], listing);
    let (_, detail) = app.get(Some(max), &format!("/listings/{listing}")).await;
    assert_eq!(detail["is_watched_by_user"], true);

    let (_, body) = app.post(Some(max), &format!("/listings/{listing}/watch"), json!({})).await;
    assert_eq!(body["watching"], false);
    let (_, watchlist) = app.get(Some(max), "/watchlist").await;
    assert!(watchlist.as_array().unwrap().is_empty());
}

/// 댓글 테스트
#[tokio::test]
async fn test_comments() {
    let app = TestClient::new().await;
    let joe = app.register("joe").await;
    let listing = app.create_listing(joe, json!({ "title": "thing" })).await;

    let (status, _) = app
        .post(Some(joe), &format!("/listings/{listing}/comments"), json!({ "text": "best ever" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post(Some(joe), &format!("/listings/{listing}/comments"), json!({ "text": "" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, detail) = app.get(None, &format!("/listings/{listing}")).await;
    let comments = detail["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["text"], "best ever");
    assert_eq!(comments[0]["commenter"], joe);
}

/// 상품 등록 및 카테고리 테스트
#[tokio::test]
async fn test_create_listing_and_categories() {
    let app = TestClient::new().await;
    let joe = app.register("joe").await;

    let (status, body) = app.post(Some(joe), "/listings", json!({ "title": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = app
        .post(Some(joe), "/listings", json!({ "title": "thing", "starting_price": "2x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid starting bid");

    let listing = app
        .create_listing(
            joe,
            json!({
                "title": "jacket",
                "description": "warm",
                "starting_price": "20",
                "currency": "EUR",
                "category": "Fashion",
                "image_url": "https://image.com/jacket.png",
            }),
        )
        .await;
    app.create_listing(joe, json!({ "title": "robot", "category": "Toys" }))
        .await;

    let (_, detail) = app.get(None, &format!("/listings/{listing}")).await;
    assert_eq!(detail["starting_price"]["amount"], "20.00");
    assert_eq!(detail["starting_price"]["currency"], "EUR");
    assert_eq!(detail["owner"], joe);
    assert!(detail.get("is_watched_by_user").is_none());

    let (_, categories) = app.get(None, "/categories").await;
    assert_eq!(categories, json!(["Fashion", "Toys", "Electronics", "Home"]));

    let (_, fashion) = app.get(None, "/categories/Fashion/listings").await;
    assert_eq!(fashion.as_array().unwrap().len(), 1);
    assert_eq!(fashion[0]["title"], "jacket");

    let (status, _) = app.get(None, "/categories/Garden/listings").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, active) = app.get(None, "/listings").await;
    assert_eq!(active.as_array().unwrap().len(), 2);
    // 최신순
    assert_eq!(active[0]["title"], "robot");
}

/// 인증 및 사용자 테스트
#[tokio::test]
async fn test_requires_current_user() {
    let app = TestClient::new().await;
    let joe = app.register("joe").await;

    let (status, body) = app.post(None, "/listings", json!({ "title": "thing" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let (status, _) = app.get(None, "/watchlist").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.post(None, "/users", json!({ "username": "joe" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username already taken.");

    let (status, _) = app.get(Some(joe), "/listings/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// 동시성 입찰 테스트 (같은 금액은 하나만 성공)
#[tokio::test]
async fn test_concurrent_bidding() {
    let app = Arc::new(TestClient::new().await);
    let owner = app.register("owner").await;
    let listing = app
        .create_listing(owner, json!({ "title": "hot item", "starting_price": "1.00" }))
        .await;

    let mut bidders = Vec::new();
    for i in 0..20 {
        bidders.push(app.register(&format!("bidder{i}")).await);
    }

    let mut handles = vec![];
    for bidder in bidders {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            app.bid(bidder, listing, "10.00").await.0
        }));
    }

    let mut successful_bids = 0;
    for handle in handles {
        if handle.await.unwrap() == StatusCode::CREATED {
            successful_bids += 1;
        }
    }
    info!("성공한 입찰 수: {}", successful_bids);
    assert_eq!(successful_bids, 1);

    let (_, detail) = app.get(None, &format!("/listings/{listing}")).await;
    assert_eq!(detail["bid_count"], 1);
}

/// Postgres 저장소 동시성 테스트 (DATABASE_URL 필요)
#[tokio::test]
#[ignore]
async fn test_postgres_concurrent_bidding() {
    init_tracing();
    let config = Config::from_env().expect("DATABASE_URL must be set");
    let db_manager = Arc::new(DatabaseManager::connect(&config).await.unwrap());
    db_manager.initialize_database(false).await.unwrap();
    let store = Arc::new(PostgresListingStore::new(Arc::clone(&db_manager)));

    let suffix = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let owner = store.create_user(&format!("owner-{suffix}")).await.unwrap();
    let listing = store
        .create_listing(
            owner.id,
            NewListing {
                title: "동시성 입찰 테스트 상품".to_string(),
                description: None,
                starting_price: None,
                category: None,
                image_url: None,
            },
        )
        .await
        .unwrap();

    let listing_id = listing.id;
    let mut handles = vec![];
    for i in 0..20 {
        let store = Arc::clone(&store);
        let bidder = store
            .create_user(&format!("bidder-{suffix}-{i}"))
            .await
            .unwrap();
        handles.push(tokio::spawn(async move {
            store
                .place_bid(listing_id, bidder.id, "10.00".parse().unwrap())
                .await
                .is_ok()
        }));
    }

    let mut successful_bids = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successful_bids += 1;
        }
    }
    assert_eq!(successful_bids, 1);
    assert_eq!(store.get_bids(listing_id).await.unwrap().len(), 1);
}
