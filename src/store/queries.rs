/// 사용자 생성
pub const INSERT_USER: &str =
    "INSERT INTO users (username) VALUES ($1) ON CONFLICT (username) DO NOTHING RETURNING id, username";

/// 사용자 조회
pub const GET_USER: &str = "SELECT id, username FROM users WHERE id = $1";

/// 상품 생성
pub const INSERT_LISTING: &str = r#"
    INSERT INTO listings (title, description, starting_price, currency, category, image_url, owner_id)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id, title, description, starting_price, currency, category, image_url, owner_id, closed, created_at
"#;

/// 상품 조회
pub const GET_LISTING: &str = "SELECT id, title, description, starting_price, currency, category, image_url, owner_id, closed, created_at FROM listings WHERE id = $1";

/// 상품 조회 (행 잠금)
pub const LOCK_LISTING: &str = "SELECT id, title, description, starting_price, currency, category, image_url, owner_id, closed, created_at FROM listings WHERE id = $1 FOR UPDATE";

/// 진행 중인 상품 조회
pub const GET_ACTIVE_LISTINGS: &str = "SELECT id, title, description, starting_price, currency, category, image_url, owner_id, closed, created_at FROM listings WHERE closed = FALSE ORDER BY created_at DESC, id DESC";

/// 종료된 상품 조회
pub const GET_CLOSED_LISTINGS: &str = "SELECT id, title, description, starting_price, currency, category, image_url, owner_id, closed, created_at FROM listings WHERE closed = TRUE ORDER BY created_at DESC, id DESC";

/// 카테고리별 상품 조회
pub const GET_LISTINGS_IN_CATEGORY: &str = "SELECT id, title, description, starting_price, currency, category, image_url, owner_id, closed, created_at FROM listings WHERE category = $1 ORDER BY created_at DESC, id DESC";

/// 관심 상품 조회
pub const GET_WATCHED_LISTINGS: &str = r#"
    SELECT l.id, l.title, l.description, l.starting_price, l.currency, l.category, l.image_url, l.owner_id, l.closed, l.created_at
    FROM listings l
    JOIN listing_watchers w ON w.listing_id = l.id
    WHERE w.user_id = $1
    ORDER BY l.created_at DESC, l.id DESC
"#;

/// 상품 관심 사용자 조회
pub const GET_WATCHERS: &str = "SELECT user_id FROM listing_watchers WHERE listing_id = $1";

/// 여러 상품의 관심 사용자 조회
pub const GET_WATCHERS_FOR_LISTINGS: &str =
    "SELECT listing_id, user_id FROM listing_watchers WHERE listing_id = ANY($1)";

/// 관심 추가
pub const INSERT_WATCHER: &str =
    "INSERT INTO listing_watchers (listing_id, user_id) VALUES ($1, $2)";

/// 관심 해제
pub const DELETE_WATCHER: &str =
    "DELETE FROM listing_watchers WHERE listing_id = $1 AND user_id = $2";

/// 상품 종료
pub const CLOSE_LISTING: &str = "UPDATE listings SET closed = TRUE WHERE id = $1";

/// 상품 입찰 조회
pub const GET_LISTING_BIDS: &str = r#"
    SELECT id, listing_id, bidder_id, amount, currency, created_at
    FROM bids
    WHERE listing_id = $1
    ORDER BY amount DESC, id DESC
"#;

/// 입찰 추가
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (listing_id, bidder_id, amount, currency)
    VALUES ($1, $2, $3, $4)
    RETURNING id, listing_id, bidder_id, amount, currency, created_at
"#;

/// 상품 댓글 조회
pub const GET_LISTING_COMMENTS: &str = r#"
    SELECT id, listing_id, commenter_id AS commenter, text, created_at
    FROM comments
    WHERE listing_id = $1
    ORDER BY created_at ASC, id ASC
"#;

/// 댓글 추가
pub const INSERT_COMMENT: &str = r#"
    INSERT INTO comments (listing_id, commenter_id, text)
    VALUES ($1, $2, $3)
    RETURNING id, listing_id, commenter_id AS commenter, text, created_at
"#;
