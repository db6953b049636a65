mod common;

use chrono::{DateTime, Duration, Utc};
use rusty_shareit::adapters::memory::{self, InMemoryStore};
use rusty_shareit::application::{self, ApplicationError, BookingDetails, ServiceDependencies};
use rusty_shareit::domain::commands::*;
use rusty_shareit::domain::{
    Booking, BookingFilter, BookingId, BookingStatus, Item, ItemId, NewBooking, NewItem,
    Pagination, RequestId, UserId,
};
use rusty_shareit::ports::{self, BookingRepository, ItemRepository, UserRepository};
use std::sync::{Arc, Mutex};

use common::{add_item, add_user, memory_deps};

// ============================================================================
// ヘルパー
// ============================================================================

/// 任意の時点で申し込んだ予約を作成する（過去の予約を用意するため）
async fn book_at(
    deps: &ServiceDependencies,
    booker_id: UserId,
    item_id: ItemId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    requested_at: DateTime<Utc>,
) -> BookingDetails {
    application::create_booking(
        deps,
        CreateBooking {
            booker_id,
            item_id,
            start,
            end,
            requested_at,
        },
    )
    .await
    .expect("Failed to create booking")
}

async fn decide(
    deps: &ServiceDependencies,
    booking: &BookingDetails,
    owner_id: UserId,
    approved: bool,
) -> Result<BookingDetails, ApplicationError> {
    application::decide_booking(
        deps,
        DecideBooking {
            booking_id: booking.booking.id,
            owner_id,
            approved,
        },
    )
    .await
}

async fn comment(
    deps: &ServiceDependencies,
    item_id: ItemId,
    author_id: UserId,
    now: DateTime<Utc>,
) -> Result<application::CommentDetails, ApplicationError> {
    application::add_comment(
        deps,
        AddComment {
            item_id,
            author_id,
            text: "Worked great".to_string(),
            created_at: now,
        },
    )
    .await
}

async fn unavailable_item(deps: &ServiceDependencies, owner_id: UserId) -> Item {
    application::create_item(
        deps,
        CreateItem {
            owner_id,
            name: "Ladder".to_string(),
            description: Some("Broken".to_string()),
            available: Some(false),
            request_id: None,
        },
    )
    .await
    .unwrap()
}

// ============================================================================
// ポートのテスト用実装
// ============================================================================

/// 検索の呼び出し回数を数えるItemRepository
struct CountingItemRepository {
    inner: Arc<dyn ItemRepository>,
    searches: Mutex<usize>,
}

impl CountingItemRepository {
    fn new(inner: Arc<dyn ItemRepository>) -> Self {
        Self {
            inner,
            searches: Mutex::new(0),
        }
    }

    fn searches(&self) -> usize {
        *self.searches.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl ItemRepository for CountingItemRepository {
    async fn insert(&self, item: NewItem) -> ports::Result<Item> {
        self.inner.insert(item).await
    }

    async fn update(&self, item: Item) -> ports::Result<Option<Item>> {
        self.inner.update(item).await
    }

    async fn find_by_id(&self, item_id: ItemId) -> ports::Result<Option<Item>> {
        self.inner.find_by_id(item_id).await
    }

    async fn find_by_ids(&self, item_ids: &[ItemId]) -> ports::Result<Vec<Item>> {
        self.inner.find_by_ids(item_ids).await
    }

    async fn find_by_owner(&self, owner_id: UserId) -> ports::Result<Vec<Item>> {
        self.inner.find_by_owner(owner_id).await
    }

    async fn search(&self, needle: &str, page: Pagination) -> ports::Result<Vec<Item>> {
        *self.searches.lock().unwrap() += 1;
        self.inner.search(needle, page).await
    }

    async fn find_by_requests(
        &self,
        request_ids: &[RequestId],
        exclude_owner: Option<UserId>,
    ) -> ports::Result<Vec<Item>> {
        self.inner.find_by_requests(request_ids, exclude_owner).await
    }
}

/// 承認・却下の書き込み直前に割り込む操作
enum Interleaved {
    /// 別の判断が先にステータスを変更する
    Decide(BookingStatus),
    /// 予約者が削除され、予約も連鎖して消える
    DeleteBooker(UserId),
}

/// 次の`update_status`の直前に1回だけ`Interleaved`を実行するBookingRepository
struct InterleavingBookingRepository {
    store: Arc<InMemoryStore>,
    pending: Mutex<Option<Interleaved>>,
}

impl InterleavingBookingRepository {
    fn new(store: Arc<InMemoryStore>, interleaved: Interleaved) -> Self {
        Self {
            store,
            pending: Mutex::new(Some(interleaved)),
        }
    }
}

#[async_trait::async_trait]
impl BookingRepository for InterleavingBookingRepository {
    async fn insert(&self, booking: NewBooking) -> ports::Result<Booking> {
        BookingRepository::insert(&*self.store, booking).await
    }

    async fn update_status(
        &self,
        booking_id: BookingId,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> ports::Result<Option<Booking>> {
        let pending = self.pending.lock().unwrap().take();
        match pending {
            Some(Interleaved::Decide(other)) => {
                self.store.update_status(booking_id, expected, other).await?;
            }
            Some(Interleaved::DeleteBooker(user_id)) => {
                UserRepository::delete(&*self.store, user_id).await?;
            }
            None => {}
        }
        self.store.update_status(booking_id, expected, status).await
    }

    async fn find_by_id(&self, booking_id: BookingId) -> ports::Result<Option<Booking>> {
        BookingRepository::find_by_id(&*self.store, booking_id).await
    }

    async fn find_by_booker(
        &self,
        booker_id: UserId,
        filter: BookingFilter,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> ports::Result<Vec<Booking>> {
        self.store.find_by_booker(booker_id, filter, now, page).await
    }

    async fn find_by_items(
        &self,
        item_ids: &[ItemId],
        filter: BookingFilter,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> ports::Result<Vec<Booking>> {
        BookingRepository::find_by_items(&*self.store, item_ids, filter, now, page).await
    }

    async fn find_last_for_items(
        &self,
        item_ids: &[ItemId],
        now: DateTime<Utc>,
    ) -> ports::Result<Vec<Booking>> {
        self.store.find_last_for_items(item_ids, now).await
    }

    async fn find_next_for_items(
        &self,
        item_ids: &[ItemId],
        now: DateTime<Utc>,
    ) -> ports::Result<Vec<Booking>> {
        self.store.find_next_for_items(item_ids, now).await
    }

    async fn find_completed_approved(
        &self,
        booker_id: UserId,
        item_id: ItemId,
        now: DateTime<Utc>,
    ) -> ports::Result<Vec<Booking>> {
        self.store
            .find_completed_approved(booker_id, item_id, now)
            .await
    }
}

/// AnnaのアイテムへのBorisの予約を用意し、承認・却下に`Interleaved`を挟む依存関係を返す
async fn interleaved_setup(
    interleaved: impl FnOnce(UserId) -> Interleaved,
) -> (ServiceDependencies, BookingDetails, UserId) {
    let store = Arc::new(InMemoryStore::new());
    let plain = memory::service_dependencies(store.clone());
    let anna = add_user(&plain, "Anna").await;
    let boris = add_user(&plain, "Boris").await;
    let drill = add_item(&plain, anna.id, "Drill").await;
    let now = Utc::now();
    let booking = book_at(
        &plain,
        boris.id,
        drill.id,
        now + Duration::days(1),
        now + Duration::days(2),
        now,
    )
    .await;

    let deps = ServiceDependencies {
        bookings: Arc::new(InterleavingBookingRepository::new(store, interleaved(boris.id))),
        ..plain
    };
    (deps, booking, anna.id)
}

// ============================================================================
// ユーザー
// ============================================================================

#[tokio::test]
async fn test_create_user_rejects_duplicate_email() {
    let deps = memory_deps();
    add_user(&deps, "Anna").await;

    let result = application::create_user(
        &deps,
        CreateUser {
            name: "Other Anna".to_string(),
            email: "anna@example.com".to_string(),
        },
    )
    .await;

    assert!(matches!(result, Err(ApplicationError::DuplicateEmail)));
}

#[tokio::test]
async fn test_update_user_email_conflicts_only_with_other_users() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    add_user(&deps, "Boris").await;

    // 自分のメールアドレスの再指定は重複ではない
    let same = application::update_user(
        &deps,
        UpdateUser {
            user_id: anna.id,
            name: Some("Anna K".to_string()),
            email: Some("anna@example.com".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(same.name, "Anna K");
    assert_eq!(same.email, "anna@example.com");

    let taken = application::update_user(
        &deps,
        UpdateUser {
            user_id: anna.id,
            name: None,
            email: Some("boris@example.com".to_string()),
        },
    )
    .await;
    assert!(matches!(taken, Err(ApplicationError::DuplicateEmail)));
}

#[tokio::test]
async fn test_update_unknown_user_is_not_found() {
    let deps = memory_deps();
    let result = application::update_user(
        &deps,
        UpdateUser {
            user_id: UserId::new(99),
            name: Some("Ghost".to_string()),
            email: None,
        },
    )
    .await;
    assert!(matches!(result, Err(ApplicationError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_user_removes_owned_items() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let drill = add_item(&deps, anna.id, "Drill").await;

    application::delete_user(&deps, anna.id).await.unwrap();

    assert!(matches!(
        application::get_user(&deps, anna.id).await,
        Err(ApplicationError::NotFound(_))
    ));
    assert!(matches!(
        application::get_item(&deps, drill.id).await,
        Err(ApplicationError::NotFound(_))
    ));
    assert!(matches!(
        application::delete_user(&deps, anna.id).await,
        Err(ApplicationError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_items_by_owner_only_returns_own_items() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let drill = add_item(&deps, anna.id, "Drill").await;
    let saw = add_item(&deps, anna.id, "Saw").await;
    add_item(&deps, boris.id, "Ladder").await;

    let ids: Vec<ItemId> = application::get_items_by_owner(&deps, anna.id)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(ids, vec![drill.id, saw.id]);

    assert!(matches!(
        application::get_items_by_owner(&deps, UserId::new(999)).await,
        Err(ApplicationError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_users_in_id_order() {
    let deps = memory_deps();
    add_user(&deps, "Anna").await;
    add_user(&deps, "Boris").await;

    let names: Vec<_> = application::list_users(&deps)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Anna", "Boris"]);
}

// ============================================================================
// アイテム
// ============================================================================

#[tokio::test]
async fn test_create_item_requires_available_flag() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;

    let result = application::create_item(
        &deps,
        CreateItem {
            owner_id: anna.id,
            name: "Drill".to_string(),
            description: Some("Cordless".to_string()),
            available: None,
            request_id: None,
        },
    )
    .await;
    assert!(matches!(result, Err(ApplicationError::Validation(_))));
}

#[tokio::test]
async fn test_create_item_for_unknown_owner_or_request_is_not_found() {
    let deps = memory_deps();
    let unknown_owner = application::create_item(
        &deps,
        CreateItem {
            owner_id: UserId::new(42),
            name: "Drill".to_string(),
            description: Some("Cordless".to_string()),
            available: Some(true),
            request_id: None,
        },
    )
    .await;
    assert!(matches!(unknown_owner, Err(ApplicationError::NotFound(_))));

    let anna = add_user(&deps, "Anna").await;
    let unknown_request = application::create_item(
        &deps,
        CreateItem {
            owner_id: anna.id,
            name: "Drill".to_string(),
            description: Some("Cordless".to_string()),
            available: Some(true),
            request_id: Some(RequestId::new(7)),
        },
    )
    .await;
    assert!(matches!(unknown_request, Err(ApplicationError::NotFound(_))));
}

#[tokio::test]
async fn test_update_item_only_by_owner() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let drill = add_item(&deps, anna.id, "Drill").await;

    let by_other = application::update_item(
        &deps,
        UpdateItem {
            item_id: drill.id,
            user_id: boris.id,
            name: None,
            description: None,
            available: Some(false),
        },
    )
    .await;
    assert!(matches!(by_other, Err(ApplicationError::NotOwner)));

    let by_owner = application::update_item(
        &deps,
        UpdateItem {
            item_id: drill.id,
            user_id: anna.id,
            name: None,
            description: None,
            available: Some(false),
        },
    )
    .await
    .unwrap();
    assert!(!by_owner.available);
    assert_eq!(by_owner.name, "Drill");
    assert_eq!(by_owner.owner_id, anna.id);
}

#[tokio::test]
async fn test_search_matches_available_items_case_insensitively() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let drill = add_item(&deps, anna.id, "Power DRILL").await;
    add_item(&deps, anna.id, "Saw").await;
    unavailable_item(&deps, anna.id).await;

    let found = application::search_items(&deps, "drill", 0, 10).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, drill.id);

    // 説明にも一致する
    let by_description = application::search_items(&deps, "FOR RENT", 0, 10).await.unwrap();
    assert_eq!(by_description.len(), 2);

    // 貸出不可のアイテムは含まない
    let none = application::search_items(&deps, "ladder", 0, 10).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_search_blank_text_is_empty_but_pagination_is_still_validated() {
    let plain = memory_deps();
    let items = Arc::new(CountingItemRepository::new(plain.items.clone()));
    let deps = ServiceDependencies {
        items: items.clone(),
        ..plain
    };
    let anna = add_user(&deps, "Anna").await;
    add_item(&deps, anna.id, "Drill").await;

    // 空白のみの検索語ではストレージを参照しない
    assert!(application::search_items(&deps, "  ", 0, 10).await.unwrap().is_empty());
    assert!(application::search_items(&deps, "", 0, 10).await.unwrap().is_empty());
    assert_eq!(items.searches(), 0);

    let found = application::search_items(&deps, "drill", 0, 10).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(items.searches(), 1);

    assert!(matches!(
        application::search_items(&deps, "", -1, 10).await,
        Err(ApplicationError::Validation(_))
    ));
    assert!(matches!(
        application::search_items(&deps, "drill", 0, 0).await,
        Err(ApplicationError::Validation(_))
    ));
}

// ============================================================================
// 予約
// ============================================================================

#[tokio::test]
async fn test_owner_cannot_book_own_item_even_if_unavailable() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let ladder = unavailable_item(&deps, anna.id).await;
    let now = Utc::now();

    let result = application::create_booking(
        &deps,
        CreateBooking {
            booker_id: anna.id,
            item_id: ladder.id,
            start: now + Duration::days(1),
            end: now + Duration::days(2),
            requested_at: now,
        },
    )
    .await;
    assert!(matches!(result, Err(ApplicationError::BookerIsOwner)));
}

#[tokio::test]
async fn test_booking_unavailable_item_fails() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let ladder = unavailable_item(&deps, anna.id).await;
    let now = Utc::now();

    let result = application::create_booking(
        &deps,
        CreateBooking {
            booker_id: boris.id,
            item_id: ladder.id,
            start: now + Duration::days(1),
            end: now + Duration::days(2),
            requested_at: now,
        },
    )
    .await;
    assert!(matches!(result, Err(ApplicationError::UnavailableItem)));
}

#[tokio::test]
async fn test_booking_period_is_validated() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let drill = add_item(&deps, anna.id, "Drill").await;
    let now = Utc::now();

    for (start, end) in [
        (now + Duration::days(2), now + Duration::days(1)),
        (now + Duration::days(1), now + Duration::days(1)),
        (now - Duration::days(1), now + Duration::days(1)),
    ] {
        let result = application::create_booking(
            &deps,
            CreateBooking {
                booker_id: boris.id,
                item_id: drill.id,
                start,
                end,
                requested_at: now,
            },
        )
        .await;
        assert!(matches!(result, Err(ApplicationError::Validation(_))));
    }
}

#[tokio::test]
async fn test_approve_flow_and_terminal_states() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let drill = add_item(&deps, anna.id, "Drill").await;
    let now = Utc::now();

    let booking = book_at(
        &deps,
        boris.id,
        drill.id,
        now + Duration::days(1),
        now + Duration::days(2),
        now,
    )
    .await;
    assert_eq!(booking.booking.status, BookingStatus::Waiting);
    assert_eq!(booking.item.name, "Drill");
    assert_eq!(booking.booker.id, boris.id);

    // 予約者自身は承認できない
    assert!(matches!(
        decide(&deps, &booking, boris.id, true).await,
        Err(ApplicationError::CannotApprove)
    ));

    let approved = decide(&deps, &booking, anna.id, true).await.unwrap();
    assert_eq!(approved.booking.status, BookingStatus::Approved);

    assert!(matches!(
        decide(&deps, &booking, anna.id, true).await,
        Err(ApplicationError::SameApproveStatus(BookingStatus::Approved))
    ));
    assert!(matches!(
        decide(&deps, &booking, anna.id, false).await,
        Err(ApplicationError::AlreadyDecided(BookingStatus::Approved))
    ));
}

#[tokio::test]
async fn test_decision_losing_concurrent_update_reports_current_state() {
    // 先に却下された予約を承認しようとした
    let (deps, booking, owner) =
        interleaved_setup(|_| Interleaved::Decide(BookingStatus::Rejected)).await;
    assert!(matches!(
        decide(&deps, &booking, owner, true).await,
        Err(ApplicationError::AlreadyDecided(BookingStatus::Rejected))
    ));
    let stored = application::get_booking(&deps, booking.booking.id, owner)
        .await
        .unwrap();
    assert_eq!(stored.booking.status, BookingStatus::Rejected);

    // 同じ判断が先に書き込まれた
    let (deps, booking, owner) =
        interleaved_setup(|_| Interleaved::Decide(BookingStatus::Approved)).await;
    assert!(matches!(
        decide(&deps, &booking, owner, true).await,
        Err(ApplicationError::SameApproveStatus(BookingStatus::Approved))
    ));

    // 判断の途中で予約そのものが消えた
    let (deps, booking, owner) = interleaved_setup(Interleaved::DeleteBooker).await;
    assert!(matches!(
        decide(&deps, &booking, owner, false).await,
        Err(ApplicationError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_booking_visible_only_to_booker_and_owner() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let clara = add_user(&deps, "Clara").await;
    let drill = add_item(&deps, anna.id, "Drill").await;
    let now = Utc::now();

    let booking = book_at(
        &deps,
        boris.id,
        drill.id,
        now + Duration::days(1),
        now + Duration::days(2),
        now,
    )
    .await;

    assert!(application::get_booking(&deps, booking.booking.id, anna.id).await.is_ok());
    assert!(application::get_booking(&deps, booking.booking.id, boris.id).await.is_ok());
    assert!(matches!(
        application::get_booking(&deps, booking.booking.id, clara.id).await,
        Err(ApplicationError::NoAccessToBook)
    ));

    // 第三者は承認しようとしても参照権限で拒否される
    assert!(matches!(
        decide(&deps, &booking, clara.id, true).await,
        Err(ApplicationError::NoAccessToBook)
    ));
}

#[tokio::test]
async fn test_booking_lists_filter_by_state() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let drill = add_item(&deps, anna.id, "Drill").await;
    let now = Utc::now();
    let long_ago = now - Duration::days(30);

    let past = book_at(
        &deps,
        boris.id,
        drill.id,
        now - Duration::days(5),
        now - Duration::days(3),
        long_ago,
    )
    .await;
    decide(&deps, &past, anna.id, true).await.unwrap();
    let current = book_at(
        &deps,
        boris.id,
        drill.id,
        now - Duration::days(1),
        now + Duration::days(1),
        long_ago,
    )
    .await;
    decide(&deps, &current, anna.id, true).await.unwrap();
    let future = book_at(
        &deps,
        boris.id,
        drill.id,
        now + Duration::days(3),
        now + Duration::days(4),
        now,
    )
    .await;
    let rejected = book_at(
        &deps,
        boris.id,
        drill.id,
        now + Duration::days(6),
        now + Duration::days(7),
        now,
    )
    .await;
    decide(&deps, &rejected, anna.id, false).await.unwrap();

    let ids = |list: Vec<BookingDetails>| -> Vec<_> {
        list.into_iter().map(|b| b.booking.id).collect()
    };

    let all = application::list_booker_bookings(&deps, boris.id, BookingFilter::All, 0, 20, now)
        .await
        .unwrap();
    // 開始日時の降順
    assert_eq!(
        ids(all),
        vec![rejected.booking.id, future.booking.id, current.booking.id, past.booking.id]
    );

    let cases = [
        (BookingFilter::Past, vec![past.booking.id]),
        (BookingFilter::Current, vec![current.booking.id]),
        (BookingFilter::Future, vec![rejected.booking.id, future.booking.id]),
        (BookingFilter::Waiting, vec![future.booking.id]),
        (BookingFilter::Rejected, vec![rejected.booking.id]),
        (BookingFilter::Approved, vec![current.booking.id, past.booking.id]),
    ];
    for (filter, expected) in cases {
        let booker = application::list_booker_bookings(&deps, boris.id, filter, 0, 20, now)
            .await
            .unwrap();
        assert_eq!(ids(booker), expected, "booker {:?}", filter);

        let owner = application::list_owner_bookings(&deps, anna.id, filter, 0, 20, now)
            .await
            .unwrap();
        assert_eq!(ids(owner), expected, "owner {:?}", filter);
    }

    // 所有者から見た予約者一覧には予約者本人は含まれない
    let none = application::list_booker_bookings(&deps, anna.id, BookingFilter::All, 0, 20, now)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_booking_lists_validate_pagination_and_user() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let now = Utc::now();

    assert!(matches!(
        application::list_booker_bookings(&deps, anna.id, BookingFilter::All, -1, 10, now).await,
        Err(ApplicationError::Validation(_))
    ));
    assert!(matches!(
        application::list_booker_bookings(&deps, anna.id, BookingFilter::All, 0, 0, now).await,
        Err(ApplicationError::Validation(_))
    ));
    assert!(matches!(
        application::list_owner_bookings(&deps, anna.id, BookingFilter::All, -1, 10, now).await,
        Err(ApplicationError::Validation(_))
    ));
    assert!(matches!(
        application::list_owner_bookings(&deps, anna.id, BookingFilter::All, 0, 0, now).await,
        Err(ApplicationError::Validation(_))
    ));
    assert!(matches!(
        application::list_owner_bookings(&deps, UserId::new(77), BookingFilter::All, 0, 10, now)
            .await,
        Err(ApplicationError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_booking_list_pagination_uses_adjusted_page() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let drill = add_item(&deps, anna.id, "Drill").await;
    let now = Utc::now();

    let mut created = Vec::new();
    for day in 1..=5 {
        let booking = book_at(
            &deps,
            boris.id,
            drill.id,
            now + Duration::days(day),
            now + Duration::days(day) + Duration::hours(1),
            now,
        )
        .await;
        created.push(booking.booking.id);
    }
    // 開始日時の降順：day5, day4, day3, day2, day1
    created.reverse();

    // from=1, size=2 → ページ1 → offset 2
    let page = application::list_booker_bookings(&deps, boris.id, BookingFilter::All, 1, 2, now)
        .await
        .unwrap();
    let ids: Vec<_> = page.into_iter().map(|b| b.booking.id).collect();
    assert_eq!(ids, created[2..4].to_vec());

    // from=3, size=2 → ページ1（3 - 2）→ offset 2
    let page = application::list_booker_bookings(&deps, boris.id, BookingFilter::All, 3, 2, now)
        .await
        .unwrap();
    let ids: Vec<_> = page.into_iter().map(|b| b.booking.id).collect();
    assert_eq!(ids, created[2..4].to_vec());
}

// ============================================================================
// 直近・次回の予約
// ============================================================================

#[tokio::test]
async fn test_item_details_last_and_next_for_owner_only() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let drill = add_item(&deps, anna.id, "Drill").await;
    let now = Utc::now();
    let long_ago = now - Duration::days(30);

    let b1 = book_at(
        &deps,
        boris.id,
        drill.id,
        now - Duration::days(4),
        now - Duration::days(2),
        long_ago,
    )
    .await;
    decide(&deps, &b1, anna.id, true).await.unwrap();
    let b2 = book_at(
        &deps,
        boris.id,
        drill.id,
        now - Duration::days(1),
        now + Duration::days(1),
        long_ago,
    )
    .await;
    decide(&deps, &b2, anna.id, true).await.unwrap();
    let b3 = book_at(
        &deps,
        boris.id,
        drill.id,
        now + Duration::days(4),
        now + Duration::days(5),
        now,
    )
    .await;

    let owner_view = application::get_item_details(&deps, drill.id, anna.id, now)
        .await
        .unwrap();
    assert_eq!(owner_view.last_booking.map(|b| b.id), Some(b2.booking.id));
    assert_eq!(owner_view.next_booking.map(|b| b.id), Some(b3.booking.id));

    let renter_view = application::get_item_details(&deps, drill.id, boris.id, now)
        .await
        .unwrap();
    assert!(renter_view.last_booking.is_none());
    assert!(renter_view.next_booking.is_none());
}

#[tokio::test]
async fn test_owner_items_with_bookings_come_first() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let idle = add_item(&deps, anna.id, "Idle").await;
    let busy = add_item(&deps, anna.id, "Busy").await;
    let now = Utc::now();

    let rejected = book_at(
        &deps,
        boris.id,
        idle.id,
        now + Duration::days(1),
        now + Duration::days(2),
        now,
    )
    .await;
    decide(&deps, &rejected, anna.id, false).await.unwrap();
    book_at(&deps, boris.id, busy.id, now + Duration::days(1), now + Duration::days(2), now).await;

    let items = application::get_owner_items_details(&deps, anna.id, now)
        .await
        .unwrap();
    let order: Vec<_> = items.iter().map(|d| d.item.id).collect();
    assert_eq!(order, vec![busy.id, idle.id]);
    assert!(items[0].next_booking.is_some());
    // 却下された予約は次回の予約にならない
    assert!(items[1].next_booking.is_none());
    assert!(items[1].last_booking.is_none());
}

// ============================================================================
// コメント
// ============================================================================

#[tokio::test]
async fn test_comment_requires_finished_approved_booking() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let drill = add_item(&deps, anna.id, "Drill").await;
    let now = Utc::now();

    // 予約なし
    assert!(matches!(
        comment(&deps, drill.id, boris.id, now).await,
        Err(ApplicationError::CannotComment)
    ));

    // 承認済みだが終了していない
    let upcoming = book_at(
        &deps,
        boris.id,
        drill.id,
        now + Duration::days(1),
        now + Duration::days(2),
        now,
    )
    .await;
    decide(&deps, &upcoming, anna.id, true).await.unwrap();
    assert!(matches!(
        comment(&deps, drill.id, boris.id, now).await,
        Err(ApplicationError::CannotComment)
    ));

    // 予約の終了後は投稿できる
    let later = now + Duration::days(3);
    let posted = comment(&deps, drill.id, boris.id, later).await.unwrap();
    assert_eq!(posted.author_name, "Boris");
    assert_eq!(posted.created, later);

    let details = application::get_item_details(&deps, drill.id, anna.id, later)
        .await
        .unwrap();
    assert_eq!(details.comments.len(), 1);
    assert_eq!(details.comments[0].text, "Worked great");
}

#[tokio::test]
async fn test_comment_after_rejected_booking_is_refused() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let drill = add_item(&deps, anna.id, "Drill").await;
    let now = Utc::now();

    let booking = book_at(
        &deps,
        boris.id,
        drill.id,
        now + Duration::days(1),
        now + Duration::days(2),
        now,
    )
    .await;
    decide(&deps, &booking, anna.id, false).await.unwrap();

    assert!(matches!(
        comment(&deps, drill.id, boris.id, now + Duration::days(3)).await,
        Err(ApplicationError::CannotComment)
    ));
}

#[tokio::test]
async fn test_comment_text_is_validated() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let drill = add_item(&deps, anna.id, "Drill").await;

    let result = application::add_comment(
        &deps,
        AddComment {
            item_id: drill.id,
            author_id: anna.id,
            text: "x".repeat(1001),
            created_at: Utc::now(),
        },
    )
    .await;
    assert!(matches!(result, Err(ApplicationError::Validation(_))));
}

// ============================================================================
// アイテムリクエスト
// ============================================================================

#[tokio::test]
async fn test_request_board_groups_answers() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;
    let boris = add_user(&deps, "Boris").await;
    let now = Utc::now();

    let older = application::create_request(
        &deps,
        CreateRequest {
            requestor_id: anna.id,
            description: "Need a drill".to_string(),
            created_at: now - Duration::hours(2),
        },
    )
    .await
    .unwrap();
    let newer = application::create_request(
        &deps,
        CreateRequest {
            requestor_id: anna.id,
            description: "Need a tent".to_string(),
            created_at: now,
        },
    )
    .await
    .unwrap();
    assert_eq!(newer.requestor.id, anna.id);

    let answer = application::create_item(
        &deps,
        CreateItem {
            owner_id: boris.id,
            name: "Drill".to_string(),
            description: Some("Cordless".to_string()),
            available: Some(true),
            request_id: Some(older.request.id),
        },
    )
    .await
    .unwrap();
    // 依頼者自身の回答は自分の一覧には含まれない
    application::create_item(
        &deps,
        CreateItem {
            owner_id: anna.id,
            name: "Old drill".to_string(),
            description: Some("Mine".to_string()),
            available: Some(true),
            request_id: Some(older.request.id),
        },
    )
    .await
    .unwrap();

    let mine = application::get_own_requests(&deps, anna.id).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].request.id, newer.request.id);
    assert!(mine[0].items.is_empty());
    assert_eq!(mine[1].request.id, older.request.id);
    let answer_ids: Vec<_> = mine[1].items.iter().map(|i| i.id).collect();
    assert_eq!(answer_ids, vec![answer.id]);

    let by_id = application::get_request(&deps, boris.id, older.request.id)
        .await
        .unwrap();
    assert_eq!(by_id.items.len(), 2);

    let others = application::get_other_requests(&deps, boris.id, 0, 10).await.unwrap();
    assert_eq!(others.len(), 2);
    assert!(application::get_other_requests(&deps, anna.id, 0, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_request_board_errors() {
    let deps = memory_deps();
    let anna = add_user(&deps, "Anna").await;

    assert!(matches!(
        application::create_request(
            &deps,
            CreateRequest {
                requestor_id: anna.id,
                description: " ".to_string(),
                created_at: Utc::now(),
            },
        )
        .await,
        Err(ApplicationError::Validation(_))
    ));
    assert!(matches!(
        application::get_request(&deps, anna.id, RequestId::new(5)).await,
        Err(ApplicationError::NotFound(_))
    ));
    assert!(matches!(
        application::get_other_requests(&deps, anna.id, -1, 10).await,
        Err(ApplicationError::Validation(_))
    ));
    assert!(matches!(
        application::get_other_requests(&deps, anna.id, 0, 0).await,
        Err(ApplicationError::Validation(_))
    ));
    assert!(matches!(
        application::get_own_requests(&deps, UserId::new(9)).await,
        Err(ApplicationError::NotFound(_))
    ));
}
