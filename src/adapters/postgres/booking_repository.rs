use crate::domain::{
    Booking, BookingFilter, BookingId, BookingStatus, ItemId, NewBooking, Pagination, UserId,
};
use crate::ports::{BookingRepository as BookingRepositoryTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use std::str::FromStr;

use super::invalid_data;

const BOOKING_COLUMNS: &str = "id, start_date, end_date, item_id, booker_id, status";

fn map_row_to_booking(row: &PgRow) -> Result<Booking> {
    let status_str: &str = row.get("status");
    let status = BookingStatus::from_str(status_str).map_err(invalid_data)?;

    Ok(Booking {
        id: BookingId::new(row.get("id")),
        item_id: ItemId::new(row.get("item_id")),
        booker_id: UserId::new(row.get("booker_id")),
        start: row.get("start_date"),
        end: row.get("end_date"),
        status,
    })
}

/// 絞り込み条件をWHERE句に追加する（先頭に` AND`を付ける）
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: BookingFilter, now: DateTime<Utc>) {
    match filter {
        BookingFilter::All => {}
        BookingFilter::Current => {
            qb.push(" AND start_date < ")
                .push_bind(now)
                .push(" AND end_date > ")
                .push_bind(now);
        }
        BookingFilter::Past => {
            qb.push(" AND end_date < ").push_bind(now);
        }
        BookingFilter::Future => {
            qb.push(" AND start_date > ").push_bind(now);
        }
        BookingFilter::Waiting | BookingFilter::Approved | BookingFilter::Rejected => {
            if let Some(status) = filter.status() {
                qb.push(" AND status = ").push_bind(status.as_str());
            }
        }
    }
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: Pagination) {
    qb.push(" ORDER BY start_date DESC, id DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
}

/// BookingRepositoryのPostgreSQL実装
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepositoryTrait for BookingRepository {
    async fn insert(&self, booking: NewBooking) -> Result<Booking> {
        let row = sqlx::query(
            r#"
            INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, start_date, end_date, item_id, booker_id, status
            "#,
        )
        .bind(booking.start)
        .bind(booking.end)
        .bind(booking.item_id.value())
        .bind(booking.booker_id.value())
        .bind(booking.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        map_row_to_booking(&row)
    }

    /// 読み取り時点のステータスを条件とした更新（compare-and-set）
    async fn update_status(
        &self,
        booking_id: BookingId,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> Result<Option<Booking>> {
        let row = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $3
            WHERE id = $1 AND status = $2
            RETURNING id, start_date, end_date, item_id, booker_id, status
            "#,
        )
        .bind(booking_id.value())
        .bind(expected.as_str())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_booking).transpose()
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        let row = sqlx::query(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(booking_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_booking).transpose()
    }

    async fn find_by_booker(
        &self,
        booker_id: UserId,
        filter: BookingFilter,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<Vec<Booking>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(BOOKING_COLUMNS)
            .push(" FROM bookings WHERE booker_id = ")
            .push_bind(booker_id.value());
        push_filter(&mut qb, filter, now);
        push_page(&mut qb, page);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(map_row_to_booking).collect()
    }

    async fn find_by_items(
        &self,
        item_ids: &[ItemId],
        filter: BookingFilter,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<Vec<Booking>> {
        let ids: Vec<i64> = item_ids.iter().map(|id| id.value()).collect();

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(BOOKING_COLUMNS)
            .push(" FROM bookings WHERE item_id = ANY(")
            .push_bind(ids)
            .push(")");
        push_filter(&mut qb, filter, now);
        push_page(&mut qb, page);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(map_row_to_booking).collect()
    }

    /// アイテムごとに終了日時が最も遅い候補を1件ずつ返す
    ///
    /// 候補：終了済み、または進行中で、REJECTED以外。
    async fn find_last_for_items(
        &self,
        item_ids: &[ItemId],
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let ids: Vec<i64> = item_ids.iter().map(|id| id.value()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status
            FROM (
                SELECT
                    b.*,
                    ROW_NUMBER() OVER (PARTITION BY b.item_id ORDER BY b.end_date DESC, b.id DESC) AS rn
                FROM bookings b
                WHERE b.item_id = ANY($1)
                  AND b.status <> 'REJECTED'
                  AND (b.end_date < $2 OR (b.start_date < $2 AND b.end_date > $2))
            ) ranked
            WHERE rn = 1
            ORDER BY item_id
            "#,
        )
        .bind(ids)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_booking).collect()
    }

    /// アイテムごとに開始日時が最も早い候補を1件ずつ返す
    ///
    /// 候補：開始前で、REJECTED以外。
    async fn find_next_for_items(
        &self,
        item_ids: &[ItemId],
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let ids: Vec<i64> = item_ids.iter().map(|id| id.value()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status
            FROM (
                SELECT
                    b.*,
                    ROW_NUMBER() OVER (PARTITION BY b.item_id ORDER BY b.start_date ASC, b.id ASC) AS rn
                FROM bookings b
                WHERE b.item_id = ANY($1)
                  AND b.status <> 'REJECTED'
                  AND b.start_date > $2
            ) ranked
            WHERE rn = 1
            ORDER BY item_id
            "#,
        )
        .bind(ids)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_booking).collect()
    }

    async fn find_completed_approved(
        &self,
        booker_id: UserId,
        item_id: ItemId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status
            FROM bookings
            WHERE booker_id = $1
              AND item_id = $2
              AND status = 'APPROVED'
              AND end_date < $3
            ORDER BY end_date DESC
            "#,
        )
        .bind(booker_id.value())
        .bind(item_id.value())
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_booking).collect()
    }
}
