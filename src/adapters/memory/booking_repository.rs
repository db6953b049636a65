use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;

use crate::domain::{
    self, Booking, BookingFilter, BookingId, BookingStatus, ItemId, NewBooking, Pagination, UserId,
};
use crate::ports::{BookingRepository, Result};

use super::store::InMemoryStore;

/// 開始日時の降順（同時刻はIDの降順）に並べてページを切り出す
fn page_of(mut bookings: Vec<Booking>, page: Pagination) -> Vec<Booking> {
    bookings.sort_by_key(|b| Reverse((b.start, b.id)));
    let (offset, limit) = page.window();
    bookings.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert(&self, booking: NewBooking) -> Result<Booking> {
        let mut tables = self.lock()?;
        Ok(tables.bookings.insert_with(|id| Booking {
            id: BookingId::new(id),
            item_id: booking.item_id,
            booker_id: booking.booker_id,
            start: booking.start,
            end: booking.end,
            status: booking.status,
        }))
    }

    async fn update_status(
        &self,
        booking_id: BookingId,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> Result<Option<Booking>> {
        let mut tables = self.lock()?;
        match tables.bookings.get_mut(booking_id.value()) {
            Some(row) if row.status == expected => {
                row.status = status;
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        Ok(self.lock()?.bookings.get(booking_id.value()).cloned())
    }

    async fn find_by_booker(
        &self,
        booker_id: UserId,
        filter: BookingFilter,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<Vec<Booking>> {
        let tables = self.lock()?;
        let matched = tables
            .bookings
            .values()
            .filter(|b| b.booker_id == booker_id && filter.matches(b, now))
            .cloned()
            .collect();
        Ok(page_of(matched, page))
    }

    async fn find_by_items(
        &self,
        item_ids: &[ItemId],
        filter: BookingFilter,
        now: DateTime<Utc>,
        page: Pagination,
    ) -> Result<Vec<Booking>> {
        let tables = self.lock()?;
        let matched = tables
            .bookings
            .values()
            .filter(|b| item_ids.contains(&b.item_id) && filter.matches(b, now))
            .cloned()
            .collect();
        Ok(page_of(matched, page))
    }

    async fn find_last_for_items(
        &self,
        item_ids: &[ItemId],
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let tables = self.lock()?;
        let candidates = tables
            .bookings
            .values()
            .filter(|b| item_ids.contains(&b.item_id));
        let mut last: Vec<Booking> = domain::booking::last_per_item(candidates, now)
            .into_values()
            .collect();
        last.sort_by_key(|b| b.item_id);
        Ok(last)
    }

    async fn find_next_for_items(
        &self,
        item_ids: &[ItemId],
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let tables = self.lock()?;
        let candidates = tables
            .bookings
            .values()
            .filter(|b| item_ids.contains(&b.item_id));
        let mut next: Vec<Booking> = domain::booking::next_per_item(candidates, now)
            .into_values()
            .collect();
        next.sort_by_key(|b| b.item_id);
        Ok(next)
    }

    async fn find_completed_approved(
        &self,
        booker_id: UserId,
        item_id: ItemId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let tables = self.lock()?;
        Ok(tables
            .bookings
            .values()
            .filter(|b| b.booker_id == booker_id && b.item_id == item_id)
            .filter(|b| domain::booking::is_completed_approved(b, now))
            .cloned()
            .collect())
    }
}
