use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{Booking, Comment, Item, ItemRequest, User};
use crate::ports::Result;

/// ロックが汚染されている（保持中のスレッドがpanicした）
#[derive(Debug, thiserror::Error)]
#[error("in-memory store lock is poisoned")]
pub struct StorePoisoned;

/// 連番IDを採番するテーブル
///
/// IDは1から始まり、削除されても再利用しない。
#[derive(Debug)]
pub(super) struct Arena<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Arena<T> {
    /// IDを採番して行を追加する
    pub(super) fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    pub(super) fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    pub(super) fn get_mut(&mut self, id: i64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub(super) fn remove(&mut self, id: i64) -> Option<T> {
        self.rows.remove(&id)
    }

    /// ID順に走査する
    pub(super) fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub(super) fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    pub(super) fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.rows.retain(|_, row| keep(row));
    }
}

#[derive(Debug, Default)]
pub(super) struct Tables {
    pub users: Arena<User>,
    pub items: Arena<Item>,
    pub bookings: Arena<Booking>,
    pub comments: Arena<Comment>,
    pub requests: Arena<ItemRequest>,
}

/// 全リポジトリポートを実装するインメモリストア
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StorePoisoned.into())
    }
}
