//! インメモリ実装
//!
//! テストと`STORAGE_BACKEND=memory`での起動に使用する。
//! 全テーブルを1つのMutexで保護し、操作は直列に実行される。

mod booking_repository;
mod comment_repository;
mod item_repository;
mod request_repository;
mod store;
mod user_repository;

use std::sync::Arc;

use crate::application::ServiceDependencies;

pub use store::{InMemoryStore, StorePoisoned};

/// 1つのストアを共有する全リポジトリを組み立てる
pub fn service_dependencies(store: Arc<InMemoryStore>) -> ServiceDependencies {
    ServiceDependencies {
        users: store.clone(),
        items: store.clone(),
        bookings: store.clone(),
        comments: store.clone(),
        requests: store,
    }
}
