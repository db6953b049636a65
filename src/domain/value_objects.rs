use serde::{Deserialize, Serialize};

use super::InvalidPagination;

/// 連番IDの値オブジェクトを定義する
///
/// ストレージ側で採番される`BIGSERIAL`をそのまま保持する。
/// エンティティ間の参照はすべてこの型で行い、生の`i64`を混同しないようにする。
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// ユーザーID
    UserId
);
define_id!(
    /// アイテムID
    ItemId
);
define_id!(
    /// 予約ID
    BookingId
);
define_id!(
    /// コメントID
    CommentId
);
define_id!(
    /// アイテムリクエストID
    RequestId
);

/// 一覧取得のページング指定
///
/// 不変条件：from >= 0 かつ size > 0
/// 不正な値は`Pagination::new`で拒否されるため、この型の値は常に有効。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    from: i64,
    size: i64,
}

impl Pagination {
    /// クエリパラメータ省略時の開始位置
    pub const DEFAULT_FROM: i64 = 0;
    /// クエリパラメータ省略時の件数
    pub const DEFAULT_SIZE: i64 = 2000;

    /// ページング指定を検証して作成する
    ///
    /// # エラー
    /// from < 0 または size <= 0 の場合は`InvalidPagination`を返す
    pub fn new(from: i64, size: i64) -> Result<Self, InvalidPagination> {
        if from < 0 || size <= 0 {
            return Err(InvalidPagination { from, size });
        }
        Ok(Self { from, size })
    }

    /// ページ番号
    ///
    /// from > size の場合のみ from - size、それ以外は from をそのまま使う。
    pub fn page(&self) -> i64 {
        if self.from > self.size {
            self.from - self.size
        } else {
            self.from
        }
    }

    /// 読み飛ばす行数（ページ番号 × 件数）
    pub fn offset(&self) -> i64 {
        self.page().saturating_mul(self.size)
    }

    /// 取得する最大行数
    pub fn limit(&self) -> i64 {
        self.size
    }

    /// インメモリ実装向けに`usize`の(offset, limit)へ変換する
    pub fn window(&self) -> (usize, usize) {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit()).unwrap_or(usize::MAX);
        (offset, limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            from: Self::DEFAULT_FROM,
            size: Self::DEFAULT_SIZE,
        }
    }
}
