pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod types;

pub use error::ApiError;
pub use extract::{JsonBody, PathParam, QueryParams, SHARER_USER_ID_HEADER, SharerUserId};
pub use router::create_router;
pub use types::*;
