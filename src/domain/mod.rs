pub mod booking;
pub mod commands;
pub mod comment;
pub mod errors;
pub mod item;
pub mod request;
pub mod user;
pub mod value_objects;

pub use booking::{Booking, BookingFilter, BookingPeriod, BookingStatus, NewBooking};
pub use comment::{Comment, NewComment, MAX_COMMENT_LENGTH};
pub use errors::*;
pub use item::{Item, ItemPatch, NewItem};
pub use request::{ItemRequest, NewItemRequest, RequestAnswer};
pub use user::{NewUser, User, UserPatch};
pub use value_objects::*;
