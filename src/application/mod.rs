mod bookings;
mod comments;
mod dependencies;
mod errors;
mod items;
mod requests;
mod users;
mod views;

pub use bookings::{
    create_booking, decide_booking, get_booking, list_booker_bookings, list_owner_bookings,
};
pub use comments::add_comment;
pub use dependencies::ServiceDependencies;
pub use errors::{ApplicationError, Result};
pub use items::{
    create_item, get_item, get_item_details, get_items_by_owner, get_owner_items_details,
    search_items, update_item,
};
pub use requests::{create_request, get_other_requests, get_own_requests, get_request};
pub use users::{create_user, delete_user, get_user, list_users, update_user};
pub use views::{BookingDetails, CommentDetails, ItemDetails, RequestDetails};
