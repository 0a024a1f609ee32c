//! HTTP surface: route groups, confined file lookup and form parsing.

mod files;
mod form;
mod routes;

pub use files::{Rejection, resolve_within};
pub use form::{FormFields, parse_form};
pub use routes::{AppState, NOT_FOUND_BODY, RouteGroup, create_router};
