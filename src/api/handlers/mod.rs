/*!
 * HTTP handler implementations
 */

pub mod account_handlers;
pub mod admin_handlers;
pub mod invite_handlers;
pub mod page_handlers;
