//! Panel pages

pub mod connection_error;
pub mod constants;
pub mod control;
pub mod page;

pub use connection_error::ConnectionErrorPage;
pub use control::ControlPage;
pub use page::{Page, PageWrapper};
