pub mod list_pages;
pub mod queue_event;
pub mod split_page;
pub mod transform;
