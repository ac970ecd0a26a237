pub mod handler_404;
pub mod render;
