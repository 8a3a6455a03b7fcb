pub mod app;
mod draw;
mod hit;
mod search_box;
