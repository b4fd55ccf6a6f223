mod handler;
mod model;

pub use handler::insert_game;
