pub mod health;
pub mod scene;
