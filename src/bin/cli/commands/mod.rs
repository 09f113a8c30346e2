pub mod cards;
pub mod delete;
pub mod export;
pub mod import;
pub mod list;
pub mod new;
pub mod quiz;
pub mod show;
