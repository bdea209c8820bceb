pub mod blocks;
pub mod challenges;
pub mod language;
pub mod links;
pub mod modules;
pub mod progress;
