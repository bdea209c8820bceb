pub mod markdown;
pub mod notion;
pub mod payload;
