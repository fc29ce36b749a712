pub mod debate;
pub mod docket;
pub mod dto;
pub mod hosting;
pub mod judge;
pub mod matchroom;
pub mod records;
pub mod types;
