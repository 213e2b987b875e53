pub mod audit;
pub mod group;
pub mod nfr_code;
pub mod user;
