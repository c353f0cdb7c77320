pub mod currency;
pub mod projection;
pub mod schedule;
pub mod time_value;
