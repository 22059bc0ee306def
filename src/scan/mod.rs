pub mod coerce;
pub mod record;
pub mod select;
