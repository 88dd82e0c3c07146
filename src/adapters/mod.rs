pub mod couch;
pub mod defaults;
