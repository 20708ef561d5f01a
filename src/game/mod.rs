//! Game rules shared by the shipped games: named trigger zones,
//! score keeping and the on-disk configuration they are loaded from.

pub mod config;
pub mod scoreboard;
pub mod zones;
