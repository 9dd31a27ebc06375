//! Background jobs.

pub mod population;

pub use population::{
    populate_daily_conferences, HeldLock, PopulationLock, PopulationOutcome,
    DAILY_POPULATION_LOCK,
};
