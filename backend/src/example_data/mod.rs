//! Startup wiring for example data seeding.

mod startup;

pub use startup::seed_example_data_on_startup;
