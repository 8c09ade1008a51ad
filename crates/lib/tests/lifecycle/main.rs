//! End-to-end lifecycle tests against the public chartdeck-lib API.

mod property_tests;
mod scenario_tests;
