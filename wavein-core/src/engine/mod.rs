pub mod callback;
pub mod capture_engine;
