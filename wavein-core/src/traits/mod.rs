pub mod capture_device;
pub mod capture_sink;
