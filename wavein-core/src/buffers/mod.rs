pub mod descriptor;
pub mod pool;
pub mod sample;
