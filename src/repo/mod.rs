pub mod telemetry;

#[cfg(test)]
pub mod memory;
