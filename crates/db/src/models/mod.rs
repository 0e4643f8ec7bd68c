pub mod analysis;
pub mod data_source;
pub mod device;
pub mod device_connection;
pub mod network;

#[cfg(test)]
pub(crate) mod test_utils;
