pub mod analysis_repository;
pub mod data_source_repository;
pub mod device_repository;
pub mod network_repository;

pub use analysis_repository::AnalysisRepository;
pub use data_source_repository::DataSourceRepository;
pub use device_repository::DeviceRepository;
pub use network_repository::NetworkRepository;
