mod threshold_service;

pub use threshold_service::ThresholdService;
