//! 业务服务层

mod money_service;

pub use money_service::MoneyService;
