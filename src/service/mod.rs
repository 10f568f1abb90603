pub mod bid_service;
pub mod error;
pub mod message_events;
pub mod notification_service;
