pub mod ddb;
pub mod events;
pub mod logs;
pub mod sns;
pub mod factory;

// GatewayPublisherVia selects where circulation events are published
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum GatewayPublisherVia {
    Sns,
    LocalDynamoDB,
    Logs,
}
