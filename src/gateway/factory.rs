use crate::core::library::TransitionKind;
use crate::core::repository::RepositoryStore;
use crate::gateway::ddb::publisher::{DDBPublisher, EVENT_TABLE};
use crate::gateway::events::EventPublisher;
use crate::gateway::GatewayPublisherVia;
use crate::gateway::logs::publisher::LogsPublisher;
use crate::gateway::sns::publisher::SNSPublisher;
use crate::utils::ddb::{build_db_client, build_sns_client, create_table};

pub(crate) const CIRCULATION_TRANSITIONS: [TransitionKind; 5] = [
    TransitionKind::CheckOut,
    TransitionKind::CheckIn,
    TransitionKind::PlaceHold,
    TransitionKind::MarkLost,
    TransitionKind::MarkFound,
];

pub(crate) async fn create_publisher(via: GatewayPublisherVia) -> Box<dyn EventPublisher> {
    match via {
        GatewayPublisherVia::Sns => {
            let client = build_sns_client().await;
            Box::new(SNSPublisher::new(client))
        }
        GatewayPublisherVia::LocalDynamoDB => {
            let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
            let _ = create_table(&client, &EVENT_TABLE).await;
            Box::new(DDBPublisher::new(client, EVENT_TABLE.table_name))
        }
        GatewayPublisherVia::Logs => {
            Box::new(LogsPublisher::new())
        }
    }
}

// registers a topic for every circulation event so that publish can resolve it
pub(crate) async fn register_circulation_topics(publisher: &mut Box<dyn EventPublisher>) {
    for transition in CIRCULATION_TRANSITIONS {
        if let Err(err) = publisher.create_topic(transition.event_name()).await {
            tracing::warn!(topic = transition.event_name(), error = %err, "failed to create topic");
        }
    }
}
