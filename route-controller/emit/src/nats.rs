use crate::{RoutePublisher, RouteSubject};
use route_sync_controller_core::Message;

/// Publishes route messages on NATS subjects.
pub struct NatsPublisher {
    client: async_nats::Client,
    register: String,
    unregister: String,
}

impl NatsPublisher {
    pub async fn connect(
        url: &str,
        register: impl ToString,
        unregister: impl ToString,
    ) -> anyhow::Result<Self> {
        let client = async_nats::connect(url).await?;
        Ok(Self {
            client,
            register: register.to_string(),
            unregister: unregister.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl RoutePublisher for NatsPublisher {
    async fn publish(&self, subject: RouteSubject, message: &Message) -> anyhow::Result<()> {
        let subject = match subject {
            RouteSubject::Register => self.register.clone(),
            RouteSubject::Unregister => self.unregister.clone(),
        };
        let payload = serde_json::to_vec(message)?;
        self.client.publish(subject, payload.into()).await?;
        Ok(())
    }
}
