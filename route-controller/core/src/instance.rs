/// The wire identity shared by every [`Message`] emitted for one pod.
///
/// `instance_id` is the pod's name, so re-emitting the same desired state
/// (e.g. during resync) produces byte-identical messages.
///
/// [`Message`]: crate::Message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    pub name: String,
    pub instance_id: String,
    pub address: String,
    pub tls_port: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum MessageConstructionError {
    #[error("instance {instance_id} has no address")]
    MissingAddress { instance_id: String },
}

impl Instance {
    /// Builds the instance identity, rejecting pods that cannot be routed to.
    ///
    /// An instance without an address must never produce a message.
    pub fn new(
        name: impl ToString,
        instance_id: impl ToString,
        address: Option<&str>,
        tls_port: u16,
    ) -> Result<Self, MessageConstructionError> {
        let instance_id = instance_id.to_string();
        let address = match address {
            Some(addr) if !addr.is_empty() => addr.to_string(),
            _ => return Err(MessageConstructionError::MissingAddress { instance_id }),
        };

        Ok(Self {
            name: name.to_string(),
            instance_id,
            address,
            tls_port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_address_is_rejected() {
        assert!(Instance::new("app", "app-0", None, 0).is_err());
        assert!(Instance::new("app", "app-0", Some(""), 0).is_err());
        assert!(Instance::new("app", "app-0", Some("10.0.0.1"), 0).is_ok());
    }
}
