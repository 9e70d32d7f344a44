//! Pure routing of transport events
//!
//! Collapses the rumqttc event stream into the four notifications the
//! session cares about, so the dispatch logic stays testable without I/O.

use rumqttc::{Event, Packet, SubscribeReasonCode};

/// Session-level view of one transport event.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Broker answered the connect request.
    ConnectAcknowledged { code: rumqttc::ConnectReturnCode },
    /// Inbound message on some topic. The payload is raw bytes; it is not
    /// retained beyond handling this event.
    Message { topic: String, payload: Vec<u8> },
    /// Broker answered the subscribe request.
    SubscriptionConfirmed {
        return_codes: Vec<SubscribeReasonCode>,
    },
    /// Broker closed the session.
    Disconnected,
    /// Pings, acks and other plumbing.
    Infrastructure,
    /// Outbound traffic, handled by the transport.
    Outgoing,
}

/// Route a transport event to its session-level meaning.
pub fn route_event(event: &Event) -> SessionEvent {
    match event {
        Event::Incoming(packet) => match packet {
            Packet::ConnAck(ack) => SessionEvent::ConnectAcknowledged { code: ack.code },
            Packet::Publish(publish) => SessionEvent::Message {
                topic: publish.topic.clone(),
                payload: publish.payload.to_vec(),
            },
            Packet::SubAck(suback) => SessionEvent::SubscriptionConfirmed {
                return_codes: suback.return_codes.clone(),
            },
            Packet::Disconnect => SessionEvent::Disconnected,
            _ => SessionEvent::Infrastructure,
        },
        Event::Outgoing(_) => SessionEvent::Outgoing,
    }
}

/// Check the broker granted every requested subscription.
pub fn subscription_accepted(return_codes: &[SubscribeReasonCode]) -> bool {
    !return_codes.is_empty()
        && return_codes
            .iter()
            .all(|code| matches!(code, SubscribeReasonCode::Success(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::{ConnAck, ConnectReturnCode, Publish, QoS, SubAck};

    #[test]
    fn connack_routes_with_return_code() {
        let event = Event::Incoming(Packet::ConnAck(ConnAck {
            session_present: false,
            code: ConnectReturnCode::Success,
        }));
        match route_event(&event) {
            SessionEvent::ConnectAcknowledged { code } => {
                assert_eq!(code, ConnectReturnCode::Success);
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn publish_routes_to_message_with_raw_payload() {
        let publish = Publish::new("sensors/temp", QoS::AtLeastOnce, b"22C".to_vec());
        let event = Event::Incoming(Packet::Publish(publish));
        match route_event(&event) {
            SessionEvent::Message { topic, payload } => {
                assert_eq!(topic, "sensors/temp");
                assert_eq!(payload, b"22C");
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn disconnect_routes_to_disconnected() {
        let event = Event::Incoming(Packet::Disconnect);
        assert!(matches!(route_event(&event), SessionEvent::Disconnected));
    }

    #[test]
    fn ping_response_is_infrastructure() {
        let event = Event::Incoming(Packet::PingResp);
        assert!(matches!(route_event(&event), SessionEvent::Infrastructure));
    }

    #[test]
    fn suback_routes_with_return_codes() {
        let suback = SubAck::new(1, vec![SubscribeReasonCode::Success(QoS::AtLeastOnce)]);
        let event = Event::Incoming(Packet::SubAck(suback));
        match route_event(&event) {
            SessionEvent::SubscriptionConfirmed { return_codes } => {
                assert!(subscription_accepted(&return_codes));
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn failed_return_code_rejects_subscription() {
        assert!(!subscription_accepted(&[SubscribeReasonCode::Failure]));
        assert!(!subscription_accepted(&[
            SubscribeReasonCode::Success(QoS::AtMostOnce),
            SubscribeReasonCode::Failure,
        ]));
        assert!(!subscription_accepted(&[]));
    }
}
