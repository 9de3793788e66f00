//! Tests for the ANCS attribute chain

use super::*;
use crate::error::{AncsError, AncsResult};
use proptest::prelude::*;

/// Calls made to the transport, in order
#[derive(Debug, Clone, PartialEq, Eq)]
enum Sent {
    Notification(u32, Vec<AttributeSpec>),
    App(Vec<u8>, Vec<AppAttributeKind>),
    NotificationSource(bool, CategoryMask),
    DataSource(bool),
}

#[derive(Debug, Default)]
struct MockTransport {
    sent: Vec<Sent>,
    fail: bool,
}

impl MockTransport {
    fn record(&mut self, sent: Sent) -> AncsResult<()> {
        if self.fail {
            return Err(AncsError::Transport("write failed".into()));
        }
        self.sent.push(sent);
        Ok(())
    }

    fn last(&self) -> Option<&Sent> {
        self.sent.last()
    }
}

impl AttributeTransport for MockTransport {
    fn request_notification_attributes(
        &mut self,
        notification_id: u32,
        attributes: &[AttributeSpec],
    ) -> AncsResult<()> {
        self.record(Sent::Notification(notification_id, attributes.to_vec()))
    }

    fn request_app_attributes(
        &mut self,
        identifier: &[u8],
        attributes: &[AppAttributeKind],
    ) -> AncsResult<()> {
        self.record(Sent::App(identifier.to_vec(), attributes.to_vec()))
    }

    fn enable_notification_source(&mut self, enabled: bool, categories: CategoryMask) -> AncsResult<()> {
        self.record(Sent::NotificationSource(enabled, categories))
    }

    fn enable_data_source(&mut self, enabled: bool) -> AncsResult<()> {
        self.record(Sent::DataSource(enabled))
    }
}

#[derive(Debug, Default)]
struct RecordingAlerts {
    alert: CoalescingAlert,
    completed: Vec<CompletedAttribute>,
    names: Vec<Vec<u8>>,
}

impl AlertSink for RecordingAlerts {
    fn cancel_pending_alert(&mut self) {
        self.alert.cancel_pending_alert();
    }

    fn send_alert(&mut self) {
        self.alert.send_alert();
    }

    fn attribute_completed(&mut self, attribute: &CompletedAttribute) {
        self.completed.push(attribute.clone());
    }

    fn app_name(&mut self, name: &[u8]) {
        self.names.push(name.to_vec());
    }
}

type TestClient = AncsClient<MockTransport, RecordingAlerts>;

fn new_client() -> TestClient {
    AncsClient::new(MockTransport::default(), RecordingAlerts::default())
}

fn event(notification_id: u32) -> NotificationSourceEvent {
    NotificationSourceEvent {
        event_id: ANCS_EVENT_ADDED,
        ..modified(notification_id)
    }
}

fn modified(notification_id: u32) -> NotificationSourceEvent {
    NotificationSourceEvent {
        event_id: ANCS_EVENT_MODIFIED,
        event_flags: 0,
        category_id: ANCS_CATEGORY_SOCIAL,
        category_count: 1,
        notification_id,
    }
}

fn head(kind: AttributeKind, declared: u16, payload: &[u8]) -> Vec<u8> {
    let mut raw = vec![kind.to_u8()];
    raw.extend_from_slice(&declared.to_le_bytes());
    raw.extend_from_slice(payload);
    raw
}

fn requested(notification_id: u32, kind: AttributeKind, max_length: Option<u16>) -> Sent {
    Sent::Notification(notification_id, vec![AttributeSpec { kind, max_length }])
}

fn awaiting(notification_id: u32, kind: AttributeKind) -> ChainState {
    ChainState::AwaitingHead {
        notification_id,
        pending: PendingRequest::Attribute(kind),
    }
}

/// Drive a fresh client up to the point where the title has been requested
fn client_awaiting_title(notification_id: u32) -> TestClient {
    let mut client = new_client();
    client.on_notification_event(event(notification_id));
    client.on_head_fragment(notification_id, &head(AttributeKind::Date, 15, b"20140901T12"));
    client.on_continuation_fragment(b"3000");
    client
}

#[test]
fn test_notification_event_roots_chain_at_date() {
    let mut client = new_client();
    client.on_notification_event(event(0x10));

    assert_eq!(client.transport().sent, vec![requested(0x10, AttributeKind::Date, None)]);
    assert_eq!(client.state(), awaiting(0x10, AttributeKind::Date));
    assert_eq!(client.current_notification(), Some(0x10));
    assert_eq!(client.alerts().alert.pending(), 1);
}

#[test]
fn test_date_completion_requests_title() {
    let client = client_awaiting_title(0x10);

    assert_eq!(
        client.transport().last(),
        Some(&requested(0x10, AttributeKind::Title, Some(20)))
    );
    assert_eq!(client.state(), awaiting(0x10, AttributeKind::Title));
    assert_eq!(client.alerts().completed[0].raw_value, b"20140901T123000");
}

#[test]
fn test_head_only_date_completes_immediately() {
    let mut client = new_client();
    client.on_notification_event(event(3));
    client.on_head_fragment(3, &head(AttributeKind::Date, 8, b"20140901"));

    assert_eq!(
        client.transport().last(),
        Some(&requested(3, AttributeKind::Title, Some(20)))
    );
}

#[test]
fn test_short_title_requests_message_size_without_continuation() {
    let mut client = client_awaiting_title(0x10);

    // size=10: 10 + 5 < 20
    let title = head(AttributeKind::Title, 7, b"Mom cel");
    assert_eq!(title.len(), 10);
    client.on_head_fragment(0x10, &title);

    assert_eq!(
        client.transport().last(),
        Some(&requested(0x10, AttributeKind::MessageSize, None))
    );
    assert_eq!(client.state(), awaiting(0x10, AttributeKind::MessageSize));
    assert!(client.buffer().is_none());
    assert_eq!(client.alerts().completed.last().unwrap().raw_value, b"Mom cel");
}

#[test]
fn test_long_title_waits_for_continuation() {
    let mut client = client_awaiting_title(0x10);
    let sent_before = client.transport().sent.len();

    client.on_head_fragment(0x10, &head(AttributeKind::Title, 20, b"Meeting moved"));
    assert_eq!(client.transport().sent.len(), sent_before);
    assert_eq!(
        client.state(),
        ChainState::Accumulating {
            notification_id: 0x10,
            kind: AttributeKind::Title
        }
    );

    client.on_continuation_fragment(b" to 3pm");
    assert_eq!(
        client.transport().last(),
        Some(&requested(0x10, AttributeKind::MessageSize, None))
    );
    assert_eq!(
        client.alerts().completed.last().unwrap().raw_value,
        b"Meeting moved to 3pm"
    );
}

#[test]
fn test_message_size_requests_message() {
    let mut client = client_awaiting_title(0x10);
    client.on_head_fragment(0x10, &head(AttributeKind::Title, 2, b"Hi"));
    client.on_head_fragment(0x10, &head(AttributeKind::MessageSize, 3, b"123"));

    assert_eq!(
        client.transport().last(),
        Some(&requested(0x10, AttributeKind::Message, Some(123)))
    );
    assert_eq!(
        client.alerts().completed.last().unwrap().decoded,
        Some(DecodedValue::Length(123))
    );
}

#[test]
fn test_message_size_wire_encoding() {
    let writes = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = writes.clone();
    let writer = move |handle: u16, value: &[u8]| -> AncsResult<()> {
        sink.borrow_mut().push((handle, value.to_vec()));
        Ok(())
    };
    let handles = AncsHandles {
        control_point: 0x0020,
        notification_source_cccd: 0x0011,
        data_source_cccd: 0x0031,
    };
    let mut client = AncsClient::new(GattAncsTransport::new(writer, handles), CoalescingAlert::new());

    client.on_notification_event(event(0x0102));
    client.on_head_fragment(0x0102, &head(AttributeKind::Date, 2, b"20"));
    client.on_head_fragment(0x0102, &head(AttributeKind::Title, 1, b"T"));
    client.on_head_fragment(0x0102, &head(AttributeKind::MessageSize, 3, b"123"));

    let writes = writes.borrow();
    assert_eq!(writes.len(), 4);
    assert_eq!(writes[0], (0x0020, vec![0x00, 0x02, 0x01, 0x00, 0x00, 0x05]));
    assert_eq!(
        writes[1],
        (0x0020, vec![0x00, 0x02, 0x01, 0x00, 0x00, 0x01, 0x14, 0x00])
    );
    assert_eq!(writes[2], (0x0020, vec![0x00, 0x02, 0x01, 0x00, 0x00, 0x04]));
    assert_eq!(
        writes[3],
        (0x0020, vec![0x00, 0x02, 0x01, 0x00, 0x00, 0x03, 0x7B, 0x00])
    );
}

#[test]
fn test_full_chain_ends_after_message() {
    let mut client = client_awaiting_title(7);
    client.on_head_fragment(7, &head(AttributeKind::Title, 5, b"Alice"));
    client.on_head_fragment(7, &head(AttributeKind::MessageSize, 2, b"33"));

    client.on_head_fragment(7, &head(AttributeKind::Message, 33, b"Are we still on"));
    client.on_continuation_fragment(b" for lunch");
    client.on_continuation_fragment(b" today?");
    assert!(!client.state().is_idle());
    client.on_continuation_fragment(b"!");

    assert!(client.state().is_idle());
    assert!(!client.has_outstanding_request());
    assert_eq!(client.transport().sent.len(), 4);

    let kinds: Vec<AttributeKind> = client.alerts().completed.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AttributeKind::Date,
            AttributeKind::Title,
            AttributeKind::MessageSize,
            AttributeKind::Message
        ]
    );
    assert_eq!(
        client.alerts().completed[3].raw_value,
        b"Are we still on for lunch today?!".to_vec()
    );
}

#[test]
fn test_app_identifier_requests_display_name() {
    let mut client = new_client();
    client.on_notification_event(event(9));
    client.on_head_fragment(9, &head(AttributeKind::Date, 1, b"2"));
    client.on_head_fragment(9, &head(AttributeKind::Title, 1, b"T"));
    client.on_head_fragment(9, &head(AttributeKind::MessageSize, 1, b"1"));
    client.on_head_fragment(9, &head(AttributeKind::Message, 1, b"m"));
    assert!(client.state().is_idle());

    client.fetch_app_identifier().unwrap();
    assert_eq!(
        client.transport().last(),
        Some(&requested(9, AttributeKind::AppIdentifier, None))
    );

    client.on_head_fragment(9, &head(AttributeKind::AppIdentifier, 16, b"com.apple"));
    client.on_continuation_fragment(b".Mobile");

    assert_eq!(
        client.transport().last(),
        Some(&Sent::App(
            b"com.apple.Mobile\0".to_vec(),
            vec![AppAttributeKind::DisplayName]
        ))
    );
    assert_eq!(
        client.state(),
        ChainState::AwaitingHead {
            notification_id: 9,
            pending: PendingRequest::AppAttributes
        }
    );

    client.handle_message(AncsMessage::AppAttribute(AppAttributeResult {
        bytes: b"Messages".to_vec(),
    }));
    assert!(client.state().is_idle());
    assert_eq!(client.alerts().names, vec![b"Messages".to_vec()]);
}

#[test]
fn test_second_request_is_refused_while_outstanding() {
    let mut client = new_client();
    assert_eq!(client.fetch_app_identifier(), Err(AncsError::NoNotification));

    client.on_notification_event(event(1));
    assert_eq!(
        client.fetch_app_identifier(),
        Err(AncsError::RequestOutstanding {
            pending: PendingRequest::Attribute(AttributeKind::Date)
        })
    );
    assert_eq!(client.transport().sent.len(), 1);
    assert_eq!(client.state(), awaiting(1, AttributeKind::Date));

    client.on_head_fragment(1, &head(AttributeKind::Date, 15, b"2014"));
    assert_eq!(
        client.fetch_app_identifier(),
        Err(AncsError::RequestOutstanding {
            pending: PendingRequest::Attribute(AttributeKind::Date)
        })
    );
    assert_eq!(client.transport().sent.len(), 1);
}

#[test]
fn test_new_notification_preempts_chain() {
    let mut client = client_awaiting_title(1);
    client.on_head_fragment(1, &head(AttributeKind::Title, 20, b"Old title is lo"));
    assert!(client.buffer().is_some());

    client.on_notification_event(event(2));
    assert!(client.buffer().is_none());
    assert_eq!(client.state(), awaiting(2, AttributeKind::Date));
    assert_eq!(client.transport().last(), Some(&requested(2, AttributeKind::Date, None)));

    // Late fragments for the old notification are dropped
    let sent = client.transport().sent.len();
    client.on_continuation_fragment(b" continues");
    client.on_head_fragment(1, &head(AttributeKind::Title, 3, b"old"));
    assert_eq!(client.state(), awaiting(2, AttributeKind::Date));
    assert_eq!(client.transport().sent.len(), sent);

    // The new chain carries on
    client.on_head_fragment(2, &head(AttributeKind::Date, 2, b"20"));
    assert_eq!(
        client.transport().last(),
        Some(&requested(2, AttributeKind::Title, Some(20)))
    );
}

#[test]
fn test_modified_event_drops_late_reply_for_same_notification() {
    let mut client = client_awaiting_title(1);
    client.on_head_fragment(1, &head(AttributeKind::Title, 4, b"Lunc"));
    assert_eq!(client.state(), awaiting(1, AttributeKind::MessageSize));

    client.on_notification_event(modified(1));
    assert_eq!(client.state(), awaiting(1, AttributeKind::Date));
    let sent = client.transport().sent.len();

    // Reply to the message size request sent before the restart
    client.on_head_fragment(1, &[0x04, 0x02, 0x00, b'4', b'0']);
    assert_eq!(client.state(), awaiting(1, AttributeKind::Date));
    assert_eq!(client.transport().sent.len(), sent);
    assert!(client.buffer().is_none());

    client.on_head_fragment(1, &head(AttributeKind::Date, 2, b"20"));
    assert_eq!(
        client.transport().last(),
        Some(&requested(1, AttributeKind::Title, Some(20)))
    );
    assert_eq!(client.transport().sent.len(), sent + 1);
}

#[test]
fn test_head_of_unrequested_kind_is_dropped() {
    let mut client = client_awaiting_title(3);
    let sent = client.transport().sent.len();
    let completed = client.alerts().completed.len();

    client.on_head_fragment(3, &head(AttributeKind::MessageSize, 2, b"12"));

    assert_eq!(client.state(), awaiting(3, AttributeKind::Title));
    assert_eq!(client.transport().sent.len(), sent);
    assert_eq!(client.alerts().completed.len(), completed);
}

#[test]
fn test_repeated_head_restarts_partial_value() {
    let mut client = client_awaiting_title(1);
    client.on_head_fragment(1, &head(AttributeKind::Title, 20, b"Old title is lo"));

    client.on_head_fragment(1, &head(AttributeKind::Title, 6, b"Lunch?"));

    assert_eq!(
        client.transport().last(),
        Some(&requested(1, AttributeKind::MessageSize, None))
    );
    let titles: Vec<&[u8]> = client
        .alerts()
        .completed
        .iter()
        .filter(|a| a.kind == AttributeKind::Title)
        .map(|a| a.raw_value.as_slice())
        .collect();
    assert_eq!(titles, vec![&b"Lunch?"[..]]);
}

#[test]
fn test_foreign_head_during_reassembly_is_dropped() {
    let mut client = client_awaiting_title(1);
    client.on_head_fragment(1, &head(AttributeKind::Title, 20, b"Old title is lo"));
    let state = client.state();
    let sent = client.transport().sent.len();

    // Other notification, then other attribute of this notification
    client.on_head_fragment(2, &head(AttributeKind::Title, 3, b"new"));
    client.on_head_fragment(1, &head(AttributeKind::Date, 2, b"20"));

    assert_eq!(
        state,
        ChainState::Accumulating {
            notification_id: 1,
            kind: AttributeKind::Title
        }
    );
    assert_eq!(client.state(), state);
    assert_eq!(client.transport().sent.len(), sent);
    assert_eq!(client.buffer().unwrap().payload(), b"Old title is lo");

    client.on_continuation_fragment(b"ng ok");
    assert_eq!(
        client.alerts().completed.last().unwrap().raw_value,
        b"Old title is long ok"
    );
    assert_eq!(
        client.transport().last(),
        Some(&requested(1, AttributeKind::MessageSize, None))
    );
}

#[test]
fn test_short_partial_title_advances_without_delivery() {
    let mut client = client_awaiting_title(6);

    // 8 + 5 < 20 although the title declares 30 bytes
    client.on_head_fragment(6, &head(AttributeKind::Title, 30, b"Short"));

    assert_eq!(client.state(), awaiting(6, AttributeKind::MessageSize));
    assert!(client.buffer().is_none());
    let kinds: Vec<AttributeKind> = client.alerts().completed.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AttributeKind::Date]);

    let sent = client.transport().sent.len();
    client.on_continuation_fragment(b" and the rest of it");
    assert_eq!(client.state(), awaiting(6, AttributeKind::MessageSize));
    assert_eq!(client.transport().sent.len(), sent);
    assert_eq!(client.alerts().completed.len(), 1);
}

#[test]
fn test_uncorrelated_fragments_are_dropped() {
    let mut client = new_client();
    client.on_continuation_fragment(b"stray");
    client.on_head_fragment(5, &head(AttributeKind::Date, 2, b"20"));

    assert!(client.state().is_idle());
    assert!(client.transport().sent.is_empty());
    assert!(client.alerts().completed.is_empty());
}

#[test]
fn test_malformed_head_resets_to_idle() {
    let mut client = new_client();
    client.on_notification_event(event(1));
    client.on_head_fragment(1, &[0x05, 0x02]);

    assert!(client.state().is_idle());
    assert_eq!(client.transport().sent.len(), 1);
}

#[test]
fn test_oversized_head_is_rejected() {
    let config = AncsClientConfig {
        buffer_capacity: 16,
        ..AncsClientConfig::default()
    };
    let mut client = AncsClient::with_config(MockTransport::default(), RecordingAlerts::default(), config);
    client.on_notification_event(event(1));
    client.on_head_fragment(1, &head(AttributeKind::Date, 15, b"2014"));

    assert!(client.state().is_idle());
    assert!(client.buffer().is_none());
}

#[test]
fn test_overflowing_continuation_resets_to_idle() {
    let mut client = new_client();
    client.on_notification_event(event(1));
    client.on_head_fragment(1, &head(AttributeKind::Date, 4, b"20"));
    client.on_continuation_fragment(b"14T12");

    assert!(client.state().is_idle());
    assert!(client.buffer().is_none());
    assert_eq!(client.transport().sent.len(), 1);
}

#[test]
fn test_transport_failure_stops_chain() {
    let mut client = new_client();
    client.transport_mut().fail = true;
    client.on_notification_event(event(1));

    assert!(client.state().is_idle());
    assert!(client.transport().sent.is_empty());
    // The alert is still raised
    assert_eq!(client.alerts().alert.pending(), 1);
}

#[test]
fn test_init_success_enables_sources() {
    let mut client = new_client();
    assert_eq!(client.on_init_cfm(InitStatus::Success), InitOutcome::Ready);

    assert_eq!(
        client.transport().sent,
        vec![
            Sent::NotificationSource(
                true,
                CategoryMask::INCOMING_CALL | CategoryMask::SOCIAL | CategoryMask::MISSED_CALL
            ),
            Sent::DataSource(true),
        ]
    );
}

#[test]
fn test_init_without_data_source() {
    let config = AncsClientConfig {
        enable_data_source: false,
        category_mask: CategoryMask::EMAIL,
        ..AncsClientConfig::default()
    };
    let mut client = AncsClient::with_config(MockTransport::default(), RecordingAlerts::default(), config);
    client.handle_message(AncsMessage::InitCfm(InitStatus::Success));

    assert_eq!(
        client.transport().sent,
        vec![Sent::NotificationSource(true, CategoryMask::EMAIL)]
    );
}

#[test]
fn test_init_failure_detaches_client() {
    let mut client = new_client();
    assert_eq!(client.on_init_cfm(InitStatus::Failed), InitOutcome::Discard);
    assert!(client.is_detached());

    client.on_notification_event(event(1));
    client.on_head_fragment(1, &head(AttributeKind::Date, 2, b"20"));
    assert!(client.transport().sent.is_empty());
    assert_eq!(client.alerts().alert.pending(), 0);
    assert_eq!(client.fetch_app_identifier(), Err(AncsError::Detached));
}

#[test]
fn test_init_failure_message_reports_discard() {
    let mut client = new_client();
    assert_eq!(
        client.handle_message(AncsMessage::InitCfm(InitStatus::Failed)),
        Some(InitOutcome::Discard)
    );
    assert!(client.is_detached());
    assert!(client.transport().sent.is_empty());

    let mut client = new_client();
    assert_eq!(
        client.handle_message(AncsMessage::InitCfm(InitStatus::Success)),
        Some(InitOutcome::Ready)
    );
    assert_eq!(client.handle_message(AncsMessage::NotificationSource(event(1))), None);
}

#[test]
fn test_confirmations_and_unknown_messages_are_ignored() {
    let mut client = new_client();
    client.on_notification_event(event(1));
    let state = client.state();

    client.handle_message(AncsMessage::SetNotificationSourceCfm { status: 0 });
    client.handle_message(AncsMessage::SetDataSourceCfm { status: 0 });
    client.handle_message(AncsMessage::WriteControlPointCfm {
        command_id: 0,
        status: 0,
    });
    client.handle_message(AncsMessage::WriteControlPointCfm {
        command_id: 0x09,
        status: 0xA1,
    });
    client.handle_message(AncsMessage::Unknown(0x7F00));

    assert_eq!(client.state(), state);
    assert_eq!(client.transport().sent.len(), 1);
}

#[test]
fn test_messages_drive_chain() {
    let mut client = new_client();
    client.handle_message(AncsMessage::NotificationSource(event(4)));
    client.handle_message(AncsMessage::AttributeHead(AttributeFragmentHead {
        notification_id: 4,
        bytes: head(AttributeKind::Date, 6, b"201"),
    }));
    client.handle_message(AncsMessage::AttributeContinuation(AttributeFragmentContinuation {
        bytes: b"409".to_vec(),
    }));

    assert_eq!(
        client.transport().last(),
        Some(&requested(4, AttributeKind::Title, Some(20)))
    );
}

proptest! {
    #[test]
    fn prop_alerts_coalesce(ids in proptest::collection::vec(any::<u32>(), 1..50)) {
        let mut client = AncsClient::new(MockTransport::default(), CoalescingAlert::new());
        for id in &ids {
            client.on_notification_event(event(*id));
        }

        prop_assert_eq!(client.alerts().pending(), 1);
        prop_assert!(client.alerts_mut().take());
        prop_assert_eq!(client.alerts().pending(), 0);
        prop_assert_eq!(client.current_notification(), ids.last().copied());
    }

    #[test]
    fn prop_preemption_discards_old_chain(
        value in proptest::collection::vec(any::<u8>(), 20..200),
        chunk in 1usize..20,
        delivered in 0usize..10,
    ) {
        let mut client = client_awaiting_title(1);
        client.on_head_fragment(1, &head(AttributeKind::Title, value.len() as u16, &value[..12]));

        let chunks: Vec<&[u8]> = value[12..].chunks(chunk).collect();
        let delivered = delivered.min(chunks.len().saturating_sub(1));
        for piece in &chunks[..delivered] {
            client.on_continuation_fragment(piece);
        }
        let accumulating = matches!(client.state(), ChainState::Accumulating { .. });
        prop_assert!(accumulating);

        client.on_notification_event(event(2));
        prop_assert!(client.buffer().is_none());
        let sent = client.transport().sent.len();

        for piece in &chunks[delivered..] {
            client.on_continuation_fragment(piece);
        }

        prop_assert_eq!(client.state(), awaiting(2, AttributeKind::Date));
        prop_assert_eq!(client.transport().sent.len(), sent);
        prop_assert_eq!(
            client.transport().last(),
            Some(&requested(2, AttributeKind::Date, None))
        );
    }
}
