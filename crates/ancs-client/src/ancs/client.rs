//! ANCS client implementation
//!
//! `AncsClient` drives the attribute chain for one connection. It is fed
//! inbound messages one at a time and talks to two collaborators: an
//! `AttributeTransport` that writes requests to the peer and an `AlertSink`
//! that surfaces new notifications to the rest of the application.
//!
//! The peer answers requests without any correlation identifier, so the
//! client keeps at most one request outstanding and refuses to send another
//! until the current reply has been dispatched.

use super::buffer::FragmentBuffer;
use super::chain::{next_on_complete, next_on_head, root_request, ChainState, NextRequest, PendingRequest};
use super::config::AncsClientConfig;
use super::decoder::complete;
use super::types::{
    AppAttributeKind, AppAttributeResult, AttributeFragmentContinuation, AttributeFragmentHead,
    AttributeKind, CommandId, AttributeRequest, AttributeSpec, CategoryMask, CompletedAttribute, InitStatus,
    NotificationSourceEvent,
};
use crate::error::{AncsError, AncsResult};
use log::{debug, error, info, trace, warn};

/// Outbound side of the ANCS control point and notification subscriptions
pub trait AttributeTransport {
    /// Send a Get Notification Attributes command
    fn request_notification_attributes(
        &mut self,
        notification_id: u32,
        attributes: &[AttributeSpec],
    ) -> AncsResult<()>;

    /// Send a Get App Attributes command for a NUL-terminated identifier
    fn request_app_attributes(
        &mut self,
        identifier: &[u8],
        attributes: &[AppAttributeKind],
    ) -> AncsResult<()>;

    /// Subscribe to the notification source for the given categories
    fn enable_notification_source(&mut self, enabled: bool, categories: CategoryMask) -> AncsResult<()>;

    /// Subscribe to the data source
    fn enable_data_source(&mut self, enabled: bool) -> AncsResult<()>;
}

/// Receiver for alerts and reassembled values
pub trait AlertSink {
    /// Drop any alert that has not been handled yet
    fn cancel_pending_alert(&mut self);

    /// Queue an alert for a new notification
    fn send_alert(&mut self);

    fn attribute_completed(&mut self, _attribute: &CompletedAttribute) {}

    fn app_name(&mut self, _name: &[u8]) {}
}

/// Alert sink that keeps at most one pending alert
#[derive(Debug, Default)]
pub struct CoalescingAlert {
    pending: usize,
}

impl CoalescingAlert {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of alerts waiting to be handled
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Drain the pending alert, returning whether there was one
    pub fn take(&mut self) -> bool {
        let had_alert = self.pending > 0;
        self.pending = 0;
        had_alert
    }
}

impl AlertSink for CoalescingAlert {
    fn cancel_pending_alert(&mut self) {
        self.pending = 0;
    }

    fn send_alert(&mut self) {
        self.pending += 1;
    }
}

/// Inbound messages for the ANCS client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AncsMessage {
    InitCfm(InitStatus),
    SetNotificationSourceCfm { status: u16 },
    SetDataSourceCfm { status: u16 },
    NotificationSource(NotificationSourceEvent),
    AttributeHead(AttributeFragmentHead),
    AttributeContinuation(AttributeFragmentContinuation),
    AppAttribute(AppAttributeResult),
    WriteControlPointCfm { command_id: u8, status: u16 },
    Unknown(u16),
}

/// What the binding collaborator must do after initialisation
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Subscriptions requested, attribute traffic may follow
    Ready,
    /// Initialisation failed; remove this client from the connection
    Discard,
}

/// ANCS client for a single connection
pub struct AncsClient<T: AttributeTransport, A: AlertSink> {
    config: AncsClientConfig,
    transport: T,
    alerts: A,
    state: ChainState,
    /// Reassembly buffer for the attribute in flight
    buffer: Option<FragmentBuffer>,
    /// Most recent notification announced by the peer
    current_notification: Option<u32>,
    detached: bool,
}

impl<T: AttributeTransport, A: AlertSink> std::fmt::Debug for AncsClient<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AncsClient")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("buffer", &self.buffer)
            .field("current_notification", &self.current_notification)
            .field("detached", &self.detached)
            .finish()
    }
}

impl<T: AttributeTransport, A: AlertSink> AncsClient<T, A> {
    /// Create a client with the default configuration
    pub fn new(transport: T, alerts: A) -> Self {
        Self::with_config(transport, alerts, AncsClientConfig::default())
    }

    pub fn with_config(transport: T, alerts: A, config: AncsClientConfig) -> Self {
        Self {
            config,
            transport,
            alerts,
            state: ChainState::Idle,
            buffer: None,
            current_notification: None,
            detached: false,
        }
    }

    pub fn config(&self) -> &AncsClientConfig {
        &self.config
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn current_notification(&self) -> Option<u32> {
        self.current_notification
    }

    pub fn has_outstanding_request(&self) -> bool {
        !self.state.is_idle()
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn buffer(&self) -> Option<&FragmentBuffer> {
        self.buffer.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn alerts(&self) -> &A {
        &self.alerts
    }

    pub fn alerts_mut(&mut self) -> &mut A {
        &mut self.alerts
    }

    /// Route an inbound message to its handler
    ///
    /// Returns the initialisation outcome when the message was an init
    /// confirmation; on `InitOutcome::Discard` the caller must drop the client.
    pub fn handle_message(&mut self, message: AncsMessage) -> Option<InitOutcome> {
        match message {
            AncsMessage::InitCfm(status) => return Some(self.on_init_cfm(status)),
            AncsMessage::SetNotificationSourceCfm { status } => {
                debug!("ANCS set notification source cfm status[{}]", status);
            }
            AncsMessage::SetDataSourceCfm { status } => {
                debug!("ANCS set data source cfm status[{}]", status);
            }
            AncsMessage::NotificationSource(event) => self.on_notification_event(event),
            AncsMessage::AttributeHead(head) => {
                self.on_head_fragment(head.notification_id, &head.bytes)
            }
            AncsMessage::AttributeContinuation(more) => self.on_continuation_fragment(&more.bytes),
            AncsMessage::AppAttribute(result) => self.on_app_attribute(&result.bytes),
            AncsMessage::WriteControlPointCfm { command_id, status } => {
                match CommandId::try_from(command_id) {
                    Ok(command) => debug!(
                        "ANCS control point cfm command[{:?}] status[{}]",
                        command, status
                    ),
                    Err(err) => warn!("ANCS control point cfm status[{}]: {}", status, err),
                }
            }
            AncsMessage::Unknown(id) => {
                warn!("Unhandled ANCS message [0x{:04X}]", id);
            }
        }
        None
    }

    /// Handle the binding collaborator's initialisation result
    pub fn on_init_cfm(&mut self, status: InitStatus) -> InitOutcome {
        debug!("ANCS init cfm status[{:?}]", status);

        if status == InitStatus::Failed {
            warn!("ANCS initialisation failed, detaching client");
            self.detached = true;
            self.reset();
            return InitOutcome::Discard;
        }

        let categories = self.config.category_mask;
        if let Err(err) = self.transport.enable_notification_source(true, categories) {
            error!("Failed to enable notification source: {}", err);
        }
        if self.config.enable_data_source {
            if let Err(err) = self.transport.enable_data_source(true) {
                error!("Failed to enable data source: {}", err);
            }
        }

        InitOutcome::Ready
    }

    /// Handle a new notification announced on the notification source
    ///
    /// Any chain in flight is abandoned. Fragments the peer is still sending
    /// for it will no longer correlate and are dropped on arrival.
    pub fn on_notification_event(&mut self, event: NotificationSourceEvent) {
        if self.detached {
            warn!("Ignoring notification {} on detached client", event.notification_id);
            return;
        }

        info!(
            "ANCS notification event[{:02X}] flags[{:02X}] category[{:02X}] count[{:02X}] uid[{:08X}]",
            event.event_id,
            event.event_flags,
            event.category_id,
            event.category_count,
            event.notification_id
        );

        self.alerts.cancel_pending_alert();
        self.alerts.send_alert();

        if let Some(previous) = self.state.notification_id() {
            warn!(
                "Notification {} preempts chain for {} in state {:?}",
                event.notification_id, previous, self.state
            );
        }
        self.reset();
        self.current_notification = Some(event.notification_id);

        let notification_id = event.notification_id;
        if let Err(err) = self.issue(notification_id, root_request(notification_id)) {
            error!("Failed to start chain for {}: {}", notification_id, err);
        }
    }

    /// Handle the first fragment of an attribute value
    pub fn on_head_fragment(&mut self, notification_id: u32, raw: &[u8]) {
        if self.detached {
            return;
        }
        trace!("ANCS head uid[{:08X}]: {}", notification_id, hex::encode(raw));

        if !self.correlate_head(notification_id, raw) {
            return;
        }

        let buffer = match FragmentBuffer::start(notification_id, raw, self.config.buffer_capacity) {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!("Rejecting head fragment for {}: {}", notification_id, err);
                self.reset();
                return;
            }
        };

        let header = buffer.header();

        if let Some(next) = next_on_head(notification_id, &header, raw, &self.config) {
            if buffer.is_complete() {
                let completed = complete(buffer);
                self.alerts.attribute_completed(&completed);
            } else {
                debug!(
                    "Advancing past {} with {} of {} bytes",
                    header.kind,
                    buffer.bytes_accumulated(),
                    header.total_len()
                );
            }
            self.reset();
            self.dispatch(notification_id, next);
        } else if buffer.is_complete() {
            self.finish(buffer);
        } else {
            self.state = ChainState::Accumulating {
                notification_id,
                kind: header.kind,
            };
            self.buffer = Some(buffer);
        }
    }

    /// Handle a continuation fragment for the attribute in flight
    pub fn on_continuation_fragment(&mut self, raw: &[u8]) {
        if self.detached {
            return;
        }
        trace!("ANCS more: {}", hex::encode(raw));

        let Some(buffer) = self.buffer.as_mut() else {
            warn!(
                "Dropping {} byte continuation with no attribute in flight",
                raw.len()
            );
            return;
        };

        if let Err(err) = buffer.append(raw) {
            warn!(
                "Dropping {} reassembly for {}: {}",
                buffer.kind(),
                buffer.notification_id(),
                err
            );
            self.reset();
            return;
        }

        if buffer.is_complete() {
            if let Some(buffer) = self.buffer.take() {
                self.finish(buffer);
            }
        }
    }

    /// Handle an app attribute result; always ends the chain
    pub fn on_app_attribute(&mut self, raw: &[u8]) {
        if self.detached {
            return;
        }
        info!("ANCS app name: {}", String::from_utf8_lossy(raw));
        trace!("ANCS app name bytes: {}", hex::encode(raw));

        self.alerts.app_name(raw);

        match self.state {
            ChainState::AwaitingHead {
                pending: PendingRequest::AppAttributes,
                ..
            } => self.state = ChainState::Idle,
            state => debug!("Unsolicited app attribute result in state {:?}", state),
        }
    }

    /// Ask for the app identifier of the current notification
    ///
    /// Its completion requests the app's display name.
    pub fn fetch_app_identifier(&mut self) -> AncsResult<()> {
        if self.detached {
            return Err(AncsError::Detached);
        }
        let notification_id = self.current_notification.ok_or(AncsError::NoNotification)?;
        let request = NextRequest::Attribute(AttributeRequest {
            notification_id,
            kind: AttributeKind::AppIdentifier,
            max_length: None,
        });
        self.issue(notification_id, request)
    }

    /// Decide whether a head fragment belongs to the outstanding request
    fn correlate_head(&self, notification_id: u32, raw: &[u8]) -> bool {
        match self.state {
            ChainState::AwaitingHead {
                notification_id: expected,
                pending: PendingRequest::Attribute(kind),
            } => {
                if notification_id != expected {
                    warn!(
                        "Dropping stale head for {} while awaiting {} for {}",
                        notification_id, kind, expected
                    );
                    return false;
                }
                if raw.first() != Some(&kind.to_u8()) {
                    warn!(
                        "Dropping head {:02X?} for {} while awaiting {}",
                        raw.first(),
                        notification_id,
                        kind
                    );
                    return false;
                }
                true
            }
            ChainState::Accumulating {
                notification_id: expected,
                kind,
            } => {
                if notification_id != expected {
                    warn!(
                        "Dropping stale head for {} while reassembling {} for {}",
                        notification_id, kind, expected
                    );
                    return false;
                }
                if raw.first() != Some(&kind.to_u8()) {
                    warn!(
                        "Dropping head {:02X?} for {} while reassembling {}",
                        raw.first(),
                        notification_id,
                        kind
                    );
                    return false;
                }
                warn!("New head for {} abandons partial {}", notification_id, kind);
                true
            }
            ChainState::AwaitingHead {
                pending: PendingRequest::AppAttributes,
                ..
            } => {
                warn!("Dropping head for {} while awaiting app attributes", notification_id);
                false
            }
            ChainState::Idle => {
                warn!("Dropping head for {} with no request outstanding", notification_id);
                false
            }
        }
    }

    /// Hand a complete attribute on and advance the chain
    fn finish(&mut self, buffer: FragmentBuffer) {
        let completed = complete(buffer);
        debug!(
            "ANCS attribute {} for {} complete ({} bytes): {}",
            completed.kind,
            completed.notification_id,
            completed.raw_value.len(),
            hex::encode(&completed.raw_value)
        );

        self.alerts.attribute_completed(&completed);
        self.reset();

        match next_on_complete(&completed, &self.config) {
            Some(next) => self.dispatch(completed.notification_id, next),
            None => debug!("ANCS chain for {} complete", completed.notification_id),
        }
    }

    fn dispatch(&mut self, notification_id: u32, next: NextRequest) {
        if let Err(err) = self.issue(notification_id, next) {
            error!("ANCS chain for {} stopped: {}", notification_id, err);
        }
    }

    /// Send a request, enforcing a single outstanding request
    fn issue(&mut self, notification_id: u32, next: NextRequest) -> AncsResult<()> {
        if let ChainState::AwaitingHead { pending, .. } = self.state {
            error!("Refusing {:?} while {:?} is outstanding", next, pending);
            return Err(AncsError::RequestOutstanding { pending });
        }
        if let ChainState::Accumulating { kind, .. } = self.state {
            error!("Refusing {:?} while reassembling {}", next, kind);
            return Err(AncsError::RequestOutstanding {
                pending: PendingRequest::Attribute(kind),
            });
        }

        let result = match &next {
            NextRequest::Attribute(request) => {
                debug!(
                    "ANCS request {} (max {:?}) for {}",
                    request.kind, request.max_length, request.notification_id
                );
                self.transport
                    .request_notification_attributes(request.notification_id, &[request.spec()])
            }
            NextRequest::AppAttributes(request) => {
                debug!("ANCS request app attributes for {}", hex::encode(&request.identifier));
                self.transport
                    .request_app_attributes(&request.identifier, &request.attributes)
            }
        };

        match result {
            Ok(()) => {
                self.state = ChainState::AwaitingHead {
                    notification_id,
                    pending: next.pending(),
                };
                Ok(())
            }
            Err(err) => {
                self.reset();
                Err(err)
            }
        }
    }

    /// Drop any in-flight reassembly and return to idle
    fn reset(&mut self) {
        self.buffer = None;
        self.state = ChainState::Idle;
    }
}
