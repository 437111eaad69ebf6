//! Audit sinks — where committed settlements get reported.
//!
//! The coordinator emits one [`AuditEvent`] per committed settlement,
//! after the ledger pair is durable. Emission is best-effort: a sink
//! error is logged and swallowed so an audit outage can never fail or
//! roll back a settlement that already moved funds.

use opensettle_types::{AuditEvent, Result};

/// Destination for post-commit audit events.
pub trait AuditSink: Send + Sync {
    /// Record one event.
    ///
    /// # Errors
    /// Sink-specific. The coordinator logs and ignores the error.
    fn record(&self, event: &AuditEvent) -> Result<()>;
}

/// Sink that writes events to the structured log stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        tracing::info!(
            actor = %event.actor,
            action = %event.action,
            amount = %event.amount,
            reference_id = %event.reference_id,
            timestamp = %event.timestamp,
            "audit event"
        );
        Ok(())
    }
}

/// Sink that discards events. For tests and embedders that wire their
/// own trail downstream of the receipt.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _event: &AuditEvent) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opensettle_types::{AuditAction, ReferenceId, UserId};
    use rust_decimal::Decimal;

    fn event() -> AuditEvent {
        AuditEvent::now(
            UserId::new(),
            AuditAction::OrderSettled,
            Decimal::new(500, 0),
            ReferenceId::new(),
        )
    }

    #[test]
    fn log_sink_accepts_events() {
        assert!(LogAuditSink.record(&event()).is_ok());
    }

    #[test]
    fn null_sink_accepts_events() {
        assert!(NullAuditSink.record(&event()).is_ok());
    }

    #[test]
    fn sinks_are_object_safe() {
        let sinks: Vec<Box<dyn AuditSink>> = vec![Box::new(LogAuditSink), Box::new(NullAuditSink)];
        for sink in &sinks {
            assert!(sink.record(&event()).is_ok());
        }
    }
}
