use crate::world::replica_command::{ReplicaCommand, SequencedCommand};
use crate::types::SessionInstant;

/// Outgoing half of the replicated-computation transport.
///
/// Whatever is published here comes back, sequenced and timestamped, to
/// every replica of the session (including the publisher's own) in one
/// global order.
pub trait SessionTransport {
    fn publish(&mut self, command: ReplicaCommand);
}

/// Incoming half of the transport, fed to a participant in delivery order
#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    /// Next command of the global sequence
    Deliver(SequencedCommand),
    /// Replicated clock moved forward with no command attached
    Advance(SessionInstant),
    /// This participant now holds the replica's complete current state.
    /// Fired once per participant.
    Synced,
}
