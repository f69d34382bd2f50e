//! Idle/NAT monitor.
//!
//! Holds the most recent packet sent to the NAT address and, whenever the network goes
//! idle, re-delivers it to instance 0. The run converges once the same `y` is delivered
//! twice in a row.

use crate::network::packet::Packet;
use crate::virtual_machine::Word;

/// What the fabric should do after an idle tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NatDecision {
    /// Nothing held yet; keep ticking.
    Wait,
    /// Deliver the packet's `(x, y)` to instance 0 and keep ticking.
    Inject(Packet),
    /// Deliver the packet; its `y` repeats the previous delivery.
    Converged(Packet),
}

#[derive(Clone, Debug, Default)]
pub struct NatMonitor {
    held: Option<Packet>,
    last_delivered_y: Option<Word>,
    first: Option<Packet>,
    injections: u64,
}

impl NatMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `packet` as the held packet, replacing any previous one.
    pub fn receive(&mut self, packet: Packet) {
        if self.first.is_none() {
            self.first = Some(packet);
        }
        self.held = Some(packet);
    }

    /// Decides what to inject after the network went idle.
    ///
    /// The held packet is kept after delivery, so a later idle tick with no new
    /// packet re-delivers it.
    pub fn on_idle(&mut self) -> NatDecision {
        let Some(packet) = self.held else {
            return NatDecision::Wait;
        };

        self.injections += 1;
        if self.last_delivered_y == Some(packet.y) {
            return NatDecision::Converged(packet);
        }
        self.last_delivered_y = Some(packet.y);
        NatDecision::Inject(packet)
    }

    pub fn held(&self) -> Option<Packet> {
        self.held
    }

    /// The first packet ever received.
    pub fn first(&self) -> Option<Packet> {
        self.first
    }

    pub fn last_delivered_y(&self) -> Option<Word> {
        self.last_delivered_y
    }

    /// Number of deliveries to instance 0, including the converging one.
    pub fn injections(&self) -> u64 {
        self.injections
    }
}
