//! Deterministic packet network of VM instances.
//!
//! A [`Network`] owns `size` instances of the same program and drives them
//! round-robin, one tick at a time. Every three values an instance outputs form a
//! [`Packet`]; the fabric routes it to the addressed instance's input queue or hands it
//! to the [`NatMonitor`]. Instances waiting for input are fed `-1` once per visit.

use crate::network::nat::{NatDecision, NatMonitor};
use crate::network::packet::{PACKET_WIDTH, Packet};
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::{Status, StepOutcome, Vm};
use crate::virtual_machine::Word;
use crate::{debug, info};

/// Default number of instances.
pub const DEFAULT_SIZE: usize = 50;
/// Default NAT address.
pub const DEFAULT_NAT_ADDRESS: Word = 255;
/// Value fed to an instance that waits for input with nothing queued.
pub const NO_PACKET: Word = -1;

/// Errors raised while running a network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// An instance failed to execute.
    #[error("instance {instance}: {source}")]
    Instance {
        instance: usize,
        #[source]
        source: VMError,
    },
    /// A packet was addressed to neither an instance nor the NAT.
    #[error("instance {instance} sent a packet to unknown address {destination}")]
    UnknownDestination { instance: usize, destination: Word },
    /// An instance halted in the middle of an output group.
    #[error("instance {instance} halted with {pending} value(s) of an unfinished packet")]
    IncompletePacket { instance: usize, pending: usize },
    #[error("no convergence after {ticks} ticks")]
    TickLimitExceeded { ticks: u64 },
    #[error("every instance halted after {ticks} ticks")]
    AllHalted { ticks: u64 },
    #[error("a network needs at least one instance")]
    InvalidSize,
}

/// Network parameters.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct NetworkConfig {
    /// Number of instances, addressed `0..size`.
    pub size: usize,
    /// Destination that delivers to the NAT monitor. Takes precedence over an
    /// instance with the same address.
    pub nat_address: Word,
    /// Optional cap on the number of ticks.
    pub max_ticks: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            nat_address: DEFAULT_NAT_ADDRESS,
            max_ticks: None,
        }
    }
}

/// Summary of a single tick.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TickReport {
    pub packets_routed: usize,
    pub produced_output: bool,
    /// No output this tick, every instance blocked on input or halted, and every
    /// input queue empty. A halted instance that was sent a packet keeps it queued,
    /// so once that happens the network never goes idle again.
    pub idle: bool,
}

/// Result of a converged run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct NetworkOutcome {
    /// The `y` delivered by the NAT twice in a row.
    pub answer: Word,
    /// First packet the NAT received.
    pub first_broadcast: Option<Packet>,
    pub ticks: u64,
    pub injections: u64,
}

#[derive(Copy, Clone, Debug, Default)]
struct Visit {
    routed: bool,
    produced_output: bool,
}

pub struct Network {
    config: NetworkConfig,
    nodes: Vec<Vm>,
    nat: NatMonitor,
    ticks: u64,
}

impl Network {
    /// Boots `config.size` instances of `program`. Instance `i` reads `i` first.
    pub fn new(program: &Program, config: NetworkConfig) -> Result<Self, NetworkError> {
        if config.size == 0 {
            return Err(NetworkError::InvalidSize);
        }

        let nodes = (0..config.size)
            .map(|i| Vm::new(program, Some(i as Word)).with_identity(i))
            .collect();

        Ok(Self {
            config,
            nodes,
            nat: NatMonitor::new(),
            ticks: 0,
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[Vm] {
        &self.nodes
    }

    pub fn nat(&self) -> &NatMonitor {
        &self.nat
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks until the NAT converges.
    pub fn run(&mut self) -> Result<NetworkOutcome, NetworkError> {
        loop {
            if let Some(limit) = self.config.max_ticks {
                if self.ticks >= limit {
                    return Err(NetworkError::TickLimitExceeded { ticks: self.ticks });
                }
            }

            let report = self.tick()?;
            if self.nodes.iter().all(|n| n.status() == Status::Halted) {
                return Err(NetworkError::AllHalted { ticks: self.ticks });
            }
            if !report.idle {
                continue;
            }

            match self.nat.on_idle() {
                NatDecision::Wait => {}
                NatDecision::Inject(packet) => {
                    debug!("tick {}: nat injects {} into instance 0", self.ticks, packet);
                    self.nodes[0].extend_input(packet.payload());
                }
                NatDecision::Converged(packet) => {
                    self.nodes[0].extend_input(packet.payload());
                    info!(
                        "nat converged on y={} after {} ticks and {} injections",
                        packet.y,
                        self.ticks,
                        self.nat.injections()
                    );
                    return Ok(NetworkOutcome {
                        answer: packet.y,
                        first_broadcast: self.nat.first(),
                        ticks: self.ticks,
                        injections: self.nat.injections(),
                    });
                }
            }
        }
    }

    /// Visits every instance once, in index order.
    pub fn tick(&mut self) -> Result<TickReport, NetworkError> {
        let mut report = TickReport::default();
        for index in 0..self.nodes.len() {
            let visit = self.visit(index)?;
            report.produced_output |= visit.produced_output;
            if visit.routed {
                report.packets_routed += 1;
            }
        }
        self.ticks += 1;

        report.idle = !report.produced_output
            && self.nodes.iter().all(|n| {
                matches!(n.status(), Status::BlockedOnInput | Status::Halted)
                    && n.pending_input() == 0
            });
        Ok(report)
    }

    /// Runs instance `index` until it blocks twice, completes a packet or halts.
    fn visit(&mut self, index: usize) -> Result<Visit, NetworkError> {
        let mut visit = Visit::default();
        let mut fed = false;

        loop {
            let node = &mut self.nodes[index];
            let outcome = node.step().map_err(|source| NetworkError::Instance {
                instance: index,
                source,
            })?;

            match outcome {
                StepOutcome::Advanced => {}
                StepOutcome::BlockedOnInput if fed => return Ok(visit),
                StepOutcome::BlockedOnInput => {
                    node.push_input(NO_PACKET);
                    fed = true;
                }
                StepOutcome::ProducedOutput => {
                    visit.produced_output = true;
                    if node.pending_output() >= PACKET_WIDTH {
                        let packet = Self::take_packet(node, index)?;
                        self.route(index, packet)?;
                        visit.routed = true;
                        return Ok(visit);
                    }
                }
                StepOutcome::Halted => {
                    let pending = node.pending_output();
                    if pending > 0 {
                        return Err(NetworkError::IncompletePacket {
                            instance: index,
                            pending,
                        });
                    }
                    return Ok(visit);
                }
            }
        }
    }

    fn take_packet(node: &mut Vm, index: usize) -> Result<Packet, NetworkError> {
        let values: Vec<Word> = (0..PACKET_WIDTH)
            .filter_map(|_| node.try_pop_output())
            .collect();
        Packet::from_values(&values).ok_or(NetworkError::IncompletePacket {
            instance: index,
            pending: values.len(),
        })
    }

    fn route(&mut self, from: usize, packet: Packet) -> Result<(), NetworkError> {
        if packet.destination == self.config.nat_address {
            debug!("tick {}: nat received {} from {}", self.ticks, packet, from);
            self.nat.receive(packet);
            return Ok(());
        }

        let target = usize::try_from(packet.destination)
            .ok()
            .filter(|t| *t < self.nodes.len())
            .ok_or(NetworkError::UnknownDestination {
                instance: from,
                destination: packet.destination,
            })?;
        self.nodes[target].extend_input(packet.payload());
        Ok(())
    }
}
