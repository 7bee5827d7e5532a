use log::{error, info};

use crate::{
    BusPlan, EnumerateError, LinkWait, PORT_COUNT, Platform, PortPlan, RootPort, RunError,
    Sequencer,
};

/// Walks the hierarchy behind an initialized root port.
pub trait Enumerator {
    fn enumerate_fabric(&mut self, port: &mut RootPort) -> Result<(), EnumerateError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

/// Brings up and enumerates the ports of a [`BusPlan`] strictly one after
/// the other, stopping at the first failure.
pub struct Orchestrator<'a, P: Platform + ?Sized, E: Enumerator + ?Sized> {
    platform: &'a P,
    enumerator: &'a mut E,
    plan: BusPlan,
    link_wait: LinkWait,
}

impl<'a, P: Platform + ?Sized, E: Enumerator + ?Sized> Orchestrator<'a, P, E> {
    pub fn new(platform: &'a P, enumerator: &'a mut E, plan: BusPlan) -> Self {
        Self {
            platform,
            enumerator,
            plan,
            link_wait: LinkWait::default(),
        }
    }

    pub fn with_link_wait(mut self, link_wait: LinkWait) -> Self {
        self.link_wait = link_wait;
        self
    }

    /// Runs the whole sequence and hands out the initialized ports.
    pub fn run(&mut self) -> Result<[RootPort; PORT_COUNT], RunError> {
        self.check_aliasing()?;

        let sequencer = Sequencer::new(self.platform).with_link_wait(self.link_wait);
        let rp0 = self.bring_up_and_enumerate(&sequencer, 0)?;
        let rp1 = self.bring_up_and_enumerate(&sequencer, 1)?;
        Ok([rp0, rp1])
    }

    /// [`Orchestrator::run`], reduced to a process status.
    pub fn run_to_exit(&mut self) -> ExitStatus {
        match self.run() {
            Ok(ports) => {
                for port in &ports {
                    info!("{port:?}");
                }
                info!("=== DONE: both root ports initialized and enumerated ===");
                ExitStatus::Success
            }
            Err(e) => {
                error!("{e}");
                ExitStatus::Failure
            }
        }
    }

    fn bring_up_and_enumerate(
        &mut self,
        sequencer: &Sequencer<'a, P>,
        port: usize,
    ) -> Result<RootPort, RunError> {
        let PortPlan { id, bus } = self.plan.ports()[port];

        info!("[RP{port}] Initializing root port {port} ({id}, {bus})...");
        let mut root = sequencer
            .bring_up(id, bus)
            .map_err(|source| RunError::BringUp { port, source })?;

        info!("[RP{port}] Enumerating fabric behind root port {port}...");
        self.enumerator
            .enumerate_fabric(&mut root)
            .map_err(|source| RunError::Enumerate { port, source })?;
        Ok(root)
    }

    /// Two identifiers must not resolve to one register block. Identifiers
    /// that do not resolve are left for bring-up to report.
    fn check_aliasing(&self) -> Result<(), RunError> {
        let ports = self.plan.ports();
        for (first, a) in ports.iter().enumerate() {
            let Some(ca) = self.platform.lookup(a.id) else {
                continue;
            };
            for (second, b) in ports.iter().enumerate().skip(first + 1) {
                if let Some(cb) = self.platform.lookup(b.id)
                    && ca.base_address == cb.base_address
                {
                    return Err(RunError::AliasedPorts {
                        first,
                        second,
                        base: ca.base_address,
                    });
                }
            }
        }
        Ok(())
    }
}
