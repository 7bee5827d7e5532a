//! Bus number plan: which identifier gets which bus window.

use pcie_xdma::BusRange;
use rdif_pcie::PortIdentifier;

use crate::PlanError;

pub const PORT_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortPlan {
    pub id: PortIdentifier,
    pub bus: BusRange,
}

/// Validated assignment of bus windows to the root ports, in bring-up order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusPlan {
    ports: [PortPlan; PORT_COUNT],
}

impl BusPlan {
    pub fn new(ports: [PortPlan; PORT_COUNT]) -> Result<Self, PlanError> {
        Self::validate(&ports)?;
        Ok(Self { ports })
    }

    /// Plan with [`BusRange::RP0`] and [`BusRange::RP1`].
    pub fn with_identifiers(rp0: PortIdentifier, rp1: PortIdentifier) -> Result<Self, PlanError> {
        Self::new([
            PortPlan {
                id: rp0,
                bus: BusRange::RP0,
            },
            PortPlan {
                id: rp1,
                bus: BusRange::RP1,
            },
        ])
    }

    /// Checks every window on its own, then every pair for shared buses and
    /// shared identifiers.
    pub fn validate(ports: &[PortPlan]) -> Result<(), PlanError> {
        for (port, plan) in ports.iter().enumerate() {
            plan.bus
                .validate()
                .map_err(|source| PlanError::InvalidRange { port, source })?;
        }

        for (first, a) in ports.iter().enumerate() {
            for (second, b) in ports.iter().enumerate().skip(first + 1) {
                if a.id == b.id {
                    return Err(PlanError::DuplicateIdentifier {
                        first,
                        second,
                        id: a.id,
                    });
                }
                if a.bus.overlaps(&b.bus) {
                    return Err(PlanError::Overlap {
                        first,
                        second,
                        first_range: a.bus,
                        second_range: b.bus,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn ports(&self) -> &[PortPlan; PORT_COUNT] {
        &self.ports
    }
}
