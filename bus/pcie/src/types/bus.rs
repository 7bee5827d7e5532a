use core::{fmt::Display, ops::RangeInclusive};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusRangeError {
    #[error("primary bus {primary:#04x} must be below secondary bus {secondary:#04x}")]
    PrimaryNotBelowSecondary { primary: u8, secondary: u8 },
    #[error("secondary bus {secondary:#04x} is above subordinate bus {subordinate:#04x}")]
    SecondaryAboveSubordinate { secondary: u8, subordinate: u8 },
}

/// Bus numbers a bridge forwards configuration cycles for.
///
/// `secondary..=subordinate` is the window of buses behind the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusRange {
    pub primary: u8,
    pub secondary: u8,
    pub subordinate: u8,
}

impl BusRange {
    /// Lower half of the bus space, for root port 0.
    pub const RP0: BusRange = BusRange::checked(0x00, 0x01, 0x7f);
    /// Upper half of the bus space, for root port 1.
    pub const RP1: BusRange = BusRange::checked(0x00, 0x80, 0xff);

    pub const fn new(primary: u8, secondary: u8, subordinate: u8) -> Result<Self, BusRangeError> {
        let range = Self {
            primary,
            secondary,
            subordinate,
        };
        match range.validate() {
            Ok(()) => Ok(range),
            Err(e) => Err(e),
        }
    }

    const fn checked(primary: u8, secondary: u8, subordinate: u8) -> Self {
        match Self::new(primary, secondary, subordinate) {
            Ok(range) => range,
            Err(_) => panic!("invalid bus range"),
        }
    }

    /// Checks `primary < secondary <= subordinate`.
    pub const fn validate(&self) -> Result<(), BusRangeError> {
        if self.primary >= self.secondary {
            return Err(BusRangeError::PrimaryNotBelowSecondary {
                primary: self.primary,
                secondary: self.secondary,
            });
        }
        if self.secondary > self.subordinate {
            return Err(BusRangeError::SecondaryAboveSubordinate {
                secondary: self.secondary,
                subordinate: self.subordinate,
            });
        }
        Ok(())
    }

    /// Layout of the Primary/Secondary/Subordinate word of a type 1 header.
    pub const fn pack(&self) -> u32 {
        ((self.subordinate as u32) << 16) | ((self.secondary as u32) << 8) | self.primary as u32
    }

    /// Inverse of [`BusRange::pack`]. Bits 31:24 are ignored.
    pub const fn unpack(value: u32) -> Self {
        Self {
            primary: value as u8,
            secondary: (value >> 8) as u8,
            subordinate: (value >> 16) as u8,
        }
    }

    /// Whether the downstream windows share at least one bus.
    pub const fn overlaps(&self, other: &BusRange) -> bool {
        self.secondary <= other.subordinate && other.secondary <= self.subordinate
    }

    pub const fn contains(&self, bus: u8) -> bool {
        self.secondary <= bus && bus <= self.subordinate
    }

    pub fn buses(&self) -> RangeInclusive<u8> {
        self.secondary..=self.subordinate
    }
}

const _: () = assert!(!BusRange::RP0.overlaps(&BusRange::RP1));

impl Display for BusRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "pri {:02x} sec {:02x} sub {:02x}",
            self.primary, self.secondary, self.subordinate
        )
    }
}

#[cfg(test)]
mod test {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn builtin_ranges_pack() {
        assert_eq!(BusRange::RP0.pack(), 0x007f_0100);
        assert_eq!(BusRange::RP1.pack(), 0x00ff_8000);
        assert!(!BusRange::RP0.overlaps(&BusRange::RP1));
    }

    #[test]
    fn unpack_recovers_every_field_value() {
        for v in 0..=255u8 {
            let a = BusRange {
                primary: v,
                secondary: v.wrapping_add(1),
                subordinate: v.wrapping_mul(7),
            };
            assert_eq!(BusRange::unpack(a.pack()), a);

            let b = BusRange {
                primary: 255 - v,
                secondary: v,
                subordinate: v ^ 0x5a,
            };
            assert_eq!(BusRange::unpack(b.pack()), b);
        }
    }

    #[test]
    fn unpack_ignores_latency_timer() {
        assert_eq!(BusRange::unpack(0x4000_0000 | BusRange::RP1.pack()), BusRange::RP1);
    }

    #[test]
    fn validate_ordering() {
        assert_eq!(
            BusRange::new(1, 1, 4),
            Err(BusRangeError::PrimaryNotBelowSecondary {
                primary: 1,
                secondary: 1
            })
        );
        assert_eq!(
            BusRange::new(0, 5, 4),
            Err(BusRangeError::SecondaryAboveSubordinate {
                secondary: 5,
                subordinate: 4
            })
        );
        assert!(BusRange::new(0, 4, 4).is_ok());
    }

    #[test]
    fn overlap_is_closed_interval() {
        let a = BusRange::new(0, 1, 0x10).unwrap();
        let touching = BusRange::new(0, 0x10, 0x20).unwrap();
        let adjacent = BusRange::new(0, 0x11, 0x20).unwrap();
        assert!(a.overlaps(&touching));
        assert!(touching.overlaps(&a));
        assert!(!a.overlaps(&adjacent));
        assert!(a.contains(0x10));
        assert!(!a.contains(0));
    }

    #[test]
    fn overlap_matches_bus_sets() {
        // Exhaustive over small windows: overlap iff some bus lies in both.
        for s1 in 1..12u8 {
            for e1 in s1..12 {
                for s2 in 1..12u8 {
                    for e2 in s2..12 {
                        let a = BusRange::new(0, s1, e1).unwrap();
                        let b = BusRange::new(0, s2, e2).unwrap();
                        let shared = a.buses().any(|bus| b.contains(bus));
                        assert_eq!(a.overlaps(&b), shared, "{a} / {b}");
                    }
                }
            }
        }
    }

    #[test]
    fn display() {
        assert_eq!(BusRange::RP1.to_string(), "pri 00 sec 80 sub ff");
    }
}
