//! Phase sequencing for stepper wiring topologies.
//!
//! Maps a step counter to the pin pattern that realises it. Bit `i` of a
//! pattern drives pattern slot `i`; consecutive entries differ by the fewest
//! coil transitions so that walking the table in either direction never
//! skips or doubles a phase.

mod output;

use serde::Deserialize;

pub use output::{Functional, PhaseSequencer, PinDriver, StepOutput};

/// 2-wire full step: Gray sequence over two H-bridge inputs.
pub const FULL_2WIRE: [u8; 4] = [0b10, 0b11, 0b01, 0b00];

/// 3-wire full step: one winding energised at a time.
pub const FULL_3WIRE: [u8; 3] = [0b100, 0b001, 0b010];

/// 4-wire full step: two windings energised at a time.
pub const FULL_4WIRE: [u8; 4] = [0b0101, 0b0110, 0b1010, 0b1001];

/// 3-wire half step.
pub const HALF_3WIRE: [u8; 6] = [0b100, 0b101, 0b001, 0b011, 0b010, 0b110];

/// 4-wire half step.
pub const HALF_4WIRE: [u8; 8] = [
    0b0001, 0b0101, 0b0100, 0b0110, 0b0010, 0b1010, 0b1000, 0b1001,
];

/// Motor wiring topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interface {
    /// Caller-supplied forward/backward callbacks, no pins.
    Functional,
    /// Step/direction driver board: slot 0 is STEP, slot 1 is DIR.
    Driver,
    /// 2-wire full step.
    Full2Wire,
    /// 3-wire full step.
    Full3Wire,
    /// 4-wire full step.
    Full4Wire,
    /// 3-wire half step.
    Half3Wire,
    /// 4-wire half step.
    Half4Wire,
}

impl Interface {
    /// Number of pins the topology drives.
    pub const fn pin_count(self) -> usize {
        match self {
            Interface::Functional => 0,
            Interface::Driver | Interface::Full2Wire => 2,
            Interface::Full3Wire | Interface::Half3Wire => 3,
            Interface::Full4Wire | Interface::Half4Wire => 4,
        }
    }

    /// Phase table for coil topologies.
    ///
    /// `Functional` and `Driver` have no table: they emit callbacks or pulses.
    pub const fn table(self) -> Option<&'static [u8]> {
        match self {
            Interface::Functional | Interface::Driver => None,
            Interface::Full2Wire => Some(&FULL_2WIRE),
            Interface::Full3Wire => Some(&FULL_3WIRE),
            Interface::Full4Wire => Some(&FULL_4WIRE),
            Interface::Half3Wire => Some(&HALF_3WIRE),
            Interface::Half4Wire => Some(&HALF_4WIRE),
        }
    }

    /// Pin pattern for a step counter, cycling with the table length.
    ///
    /// Negative counters continue the cycle backwards.
    pub fn pattern(self, step: i64) -> Option<u8> {
        self.table()
            .map(|table| table[step.rem_euclid(table.len() as i64) as usize])
    }

    /// Whether the first and fourth pins swap pattern slots.
    ///
    /// 4-wire motors are wired with pin 4 in slot 0 and pin 1 in slot 3.
    pub const fn swaps_outer_pins(self) -> bool {
        matches!(self, Interface::Full4Wire | Interface::Half4Wire)
    }

    /// Configuration name of the topology.
    pub const fn name(self) -> &'static str {
        match self {
            Interface::Functional => "functional",
            Interface::Driver => "driver",
            Interface::Full2Wire => "full2wire",
            Interface::Full3Wire => "full3wire",
            Interface::Full4Wire => "full4wire",
            Interface::Half3Wire => "half3wire",
            Interface::Half4Wire => "half4wire",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COIL_INTERFACES: [(Interface, usize); 5] = [
        (Interface::Full2Wire, 4),
        (Interface::Full3Wire, 3),
        (Interface::Full4Wire, 4),
        (Interface::Half3Wire, 6),
        (Interface::Half4Wire, 8),
    ];

    #[test]
    fn test_tables_cycle_with_their_length() {
        for (interface, len) in COIL_INTERFACES {
            let table = interface.table().unwrap();
            assert_eq!(table.len(), len);
            for step in 0..(3 * len as i64) {
                assert_eq!(interface.pattern(step), interface.pattern(step + len as i64));
            }
        }
    }

    #[test]
    fn test_table_entries_are_distinct() {
        for (interface, _) in COIL_INTERFACES {
            let table = interface.table().unwrap();
            for (i, a) in table.iter().enumerate() {
                for b in &table[i + 1..] {
                    assert_ne!(a, b, "{:?} repeats a pattern", interface);
                }
            }
        }
    }

    #[test]
    fn test_half_step_neighbours_differ_by_one_coil() {
        for interface in [Interface::Half3Wire, Interface::Half4Wire] {
            let table = interface.table().unwrap();
            for i in 0..table.len() {
                let next = table[(i + 1) % table.len()];
                assert_eq!((table[i] ^ next).count_ones(), 1);
            }
        }
    }

    #[test]
    fn test_patterns_stay_within_pin_count() {
        for (interface, _) in COIL_INTERFACES {
            let limit = 1u8 << interface.pin_count();
            assert!(interface.table().unwrap().iter().all(|&p| p < limit));
        }
    }

    #[test]
    fn test_negative_steps_continue_cycle() {
        assert_eq!(Interface::Full3Wire.pattern(-1), Some(FULL_3WIRE[2]));
        assert_eq!(Interface::Half3Wire.pattern(-7), Some(HALF_3WIRE[5]));
        assert_eq!(Interface::Half4Wire.pattern(-1), Some(HALF_4WIRE[7]));
    }

    #[test]
    fn test_pinless_interfaces_have_no_table() {
        assert_eq!(Interface::Functional.pattern(3), None);
        assert_eq!(Interface::Driver.pattern(3), None);
        assert_eq!(Interface::Functional.pin_count(), 0);
        assert_eq!(Interface::Driver.pin_count(), 2);
    }
}
