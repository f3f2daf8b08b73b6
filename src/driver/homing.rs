// Homing sequence
// The controller does not necessarily reset when the MCU does, so at start-up it can be in any of
// three states:
//   a) 8-bit mode
//   b) 4-bit mode with the next nibble being the upper half of a byte
//   c) 4-bit mode with the next nibble being the lower half of a byte (MCU reset mid-transfer)
// Nothing can be read back before the bus is in sync, so the sequence is purely timed. Sending
// 0b0011 three times converges every case to 8-bit mode:
//   a) 0b0011**** executed three times, stays in 8-bit mode
//   b) first nibble stored, second completes 0b00110011 (8-bit), third executes as 0b0011****
//   c) first nibble completes an unknown command, second is stored, third completes 0b00110011
// after which 0b0010 is executed as 0b0010**** and switches to 4-bit mode.

/// Progress of the homing sequence. The terminal state is [`HomingState::Final4Bit`].
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingState {
    /// Bus mode and nibble phase are unknown.
    Unknown,
    /// `sent` function-set nibbles with DL=1 are out; the controller may still be mid-byte.
    Forced8Bit { sent: u8 },
    /// Three DL=1 nibbles are out. The controller is in 8-bit mode whatever its start state.
    Confirmed8Bit,
    /// Switched to 4-bit mode and in nibble sync.
    Final4Bit,
}

/// One nibble of the homing sequence and how long to hold off afterwards.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct HomingStep {
    pub nibble: u8,
    pub hold_us: u32,
}

// 0b0011: function set, DL=1
const NIBBLE_8BIT: u8 = 0b0011;
// 0b0010: function set, DL=0
const NIBBLE_4BIT: u8 = 0b0010;

/// Long enough for any command issued from an unknown prior state to finish (min. 4.1 ms)
const FIRST_HOLD_US: u32 = 5_000;
/// Long enough for a 0b0011**** command to finish (min. 100 us)
const SYNC_HOLD_US: u32 = 100;
const SWITCH_HOLD_US: u32 = 42;

impl HomingState {
    /// The nibble to send from this state and the state reached once it has been sent and held.
    /// Returns `None` once the sequence is complete.
    pub fn step(&self) -> Option<(HomingStep, HomingState)> {
        let (nibble, hold_us, next) = match *self {
            HomingState::Unknown => (NIBBLE_8BIT, FIRST_HOLD_US, HomingState::Forced8Bit { sent: 1 }),
            HomingState::Forced8Bit { sent } if sent < 2 => (
                NIBBLE_8BIT,
                SYNC_HOLD_US,
                HomingState::Forced8Bit { sent: sent + 1 },
            ),
            HomingState::Forced8Bit { .. } => (NIBBLE_8BIT, SYNC_HOLD_US, HomingState::Confirmed8Bit),
            HomingState::Confirmed8Bit => (NIBBLE_4BIT, SWITCH_HOLD_US, HomingState::Final4Bit),
            HomingState::Final4Bit => return None,
        };
        Some((HomingStep { nibble, hold_us }, next))
    }

    pub fn is_synchronized(&self) -> bool {
        *self == HomingState::Final4Bit
    }
}
