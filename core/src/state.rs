use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, MAX_ROM_SIZE, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET,
    STACK_SIZE,
};
use crate::error::{Chip8Error, Result};

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry/borrow/collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses currently on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented at 60Hz by the driver
///
/// ## Memory
/// - 16 entry stack of return addresses
/// - 4096 bytes of addressable memory, the sprite sheet lives at 0x000
/// - 32x64 frame buffer of 0/1 pixels
///
/// ## Input
/// - Emulation halts until a key's value is written to `register_needing_key`
#[derive(Copy, Clone)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_SIZE],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub register_needing_key: Option<u8>,
}

impl State {
    pub fn new() -> Self {
        // 0x000 - 0x050 holds the sprite sheet
        let mut memory = [0; MEMORY_SIZE];
        memory[0..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            register_needing_key: None,
        }
    }

    /// A fresh state with `rom` copied in at `PROGRAM_START`
    pub fn with_rom(rom: &[u8]) -> Result<Self> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::OversizedRom {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let mut state = State::new();
        let start = PROGRAM_START as usize;
        state.memory[start..start + rom.len()].copy_from_slice(rom);
        Ok(state)
    }

    /// Counts both timers down by `ticks`, stopping at zero
    pub fn decay_timers(&mut self, ticks: u32) {
        let ticks = ticks.min(u32::from(u8::MAX)) as u8;
        self.delay_timer = self.delay_timer.saturating_sub(ticks);
        self.sound_timer = self.sound_timer.saturating_sub(ticks);
    }

    pub fn read_byte(&self, address: usize) -> Result<u8> {
        self.memory
            .get(address)
            .copied()
            .ok_or(Chip8Error::OutOfBounds { address })
    }

    /// `len` bytes of memory starting at `address`
    pub fn read_slice(&self, address: usize, len: usize) -> Result<&[u8]> {
        let end = checked_end(address, len)?;
        Ok(&self.memory[address..end])
    }

    pub fn write_slice(&mut self, address: usize, data: &[u8]) -> Result<()> {
        let end = checked_end(address, data.len())?;
        self.memory[address..end].copy_from_slice(data);
        Ok(())
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// Reports the first offending address when a range runs off the end of memory
fn checked_end(address: usize, len: usize) -> Result<usize> {
    let end = address + len;
    if end > MEMORY_SIZE {
        Err(Chip8Error::OutOfBounds {
            address: address.max(MEMORY_SIZE),
        })
    } else {
        Ok(end)
    }
}

/// The FrameBuffer is indexed as [y][x]; each pixel is 0 (off) or 1 (on)
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// Pressed status of keypad keys 0..F
pub type Keys = [bool; 16];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_loads_sprite_sheet() {
        let state = State::new();
        assert_eq!(state.memory[..80], SPRITE_SHEET[..]);
        assert!(state.memory[80..].iter().all(|&b| b == 0));
        assert_eq!(state.pc, 0x200);
    }

    #[test]
    fn test_with_rom_places_bytes_at_program_start() {
        let state = State::with_rom(&[0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(state.memory[0x200..0x203], [0xAA, 0xBB, 0xCC]);
        assert_eq!(state.memory[0x203], 0);
    }

    #[test]
    fn test_with_rom_accepts_exactly_full_memory() {
        let rom = vec![0x12; MAX_ROM_SIZE];
        let state = State::with_rom(&rom).unwrap();
        assert_eq!(state.memory[0xFFF], 0x12);
    }

    #[test]
    fn test_with_rom_rejects_oversized() {
        let rom = vec![0; MAX_ROM_SIZE + 1];
        match State::with_rom(&rom) {
            Err(Chip8Error::OversizedRom { size, max }) => {
                assert_eq!(size, 0xE01);
                assert_eq!(max, 0xE00);
            }
            _ => panic!("expected OversizedRom"),
        }
    }

    #[test]
    fn test_decay_timers() {
        let mut state = State::new();
        state.delay_timer = 10;
        state.sound_timer = 2;
        state.decay_timers(3);
        assert_eq!(state.delay_timer, 7);
        assert_eq!(state.sound_timer, 0);
    }

    #[test]
    fn test_decay_timers_huge_tick_count() {
        let mut state = State::new();
        state.delay_timer = 0xFF;
        state.decay_timers(10_000);
        assert_eq!(state.delay_timer, 0);
    }

    #[test]
    fn test_read_slice_bounds() {
        let state = State::new();
        assert_eq!(state.read_slice(0xFFE, 2).unwrap(), &[0, 0]);
        assert!(matches!(
            state.read_slice(0xFFF, 2),
            Err(Chip8Error::OutOfBounds { address: 0x1000 })
        ));
    }

    #[test]
    fn test_write_slice_past_end_leaves_memory_untouched() {
        let mut state = State::new();
        assert!(state.write_slice(0xFFE, &[1, 2, 3]).is_err());
        assert_eq!(state.memory[0xFFE..], [0, 0]);
    }
}
