use std::io::Read;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::error::Result;
use crate::instruction::Instruction;
use crate::opcode::Opcode;
use crate::operations::{execute, Flow};
use crate::state::{FrameBuffer, Keys, State};

/// Outcome of a single `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// An instruction was executed
    Running,
    /// Blocked on FX0A until a key goes down
    Waiting,
    /// The zero instruction was fetched
    Halted,
}

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `pressed_keys` with public interfaces for manipulating them
///  - the random source behind CXKK
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU and its timers
/// - inspecting its frame buffer for rendering by some display
pub struct Chip8 {
    state: State,
    pressed_keys: Keys,
    rng: StdRng,
}

impl Chip8 {
    pub fn new(config: &Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8 {
            state: State::new(),
            pressed_keys: [false; 16],
            rng,
        }
    }

    /// A machine with `rom` loaded and ready to run
    pub fn from_rom(rom: &[u8], config: &Config) -> Result<Self> {
        let mut chip8 = Chip8::new(config);
        chip8.state = State::with_rom(rom)?;
        log::info!("loaded {} byte ROM", rom.len());
        Ok(chip8)
    }

    /// Load a rom from a source file, resetting the machine
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<()> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        self.state = State::with_rom(&rom)?;
        self.pressed_keys = [false; 16];
        log::info!("loaded {} byte ROM", rom.len());
        Ok(())
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    pub fn keys(&self) -> Keys {
        self.pressed_keys
    }

    /// Whether the sound timer is still running
    pub fn is_sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// Replaces the whole key vector.
    /// A key going from released to pressed satisfies a pending FX0A.
    pub fn set_keys(&mut self, keys: Keys) {
        let newly_pressed = (0..16u8).find(|&k| keys[k as usize] && !self.pressed_keys[k as usize]);
        self.pressed_keys = keys;
        if let Some(key) = newly_pressed {
            self.deliver_key(key);
        }
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the keypad value 0x0..=0xF that was pressed
    pub fn key_press(&mut self, key: u8) {
        let mut keys = self.pressed_keys;
        keys[(key & 0xF) as usize] = true;
        self.set_keys(keys);
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the keypad value 0x0..=0xF that was released
    pub fn key_release(&mut self, key: u8) {
        self.pressed_keys[(key & 0xF) as usize] = false;
    }

    fn deliver_key(&mut self, key: u8) {
        if let Some(register) = self.state.register_needing_key.take() {
            log::debug!("key {:X} -> V{:X}", key, register);
            self.state.v[register as usize] = key;
        }
    }

    /// Advances the CPU by a single cycle
    /// - does nothing while awaiting a keypress
    /// - stops on the zero instruction
    /// - otherwise executes the next opcode and moves the pc
    ///
    /// A failing instruction leaves the state exactly as it was before the step.
    pub fn step(&mut self) -> Result<Status> {
        if self.state.register_needing_key.is_some() {
            return Ok(Status::Waiting);
        }

        let op = self.get_op()?;
        let instruction = Instruction::decode(op);
        if instruction == Instruction::Halt {
            log::info!("halted at {:#05X}", self.state.pc);
            return Ok(Status::Halted);
        }

        log::debug!(
            "{:04X} {:<16} v{:02X?} i{:04X} pc{:04X}",
            op,
            instruction.to_string(),
            self.state.v,
            self.state.i,
            self.state.pc
        );

        let (mut next, flow) = execute(instruction, &self.state, &self.pressed_keys, &mut self.rng)?;
        next.pc = match flow {
            Flow::Next => self.state.pc + 0x2,
            Flow::Skip => self.state.pc + 0x4,
            Flow::Jump(addr) => addr,
        };
        self.state = next;
        Ok(Status::Running)
    }

    /// Counts the delay and sound timers down by `ticks` 60Hz ticks
    pub fn advance_timers(&mut self, ticks: u32) {
        self.state.decay_timers(ticks);
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    fn get_op(&self) -> Result<u16> {
        let pc = self.state.pc as usize;
        let high = self.state.read_byte(pc)?;
        let low = self.state.read_byte(pc + 1)?;
        Ok(u16::from_bytes(high, low))
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl From<State> for Chip8 {
    fn from(state: State) -> Self {
        Chip8 {
            state,
            ..Chip8::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Chip8Error;

    fn chip8_with(rom: &[u8]) -> Chip8 {
        Chip8::from_rom(rom, &Config::with_seed(7)).unwrap()
    }

    #[test]
    fn test_chip8_gets_op() {
        let chip8 = chip8_with(&[0xAA, 0xBB]);
        assert_eq!(chip8.get_op().unwrap(), 0xAABB);
    }

    #[test]
    fn test_get_op_at_last_byte_is_out_of_bounds() {
        let mut chip8 = Chip8::default();
        chip8.state.pc = 0xFFF;
        assert!(matches!(
            chip8.step(),
            Err(Chip8Error::OutOfBounds { address: 0x1000 })
        ));
    }

    #[test]
    fn test_step_advances_pc() {
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        assert_eq!(chip8.step().unwrap(), Status::Running);
        assert_eq!(chip8.state.pc, 0x202);
    }

    #[test]
    fn test_step_skips() {
        // V0 == 0 so 3000 skips the following word
        let mut chip8 = chip8_with(&[0x30, 0x00]);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, 0x204);
    }

    #[test]
    fn test_step_jumps_exactly_to_target() {
        let mut chip8 = chip8_with(&[0x13, 0x00]);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, 0x300);
    }

    #[test]
    fn test_call_then_return_lands_after_call_site() {
        let mut rom = vec![0u8; 0x100];
        rom[0..2].copy_from_slice(&[0x22, 0x80]); // 0x200: CALL 0x280
        rom[0x80..0x82].copy_from_slice(&[0x00, 0xEE]); // 0x280: RET
        let mut chip8 = chip8_with(&rom);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, 0x280);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.sp, 0);
    }

    #[test]
    fn test_zero_instruction_halts_without_moving() {
        let mut chip8 = chip8_with(&[]);
        assert_eq!(chip8.step().unwrap(), Status::Halted);
        assert_eq!(chip8.state.pc, 0x200);
    }

    #[test]
    fn test_clear_then_halt() {
        let mut chip8 = chip8_with(&[0x00, 0xE0, 0x00, 0x00]);
        chip8.state.frame_buffer = [[1; 64]; 32];
        assert_eq!(chip8.step().unwrap(), Status::Running);
        assert!(chip8.frame().iter().flatten().all(|&p| p == 0));
        assert_eq!(chip8.step().unwrap(), Status::Halted);
    }

    #[test]
    fn test_failed_step_leaves_state_untouched() {
        // RET with nothing on the stack
        let mut chip8 = chip8_with(&[0x60, 0x05, 0x00, 0xEE]);
        chip8.step().unwrap();
        assert!(matches!(
            chip8.step(),
            Err(Chip8Error::StackUnderflow { pc: 0x202 })
        ));
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.v[0], 0x05);
    }

    #[test]
    fn test_doesnt_cycle_while_register_needs_key() {
        let mut chip8 = chip8_with(&[0xF3, 0x0A, 0x60, 0x01]);
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.step().unwrap(), Status::Waiting);
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.v[0], 0);
    }

    #[test]
    fn test_captures_key_presses() {
        let mut chip8 = Chip8::default();
        chip8.state.register_needing_key = Some(0x1);
        chip8.key_press(0xE);
        assert_eq!(chip8.state.register_needing_key, None);
        assert_eq!(chip8.state.v[0x1], 0xE);
        assert!(chip8.keys()[0xE]);
    }

    #[test]
    fn test_held_key_does_not_satisfy_wait() {
        let mut chip8 = Chip8::default();
        let mut keys = [false; 16];
        keys[0x4] = true;
        chip8.set_keys(keys);
        chip8.state.register_needing_key = Some(0x2);
        // still held: no transition
        chip8.set_keys(keys);
        assert_eq!(chip8.state.register_needing_key, Some(0x2));
        // a second key goes down
        keys[0x9] = true;
        chip8.set_keys(keys);
        assert_eq!(chip8.state.register_needing_key, None);
        assert_eq!(chip8.state.v[0x2], 0x9);
    }

    #[test]
    fn test_key_release() {
        let mut chip8 = Chip8::default();
        chip8.key_press(0x3);
        chip8.key_release(0x3);
        assert_eq!(chip8.keys(), [false; 16]);
    }

    #[test]
    fn test_advance_timers() {
        let mut chip8 = Chip8::default();
        chip8.state.delay_timer = 10;
        chip8.state.sound_timer = 1;
        assert!(chip8.is_sound_active());
        chip8.advance_timers(3);
        assert_eq!(chip8.state.delay_timer, 7);
        assert!(!chip8.is_sound_active());
    }

    #[test]
    fn test_load_rom_resets_machine() {
        let mut chip8 = chip8_with(&[0x6A, 0x02]);
        chip8.step().unwrap();
        let mut rom: &[u8] = &[0x12, 0x34];
        chip8.load_rom(&mut rom).unwrap();
        assert_eq!(chip8.state.pc, 0x200);
        assert_eq!(chip8.state.v[0xA], 0);
        assert_eq!(chip8.state.memory[0x200..0x202], [0x12, 0x34]);
    }

    #[test]
    fn test_load_rom_rejects_oversized() {
        let mut chip8 = Chip8::default();
        let big = vec![0u8; 0xE01];
        let mut rom: &[u8] = &big;
        assert!(matches!(
            chip8.load_rom(&mut rom),
            Err(Chip8Error::OversizedRom { .. })
        ));
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let rom = [0xC0, 0xFF, 0xC1, 0xFF];
        let mut a = chip8_with(&rom);
        let mut b = chip8_with(&rom);
        for _ in 0..2 {
            a.step().unwrap();
            b.step().unwrap();
        }
        assert_eq!(a.state.v[..2], b.state.v[..2]);
    }
}
