use rand::Rng;

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, GLYPH_SIZE, SPRITE_WIDTH, STACK_SIZE};
use crate::error::{Chip8Error, Result};
use crate::instruction::Instruction;
use crate::state::{Keys, State};

/// What the driver should do with the program counter after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// pc += 2
    Next,
    /// pc += 4
    Skip,
    /// pc = addr; no automatic advance
    Jump(u16),
}

impl Flow {
    fn skip_if(condition: bool) -> Self {
        if condition {
            Flow::Skip
        } else {
            Flow::Next
        }
    }
}

/// Executes a single instruction against `state`.
///
/// Returns the successor state and how to move the program counter; the
/// program counter itself is never touched here. On error `state` is unchanged.
pub fn execute<R: Rng>(
    instruction: Instruction,
    state: &State,
    keys: &Keys,
    rng: &mut R,
) -> Result<(State, Flow)> {
    use Instruction::*;

    match instruction {
        // the driver stops before executing this; if it does get here, stay put
        Halt => Ok((*state, Flow::Jump(state.pc))),
        Clear => Ok(clr(state)),
        Return => rts(state),
        Jump { addr } => Ok((*state, Flow::Jump(addr))),
        Call { addr } => call(state, addr),
        SkipEqImm { x, kk } => Ok((*state, Flow::skip_if(state.v[x as usize] == kk))),
        SkipNeImm { x, kk } => Ok((*state, Flow::skip_if(state.v[x as usize] != kk))),
        SkipEqReg { x, y } => Ok((
            *state,
            Flow::skip_if(state.v[x as usize] == state.v[y as usize]),
        )),
        LoadImm { x, kk } => Ok(set_register(state, x, kk)),
        AddImm { x, kk } => Ok(set_register(state, x, state.v[x as usize].wrapping_add(kk))),
        Move { x, y } => Ok(set_register(state, x, state.v[y as usize])),
        Or { x, y } => Ok(set_register(state, x, state.v[x as usize] | state.v[y as usize])),
        And { x, y } => Ok(set_register(state, x, state.v[x as usize] & state.v[y as usize])),
        Xor { x, y } => Ok(set_register(state, x, state.v[x as usize] ^ state.v[y as usize])),
        AddReg { x, y } => Ok(addr(state, x, y)),
        Sub { x, y } => Ok(sub(state, x, x, y)),
        ShiftRight { x } => Ok(shr(state, x)),
        SubN { x, y } => Ok(sub(state, x, y, x)),
        ShiftLeft { x } => Ok(shl(state, x)),
        SkipNeReg { x, y } => Ok((
            *state,
            Flow::skip_if(state.v[x as usize] != state.v[y as usize]),
        )),
        LoadIndex { addr } => Ok((State { i: addr, ..*state }, Flow::Next)),
        JumpOffset { addr } => Ok((*state, Flow::Jump(addr + u16::from(state.v[0x0])))),
        Random { x, kk } => Ok(set_register(state, x, rng.gen::<u8>() & kk)),
        Draw { x, y, n } => draw(state, x, y, n),
        SkipPressed { x } => Ok((*state, Flow::skip_if(key_for(state, keys, x)))),
        SkipNotPressed { x } => Ok((*state, Flow::skip_if(!key_for(state, keys, x)))),
        ReadDelay { x } => Ok(set_register(state, x, state.delay_timer)),
        WaitKey { x } => Ok((
            State {
                register_needing_key: Some(x),
                ..*state
            },
            Flow::Next,
        )),
        SetDelay { x } => Ok((
            State {
                delay_timer: state.v[x as usize],
                ..*state
            },
            Flow::Next,
        )),
        SetSound { x } => Ok((
            State {
                sound_timer: state.v[x as usize],
                ..*state
            },
            Flow::Next,
        )),
        AddIndex { x } => Ok(addi(state, x)),
        LoadGlyph { x } => Ok(ldspr(state, x)),
        Bcd { x } => bcd(state, x),
        Store { x } => stor(state, x),
        Read { x } => read(state, x),
        Unknown(op) => {
            log::warn!("skipping unknown opcode {:#06X} at {:#05X}", op, state.pc);
            Ok((*state, Flow::Next))
        }
    }
}

/// Vx = value
fn set_register(state: &State, x: u8, value: u8) -> (State, Flow) {
    let mut v = state.v;
    v[x as usize] = value;
    (State { v, ..*state }, Flow::Next)
}

/// clear
fn clr(state: &State) -> (State, Flow) {
    (
        State {
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            ..*state
        },
        Flow::Next,
    )
}

/// PC = STACK.pop()
fn rts(state: &State) -> Result<(State, Flow)> {
    let sp = state
        .sp
        .checked_sub(1)
        .ok_or(Chip8Error::StackUnderflow { pc: state.pc })?;
    let target = state.stack[sp as usize];
    Ok((State { sp, ..*state }, Flow::Jump(target)))
}

/// STACK.push(PC + 2); PC = addr
fn call(state: &State, addr: u16) -> Result<(State, Flow)> {
    if state.sp as usize >= STACK_SIZE {
        return Err(Chip8Error::StackOverflow { pc: state.pc });
    }
    let mut stack = state.stack;
    stack[state.sp as usize] = state.pc + 0x2;
    Ok((
        State {
            sp: state.sp + 1,
            stack,
            ..*state
        },
        Flow::Jump(addr),
    ))
}

/// Vx += Vy; VF = carry
fn addr(state: &State, x: u8, y: u8) -> (State, Flow) {
    let (res, carry) = state.v[x as usize].overflowing_add(state.v[y as usize]);
    with_flag(state, x, res, carry)
}

/// Vx = Va - Vb; VF = !borrow
/// Used for both SUB (a = x, b = y) and SUBN (a = y, b = x)
fn sub(state: &State, x: u8, a: u8, b: u8) -> (State, Flow) {
    let (res, borrow) = state.v[a as usize].overflowing_sub(state.v[b as usize]);
    with_flag(state, x, res, !borrow)
}

/// Vx >>= 1; VF = shifted out bit
fn shr(state: &State, x: u8) -> (State, Flow) {
    let value = state.v[x as usize];
    with_flag(state, x, value >> 1, value & 0x1 == 0x1)
}

/// Vx <<= 1; VF = shifted out bit
fn shl(state: &State, x: u8) -> (State, Flow) {
    let value = state.v[x as usize];
    with_flag(state, x, value << 1, value & 0x80 == 0x80)
}

/// Writes the result before VF so that the flag wins when x is 0xF
fn with_flag(state: &State, x: u8, result: u8, flag: bool) -> (State, Flow) {
    let mut v = state.v;
    v[x as usize] = result;
    v[0xF] = u8::from(flag);
    (State { v, ..*state }, Flow::Next)
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position x, y on the FrameBuffer with wrapping.
/// Sets VF if any pixels were erased
fn draw(state: &State, x: u8, y: u8, n: u8) -> Result<(State, Flow)> {
    let sprite = state.read_slice(state.i as usize, n as usize)?;
    let origin_x = state.v[x as usize] as usize;
    let origin_y = state.v[y as usize] as usize;

    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;

    // Reset the carry flag (used for collision detection)
    v[0xF] = 0x0;

    for (row, byte) in sprite.iter().enumerate() {
        let py = (origin_y + row) % DISPLAY_HEIGHT;
        for bit in 0..SPRITE_WIDTH {
            let px = (origin_x + bit) % DISPLAY_WIDTH;
            let pixel = (byte >> (7 - bit)) & 1;
            v[0xF] |= pixel & frame_buffer[py][px];
            frame_buffer[py][px] ^= pixel;
        }
    }

    Ok((
        State {
            v,
            frame_buffer,
            ..*state
        },
        Flow::Next,
    ))
}

/// Only the low nibble of Vx names a key
fn key_for(state: &State, keys: &Keys, x: u8) -> bool {
    keys[(state.v[x as usize] & 0xF) as usize]
}

/// I += Vx, wrapping within the 12-bit address space; VF is untouched
fn addi(state: &State, x: u8) -> (State, Flow) {
    let i = (state.i + u16::from(state.v[x as usize])) & 0x0FFF;
    (State { i, ..*state }, Flow::Next)
}

/// I = glyph address of the low nibble of Vx
fn ldspr(state: &State, x: u8) -> (State, Flow) {
    let glyph = u16::from(state.v[x as usize] & 0xF);
    (
        State {
            i: glyph * GLYPH_SIZE,
            ..*state
        },
        Flow::Next,
    )
}

/// mem[I..I+3] = bcd(Vx)
fn bcd(state: &State, x: u8) -> Result<(State, Flow)> {
    let value = state.v[x as usize];
    let digits = [value / 100, value / 10 % 10, value % 10];
    let mut next = *state;
    next.write_slice(state.i as usize, &digits)?;
    Ok((next, Flow::Next))
}

/// mem[I..=I+x] = V0..=Vx; I += x + 1
fn stor(state: &State, x: u8) -> Result<(State, Flow)> {
    let count = x as usize + 1;
    let mut next = *state;
    next.write_slice(state.i as usize, &state.v[..count])?;
    next.i = state.i + count as u16;
    Ok((next, Flow::Next))
}

/// V0..=Vx = mem[I..=I+x]; I += x + 1
fn read(state: &State, x: u8) -> Result<(State, Flow)> {
    let count = x as usize + 1;
    let mut v = state.v;
    v[..count].copy_from_slice(state.read_slice(state.i as usize, count)?);
    Ok((
        State {
            v,
            i: state.i + count as u16,
            ..*state
        },
        Flow::Next,
    ))
}
