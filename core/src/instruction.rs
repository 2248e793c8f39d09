use std::fmt;

use crate::opcode::Opcode;

/// A decoded opcode with its operands pulled out.
///
/// `x`/`y` are register indices, `kk` an immediate byte, `addr` a 12-bit address
/// and `n` a sprite height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 0000: end of program
    Halt,
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1nnn
    Jump { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SkipEqImm { x: u8, kk: u8 },
    /// 4xkk
    SkipNeImm { x: u8, kk: u8 },
    /// 5xy0
    SkipEqReg { x: u8, y: u8 },
    /// 6xkk
    LoadImm { x: u8, kk: u8 },
    /// 7xkk
    AddImm { x: u8, kk: u8 },
    /// 8xy0
    Move { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddReg { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    ShiftRight { x: u8 },
    /// 8xy7
    SubN { x: u8, y: u8 },
    /// 8xyE
    ShiftLeft { x: u8 },
    /// 9xy0
    SkipNeReg { x: u8, y: u8 },
    /// Annn
    LoadIndex { addr: u16 },
    /// Bnnn
    JumpOffset { addr: u16 },
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipPressed { x: u8 },
    /// ExA1
    SkipNotPressed { x: u8 },
    /// Fx07
    ReadDelay { x: u8 },
    /// Fx0A
    WaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddIndex { x: u8 },
    /// Fx29
    LoadGlyph { x: u8 },
    /// Fx33
    Bcd { x: u8 },
    /// Fx55
    Store { x: u8 },
    /// Fx65
    Read { x: u8 },
    /// Anything else; executed as a no-op
    Unknown(u16),
}

impl Instruction {
    /// Selects the correct Instruction for a given Opcode
    pub fn decode(op: u16) -> Self {
        use Instruction::*;

        let (x, y, n, kk, addr) = (op.x(), op.y(), op.n(), op.kk(), op.addr());
        match op.nibbles() {
            (0x0, 0x0, 0x0, 0x0) => Halt,
            (0x0, 0x0, 0xE, 0x0) => Clear,
            (0x0, 0x0, 0xE, 0xE) => Return,
            (0x1, ..) => Jump { addr },
            (0x2, ..) => Call { addr },
            (0x3, ..) => SkipEqImm { x, kk },
            (0x4, ..) => SkipNeImm { x, kk },
            (0x5, .., 0x0) => SkipEqReg { x, y },
            (0x6, ..) => LoadImm { x, kk },
            (0x7, ..) => AddImm { x, kk },
            (0x8, .., 0x0) => Move { x, y },
            (0x8, .., 0x1) => Or { x, y },
            (0x8, .., 0x2) => And { x, y },
            (0x8, .., 0x3) => Xor { x, y },
            (0x8, .., 0x4) => AddReg { x, y },
            (0x8, .., 0x5) => Sub { x, y },
            (0x8, .., 0x6) => ShiftRight { x },
            (0x8, .., 0x7) => SubN { x, y },
            (0x8, .., 0xE) => ShiftLeft { x },
            (0x9, .., 0x0) => SkipNeReg { x, y },
            (0xA, ..) => LoadIndex { addr },
            (0xB, ..) => JumpOffset { addr },
            (0xC, ..) => Random { x, kk },
            (0xD, ..) => Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => SkipPressed { x },
            (0xE, _, 0xA, 0x1) => SkipNotPressed { x },
            (0xF, _, 0x0, 0x7) => ReadDelay { x },
            (0xF, _, 0x0, 0xA) => WaitKey { x },
            (0xF, _, 0x1, 0x5) => SetDelay { x },
            (0xF, _, 0x1, 0x8) => SetSound { x },
            (0xF, _, 0x1, 0xE) => AddIndex { x },
            (0xF, _, 0x2, 0x9) => LoadGlyph { x },
            (0xF, _, 0x3, 0x3) => Bcd { x },
            (0xF, _, 0x5, 0x5) => Store { x },
            (0xF, _, 0x6, 0x5) => Read { x },
            _ => Unknown(op),
        }
    }
}

/// Assembler-style mnemonics, used by the execution trace
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Halt => write!(f, "HALT"),
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump { addr } => write!(f, "JP {:#05X}", addr),
            Call { addr } => write!(f, "CALL {:#05X}", addr),
            SkipEqImm { x, kk } => write!(f, "SE V{:X}, {:#04X}", x, kk),
            SkipNeImm { x, kk } => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm { x, kk } => write!(f, "LD V{:X}, {:#04X}", x, kk),
            AddImm { x, kk } => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x } => write!(f, "SHR V{:X}", x),
            SubN { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { addr } => write!(f, "LD I, {:#05X}", addr),
            JumpOffset { addr } => write!(f, "JP V0, {:#05X}", addr),
            Random { x, kk } => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipPressed { x } => write!(f, "SKP V{:X}", x),
            SkipNotPressed { x } => write!(f, "SKNP V{:X}", x),
            ReadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            Bcd { x } => write!(f, "LD B, V{:X}", x),
            Store { x } => write!(f, "LD [I], V{:X}", x),
            Read { x } => write!(f, "LD V{:X}, [I]", x),
            Unknown(op) => write!(f, "??? {:#06X}", op),
        }
    }
}

#[cfg(test)]
mod test_instruction {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn test_0000_halts() {
        assert_eq!(Instruction::decode(0x0000), Halt);
    }

    #[test]
    fn test_0nnn_sys_is_unknown() {
        assert_eq!(Instruction::decode(0x0123), Unknown(0x0123));
    }

    #[test]
    fn test_decodes_fixed_functions() {
        assert_eq!(Instruction::decode(0x00E0), Clear);
        assert_eq!(Instruction::decode(0x00EE), Return);
    }

    #[test]
    fn test_decodes_addresses() {
        assert_eq!(Instruction::decode(0x1ABC), Jump { addr: 0xABC });
        assert_eq!(Instruction::decode(0x2ABC), Call { addr: 0xABC });
        assert_eq!(Instruction::decode(0xAABC), LoadIndex { addr: 0xABC });
        assert_eq!(Instruction::decode(0xBABC), JumpOffset { addr: 0xABC });
    }

    #[test]
    fn test_decodes_immediates() {
        assert_eq!(Instruction::decode(0x3A12), SkipEqImm { x: 0xA, kk: 0x12 });
        assert_eq!(Instruction::decode(0x4A12), SkipNeImm { x: 0xA, kk: 0x12 });
        assert_eq!(Instruction::decode(0x6A02), LoadImm { x: 0xA, kk: 0x02 });
        assert_eq!(Instruction::decode(0x7001), AddImm { x: 0x0, kk: 0x01 });
        assert_eq!(Instruction::decode(0xC30F), Random { x: 0x3, kk: 0x0F });
    }

    #[test]
    fn test_decodes_alu_family() {
        assert_eq!(Instruction::decode(0x8120), Move { x: 1, y: 2 });
        assert_eq!(Instruction::decode(0x8121), Or { x: 1, y: 2 });
        assert_eq!(Instruction::decode(0x8122), And { x: 1, y: 2 });
        assert_eq!(Instruction::decode(0x8123), Xor { x: 1, y: 2 });
        assert_eq!(Instruction::decode(0x8124), AddReg { x: 1, y: 2 });
        assert_eq!(Instruction::decode(0x8125), Sub { x: 1, y: 2 });
        assert_eq!(Instruction::decode(0x8126), ShiftRight { x: 1 });
        assert_eq!(Instruction::decode(0x8127), SubN { x: 1, y: 2 });
        assert_eq!(Instruction::decode(0x812E), ShiftLeft { x: 1 });
        assert_eq!(Instruction::decode(0x8128), Unknown(0x8128));
    }

    #[test]
    fn test_register_compares_need_zero_low_nibble() {
        assert_eq!(Instruction::decode(0x5120), SkipEqReg { x: 1, y: 2 });
        assert_eq!(Instruction::decode(0x9120), SkipNeReg { x: 1, y: 2 });
        assert_eq!(Instruction::decode(0x5121), Unknown(0x5121));
        assert_eq!(Instruction::decode(0x9121), Unknown(0x9121));
    }

    #[test]
    fn test_decodes_draw() {
        assert_eq!(Instruction::decode(0xD125), Draw { x: 1, y: 2, n: 5 });
    }

    #[test]
    fn test_decodes_key_family() {
        assert_eq!(Instruction::decode(0xE49E), SkipPressed { x: 4 });
        assert_eq!(Instruction::decode(0xE4A1), SkipNotPressed { x: 4 });
        assert_eq!(Instruction::decode(0xE4A2), Unknown(0xE4A2));
    }

    #[test]
    fn test_decodes_misc_family() {
        assert_eq!(Instruction::decode(0xF107), ReadDelay { x: 1 });
        assert_eq!(Instruction::decode(0xF10A), WaitKey { x: 1 });
        assert_eq!(Instruction::decode(0xF115), SetDelay { x: 1 });
        assert_eq!(Instruction::decode(0xF118), SetSound { x: 1 });
        assert_eq!(Instruction::decode(0xF11E), AddIndex { x: 1 });
        assert_eq!(Instruction::decode(0xF129), LoadGlyph { x: 1 });
        assert_eq!(Instruction::decode(0xF133), Bcd { x: 1 });
        assert_eq!(Instruction::decode(0xF155), Store { x: 1 });
        assert_eq!(Instruction::decode(0xF165), Read { x: 1 });
        assert_eq!(Instruction::decode(0xF175), Unknown(0xF175));
    }

    #[test]
    fn test_display_mnemonics() {
        assert_eq!(Instruction::decode(0x6122).to_string(), "LD V1, 0x22");
        assert_eq!(Instruction::decode(0x1ABC).to_string(), "JP 0xABC");
        assert_eq!(Instruction::decode(0xD015).to_string(), "DRW V0, V1, 5");
        assert_eq!(Instruction::decode(0xF465).to_string(), "LD V4, [I]");
    }
}
