#![allow(clippy::upper_case_acronyms)]

use std::str::FromStr;

use crate::{
    error::EncodeError,
    parsing::{AInstruction, CInstruction, Instruction, Target},
};

/// Largest value an A-instruction can carry.
pub const MAX_ADDRESS: u32 = 0x7FFF;

impl Instruction {
    /// Encode into the 16 character `0`/`1` form written to `.hack` files.
    pub fn to_binary(&self) -> Result<String, EncodeError> {
        let word = match self {
            Instruction::A(a) => a.encode()?,
            Instruction::C(c) => c.encode()?,
        };
        Ok(format!("{word:016b}"))
    }
}

impl AInstruction {
    pub fn encode(&self) -> Result<u16, EncodeError> {
        match &self.target {
            Target::Literal(address) if *address <= MAX_ADDRESS => Ok(*address as u16),
            Target::Literal(address) => Err(EncodeError::AddressOutOfRange(*address)),
            Target::Name(name) => Err(EncodeError::UnresolvedSymbol(name.clone())),
        }
    }
}

impl CInstruction {
    pub fn encode(&self) -> Result<u16, EncodeError> {
        let comp: Comp = self.comp.parse()?;
        let dest = self.dest.as_deref().map(Dest::from_str).transpose()?;
        let jump = self.jump.as_deref().map(Jump::from_str).transpose()?;
        Ok(0b111_u16 << 13
            | comp.bits() << 6
            | dest.map_or(0, Dest::bits) << 3
            | jump.map_or(0, Jump::bits))
    }
}

/// The 18 ALU operations, written with `A` as the second operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Zero,
    One,
    MinusOne,
    D,
    A,
    NotD,
    NotA,
    NegD,
    NegA,
    DPlusOne,
    APlusOne,
    DMinusOne,
    AMinusOne,
    DPlusA,
    DMinusA,
    AMinusD,
    DAndA,
    DOrA,
}

impl AluOp {
    pub fn bits(self) -> u16 {
        match self {
            AluOp::Zero => 0b101010,
            AluOp::One => 0b111111,
            AluOp::MinusOne => 0b111010,
            AluOp::D => 0b001100,
            AluOp::A => 0b110000,
            AluOp::NotD => 0b001101,
            AluOp::NotA => 0b110001,
            AluOp::NegD => 0b001111,
            AluOp::NegA => 0b110011,
            AluOp::DPlusOne => 0b011111,
            AluOp::APlusOne => 0b110111,
            AluOp::DMinusOne => 0b001110,
            AluOp::AMinusOne => 0b110010,
            AluOp::DPlusA => 0b000010,
            AluOp::DMinusA => 0b010011,
            AluOp::AMinusD => 0b000111,
            AluOp::DAndA => 0b000000,
            AluOp::DOrA => 0b010101,
        }
    }

    fn from_text(text: &str) -> Option<Self> {
        let op = match text {
            "0" => AluOp::Zero,
            "1" => AluOp::One,
            "-1" => AluOp::MinusOne,
            "D" => AluOp::D,
            "A" => AluOp::A,
            "!D" => AluOp::NotD,
            "!A" => AluOp::NotA,
            "-D" => AluOp::NegD,
            "-A" => AluOp::NegA,
            "D+1" => AluOp::DPlusOne,
            "A+1" => AluOp::APlusOne,
            "D-1" => AluOp::DMinusOne,
            "A-1" => AluOp::AMinusOne,
            "D+A" => AluOp::DPlusA,
            "D-A" => AluOp::DMinusA,
            "A-D" => AluOp::AMinusD,
            "D&A" => AluOp::DAndA,
            "D|A" => AluOp::DOrA,
            _ => return None,
        };
        Some(op)
    }
}

/// Computation field: the `a` bit selects `M` instead of `A` as operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comp {
    pub memory: bool,
    pub op: AluOp,
}

impl Comp {
    pub fn bits(self) -> u16 {
        u16::from(self.memory) << 6 | self.op.bits()
    }
}

impl FromStr for Comp {
    type Err = EncodeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let memory = text.contains('M');
        let op = if memory {
            AluOp::from_text(&text.replace('M', "A"))
        } else {
            AluOp::from_text(text)
        };
        op.map(|op| Comp { memory, op })
            .ok_or_else(|| EncodeError::UnknownComp(text.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dest {
    M,
    D,
    MD,
    A,
    AM,
    AD,
    AMD,
}

impl Dest {
    pub fn bits(self) -> u16 {
        match self {
            Dest::M => 0b001,
            Dest::D => 0b010,
            Dest::MD => 0b011,
            Dest::A => 0b100,
            Dest::AM => 0b101,
            Dest::AD => 0b110,
            Dest::AMD => 0b111,
        }
    }
}

impl FromStr for Dest {
    type Err = EncodeError;

    /// Registers may appear in any order, each at most once.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let unknown = || EncodeError::UnknownDest(text.to_string());
        let mut bits = 0u16;
        for register in text.chars() {
            let bit = match register {
                'A' => 0b100,
                'D' => 0b010,
                'M' => 0b001,
                _ => return Err(unknown()),
            };
            if bits & bit != 0 {
                return Err(unknown());
            }
            bits |= bit;
        }
        match bits {
            0b001 => Ok(Dest::M),
            0b010 => Ok(Dest::D),
            0b011 => Ok(Dest::MD),
            0b100 => Ok(Dest::A),
            0b101 => Ok(Dest::AM),
            0b110 => Ok(Dest::AD),
            0b111 => Ok(Dest::AMD),
            _ => Err(unknown()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    JGT,
    JEQ,
    JGE,
    JLT,
    JNE,
    JLE,
    JMP,
}

impl Jump {
    pub fn bits(self) -> u16 {
        match self {
            Jump::JGT => 0b001,
            Jump::JEQ => 0b010,
            Jump::JGE => 0b011,
            Jump::JLT => 0b100,
            Jump::JNE => 0b101,
            Jump::JLE => 0b110,
            Jump::JMP => 0b111,
        }
    }
}

impl FromStr for Jump {
    type Err = EncodeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "JGT" => Ok(Jump::JGT),
            "JEQ" => Ok(Jump::JEQ),
            "JGE" => Ok(Jump::JGE),
            "JLT" => Ok(Jump::JLT),
            "JNE" => Ok(Jump::JNE),
            "JLE" => Ok(Jump::JLE),
            "JMP" => Ok(Jump::JMP),
            _ => Err(EncodeError::UnknownJump(text.to_string())),
        }
    }
}
