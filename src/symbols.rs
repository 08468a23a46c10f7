use std::collections::HashMap;

use crate::{
    error::AsmError,
    parsing::{AInstruction, Instruction, Line, Target},
};

/// First RAM address handed out to variables.
pub const FIRST_VARIABLE_ADDRESS: u32 = 16;

const PREDEFINED: [(&str, u32); 23] = [
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("R0", 0),
    ("R1", 1),
    ("R2", 2),
    ("R3", 3),
    ("R4", 4),
    ("R5", 5),
    ("R6", 6),
    ("R7", 7),
    ("R8", 8),
    ("R9", 9),
    ("R10", 10),
    ("R11", 11),
    ("R12", 12),
    ("R13", 13),
    ("R14", 14),
    ("R15", 15),
    ("SCREEN", 16384),
    ("KBD", 24576),
];

/// Symbol to address bindings for one assembly run.
/// Entries are only ever added, never rebound.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    next_variable: u32,
    symbols: HashMap<String, u32>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Fresh table holding only the predefined symbols
    pub fn new() -> Self {
        let symbols = PREDEFINED
            .into_iter()
            .map(|(symbol, address)| (symbol.to_string(), address))
            .collect();
        Self {
            next_variable: FIRST_VARIABLE_ADDRESS,
            symbols,
        }
    }

    pub fn get(&self, symbol: &str) -> Option<u32> {
        self.symbols.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Bind a label to an instruction address.
    /// If the name is already bound, returns the existing address and leaves it.
    pub fn add_label(&mut self, label: &str, address: u32) -> Result<(), u32> {
        match self.symbols.get(label) {
            Some(previous) => Err(*previous),
            None => {
                self.symbols.insert(label.to_string(), address);
                Ok(())
            }
        }
    }

    /// Look up a symbol, allocating the next variable address on first use
    pub fn resolve_variable(&mut self, variable: &str) -> u32 {
        if let Some(address) = self.get(variable) {
            return address;
        }
        let address = self.next_variable;
        self.next_variable += 1;
        self.symbols.insert(variable.to_string(), address);
        address
    }
}

/// First pass: bind every label to the address of the next instruction and
/// drop labels from the stream.
pub fn collect_labels(
    lines: Vec<(usize, Line)>,
) -> Result<(Vec<(usize, Instruction)>, SymbolTable), AsmError> {
    let mut symbol_table = SymbolTable::new();
    let mut instructions = Vec::with_capacity(lines.len());
    for (line_nr, line) in lines {
        match line {
            Line::Label(label) => {
                let next_instruction = instructions.len() as u32;
                symbol_table
                    .add_label(&label.symbol, next_instruction)
                    .map_err(|previous| AsmError::DuplicateSymbol {
                        line_nr,
                        name: label.symbol,
                        previous,
                    })?;
            }
            Line::A(a) => instructions.push((line_nr, Instruction::A(a))),
            Line::C(c) => instructions.push((line_nr, Instruction::C(c))),
        }
    }
    Ok((instructions, symbol_table))
}

/// Second pass: replace every symbolic A-instruction target with its address,
/// allocating variables in first-use order.
pub fn resolve_symbols(
    instructions: Vec<(usize, Instruction)>,
    mut symbol_table: SymbolTable,
) -> (Vec<(usize, Instruction)>, SymbolTable) {
    let resolved = instructions
        .into_iter()
        .map(|(line_nr, inst)| match inst {
            Instruction::A(AInstruction {
                target: Target::Name(name),
            }) => {
                let address = symbol_table.resolve_variable(&name);
                (line_nr, Instruction::A(AInstruction::new(Target::Literal(address))))
            }
            other => (line_nr, other),
        })
        .collect();
    (resolved, symbol_table)
}
