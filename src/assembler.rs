use crate::{
    error::AsmError,
    parsing::parse,
    symbols::{collect_labels, resolve_symbols, SymbolTable},
};

/// Result of assembling one program.
#[derive(Debug)]
pub struct Assembly {
    /// Non-blank, non-comment source lines, labels included
    pub parsed_lines: usize,
    pub symbols: SymbolTable,
    /// One 16 character word per instruction, in source order
    pub binary: Vec<String>,
}

impl Assembly {
    /// Machine code as file contents, each word newline terminated
    pub fn to_hack(&self) -> String {
        let mut res = String::with_capacity(self.binary.len() * 17);
        for word in &self.binary {
            res.push_str(word);
            res.push('\n');
        }
        res
    }
}

pub fn assemble(asm_src: &str) -> Result<Assembly, AsmError> {
    let lines = parse(asm_src)?;
    let parsed_lines = lines.len();

    let (instructions, symbols) = collect_labels(lines)?;
    let (instructions, symbols) = resolve_symbols(instructions, symbols);

    let binary = instructions
        .iter()
        .map(|(line_nr, inst)| {
            inst.to_binary().map_err(|error| AsmError::Encode {
                line_nr: *line_nr,
                error,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Assembly {
        parsed_lines,
        symbols,
        binary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EncodeError;

    fn asm_to_bin(asm_src: &str) -> Result<String, AsmError> {
        assemble(asm_src).map(|assembly| assembly.to_hack())
    }

    const ADD_ASM: &str = include_str!("../test_resources/Add.asm");
    const ADD_BIN: &str = include_str!("../test_resources/Add.hack");
    const MAX_ASM: &str = include_str!("../test_resources/Max.asm");
    const MAX_BIN: &str = include_str!("../test_resources/Max.hack");
    const SUM_ASM: &str = include_str!("../test_resources/Sum.asm");
    const SUM_BIN: &str = include_str!("../test_resources/Sum.hack");

    #[test]
    fn assemble_add_program() {
        let res = asm_to_bin(ADD_ASM).unwrap();
        assert_eq!(res, ADD_BIN);
    }

    #[test]
    fn assemble_max_program() {
        let res = asm_to_bin(MAX_ASM).unwrap();
        assert_eq!(res, MAX_BIN);
    }

    #[test]
    fn assemble_sum_program() {
        let res = asm_to_bin(SUM_ASM).unwrap();
        assert_eq!(res, SUM_BIN);
    }

    #[test]
    fn output_line_per_instruction() {
        let assembly = assemble(MAX_ASM).unwrap();
        // 16 instructions and 3 labels
        assert_eq!(assembly.parsed_lines, 19);
        assert_eq!(assembly.binary.len(), 16);
        assert!(assembly
            .binary
            .iter()
            .all(|w| w.len() == 16 && w.chars().all(|c| c == '0' || c == '1')));
        assert_eq!(assembly.symbols.get("OUTPUT_D"), Some(12));
    }

    #[test]
    fn literal_programs_are_deterministic() {
        let src = "@7\nD=A\n@0\nM=D\n0;JMP";
        assert_eq!(asm_to_bin(src).unwrap(), asm_to_bin(src).unwrap());
    }

    #[test]
    fn empty_program() {
        assert_eq!(asm_to_bin("// nothing here\n\n").unwrap(), "");
    }

    #[test]
    fn encode_error_reports_line() {
        let res = assemble("@1\n\nD=D*A\n");
        match res {
            Err(AsmError::Encode { line_nr, error }) => {
                assert_eq!(line_nr, 3);
                assert_eq!(error, EncodeError::UnknownComp("D*A".into()));
            }
            x => panic!("expected encode error, got: {x:?}"),
        }
    }

    #[test]
    fn out_of_range_literal() {
        let res = assemble("@32768");
        assert!(
            matches!(
                res,
                Err(AsmError::Encode {
                    line_nr: 1,
                    error: EncodeError::AddressOutOfRange(32768)
                })
            ),
            "{res:?}"
        );
        assert!(assemble("@32767").is_ok());
    }
}
