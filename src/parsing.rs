use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_till1},
    character::complete::digit1,
    combinator::{all_consuming, cut, map, opt, rest, verify},
    sequence::{preceded, terminated, tuple},
};
use nom_supreme::{error::ErrorTree, final_parser::final_parser};

use crate::error::AsmError;

type IResult<I, O> = Result<(I, O), nom::Err<ErrorTree<I>>>;

/// Parse a whole source file into numbered lines, skipping blanks and comments.
/// Line numbers are 1-based and refer to the raw source.
pub fn parse(src: &str) -> Result<Vec<(usize, Line)>, AsmError> {
    src.lines()
        .enumerate()
        .filter_map(|(i, raw)| normalize(raw).map(|token| (i + 1, token)))
        .map(|(line_nr, token)| {
            parse_line(&token)
                .map(|line| (line_nr, line))
                .map_err(|e| AsmError::Syntax {
                    line_nr,
                    token: token.clone(),
                    message: e.to_string(),
                })
        })
        .collect()
}

/// Strip the `//` comment and every whitespace character from a raw line.
/// Returns `None` when nothing is left.
pub fn normalize(raw: &str) -> Option<String> {
    let code = raw.split_once("//").map_or(raw, |(code, _comment)| code);
    let token: String = code.chars().filter(|c| !c.is_whitespace()).collect();
    (!token.is_empty()).then_some(token)
}

/// Parse one normalized token. The whole token must be consumed.
pub fn parse_line(token: &str) -> Result<Line, ErrorTree<&str>> {
    final_parser(Line::parse)(token)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Label(Label),
    A(AInstruction),
    C(CInstruction),
}

impl Line {
    fn parse(input: &str) -> IResult<&str, Self> {
        alt((
            map(Label::parse, Line::Label),
            map(AInstruction::parse, Line::A),
            map(CInstruction::parse, Line::C),
        ))(input)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub symbol: String,
}

impl Label {
    fn parse(input: &str) -> IResult<&str, Self> {
        let name = terminated(take_till1(|c: char| c == ')'), tag(")"));
        map(preceded(tag("("), cut(name)), |symbol: &str| Self {
            symbol: symbol.to_string(),
        })(input)
    }
}

/// A label-free instruction, as produced by the first pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    A(AInstruction),
    C(CInstruction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Literal(u32),
    Name(String),
}

impl Target {
    fn parse(input: &str) -> IResult<&str, Self> {
        // digit strings too long for u32 saturate and fail range checks later
        let literal = map(all_consuming(digit1), |digits: &str| {
            Target::Literal(digits.parse().unwrap_or(u32::MAX))
        });
        let name = map(verify(rest, |name: &str| !name.is_empty()), |name: &str| {
            Target::Name(name.to_string())
        });
        alt((literal, name))(input)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AInstruction {
    pub target: Target,
}

impl AInstruction {
    pub fn new(target: Target) -> Self {
        Self { target }
    }

    fn parse(input: &str) -> IResult<&str, Self> {
        map(preceded(tag("@"), cut(Target::parse)), Self::new)(input)
    }
}

/// Purely syntactic `dest=comp;jump` split; validated by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CInstruction {
    pub dest: Option<String>,
    pub comp: String,
    pub jump: Option<String>,
}

impl CInstruction {
    fn parse(input: &str) -> IResult<&str, Self> {
        let dest = terminated(take_till(|c: char| c == '='), tag("="));
        let comp = take_till(|c: char| c == ';');
        let jump = preceded(tag(";"), rest);
        map(
            tuple((opt(dest), comp, opt(jump))),
            |(dest, comp, jump): (Option<&str>, &str, Option<&str>)| Self {
                dest: dest.map(str::to_string),
                comp: comp.to_string(),
                jump: jump.map(str::to_string),
            },
        )(input)
    }
}
