//! DIMACS CNF parser and writer for the lasat solver.

use std::{borrow::Borrow, io, mem::replace};

use lasat_formula::{CnfFormula, Lit};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {}: Unexpected token in DIMACS CNF input: '{}'", line, unexpected)]
    UnexpectedInput { line: usize, unexpected: String },
    #[error("line {}: Literal is out of the supported range: {}", line, literal)]
    LiteralTooLarge { line: usize, literal: String },
    #[error("line {}: Invalid header syntax: {}", line, header)]
    InvalidHeader { line: usize, header: String },
    #[error("line {}: Unterminated clause", line)]
    UnterminatedClause { line: usize },
    #[error(
        "line {}: Variable {} exceeds the {} variables declared in the header",
        line,
        var,
        header_var_count
    )]
    VarOutOfRange {
        line: usize,
        var: usize,
        header_var_count: usize,
    },
    #[error(
        "Formula has {} clauses while the header specifies {} clauses",
        clause_count,
        header_clause_count
    )]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("Parser invoked after a previous error")]
    PreviousError,
}

/// Variable and clause count present in a DIMACS CNF header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Line based parser for DIMACS CNF files.
///
/// Clauses may span several lines and a line may contain several clauses. Comment lines start with
/// `c`, the optional header line with `p`. A line starting with `%` ends the input, as used by some
/// benchmark collections.
#[derive(Default)]
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,

    line_number: usize,
    clause_count: usize,

    seen_clause_data: bool,
    finished: bool,
    error: bool,
}

impl DimacsParser {
    /// Create a new DIMACS CNF parser.
    pub fn new() -> DimacsParser {
        DimacsParser::default()
    }

    /// Parse the given input and check the header if present.
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, Error> {
        let mut parser = Self::parse_lines(input)?;
        Ok(parser.take_formula())
    }

    /// Parse all lines of the given input and check the header if present.
    ///
    /// Returns the parser so that the header and counts remain available.
    pub fn parse_lines(input: impl io::Read) -> Result<DimacsParser, Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = Self::new();
        let mut line = vec![];

        loop {
            line.clear();
            if buffer.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            parser.parse_line(&line)?;
        }
        parser.eof()?;
        parser.check_header()?;

        Ok(parser)
    }

    /// Parse a single line of input.
    ///
    /// After parsing the last line call the [`eof`](DimacsParser::eof) method.
    ///
    /// If this method returns an error, the parser is in an invalid state and cannot parse further
    /// lines.
    /// Comment lines may contain arbitrary bytes. Elsewhere bytes that are not valid UTF-8 are
    /// reported as unexpected input.
    pub fn parse_line(&mut self, line: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        self.line_number += 1;

        if self.finished {
            return Ok(());
        }

        match line.iter().find(|byte| !byte.is_ascii_whitespace()) {
            Some(b'c') => return Ok(()),
            Some(b'%') => {
                self.finished = true;
                return Ok(());
            }
            _ => (),
        }

        let text = String::from_utf8_lossy(line);
        let trimmed = text.trim();

        if trimmed.starts_with('p') {
            return self.parse_header_line(trimmed);
        }

        for token in trimmed.split_whitespace() {
            self.parse_literal(token)?;
        }

        Ok(())
    }

    /// Finish parsing the input.
    ///
    /// This does not check the clause count of the header, call
    /// [`check_header`](DimacsParser::check_header) for this.
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        if !self.partial_clause.is_empty() {
            self.error = true;
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }
        Ok(())
    }

    /// Verifies the clause count of the header when present.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = self.header {
            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        Ok(())
    }

    /// Returns everything parsed since the last call to this method.
    ///
    /// The variable count of the returned formula is the maximum of the variable count so far and
    /// the variable count of the header if present.
    pub fn take_formula(&mut self) -> CnfFormula {
        let mut new_formula = CnfFormula::new();
        new_formula.set_var_count(self.formula.var_count());
        replace(&mut self.formula, new_formula)
    }

    /// Return the DIMACS CNF header data if present.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables in the parsed formula.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn parse_literal(&mut self, token: &str) -> Result<(), ParserError> {
        self.seen_clause_data = true;

        let number: isize = match token.parse() {
            Ok(number) => number,
            Err(_) if is_integer(token) => {
                return self.fail(ParserError::LiteralTooLarge {
                    line: self.line_number,
                    literal: token.to_owned(),
                })
            }
            Err(_) => {
                return self.fail(ParserError::UnexpectedInput {
                    line: self.line_number,
                    unexpected: token.to_owned(),
                })
            }
        };

        if number == 0 {
            self.formula.add_clause(&self.partial_clause);
            self.partial_clause.clear();
            self.clause_count += 1;
            return Ok(());
        }

        let lit = match Lit::try_from_dimacs(number) {
            Some(lit) => lit,
            None => {
                return self.fail(ParserError::LiteralTooLarge {
                    line: self.line_number,
                    literal: token.to_owned(),
                })
            }
        };

        if let Some(header) = self.header {
            if lit.index() >= header.var_count {
                return self.fail(ParserError::VarOutOfRange {
                    line: self.line_number,
                    var: lit.index() + 1,
                    header_var_count: header.var_count,
                });
            }
        }

        self.partial_clause.push(lit);
        Ok(())
    }

    fn parse_header_line(&mut self, header_line: &str) -> Result<(), ParserError> {
        if self.header.is_some() || self.seen_clause_data {
            return self.fail(ParserError::UnexpectedInput {
                line: self.line_number,
                unexpected: header_line.to_owned(),
            });
        }

        let mut header_values = header_line.split_whitespace();

        if header_values.next() != Some("p") || header_values.next() != Some("cnf") {
            return self.invalid_header(header_line);
        }

        let var_count: usize = match header_values.next().and_then(|value| value.parse().ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if var_count > lasat_formula::Var::max_count() {
            return self.fail(ParserError::LiteralTooLarge {
                line: self.line_number,
                literal: var_count.to_string(),
            });
        }

        let clause_count: usize = match header_values.next().and_then(|value| value.parse().ok()) {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if header_values.next().is_some() {
            return self.invalid_header(header_line);
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        self.formula.set_var_count(var_count);

        Ok(())
    }

    fn invalid_header(&mut self, header_line: &str) -> Result<(), ParserError> {
        self.fail(ParserError::InvalidHeader {
            line: self.line_number,
            header: header_line.to_owned(),
        })
    }

    fn fail(&mut self, error: ParserError) -> Result<(), ParserError> {
        self.error = true;
        Err(error)
    }
}

/// Whether the token is an optionally negated string of digits.
fn is_integer(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

/// Write a DIMACS CNF header.
///
/// Can be used with [`write_dimacs_clauses`] to implement incremental writing.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write an iterator of clauses as headerless DIMACS CNF.
///
/// Can be used with [`write_dimacs_header`] to implement incremental writing.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula as DIMACS CNF.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Error;
    use proptest::{test_runner::TestCaseError, *};

    use lasat_formula::{cnf::strategy::*, cnf_formula, Var};

    #[test]
    fn odd_whitespace() -> Result<(), Error> {
        let parsed = DimacsParser::parse(
            b"p  cnf  4   3  \n  1  \n 2  3\n0 -4 0 2\nccomment  \n\n0\n\n" as &[_],
        )?;

        let expected = cnf_formula![
            1, 2, 3;
            -4;
            2;
        ];

        assert_eq!(parsed, expected);

        Ok(())
    }

    #[test]
    fn percent_ends_input() -> Result<(), Error> {
        let parsed = DimacsParser::parse(b"p cnf 3 2\n1 -3 0\n2 3 0\n%\n0\n\n" as &[_])?;

        assert_eq!(
            parsed,
            cnf_formula![
                1, -3;
                2, 3;
            ]
        );

        Ok(())
    }

    #[test]
    fn arbitrary_bytes_in_comments() -> Result<(), Error> {
        let parsed = DimacsParser::parse(b"c caf\xe9\np cnf 2 1\n1 -2 0\n  c \xff\xfe\n" as &[_])?;

        assert_eq!(
            parsed,
            cnf_formula![
                1, -2;
            ]
        );

        Ok(())
    }

    #[test]
    fn header_sets_var_count() -> Result<(), Error> {
        let mut parser = DimacsParser::parse_lines(b"c unused variables\np cnf 9 1\n1 0\n" as &[_])?;
        assert_eq!(
            parser.header(),
            Some(DimacsHeader {
                var_count: 9,
                clause_count: 1
            })
        );
        assert_eq!(parser.clause_count(), 1);
        assert_eq!(parser.take_formula().var_count(), 9);
        Ok(())
    }

    macro_rules! expect_error {
        ( $input:expr, $( $cases:tt )* ) => {
            match DimacsParser::parse($input as &[_]) {
                Ok(parsed) => panic!("Expected error but got {:?}", parsed),
                Err(err) => match err.downcast_ref() {
                    Some(casted_err) => match casted_err {
                        $( $cases )*,
                        _ => panic!("Unexpected error {:?}", casted_err),
                    },
                    None => panic!("Unexpected error type {:?}", err),
                }
            }
        };
    }

    #[test]
    fn invalid_headers() {
        expect_error!(b"pcnf 1 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p notcnf 1 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf 1", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf 1 2 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf foo bar", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf -3 -6", ParserError::InvalidHeader { .. } => ());

        expect_error!(
            format!("p cnf {} 4", Var::max_count() + 1).as_bytes(),
            ParserError::LiteralTooLarge { .. } => ()
        );

        expect_error!(b"p cnf 4 18446744073709551616", ParserError::InvalidHeader { .. } => ());

        expect_error!(
            b"p cnf 1 2\np cnf 1 2\n",
            ParserError::UnexpectedInput { line: 2, .. } => ()
        );

        expect_error!(
            b"1 0\np cnf 1 1\n",
            ParserError::UnexpectedInput { line: 2, .. } => ()
        );
    }

    #[test]
    fn invalid_bytes_in_clauses() {
        expect_error!(
            b"p cnf 2 1\n1 \xe9 0\n",
            ParserError::UnexpectedInput { line: 2, .. } => ()
        );
    }

    #[test]
    fn invalid_header_data() {
        expect_error!(
            b"p cnf 1 1\n 2 0",
            ParserError::VarOutOfRange { line: 2, var: 2, header_var_count: 1 } => ()
        );

        expect_error!(
            b"p cnf 10 1\n 1 0 0",
            ParserError::ClauseCount { clause_count: 2, header_clause_count: 1 } => ()
        );

        expect_error!(
            b"p cnf 10 4\n 1 0",
            ParserError::ClauseCount { clause_count: 1, header_clause_count: 4 } => ()
        );
    }

    #[test]
    fn syntax_errors() {
        expect_error!(
            b"1 2 ?foo",
            ParserError::UnexpectedInput { .. } => ()
        );

        expect_error!(
            b"1 2 - 3 0",
            ParserError::UnexpectedInput { .. } => ()
        );

        expect_error!(
            b"1 2 --3 0",
            ParserError::UnexpectedInput { .. } => ()
        );

        expect_error!(
            b"1 2-3 0",
            ParserError::UnexpectedInput { .. } => ()
        );
    }

    #[test]
    fn unterminated_clause() {
        expect_error!(
            b"1 2 3",
            ParserError::UnterminatedClause { .. } => ()
        );
    }

    #[test]
    fn literal_too_large() {
        expect_error!(
            format!("1 {} 2 0", Var::max_count() + 1).as_bytes(),
            ParserError::LiteralTooLarge { .. } => ()
        );

        expect_error!(
            b"1 99999999999999999999999 0",
            ParserError::LiteralTooLarge { .. } => ()
        );

        assert_eq!(
            DimacsParser::parse(format!("1 {} 2 0", Var::max_count()).as_bytes()).unwrap(),
            cnf_formula![
                1, Var::max_count() as isize, 2;
            ]
        );
    }

    proptest! {
        #[test]
        fn roundtrip(input in cnf_formula(1..100usize, 0..1000, 0..10)) {
            let mut buf = vec![];

            write_dimacs(&mut buf, &input)?;

            let parsed = DimacsParser::parse(&buf[..]).map_err(|e| TestCaseError::fail(e.to_string()))?;

            prop_assert_eq!(parsed, input);
        }
    }
}
