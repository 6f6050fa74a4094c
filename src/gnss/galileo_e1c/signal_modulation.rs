
use std::path::Path;

use crate::AcqErr;

use super::{CODE_LENGTH, HEX_DIGITS};

/// Galileo E1-C primary codes are memory codes rather than register outputs, published as one
/// hexadecimal string per PRN.  A table holds them in PRN order starting at PRN 1.
#[derive(Debug, Clone)]
pub struct MemoryCodes {
	codes: Vec<Vec<bool>>,
}

impl MemoryCodes {

	/// One code per non-empty line; lines starting with '#' are comments
	pub fn from_hex_lines(text:&str) -> Result<Self, AcqErr> {
		let codes:Vec<Vec<bool>> = text.lines()
			.map(|line| line.trim())
			.filter(|line| !line.is_empty() && !line.starts_with('#'))
			.enumerate()
			.map(|(idx, line)| parse_hex_code(line).map_err(|e| AcqErr::InvalidCodeTable(format!("PRN {}: {}", idx+1, e))))
			.collect::<Result<Vec<Vec<bool>>, AcqErr>>()?;

		if codes.is_empty() { Err(AcqErr::InvalidCodeTable("no codes found".to_string())) }
		else { Ok(Self { codes }) }
	}

	pub fn from_file<P: AsRef<Path>>(path:P) -> Result<Self, AcqErr> {
		let text = std::fs::read_to_string(path)?;
		Self::from_hex_lines(&text)
	}

	pub fn from_chips(codes:Vec<Vec<bool>>) -> Result<Self, AcqErr> {
		match codes.iter().position(|c| c.len() != CODE_LENGTH) {
			Some(idx) => Err(AcqErr::InvalidCodeTable(format!("PRN {} has {} chips instead of {}", idx+1, codes[idx].len(), CODE_LENGTH))),
			None if codes.is_empty() => Err(AcqErr::InvalidCodeTable("no codes found".to_string())),
			None => Ok(Self { codes }),
		}
	}

	pub fn len(&self) -> usize { self.codes.len() }
	pub fn is_empty(&self) -> bool { self.codes.is_empty() }

	pub fn code(&self, prn:usize) -> Option<&[bool]> {
		if prn >= 1 { self.codes.get(prn-1).map(|c| &c[..]) } else { None }
	}

}

fn parse_hex_code(line:&str) -> Result<Vec<bool>, String> {
	if line.len() != HEX_DIGITS {
		return Err(format!("expected {} hex digits, found {}", HEX_DIGITS, line.len()));
	}

	let mut ans:Vec<bool> = Vec::with_capacity(CODE_LENGTH);
	for c in line.chars() {
		let nibble:u32 = c.to_digit(16).ok_or_else(|| format!("{:?} isn't a hex digit", c))?;
		for bit in (0..4).rev() {
			ans.push((nibble >> bit) & 1 == 1);
		}
	}
	Ok(ans)
}
