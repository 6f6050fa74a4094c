
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::AcqErr;
use crate::gnss::signal::{CodeGenerator, CommandDefaults, SignalType, Subcarrier};

pub mod signal_modulation;

pub use self::signal_modulation::MemoryCodes;

pub const NAME:&str = "Galileo E1C";

pub const CODE_LENGTH:usize = 4092;
pub const HEX_DIGITS:usize = CODE_LENGTH / 4;

pub const FS:f64 = 8.192e6;
// 4 [ms] coherent integration, one primary code period
pub const SAMPLES_PER_BLOCK:usize = 32768;
pub const BLOCK_MS:usize = 4;

pub struct E1cCode {
	codes: MemoryCodes,
}

impl E1cCode {
	pub fn new(codes:MemoryCodes) -> Self { Self { codes } }
}

impl CodeGenerator for E1cCode {

	fn name(&self) -> &'static str { NAME }
	fn code_length(&self) -> usize { CODE_LENGTH }
	fn prns(&self) -> RangeInclusive<usize> { 1..=self.codes.len() }

	fn chips(&self, prn:usize) -> Result<Vec<i8>, AcqErr> {
		match self.codes.code(prn) {
			Some(c) => Ok(c.iter().map(|b| if *b { -1 } else { 1 }).collect()),
			None => Err(AcqErr::InvalidIdentifier{ prn, signal: NAME }),
		}
	}

}

pub fn signal_type(codes:MemoryCodes) -> SignalType {
	SignalType::new(NAME, Arc::new(E1cCode::new(codes)), FS, SAMPLES_PER_BLOCK, BLOCK_MS)
		.with_reserved_blocks(1)
		.with_subcarrier(Subcarrier::Boc11)
		.with_defaults(command_defaults())
}

pub fn command_defaults() -> CommandDefaults {
	CommandDefaults {
		about: "Acquire Galileo E1C signals",
		carrier: "E1",
		prns: "1-50",
		prn_help: "PRNs to search, e.g. 1,3,7-14,31; each needs a line in the code table",
		doppler_search: "-9000,9000,50",
		time_ms: 80,
		cutoff_hz: 4.0e6,
		prn_width: 2,
	}
}
