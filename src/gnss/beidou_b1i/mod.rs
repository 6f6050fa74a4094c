
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::AcqErr;
use crate::gnss::signal::{CodeGenerator, CommandDefaults, SignalType};

pub mod signal_modulation;

pub const NAME:&str = "BeiDou B1I";

pub const CODE_LENGTH:usize = 2046;
pub const N_PRN:usize = 37;

pub const FS:f64 = 8.192e6;
// 1 [ms] coherent integration
pub const SAMPLES_PER_BLOCK:usize = 8192;
pub const BLOCK_MS:usize = 1;

pub struct B1iCode;

impl CodeGenerator for B1iCode {

	fn name(&self) -> &'static str { NAME }
	fn code_length(&self) -> usize { CODE_LENGTH }
	fn prns(&self) -> RangeInclusive<usize> { 1..=N_PRN }

	fn chips(&self, prn:usize) -> Result<Vec<i8>, AcqErr> {
		Ok(signal_modulation::b1i_code(prn)?.iter().map(|b| if *b { -1 } else { 1 }).collect())
	}

}

pub fn signal_type() -> SignalType {
	SignalType::new(NAME, Arc::new(B1iCode), FS, SAMPLES_PER_BLOCK, BLOCK_MS)
		.with_defaults(command_defaults())
}

pub fn command_defaults() -> CommandDefaults {
	CommandDefaults {
		about: "Acquire BeiDou B1I signals",
		carrier: "B1",
		prns: "1-37",
		prn_help: "PRNs to search, e.g. 1,3,7-14,31; B1I codes are defined for 1-37 only",
		doppler_search: "-7000,7000,200",
		time_ms: 80,
		cutoff_hz: 3.0e6,
		prn_width: 2,
	}
}
