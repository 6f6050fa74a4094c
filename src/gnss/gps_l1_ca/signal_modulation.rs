
use crate::AcqErr;
use crate::gnss::shift_register::FibonacciShiftRegister;

use super::{CODE_LENGTH, N_PRN};

// G2 delays in chips, IS-GPS-200 Table 3-Ia
const G2_DELAY:[usize; N_PRN] = [
	  5,   6,   7,   8,  17,  18, 139, 140, 141, 251,
	252, 254, 255, 256, 257, 258, 469, 470, 471, 472,
	473, 474, 509, 512, 513, 514, 515, 516, 859, 860,
	861, 862 ];

const G1_TAPS:[usize; 2] = [3, 10];
const G2_TAPS:[usize; 6] = [2, 3, 6, 8, 9, 10];

pub fn ca_code(prn:usize) -> Result<[bool; CODE_LENGTH], AcqErr> {
	if prn >= 1 && prn <= N_PRN {
		let mut g1 = FibonacciShiftRegister::new(vec![true; 10], &G1_TAPS);
		let mut g2 = FibonacciShiftRegister::new(vec![true; 10], &G2_TAPS);

		let mut g1_out:[bool; CODE_LENGTH] = [false; CODE_LENGTH];
		let mut g2_out:[bool; CODE_LENGTH] = [false; CODE_LENGTH];
		for idx in 0..CODE_LENGTH {
			g1_out[idx] = g1.output();
			g2_out[idx] = g2.output();
			g1.shift();
			g2.shift();
		}

		let delay:usize = G2_DELAY[prn-1];
		let mut ans:[bool; CODE_LENGTH] = [false; CODE_LENGTH];
		for idx in 0..CODE_LENGTH {
			ans[idx] = g1_out[idx] ^ g2_out[(idx + CODE_LENGTH - delay) % CODE_LENGTH];
		}
		Ok(ans)
	} else {
		Err(AcqErr::InvalidIdentifier{ prn, signal: super::NAME })
	}
}
