
use crate::AcqErr;
use crate::gnss::shift_register::FibonacciShiftRegister;

use super::{CODE_LENGTH, N_PRN};

// G2 phase assignment: the two G2 stages combined into the output for each PRN, BDS-SIS-ICD Table 4-1
const G2_PHASE:[(usize, usize); N_PRN] = [
	(1, 3),  (1, 4),  (1, 5),  (1, 6),  (1, 8),  (1, 9),  (1, 10), (1, 11), (2, 7),  (3, 4),
	(3, 5),  (3, 6),  (3, 8),  (3, 9),  (3, 10), (3, 11), (4, 5),  (4, 6),  (4, 8),  (4, 9),
	(4, 10), (4, 11), (5, 6),  (5, 8),  (5, 9),  (5, 10), (5, 11), (6, 8),  (6, 9),  (6, 10),
	(6, 11), (8, 9),  (8, 10), (8, 11), (9, 10), (9, 11), (10, 11) ];

// G1(X) = 1 + X + X^7 + X^8 + X^9 + X^10 + X^11
const G1_TAPS:[usize; 6] = [1, 7, 8, 9, 10, 11];
// G2(X) = 1 + X + X^2 + X^3 + X^4 + X^5 + X^8 + X^9 + X^11
const G2_TAPS:[usize; 8] = [1, 2, 3, 4, 5, 8, 9, 11];

// Both registers start at 01010101010
fn initial_phase() -> Vec<bool> { (0..11).map(|idx| idx % 2 == 1).collect() }

/// The 2047-chip Gold code truncated by its last chip
pub fn b1i_code(prn:usize) -> Result<[bool; CODE_LENGTH], AcqErr> {
	if prn >= 1 && prn <= N_PRN {
		let (a, b) = G2_PHASE[prn-1];
		let mut g1 = FibonacciShiftRegister::new(initial_phase(), &G1_TAPS);
		let mut g2 = FibonacciShiftRegister::new(initial_phase(), &G2_TAPS);

		let mut ans:[bool; CODE_LENGTH] = [false; CODE_LENGTH];
		for idx in 0..CODE_LENGTH {
			ans[idx] = g1.output() ^ g2.stage(a) ^ g2.stage(b);
			g1.shift();
			g2.shift();
		}
		Ok(ans)
	} else {
		Err(AcqErr::InvalidIdentifier{ prn, signal: super::NAME })
	}
}
