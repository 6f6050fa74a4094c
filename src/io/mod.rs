
use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use rustfft::num_complex::Complex;

use crate::AcqErr;

pub const BUFFER_SIZE:usize = 2048;

/// Largest up-front reservation [samples]; longer reads grow the vector as records arrive
pub const MAX_RESERVE:usize = 1 << 22;

/// Layout of one raw I/Q record in the input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
	ComplexI8,
	ComplexI16,
}

impl SampleFormat {

	pub fn record_len(&self) -> usize { match self {
		SampleFormat::ComplexI8  => 2,
		SampleFormat::ComplexI16 => 4,
	}}

	fn decode(&self, bytes:&[u8]) -> Complex<f64> { match self {
		SampleFormat::ComplexI8  => Complex{ re: (bytes[0] as i8) as f64, im: (bytes[1] as i8) as f64 },
		SampleFormat::ComplexI16 => Complex{ re: LittleEndian::read_i16(&bytes[0..2]) as f64, im: LittleEndian::read_i16(&bytes[2..4]) as f64 },
	}}

}

impl std::str::FromStr for SampleFormat {
	type Err = AcqErr;

	fn from_str(s:&str) -> Result<Self, AcqErr> { match s {
		"i8"  => Ok(SampleFormat::ComplexI8),
		"i16" => Ok(SampleFormat::ComplexI16),
		x     => Err(AcqErr::InvalidArgument(format!("{} isn't a valid sample type", x))),
	}}
}

/// Iterates over interleaved I/Q records, yielding each sample with its index in the stream
pub struct BufferedSource<S: Read> {
	src: S,
	format: SampleFormat,
	idx:usize,
	buffer: [u8; BUFFER_SIZE],
	buffer_idx: usize,
	buffer_valid_len: usize,
}

impl<S: Read> BufferedSource<S> {

	pub fn new(src:S, format:SampleFormat) -> Self {
		Self { src, format, idx: 0, buffer: [0; BUFFER_SIZE], buffer_idx: 0, buffer_valid_len: 0 }
	}

	// Returns the number of new bytes, zero at end of stream
	fn buffer_samples(&mut self) -> Result<usize, AcqErr> {
		// A partial record may be left over from the last read
		self.buffer.copy_within(self.buffer_idx..self.buffer_valid_len, 0);
		self.buffer_valid_len -= self.buffer_idx;
		self.buffer_idx = 0;

		loop {
			match self.src.read(&mut self.buffer[self.buffer_valid_len..]) {
				Ok(bytes_read) => {
					self.buffer_valid_len += bytes_read;
					return Ok(bytes_read);
				},
				Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(AcqErr::Io(e)),
			}
		}
	}

}

impl<S: Read> Iterator for BufferedSource<S> {
	type Item = Result<(Complex<f64>, usize), AcqErr>;

	fn next(&mut self) -> Option<Self::Item> {
		let record_len = self.format.record_len();
		while self.buffer_valid_len - self.buffer_idx < record_len {
			match self.buffer_samples() {
				Ok(0)  => return None,
				Ok(_)  => {},
				Err(e) => return Some(Err(e)),
			}
		}

		let val = self.format.decode(&self.buffer[self.buffer_idx..(self.buffer_idx + record_len)]);
		let ans = (val, self.idx);
		self.idx += 1;
		self.buffer_idx += record_len;
		Some(Ok(ans))
	}
}

/// Reads exactly `n` complex samples from the front of a raw stream
pub fn get_samples_complex<S: Read>(src:S, n:usize, format:SampleFormat) -> Result<Vec<Complex<f64>>, AcqErr> {
	let mut ans:Vec<Complex<f64>> = Vec::with_capacity(n.min(MAX_RESERVE));
	for s in BufferedSource::new(src, format).take(n) {
		let (val, _) = s?;
		ans.push(val);
	}

	if ans.len() < n { Err(AcqErr::StreamTruncated{ requested: n, read: ans.len() }) }
	else { Ok(ans) }
}

#[cfg(test)]
mod tests {

	use std::io::Cursor;

	use super::*;

	// Hands out at most three bytes per read so records straddle reads
	struct Trickle(Cursor<Vec<u8>>);

	impl Read for Trickle {
		fn read(&mut self, buf:&mut [u8]) -> std::io::Result<usize> {
			let n = buf.len().min(3);
			self.0.read(&mut buf[..n])
		}
	}

	#[test]
	fn decodes_signed_bytes() {
		let raw:Vec<u8> = vec![1, 255, 127, 128, 0, 2];
		let x = get_samples_complex(Cursor::new(raw), 3, SampleFormat::ComplexI8).unwrap();
		assert_eq!(x, vec![Complex{ re: 1.0, im: -1.0 }, Complex{ re: 127.0, im: -128.0 }, Complex{ re: 0.0, im: 2.0 }]);
	}

	#[test]
	fn decodes_little_endian_i16() {
		let mut raw:Vec<u8> = vec![];
		for v in [-300i16, 1200, 7, -1].iter() { raw.extend_from_slice(&v.to_le_bytes()); }
		let x = get_samples_complex(Trickle(Cursor::new(raw)), 2, SampleFormat::ComplexI16).unwrap();
		assert_eq!(x, vec![Complex{ re: -300.0, im: 1200.0 }, Complex{ re: 7.0, im: -1.0 }]);
	}

	#[test]
	fn indices_are_sequential_across_buffers() {
		let raw:Vec<u8> = (0..(3*BUFFER_SIZE)).map(|i| (i % 100) as u8).collect();
		let idxs:Vec<usize> = BufferedSource::new(Cursor::new(raw), SampleFormat::ComplexI8).map(|s| s.unwrap().1).collect();
		assert_eq!(idxs.len(), 3*BUFFER_SIZE / 2);
		assert!(idxs.iter().enumerate().all(|(i, idx)| i == *idx));
	}

	#[test]
	fn short_stream_is_reported() {
		// Five bytes is two complete records plus a dangling in-phase byte
		let raw:Vec<u8> = vec![1, 2, 3, 4, 5];
		match get_samples_complex(Cursor::new(raw), 4, SampleFormat::ComplexI8) {
			Err(AcqErr::StreamTruncated{ requested, read }) => {
				assert_eq!(requested, 4);
				assert_eq!(read, 2);
			},
			other => panic!("Expected StreamTruncated, got {:?}", other),
		}
	}

	#[test]
	fn oversized_request_reports_truncation() {
		let raw:Vec<u8> = vec![0; 10];
		match get_samples_complex(Cursor::new(raw), usize::MAX, SampleFormat::ComplexI16) {
			Err(AcqErr::StreamTruncated{ requested, read }) => {
				assert_eq!(requested, usize::MAX);
				assert_eq!(read, 2);
			},
			other => panic!("Expected StreamTruncated, got {:?}", other),
		}
	}

	#[test]
	fn parses_format_names() {
		assert_eq!("i8".parse::<SampleFormat>().unwrap(), SampleFormat::ComplexI8);
		assert_eq!("i16".parse::<SampleFormat>().unwrap(), SampleFormat::ComplexI16);
		assert!("f32".parse::<SampleFormat>().is_err());
	}

}
