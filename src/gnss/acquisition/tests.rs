
use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use rstest::rstest;
use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::{AcqErr, SampleBuffer, nco};
use crate::gnss::galileo_e1c::MemoryCodes;
use crate::gnss::shift_register::FibonacciShiftRegister;
use crate::gnss::signal::{CodeGenerator, SignalType, check_prn};

use super::{AcquisitionResult, DopplerGrid, search};
use super::dispatch::Dispatcher;

const L1_CA_CHIPS_PER_SAMPLE:f64 = 1023.0 / 4096.0;

/// Buffer of `len` samples carrying `prn`'s periodic replica delayed by `shift` samples, on a carrier at `doppler_hz`
fn delayed_replica(signal:&SignalType, prn:usize, shift:usize, doppler_hz:f64, len:usize) -> SampleBuffer {
	let n:usize = signal.samples_per_block;
	let replica = signal.replica(prn).unwrap();
	let carrier = nco::nco(doppler_hz / signal.fs, 0.0, len);
	let samples:Vec<Complex<f64>> = (0..len).map(|j| replica[(j + n - (shift % n)) % n] * carrier[j]).collect();
	SampleBuffer::new(samples, signal.fs)
}

fn gaussian_noise(rng:&mut StdRng, sigma:f64, len:usize) -> Vec<Complex<f64>> {
	let normal = Normal::new(0.0, sigma).unwrap();
	(0..len).map(|_| Complex{ re: normal.sample(rng), im: normal.sample(rng) }).collect()
}

fn add_noise(buffer:SampleBuffer, seed:u64, sigma:f64) -> SampleBuffer {
	let mut rng = StdRng::seed_from_u64(seed);
	let noise = gaussian_noise(&mut rng, sigma, buffer.len());
	let samples:Vec<Complex<f64>> = buffer.as_slice().iter().zip(noise.iter()).map(|(s, w)| s + w).collect();
	SampleBuffer::new(samples, buffer.fs())
}

fn zero_doppler_only() -> DopplerGrid { DopplerGrid::new(0.0, 1.0, 1.0).unwrap() }

// 31-chip m-sequence from x^5 + x^3 + 1, small enough to correlate the slow way
struct MSequence;

impl CodeGenerator for MSequence {
	fn name(&self) -> &'static str { "m-sequence" }
	fn code_length(&self) -> usize { 31 }
	fn prns(&self) -> RangeInclusive<usize> { 1..=1 }
	fn chips(&self, prn:usize) -> Result<Vec<i8>, AcqErr> {
		check_prn(self, prn)?;
		let mut reg = FibonacciShiftRegister::new(vec![true; 5], &[3, 5]);
		Ok((0..31).map(|_| { let b = reg.output(); reg.shift(); if b { -1 } else { 1 } }).collect())
	}
}

fn m_sequence_signal() -> SignalType { SignalType::new("m-sequence", Arc::new(MSequence), 64000.0, 64, 1) }

/// Direct time-domain evaluation of the same grid search
fn reference_search(signal:&SignalType, samples:&SampleBuffer, prn:usize, grid:&DopplerGrid, blocks:usize) -> AcquisitionResult {
	let n:usize = signal.samples_per_block;
	let replica = signal.replica(prn).unwrap();
	let x = samples.as_slice();

	let mut best = AcquisitionResult::none();
	for doppler_hz in grid.bins() {
		let lo = nco::nco(-doppler_hz / signal.fs, 0.0, 2*n);
		let mut acc:Vec<f64> = vec![0.0; 2*n];
		for block in 0..blocks {
			for k in 0..(2*n) {
				let mut r:Complex<f64> = Complex::zero();
				for m in 0..n {
					let j = (m + k) % (2*n);
					r = r + x[block*n + j] * lo[j] * replica[m].conj();
				}
				acc[k] += r.norm();
			}
		}
		let (idx, peak) = acc.iter().enumerate().fold((0, 0.0), |(bi, bv), (i, v)| if *v > bv { (i, *v) } else { (bi, bv) });
		if peak > best.metric {
			let mean:f64 = acc.iter().sum::<f64>() / ((2*n) as f64);
			let code_length = signal.code_length() as f64;
			best = AcquisitionResult{ metric: peak, code_phase: (code_length * (idx as f64) / (n as f64)) % code_length,
				doppler_hz, peak_to_mean: peak / mean };
		}
	}
	best
}

fn relative_eq(a:f64, b:f64) -> bool { (a - b).abs() <= 1.0e-9 * a.abs().max(b.abs()).max(1.0) }

#[test]
fn repeated_searches_are_bit_identical() {
	let signal = SignalType::gps_l1ca();
	let buffer = add_noise(delayed_replica(&signal, 4, 1234, 300.0, 3*4096), 11, 2.0);
	let grid = DopplerGrid::new(-1000.0, 1000.0, 250.0).unwrap();

	let first = search(&signal, &buffer, 4, &grid, 2).unwrap();
	let second = search(&signal, &buffer, 4, &grid, 2).unwrap();
	assert_eq!(first, second);
	assert_eq!(first.metric.to_bits(), second.metric.to_bits());
}

#[rstest]
#[case(0)]
#[case(1000)]
#[case(3000)]
fn self_correlation_peak_stands_out(#[case] shift:usize) {
	let signal = SignalType::gps_l1ca();
	let buffer = delayed_replica(&signal, 1, shift, 0.0, 2*4096);
	let grid = DopplerGrid::new(-100.0, 100.0, 100.0).unwrap();

	let own = search(&signal, &buffer, 1, &grid, 1).unwrap();
	assert_eq!(own.doppler_hz, 0.0);
	assert!((own.code_phase - (shift as f64) * L1_CA_CHIPS_PER_SAMPLE).abs() <= L1_CA_CHIPS_PER_SAMPLE);

	for prn in 2..=32 {
		let other = search(&signal, &buffer, prn, &grid, 1).unwrap();
		assert!(own.metric > 10.0 * other.metric, "PRN {} metric {} against {}", prn, other.metric, own.metric);
	}
}

#[rstest]
#[case(1600.0)]
#[case(-1234.0)]
#[case(0.0)]
fn doppler_lands_in_nearest_bin(#[case] doppler_hz:f64) {
	let signal = SignalType::gps_l1ca();
	let buffer = delayed_replica(&signal, 1, 2000, doppler_hz, 3*4096);
	let grid = DopplerGrid::new(-5000.0, 5000.0, 500.0).unwrap();

	let result = search(&signal, &buffer, 1, &grid, 2).unwrap();
	assert_eq!(result.doppler_hz, grid.nearest_bin(doppler_hz));
	assert!((result.code_phase - 2000.0 * L1_CA_CHIPS_PER_SAMPLE).abs() <= L1_CA_CHIPS_PER_SAMPLE);
}

#[test]
fn code_phase_stays_within_one_period() {
	let signal = SignalType::gps_l1ca();
	for shift in vec![0, 1, 17, 2047, 2048, 4000, 4095] {
		let buffer = delayed_replica(&signal, 9, shift, 0.0, 2*4096);
		let result = search(&signal, &buffer, 9, &zero_doppler_only(), 1).unwrap();
		assert!(result.code_phase >= 0.0 && result.code_phase < 1023.0);
		assert!((result.code_phase - (shift as f64) * L1_CA_CHIPS_PER_SAMPLE).abs() <= L1_CA_CHIPS_PER_SAMPLE);
	}
}

#[test]
fn buffer_must_cover_every_block() {
	let signal = SignalType::gps_l1ca();
	let grid = DopplerGrid::new(-500.0, 500.0, 500.0).unwrap();

	let exact = delayed_replica(&signal, 1, 0, 0.0, 3*4096);
	assert!(search(&signal, &exact, 1, &grid, 2).is_ok());

	let short = delayed_replica(&signal, 1, 0, 0.0, 3*4096 - 1);
	match search(&signal, &short, 1, &grid, 2) {
		Err(AcqErr::InsufficientSamples{ required, available }) => {
			assert_eq!(required, 3*4096);
			assert_eq!(available, 3*4096 - 1);
		},
		other => panic!("Expected InsufficientSamples, got {:?}", other),
	}
}

#[test]
fn frequency_domain_search_matches_direct_correlation() {
	let signal = m_sequence_signal();
	let noisy = add_noise(delayed_replica(&signal, 1, 23, 1000.0, 3*64), 5, 0.5);
	let grid = DopplerGrid::new(-2000.0, 2000.0, 1000.0).unwrap();

	let fast = search(&signal, &noisy, 1, &grid, 2).unwrap();
	let slow = reference_search(&signal, &noisy, 1, &grid, 2);

	assert_eq!(fast.doppler_hz, slow.doppler_hz);
	assert!(relative_eq(fast.code_phase, slow.code_phase), "{} vs {}", fast.code_phase, slow.code_phase);
	assert!(relative_eq(fast.metric, slow.metric), "{} vs {}", fast.metric, slow.metric);
	assert!(relative_eq(fast.peak_to_mean, slow.peak_to_mean));
}

#[test]
fn weak_signal_is_detected_and_noise_is_not() {
	let signal = SignalType::gps_l1ca();
	let grid = DopplerGrid::new(-1500.0, 1500.0, 250.0).unwrap();

	let weak = add_noise(delayed_replica(&signal, 1, 2000, 750.0, 5*4096), 7, 4.0);
	let result = search(&signal, &weak, 1, &grid, 4).unwrap();
	assert!(result.detected(4.0), "{:?}", result);
	assert_eq!(result.doppler_hz, 750.0);
	assert!((result.code_phase - 2000.0 * L1_CA_CHIPS_PER_SAMPLE).abs() <= L1_CA_CHIPS_PER_SAMPLE);

	let mut rng = StdRng::seed_from_u64(8);
	let noise = SampleBuffer::new(gaussian_noise(&mut rng, 4.0, 5*4096), signal.fs);
	let result = search(&signal, &noise, 1, &grid, 4).unwrap();
	assert!(result.metric > 0.0);
	assert!(!result.detected(4.0), "{:?}", result);
}

#[test]
fn silent_buffer_is_a_non_detection_not_an_error() {
	let signal = SignalType::gps_l1ca();
	let silent = SampleBuffer::new(vec![Complex::zero(); 2*4096], signal.fs);
	let result = search(&signal, &silent, 1, &DopplerGrid::new(-500.0, 500.0, 250.0).unwrap(), 1).unwrap();
	assert_eq!(result, AcquisitionResult::none());
	assert!(!result.detected(0.0));
}

#[test]
fn buffer_at_wrong_rate_is_rejected() {
	let signal = SignalType::gps_l1ca();
	let buffer = SampleBuffer::new(vec![Complex::zero(); 2*4096], 4.0e6);
	match search(&signal, &buffer, 1, &zero_doppler_only(), 1) {
		Err(AcqErr::SampleRateMismatch{ expected, actual }) => {
			assert_eq!(expected, 4.096e6);
			assert_eq!(actual, 4.0e6);
		},
		other => panic!("Expected SampleRateMismatch, got {:?}", other),
	}
}

#[test]
fn dispatcher_reports_in_request_order() {
	let signal = SignalType::gps_l1ca();
	let buffer = delayed_replica(&signal, 3, 600, 500.0, 3*4096);
	let grid = DopplerGrid::new(-1000.0, 1000.0, 500.0).unwrap();
	let prns:Vec<usize> = vec![7, 3, 1, 12, 5, 30, 2];

	let dispatcher = Dispatcher::new(4).unwrap();
	let results = dispatcher.run_acquisition(&signal, &buffer, &prns, &grid, 2).unwrap();

	assert_eq!(results.iter().map(|(prn, _)| *prn).collect::<Vec<usize>>(), prns);

	let strongest = results.iter()
		.map(|(prn, r)| (*prn, r.as_ref().unwrap().metric))
		.fold((0, 0.0), |(bp, bm), (p, m)| if m > bm { (p, m) } else { (bp, bm) });
	assert_eq!(strongest.0, 3);

	// Same answers as searching one at a time
	for (prn, result) in results.iter() {
		assert_eq!(*result.as_ref().unwrap(), search(&signal, &buffer, *prn, &grid, 2).unwrap());
	}
}

#[test]
fn dispatcher_rejects_bad_arguments_before_searching() {
	let signal = SignalType::gps_l1ca();
	let buffer = delayed_replica(&signal, 1, 0, 0.0, 2*4096);
	let dispatcher = Dispatcher::new(2).unwrap();

	match dispatcher.run_acquisition(&signal, &buffer, &[1, 40, 2], &zero_doppler_only(), 1) {
		Err(AcqErr::InvalidIdentifier{ prn, .. }) => assert_eq!(prn, 40),
		other => panic!("Expected InvalidIdentifier, got {:?}", other),
	}

	match dispatcher.run_acquisition(&signal, &buffer, &[1, 2], &zero_doppler_only(), 0) {
		Err(AcqErr::InvalidIntegrationTime{ ms, block_ms }) => {
			assert_eq!(ms, 0);
			assert_eq!(block_ms, 1);
		},
		other => panic!("Expected InvalidIntegrationTime, got {:?}", other),
	}
}

#[test]
fn short_buffer_fails_each_slot_without_aborting() {
	let signal = SignalType::gps_l1ca();
	let buffer = delayed_replica(&signal, 1, 0, 0.0, 2*4096);
	let results = Dispatcher::new(2).unwrap().run_acquisition(&signal, &buffer, &[1, 2, 3], &zero_doppler_only(), 4).unwrap();

	assert_eq!(results.len(), 3);
	for (_, result) in results.iter() {
		match result {
			Err(AcqErr::InsufficientSamples{ required, available }) => {
				assert_eq!(*required, 5*4096);
				assert_eq!(*available, 2*4096);
			},
			other => panic!("Expected InsufficientSamples, got {:?}", other),
		}
	}
}

#[test]
fn cancelled_dispatcher_stops_every_search() {
	let signal = SignalType::gps_l1ca();
	let buffer = delayed_replica(&signal, 1, 0, 0.0, 2*4096);
	let dispatcher = Dispatcher::new(2).unwrap();
	dispatcher.cancel();

	let results = dispatcher.run_acquisition(&signal, &buffer, &[1, 2, 3, 4], &zero_doppler_only(), 1).unwrap();
	assert_eq!(results.len(), 4);
	assert!(results.iter().all(|(_, r)| match r { Err(AcqErr::Cancelled) => true, _ => false }));
}

fn galileo_e1c_with_random_codes() -> SignalType {
	let mut rng = StdRng::seed_from_u64(42);
	let normal = Normal::new(0.0, 1.0).unwrap();
	let codes:Vec<Vec<bool>> = (0..3).map(|_| (0..4092).map(|_| normal.sample(&mut rng) > 0.0).collect()).collect();
	SignalType::galileo_e1c(MemoryCodes::from_chips(codes).unwrap())
}

#[rstest]
#[case(SignalType::beidou_b1i(), 6, 1, 3000)]
#[case(SignalType::gps_l2cm(), 14, 40, 51234)]
#[case(SignalType::gps_l1ca(), 22, 1, 777)]
#[case(galileo_e1c_with_random_codes(), 2, 8, 20000)]
fn every_signal_type_finds_its_own_code(#[case] signal:SignalType, #[case] prn:usize, #[case] integration_ms:usize, #[case] shift:usize) {
	let n:usize = signal.samples_per_block;
	let blocks = signal.incoherent_blocks(integration_ms).unwrap();
	assert_eq!(blocks, 1);

	let buffer = delayed_replica(&signal, prn, shift, 0.0, signal.required_samples(integration_ms).unwrap());
	let result = search(&signal, &buffer, prn, &zero_doppler_only(), integration_ms).unwrap();

	let resolution:f64 = signal.chips_per_sample();
	assert!((result.code_phase - (shift as f64) * resolution).abs() <= resolution, "{} {:?}", signal.name, result);
	assert!(result.code_phase < signal.code_length() as f64);
	assert!((result.metric - n as f64).abs() < 1.0e-6 * (n as f64));
}

#[test]
fn grid_excludes_its_upper_bound() {
	let grid:DopplerGrid = "-7000,7000,200".parse().unwrap();
	assert_eq!(grid.len(), 70);
	let bins:Vec<f64> = grid.bins().collect();
	assert_eq!(bins[0], -7000.0);
	assert_eq!(bins[69], 6800.0);
	assert_eq!(grid.nearest_bin(1e6), 6800.0);
	assert_eq!(grid.nearest_bin(-1e6), -7000.0);

	let uneven = DopplerGrid::new(-100.0, 150.0, 100.0).unwrap();
	assert_eq!(uneven.bins().collect::<Vec<f64>>(), vec![-100.0, 0.0, 100.0]);
}

#[test]
fn degenerate_grids_are_rejected() {
	for (min, max, incr) in vec![(0.0, 100.0, 0.0), (0.0, 100.0, -5.0), (100.0, 100.0, 5.0), (200.0, 100.0, 5.0), (0.0, f64::NAN, 1.0)] {
		assert!(DopplerGrid::new(min, max, incr).is_err(), "{} {} {}", min, max, incr);
	}
	assert!("1,2".parse::<DopplerGrid>().is_err());
	assert!("1,2,x".parse::<DopplerGrid>().is_err());
}
