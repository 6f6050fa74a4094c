
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::sync::atomic::Ordering;

use clap::{App, AppSettings, Arg, ArgMatches};
use colored::*;
use env_logger::{Builder, Env};
use log::{info, warn};

use crate::AcqErr;
use crate::gnss::acquisition::DopplerGrid;
use crate::gnss::acquisition::dispatch::{Dispatcher, PrnResult};
use crate::gnss::signal::{CommandDefaults, SignalType};
use crate::io::{SampleFormat, get_samples_complex};
use crate::resample::FrontEnd;
use crate::utils;

pub mod report;

/// Extra milliseconds read past the integration time so the last block can overrun
pub const PAD_MS:usize = 5;

/// Everything one acquisition run is configured with
#[derive(Debug, Clone)]
pub struct RunConfig {
	pub input_filename:String,
	pub sample_rate:f64,
	pub carrier_offset:f64,
	pub prns:Vec<usize>,
	pub grid:DopplerGrid,
	pub time_ms:usize,
	pub threads:usize,
	pub format:SampleFormat,
	pub threshold:Option<f64>,
	pub json:bool,
	pub codes:Option<String>,
}

pub fn build_app(defaults:&CommandDefaults, with_codes:bool) -> App<'static, 'static> {
	let app = App::new(defaults.about)
		.version("0.1.0")
		.author("John Stanford (johnwstanford@gmail.com)")
		.about(defaults.about)
		.setting(AppSettings::AllowNegativeNumbers)
		.arg(Arg::with_name("input_filename")
			.help("Input data file, i/q interleaved, '-' for standard input")
			.required(true).index(1))
		.arg(Arg::with_name("sample_rate")
			.help("Sampling rate [samples/sec]")
			.required(true).index(2))
		.arg(Arg::with_name("carrier_offset")
			.help("Offset to the carrier [Hz], positive or negative")
			.required(true).index(3).allow_hyphen_values(true))
		.arg(Arg::with_name("prn")
			.long("prn").takes_value(true)
			.help(defaults.prn_help)
			.default_value(defaults.prns))
		.arg(Arg::with_name("doppler_search")
			.long("doppler-search").value_name("MIN,MAX,INCR").takes_value(true)
			.allow_hyphen_values(true)
			.help("Doppler search grid: min,max,increment [Hz]")
			.default_value(defaults.doppler_search))
		.arg(Arg::with_name("time")
			.long("time").takes_value(true)
			.help("Integration time [ms]"))
		.arg(Arg::with_name("threads")
			.long("threads").takes_value(true)
			.help("Worker threads, defaults to the available parallelism"))
		.arg(Arg::with_name("input_type")
			.short("t").long("type").takes_value(true)
			.possible_values(&["i8", "i16"])
			.default_value("i8"))
		.arg(Arg::with_name("threshold")
			.long("threshold").takes_value(true)
			.help("Peak-to-mean ratio a PRN needs to count as detected"))
		.arg(Arg::with_name("json")
			.long("json")
			.help("Print JSON records instead of text lines"));

	if with_codes {
		app.arg(Arg::with_name("codes")
			.long("codes").value_name("FILE").takes_value(true).required(true)
			.help("Memory code table, one line of hex digits per PRN"))
	} else { app }
}

fn parse_arg<T: std::str::FromStr>(matches:&ArgMatches, name:&str) -> Result<Option<T>, AcqErr> {
	match matches.value_of(name) {
		Some(s) => s.trim().parse().map(Some).map_err(|_| AcqErr::InvalidArgument(format!("invalid {}: {:?}", name, s))),
		None => Ok(None),
	}
}

fn required_arg<T: std::str::FromStr>(matches:&ArgMatches, name:&str) -> Result<T, AcqErr> {
	parse_arg(matches, name)?.ok_or_else(|| AcqErr::InvalidArgument(format!("missing {}", name)))
}

impl RunConfig {

	pub fn from_matches(matches:&ArgMatches, defaults:&CommandDefaults) -> Result<Self, AcqErr> {
		let input_filename:String = matches.value_of("input_filename")
			.ok_or_else(|| AcqErr::InvalidArgument("missing input_filename".to_string()))?.to_string();

		Ok(Self {
			input_filename,
			sample_rate:    required_arg(matches, "sample_rate")?,
			carrier_offset: required_arg(matches, "carrier_offset")?,
			prns:           utils::parse_list_ranges(matches.value_of("prn").unwrap_or(defaults.prns))?,
			grid:           matches.value_of("doppler_search").unwrap_or(defaults.doppler_search).parse()?,
			time_ms:        parse_arg(matches, "time")?.unwrap_or(defaults.time_ms),
			threads:        parse_arg(matches, "threads")?.unwrap_or(0),
			format:         matches.value_of("input_type").unwrap_or("i8").parse()?,
			threshold:      parse_arg(matches, "threshold")?,
			json:           matches.is_present("json"),
			codes:          matches.value_of("codes").map(|s| s.to_string()),
		})
	}

}

fn checked_front_end(signal:&SignalType, config:&RunConfig) -> Result<FrontEnd, AcqErr> {
	for prn in config.prns.iter() { signal.validate_prn(*prn)?; }
	signal.incoherent_blocks(config.time_ms)?;

	let front_end = FrontEnd::new(config.sample_rate, config.carrier_offset, signal.defaults.cutoff_hz);
	front_end.check()?;
	Ok(front_end)
}

fn open_input(config:&RunConfig) -> Result<Box<dyn Read>, AcqErr> {
	if config.input_filename == "-" { Ok(Box::new(BufReader::new(io::stdin()))) }
	else { Ok(Box::new(BufReader::new(File::open(&config.input_filename)?))) }
}

fn stop_if_cancelled(dispatcher:&Dispatcher) -> Result<(), AcqErr> {
	if dispatcher.is_cancelled() { Err(AcqErr::Cancelled) } else { Ok(()) }
}

/// Reads, conditions, and searches the input described by `config`
pub fn run(signal:&SignalType, config:&RunConfig, dispatcher:&Dispatcher) -> Result<Vec<PrnResult>, AcqErr> {
	// Argument errors surface before any input is opened
	let front_end = checked_front_end(signal, config)?;
	search_input(signal, config, dispatcher, &front_end, open_input(config)?)
}

/// Same as `run`, with the raw samples taken from `src`
pub fn run_from<R: Read>(signal:&SignalType, config:&RunConfig, dispatcher:&Dispatcher, src:R) -> Result<Vec<PrnResult>, AcqErr> {
	let front_end = checked_front_end(signal, config)?;
	search_input(signal, config, dispatcher, &front_end, src)
}

// A cancel request is honoured between stages
fn search_input<R: Read>(signal:&SignalType, config:&RunConfig, dispatcher:&Dispatcher, front_end:&FrontEnd, src:R) -> Result<Vec<PrnResult>, AcqErr> {
	let ms_pad:usize = config.time_ms.checked_add(PAD_MS)
		.ok_or_else(|| AcqErr::InvalidArgument(format!("integration time {} [ms] is too long", config.time_ms)))?;
	let n_raw:usize = front_end.input_len(ms_pad)?;
	let n_out:usize = ms_pad.checked_mul(signal.samples_per_ms())
		.ok_or_else(|| AcqErr::InvalidArgument(format!("integration time {} [ms] is too long", config.time_ms)))?;

	stop_if_cancelled(dispatcher)?;
	info!("Reading {} samples from {}", n_raw, config.input_filename);
	let x = get_samples_complex(src, n_raw, config.format)?;

	stop_if_cancelled(dispatcher)?;
	let buffer = front_end.process(x, signal.fs, n_out)?;
	info!("{:.1} [ms] of {} at {} [samples/sec] around the {} carrier", buffer.duration_ms(), signal.name, signal.fs, signal.defaults.carrier);

	stop_if_cancelled(dispatcher)?;
	dispatcher.run_acquisition(signal, &buffer, &config.prns, &config.grid, config.time_ms)
}

fn print_report(signal:&SignalType, config:&RunConfig, results:&[PrnResult]) -> Result<(), AcqErr> {
	if config.json {
		let records:Vec<report::AcquisitionRecord> = results.iter()
			.map(|(prn, r)| report::AcquisitionRecord::new(*prn, signal.name, r, config.threshold)).collect();
		let text = serde_json::to_string_pretty(&records).map_err(io::Error::from)?;
		println!("{}", text);
	} else {
		for (prn, r) in results.iter() {
			println!("{}", report::format_line(*prn, r, signal.defaults.prn_width, config.threshold));
		}
	}
	Ok(())
}

/// Ok(false) when any PRN's search failed after dispatch
fn try_main<F>(defaults:&CommandDefaults, with_codes:bool, make_signal:F) -> Result<bool, AcqErr>
	where F: FnOnce(&RunConfig) -> Result<SignalType, AcqErr> {

	let matches = build_app(defaults, with_codes).get_matches();
	let config = RunConfig::from_matches(&matches, defaults)?;
	let signal = make_signal(&config)?;

	let dispatcher = Dispatcher::new(config.threads)?;
	let cancel = dispatcher.cancel_flag();
	// A first Ctrl-C stops at the next stage or Doppler bin; a second one leaves at once
	if let Err(e) = ctrlc::set_handler(move || if cancel.swap(true, Ordering::Relaxed) { std::process::exit(130) }) {
		warn!("Unable to install Ctrl-C handler: {}", e);
	}

	let results = run(&signal, &config, &dispatcher)?;
	print_report(&signal, &config, &results)?;

	let mut all_ok = true;
	for (prn, r) in results.iter() {
		if let Err(e) = r {
			eprintln!("{}", format!("PRN {}: {}", prn, e).red());
			all_ok = false;
		}
	}
	Ok(all_ok)
}

/// Entry point shared by the acquisition programs; returns the process exit code
pub fn main<F>(defaults:CommandDefaults, with_codes:bool, make_signal:F) -> i32
	where F: FnOnce(&RunConfig) -> Result<SignalType, AcqErr> {

	Builder::from_env(Env::default().default_filter_or("info")).init();

	match try_main(&defaults, with_codes, make_signal) {
		Ok(true) => 0,
		Ok(false) => 2,
		Err(e) => {
			eprintln!("{}", format!("Error: {}", e).red().bold());
			1
		}
	}
}
