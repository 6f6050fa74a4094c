
use serde::Serialize;

use crate::AcqErr;
use crate::gnss::acquisition::AcquisitionResult;

#[derive(Debug, Serialize)]
pub struct AcquisitionRecord {
	pub prn:usize,
	pub signal:&'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub doppler_hz:Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub metric:Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub code_phase:Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub peak_to_mean:Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub detected:Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error:Option<String>,
}

impl AcquisitionRecord {

	pub fn new(prn:usize, signal:&'static str, result:&Result<AcquisitionResult, AcqErr>, threshold:Option<f64>) -> Self { match result {
		Ok(r) => Self { prn, signal, doppler_hz: Some(r.doppler_hz), metric: Some(r.metric), code_phase: Some(r.code_phase),
			peak_to_mean: Some(r.peak_to_mean), detected: threshold.map(|t| r.detected(t)), error: None },
		Err(e) => Self { prn, signal, doppler_hz: None, metric: None, code_phase: None,
			peak_to_mean: None, detected: None, error: Some(e.to_string()) },
	}}

}

/// Fixed-point with one decimal, right-aligned in `width`, and a blank where a plus sign would go
fn space_signed(v:f64, width:usize) -> String {
	if v.is_sign_negative() { format!("{:w$.1}", v, w = width) }
	else { format!(" {:>w$.1}", v, w = width.saturating_sub(1)) }
}

/// One report line per PRN; a threshold adds the detection test
pub fn format_line(prn:usize, result:&Result<AcquisitionResult, AcqErr>, prn_width:usize, threshold:Option<f64>) -> String { match result {
	Ok(r) => {
		let line = format!("prn {:w$} doppler {} metric {} code_offset {:6.1}", prn, space_signed(r.doppler_hz, 7), space_signed(r.metric, 7), r.code_phase, w = prn_width);
		match threshold {
			Some(t) if r.detected(t) => format!("{} peak_to_mean {:5.1} detected", line, r.peak_to_mean),
			Some(_) => format!("{} peak_to_mean {:5.1}", line, r.peak_to_mean),
			None => line,
		}
	},
	Err(e) => format!("prn {:w$} error: {}", prn, e, w = prn_width),
}}
