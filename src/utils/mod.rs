
use regex::Regex;

use crate::AcqErr;

/// Expands a list like `1,3,7-14,31` into identifiers, keeping the order given
pub fn parse_list_ranges(s:&str) -> Result<Vec<usize>, AcqErr> {
	let re = Regex::new(r"^(\d+)(?:-(\d+))?$").map_err(|e| AcqErr::InvalidArgument(e.to_string()))?;
	let mut ans:Vec<usize> = vec![];

	for item in s.split(',').map(|x| x.trim()) {
		let caps = re.captures(item).ok_or_else(|| AcqErr::InvalidArgument(format!("malformed list item {:?} in {:?}", item, s)))?;
		let first:usize = parse_usize(&caps[1])?;
		match caps.get(2) {
			Some(last) => {
				let last:usize = parse_usize(last.as_str())?;
				if last < first { return Err(AcqErr::InvalidArgument(format!("descending range {:?}", item))); }
				ans.extend(first..=last);
			},
			None => ans.push(first),
		}
	}

	Ok(ans)
}

fn parse_usize(s:&str) -> Result<usize, AcqErr> {
	s.parse().map_err(|_| AcqErr::InvalidArgument(format!("{:?} is not an integer", s)))
}

pub fn parse_list_floats(s:&str) -> Result<Vec<f64>, AcqErr> {
	s.split(',').map(|x| x.trim().parse::<f64>()
		.map_err(|_| AcqErr::InvalidArgument(format!("{:?} is not a number in {:?}", x, s)))).collect()
}
