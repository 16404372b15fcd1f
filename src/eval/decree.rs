/// How integer indices map onto arrays and strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexingBase {
	Zero,
	One,
	/// The default: 1-based on weekdays, 0-based on weekends, read from
	/// the evaluator's clock.
	Weekday,
}

/// Runtime semantic switches set by decree statements. Unknown decree
/// strings are silently ignored.
#[derive(Debug, Clone)]
pub struct DecreeConfig {
	pub indexing_base:         IndexingBase,
	pub deterministic_hashing: bool,
	pub ambitious_mode:        bool,
	pub soft_casts:            bool,
	pub sequential_mood:       bool,
	pub no_forgiveness:        bool,
}

impl Default for DecreeConfig {
	fn default() -> Self {
		Self {
			indexing_base:         IndexingBase::Weekday,
			deterministic_hashing: false,
			ambitious_mode:        false,
			soft_casts:            false,
			sequential_mood:       false,
			no_forgiveness:        false,
		}
	}
}

impl DecreeConfig {
	pub fn apply(&mut self, decree: &str) {
		match decree {
			"zero_indexed" => self.indexing_base = IndexingBase::Zero,
			"one_indexed" => self.indexing_base = IndexingBase::One,
			"deterministic_hashing" => self.deterministic_hashing = true,
			"soft_casts" => self.soft_casts = true,
			"ambitious_mode" => self.ambitious_mode = true,
			"sequential_mood" => self.sequential_mood = true,
			"no_forgiveness" => self.no_forgiveness = true,
			_ => {}
		}
	}
}
