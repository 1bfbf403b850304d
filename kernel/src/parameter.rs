#[derive(Clone, Debug, PartialEq)]
pub enum Unit {
    Generic,
    Boolean,
    Percent,
    Second,
    Milliseconds,
    SampleFrames,
    Custom(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Details {
    Numeric {
        min: f64,
        max: f64,
        unit: Unit,
        default: f64,
    },
    Indexed {
        names: Vec<String>,
        default: usize,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum DisplayScale {
    Linear,
    Logarithmic,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Flags {
    pub writable: bool,
    pub readable: bool,
    pub scale: DisplayScale,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Info {
    pub id: String,
    pub address: u64,
    pub name: String,
    pub details: Details,
    pub flags: Flags,
    pub dependent_parameters: Vec<u64>,
}

impl Info {
    pub fn default_value(&self) -> f64 {
        match self.details {
            Details::Numeric { default, .. } => default,
            Details::Indexed { default, .. } => default as f64,
        }
    }

    /// Brings `value` into the parameter's domain. Out-of-range writes are
    /// never rejected. Indexed parameters snap to the nearest valid index and
    /// NaN falls back to the default.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.default_value();
        }
        match &self.details {
            Details::Numeric { min, max, .. } => value.max(*min).min(*max),
            Details::Indexed { names, .. } => {
                let last = names.len().saturating_sub(1) as f64;
                value.round().max(0.).min(last)
            }
        }
    }

    /// Human-readable form of `value`: whole numbers for numeric parameters,
    /// the entry name for indexed ones.
    pub fn string_from_value(&self, value: f64) -> String {
        match &self.details {
            Details::Numeric { .. } => {
                let rounded = value.round();
                // Avoid printing "-0" for small negative values.
                let rounded = if rounded == 0. { 0. } else { rounded };
                format!("{:.0}", rounded)
            }
            Details::Indexed { names, .. } => {
                let index = self.clamp(value) as usize;
                names.get(index).cloned().unwrap_or_default()
            }
        }
    }
}
