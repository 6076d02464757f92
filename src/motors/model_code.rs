//! Model Codes
//!
//! Mercury model names carry the rigging after the horsepower: `9.9MH` is a manual-start
//! tiller, `115ELPT` an electric-start 20" shaft with power trim, `150XL` a 25" shaft.

/// How the motor is started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartType {
    /// Pull start (`M`)
    Manual,

    /// Electric start (`E`)
    Electric,
}

/// How the motor is steered and throttled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Control {
    /// Remote steering and throttle (no `H`)
    #[default]
    Remote,

    /// Tiller handle (`H`)
    Tiller,
}

/// Transom shaft length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaftLength {
    /// 15" (`S`)
    Short,

    /// 20" (`L`)
    Long,

    /// 25" (`XL`)
    ExtraLong,

    /// 30" (`XXL`)
    ExtraExtraLong,
}

impl ShaftLength {
    /// Shaft length in inches.
    pub const fn inches(self) -> u32 {
        match self {
            ShaftLength::Short => 15,
            ShaftLength::Long => 20,
            ShaftLength::ExtraLong => 25,
            ShaftLength::ExtraExtraLong => 30,
        }
    }
}

/// Decoded rigging suffix of a model name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each flag is an independent suffix letter in the model code"
)]
pub struct ModelCode {
    /// Start type, if encoded
    pub start: Option<StartType>,

    /// Steering control
    pub control: Control,

    /// Shaft length, if encoded
    pub shaft: Option<ShaftLength>,

    /// Power trim & tilt (`PT`)
    pub power_trim: bool,

    /// Command Thrust gearcase (`CT`)
    pub command_thrust: bool,

    /// Counter-rotating gearcase (`C`)
    pub counter_rotation: bool,

    /// Electronic fuel injection (`EFI`)
    pub efi: bool,
}

/// Suffix tokens, longest first so `XXL` wins over `XL` and `L`, and `EFI` over `E`.
const TOKENS: [&str; 11] = [
    "XXL", "EFI", "XL", "PT", "CT", "M", "E", "L", "S", "H", "C",
];

impl ModelCode {
    /// Decode a model name.
    ///
    /// The first whitespace-separated word that starts with a digit is treated as the
    /// horsepower plus suffix. Remaining words may add `CT`, `PT` or `EFI`. Unknown letters
    /// are skipped.
    pub fn parse(model: &str) -> Self {
        let mut code = ModelCode::default();
        let mut seen_rating = false;

        for word in model.split_whitespace() {
            let upper = word.to_ascii_uppercase();

            if !seen_rating && upper.starts_with(|c: char| c.is_ascii_digit()) {
                seen_rating = true;
                code.apply_suffix(
                    upper.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.'),
                );
            } else {
                match upper.as_str() {
                    "CT" => code.command_thrust = true,
                    "PT" => code.power_trim = true,
                    "EFI" => code.efi = true,
                    _ => {}
                }
            }
        }

        code
    }

    fn apply_suffix(&mut self, suffix: &str) {
        let mut rest = suffix;

        while !rest.is_empty() {
            let matched = TOKENS
                .iter()
                .find_map(|token| rest.strip_prefix(token).map(|tail| (*token, tail)));

            match matched {
                Some((token, tail)) => {
                    self.apply_token(token);
                    rest = tail;
                }
                None => {
                    let mut chars = rest.chars();
                    chars.next();
                    rest = chars.as_str();
                }
            }
        }
    }

    fn apply_token(&mut self, token: &str) {
        match token {
            "M" => self.start = Some(StartType::Manual),
            "E" => self.start = Some(StartType::Electric),
            "H" => self.control = Control::Tiller,
            "S" => self.shaft = Some(ShaftLength::Short),
            "L" => self.shaft = Some(ShaftLength::Long),
            "XL" => self.shaft = Some(ShaftLength::ExtraLong),
            "XXL" => self.shaft = Some(ShaftLength::ExtraExtraLong),
            "PT" => self.power_trim = true,
            "CT" => self.command_thrust = true,
            "C" => self.counter_rotation = true,
            "EFI" => self.efi = true,
            _ => {}
        }
    }
}
