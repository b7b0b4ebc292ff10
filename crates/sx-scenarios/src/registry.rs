//! Built-in scenario catalogue.

use std::collections::BTreeMap;

use sx_engine::Simulation;
use sx_stages::analog::{DEFAULT_MODULATION_INDEX, DEFAULT_PHASE_DEVIATION};
use sx_stages::pulse::{DEFAULT_PCM_BITS, DEFAULT_STEP_SIZE, MAX_PCM_BITS, PcmFormat};
use sx_stages::{
    AmDemodulator, AmModulator, AskDemodulator, AskModulator, DeltaDecoder, DeltaEncoder,
    FmDemodulator, FmModulator, FskDemodulator, FskModulator, PcmDecoder, PcmEncoder,
    PmDemodulator, PmModulator, PskDemodulator, PskModulator, digital_signal,
    sine_wave,
};
use tracing::debug;

use crate::error::{ScenarioError, ScenarioResult};
use crate::layout::Layout;
use crate::line_code::LineCode;
use crate::params::{ParamSet, ParamSpec, ParamValue};

const DIGITAL_DT: f64 = 1e-3;
const AM_DT: f64 = 1e-4;
const ANGLE_DT: f64 = 1e-5;

const LINE_CODING_BITS: &str = "01001100011011101010";
const CODEC_BITS: &str = "01001100011";
const KEYING_BITS: &str = "10110010";

/// What a scenario builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    LineCoding,
    Codec(LineCode),
    AnalogModulation,
    AmModem,
    FmModem,
    PmModem,
    AnalogToDigital,
    DmCodec,
    PcmCodec,
    DigitalModulation,
    AskModem,
    FskModem,
    PskModem,
}

#[derive(Debug, Clone)]
pub struct ScenarioDef {
    pub id: String,
    pub title: String,
    pub description: String,
    pub default_duration_s: f64,
    pub params: Vec<ParamSpec>,
    pub recipe: Recipe,
}

/// A freshly built simulation plus the parameters it was built from.
#[derive(Debug)]
pub struct BuiltScenario {
    pub sim: Simulation,
    pub params: ParamSet,
}

impl ScenarioDef {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn resolve(&self, overrides: &BTreeMap<String, ParamValue>) -> ScenarioResult<ParamSet> {
        ParamSet::resolve(&self.id, &self.params, overrides)
    }

    /// Parse raw `key=value` strings against this scenario's parameters.
    pub fn parse_overrides<'a>(
        &self,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> ScenarioResult<BTreeMap<String, ParamValue>> {
        let mut out = BTreeMap::new();
        for (name, raw) in pairs {
            let spec = self.param(name).ok_or_else(|| ScenarioError::UnknownParam {
                scenario: self.id.clone(),
                name: name.to_string(),
            })?;
            out.insert(name.to_string(), spec.parse(raw)?);
        }
        Ok(out)
    }

    pub fn build(&self, overrides: &BTreeMap<String, ParamValue>) -> ScenarioResult<BuiltScenario> {
        let params = self.resolve(overrides)?;
        let sim = build_recipe(self.recipe, &params)?;
        debug!(
            scenario = %self.id,
            wires = sim.wire_ids().len(),
            components = sim.component_ids().len(),
            "built scenario"
        );
        Ok(BuiltScenario { sim, params })
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    scenarios: Vec<ScenarioDef>,
}

impl Registry {
    pub fn builtin() -> Self {
        let mut scenarios = vec![ScenarioDef {
            id: "line-coding".into(),
            title: "Line Coding".into(),
            description: "All six line encoders side by side on one bit pattern.".into(),
            default_duration_s: 4.0,
            params: digital_params(LINE_CODING_BITS),
            recipe: Recipe::LineCoding,
        }];

        for code in LineCode::ALL {
            scenarios.push(ScenarioDef {
                id: format!("codec-{}", code.slug()),
                title: format!("Digital to Digital: {} Codec", code.label()),
                description: format!("{} encoding followed by decoding.", code.label()),
                default_duration_s: 2.2,
                params: digital_params(CODEC_BITS),
                recipe: Recipe::Codec(code),
            });
        }

        scenarios.extend([
            analog(
                "analog-modulation",
                "Analog to Analog Modulation",
                "AM, FM and PM modulators side by side.",
                ANGLE_DT,
                vec![
                    carrier(),
                    modulation_index(),
                    freq_deviation(),
                ],
                Recipe::AnalogModulation,
            ),
            analog(
                "am-modem",
                "Analog to Analog: AM Modem",
                "AM modulation and envelope demodulation.",
                AM_DT,
                vec![carrier(), modulation_index()],
                Recipe::AmModem,
            ),
            analog(
                "fm-modem",
                "Analog to Analog: FM Modem",
                "FM modulation and zero-crossing demodulation.",
                ANGLE_DT,
                vec![carrier(), freq_deviation()],
                Recipe::FmModem,
            ),
            analog(
                "pm-modem",
                "Analog to Analog: PM Modem",
                "PM modulation and coherent demodulation.",
                ANGLE_DT,
                vec![
                    carrier(),
                    ParamSpec::float(
                        "phase_deviation",
                        DEFAULT_PHASE_DEVIATION,
                        "radians of phase shift per unit message",
                    ),
                ],
                Recipe::PmModem,
            ),
            analog(
                "analog-to-digital",
                "Analog to Digital Encoding",
                "Delta modulation and PCM encoders side by side.",
                DIGITAL_DT,
                vec![sample_rate(), n_bits(), step_size()],
                Recipe::AnalogToDigital,
            ),
            analog(
                "dm-codec",
                "Analog to Digital: Delta Modulation Codec",
                "Delta modulation encoding and decoding.",
                DIGITAL_DT,
                vec![sample_rate(), step_size()],
                Recipe::DmCodec,
            ),
            analog(
                "pcm-codec",
                "Analog to Digital: PCM Codec",
                "PCM encoding and decoding.",
                DIGITAL_DT,
                vec![sample_rate(), n_bits()],
                Recipe::PcmCodec,
            ),
            keying(
                "digital-modulation",
                "Digital to Analog Modulation",
                "ASK, FSK and PSK modulators side by side.",
                vec![carrier(), freq_0(), freq_1()],
                Recipe::DigitalModulation,
            ),
            keying(
                "ask-modem",
                "Digital to Analog: ASK Modem",
                "ASK modulation and envelope detection.",
                vec![carrier()],
                Recipe::AskModem,
            ),
            keying(
                "fsk-modem",
                "Digital to Analog: FSK Modem",
                "FSK modulation and zero-crossing detection.",
                vec![freq_0(), freq_1()],
                Recipe::FskModem,
            ),
            keying(
                "psk-modem",
                "Digital to Analog: PSK Modem",
                "PSK modulation and coherent detection.",
                vec![carrier()],
                Recipe::PskModem,
            ),
        ]);

        Self { scenarios }
    }

    pub fn get(&self, id: &str) -> ScenarioResult<&ScenarioDef> {
        self.scenarios
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ScenarioError::UnknownScenario { id: id.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioDef> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn dt(default: f64) -> ParamSpec {
    ParamSpec::float("dt", default, "simulation time step in seconds")
}

fn digital_params(bits: &str) -> Vec<ParamSpec> {
    vec![
        ParamSpec::float("baud_rate", 5.0, "bits per second"),
        ParamSpec::text("bitstream", bits, "repeating pattern of 0 and 1"),
        dt(DIGITAL_DT),
    ]
}

fn carrier() -> ParamSpec {
    ParamSpec::float("carrier_freq", 20.0, "carrier frequency in Hz")
}

fn modulation_index() -> ParamSpec {
    ParamSpec::float("modulation_index", DEFAULT_MODULATION_INDEX, "AM modulation index")
}

fn freq_deviation() -> ParamSpec {
    ParamSpec::float("freq_deviation", 5.0, "FM frequency deviation in Hz per unit message")
}

fn sample_rate() -> ParamSpec {
    ParamSpec::float("sample_rate", 20.0, "samples per second")
}

fn n_bits() -> ParamSpec {
    ParamSpec::int("n_bits", DEFAULT_PCM_BITS as i64, "PCM bits per sample")
}

fn step_size() -> ParamSpec {
    ParamSpec::float("step_size", DEFAULT_STEP_SIZE, "delta modulation step")
}

fn freq_0() -> ParamSpec {
    ParamSpec::float("freq_0", 10.0, "FSK frequency for 0 in Hz")
}

fn freq_1() -> ParamSpec {
    ParamSpec::float("freq_1", 25.0, "FSK frequency for 1 in Hz")
}

fn analog(
    id: &str,
    title: &str,
    description: &str,
    step: f64,
    mut params: Vec<ParamSpec>,
    recipe: Recipe,
) -> ScenarioDef {
    params.extend([
        ParamSpec::float("signal_freq", 1.0, "message sine frequency in Hz"),
        ParamSpec::float("signal_amplitude", 1.0, "message sine amplitude"),
        dt(step),
    ]);
    ScenarioDef {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        default_duration_s: 1.0,
        params,
        recipe,
    }
}

fn keying(
    id: &str,
    title: &str,
    description: &str,
    mut params: Vec<ParamSpec>,
    recipe: Recipe,
) -> ScenarioDef {
    params.extend(digital_params(KEYING_BITS));
    ScenarioDef {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        default_duration_s: 1.6,
        params,
        recipe,
    }
}

fn message(params: &ParamSet) -> ScenarioResult<impl Fn(f64) -> f64 + Send + 'static> {
    Ok(sine_wave(
        params.float("signal_freq")?,
        params.float("signal_amplitude")?,
        0.0,
    ))
}

fn bit_pattern(params: &ParamSet) -> ScenarioResult<impl Fn(f64) -> f64 + Send + 'static> {
    Ok(digital_signal(
        params.text("bitstream")?,
        params.float("baud_rate")?,
        (0.0, 1.0),
    )?)
}

fn pcm_format(params: &ParamSet) -> ScenarioResult<PcmFormat> {
    let n_bits = params.int("n_bits")?;
    if !(1..=MAX_PCM_BITS as i64).contains(&n_bits) {
        return Err(ScenarioError::InvalidValue {
            name: "n_bits".into(),
            reason: format!("must be between 1 and {MAX_PCM_BITS}, got {n_bits}"),
        });
    }
    Ok(PcmFormat {
        n_bits: n_bits as u32,
        ..PcmFormat::default()
    })
}

fn build_recipe(recipe: Recipe, p: &ParamSet) -> ScenarioResult<Simulation> {
    let step = p.float("dt")?;
    match recipe {
        Recipe::LineCoding => {
            let baud = p.float("baud_rate")?;
            let mut layout = Layout::new("Raw Input");
            let input = layout.input();
            for code in LineCode::ALL {
                layout.stage(input, &format!("{} Encoded", code.label()), code.encoder(baud)?)?;
            }
            layout.finish(bit_pattern(p)?, step)
        }
        Recipe::Codec(code) => {
            let baud = p.float("baud_rate")?;
            let mut layout = Layout::new("Raw Input");
            let encoded =
                layout.stage(layout.input(), &format!("{} Encoded", code.label()), code.encoder(baud)?)?;
            layout.stage(encoded, &format!("{} Decoded", code.label()), code.decoder(baud)?)?;
            layout.finish(bit_pattern(p)?, step)
        }
        Recipe::AnalogModulation => {
            let fc = p.float("carrier_freq")?;
            let mut layout = Layout::new("Analog Input");
            let input = layout.input();
            layout.stage(
                input,
                "AM Modulated",
                Box::new(AmModulator::new(fc, p.float("modulation_index")?)?),
            )?;
            layout.stage(
                input,
                "FM Modulated",
                Box::new(FmModulator::new(fc, p.float("freq_deviation")?)?),
            )?;
            layout.stage(
                input,
                "PM Modulated",
                Box::new(PmModulator::new(fc, DEFAULT_PHASE_DEVIATION)?),
            )?;
            layout.finish(message(p)?, step)
        }
        Recipe::AmModem => {
            let fc = p.float("carrier_freq")?;
            let m = p.float("modulation_index")?;
            let mut layout = Layout::new("Analog Input");
            let modulated =
                layout.stage(layout.input(), "AM Modulated", Box::new(AmModulator::new(fc, m)?))?;
            layout.stage(modulated, "AM Demodulated", Box::new(AmDemodulator::new(m)?))?;
            layout.finish(message(p)?, step)
        }
        Recipe::FmModem => {
            let fc = p.float("carrier_freq")?;
            let kf = p.float("freq_deviation")?;
            let mut layout = Layout::new("Analog Input");
            let modulated =
                layout.stage(layout.input(), "FM Modulated", Box::new(FmModulator::new(fc, kf)?))?;
            layout.stage(modulated, "FM Demodulated", Box::new(FmDemodulator::new(fc, kf)?))?;
            layout.finish(message(p)?, step)
        }
        Recipe::PmModem => {
            let fc = p.float("carrier_freq")?;
            let kp = p.float("phase_deviation")?;
            let mut layout = Layout::new("Analog Input");
            let modulated =
                layout.stage(layout.input(), "PM Modulated", Box::new(PmModulator::new(fc, kp)?))?;
            layout.stage(modulated, "PM Demodulated", Box::new(PmDemodulator::new(fc, kp)?))?;
            layout.finish(message(p)?, step)
        }
        Recipe::AnalogToDigital => {
            let rate = p.float("sample_rate")?;
            let mut layout = Layout::new("Analog Input");
            let input = layout.input();
            layout.stage(
                input,
                "DM Encoded",
                Box::new(DeltaEncoder::new(rate, p.float("step_size")?)?),
            )?;
            layout.stage(
                input,
                "PCM Encoded",
                Box::new(PcmEncoder::new(rate, pcm_format(p)?)?),
            )?;
            layout.finish(message(p)?, step)
        }
        Recipe::DmCodec => {
            let rate = p.float("sample_rate")?;
            let size = p.float("step_size")?;
            let mut layout = Layout::new("Analog Input");
            let encoded =
                layout.stage(layout.input(), "DM Encoded", Box::new(DeltaEncoder::new(rate, size)?))?;
            layout.stage(encoded, "DM Decoded", Box::new(DeltaDecoder::new(rate, size)?))?;
            layout.finish(message(p)?, step)
        }
        Recipe::PcmCodec => {
            let rate = p.float("sample_rate")?;
            let format = pcm_format(p)?;
            let mut layout = Layout::new("Analog Input");
            let encoded =
                layout.stage(layout.input(), "PCM Encoded", Box::new(PcmEncoder::new(rate, format)?))?;
            layout.stage(encoded, "PCM Decoded", Box::new(PcmDecoder::new(rate, format)?))?;
            layout.finish(message(p)?, step)
        }
        Recipe::DigitalModulation => {
            let fc = p.float("carrier_freq")?;
            let mut layout = Layout::new("Digital Input");
            let input = layout.input();
            layout.stage(input, "ASK Modulated", Box::new(AskModulator::new(fc)?))?;
            layout.stage(
                input,
                "FSK Modulated",
                Box::new(FskModulator::new(p.float("freq_0")?, p.float("freq_1")?)?),
            )?;
            layout.stage(input, "PSK Modulated", Box::new(PskModulator::new(fc)?))?;
            layout.finish(bit_pattern(p)?, step)
        }
        Recipe::AskModem => {
            let fc = p.float("carrier_freq")?;
            let baud = p.float("baud_rate")?;
            let mut layout = Layout::new("Digital Input");
            let modulated =
                layout.stage(layout.input(), "ASK Modulated", Box::new(AskModulator::new(fc)?))?;
            layout.stage(modulated, "ASK Demodulated", Box::new(AskDemodulator::new(baud)?))?;
            layout.finish(bit_pattern(p)?, step)
        }
        Recipe::FskModem => {
            let (f0, f1) = (p.float("freq_0")?, p.float("freq_1")?);
            let baud = p.float("baud_rate")?;
            let mut layout = Layout::new("Digital Input");
            let modulated = layout.stage(
                layout.input(),
                "FSK Modulated",
                Box::new(FskModulator::new(f0, f1)?),
            )?;
            layout.stage(
                modulated,
                "FSK Demodulated",
                Box::new(FskDemodulator::new(f0, f1, baud)?),
            )?;
            layout.finish(bit_pattern(p)?, step)
        }
        Recipe::PskModem => {
            let fc = p.float("carrier_freq")?;
            let baud = p.float("baud_rate")?;
            let mut layout = Layout::new("Digital Input");
            let modulated =
                layout.stage(layout.input(), "PSK Modulated", Box::new(PskModulator::new(fc)?))?;
            layout.stage(
                modulated,
                "PSK Demodulated",
                Box::new(PskDemodulator::new(fc, baud)?),
            )?;
            layout.finish(bit_pattern(p)?, step)
        }
    }
}
