//! The six digital line codes and their encoder/decoder stages.

use sx_engine::Component;
use sx_stages::{
    BipolarAmiDecoder, BipolarAmiEncoder, DifferentialManchesterDecoder,
    DifferentialManchesterEncoder, ManchesterDecoder, ManchesterEncoder, NrziDecoder,
    NrziEncoder, NrzlDecoder, NrzlEncoder, PseudoternaryDecoder, PseudoternaryEncoder,
    StageResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCode {
    Nrzl,
    Nrzi,
    Manchester,
    DifferentialManchester,
    BipolarAmi,
    Pseudoternary,
}

impl LineCode {
    pub const ALL: [LineCode; 6] = [
        LineCode::Nrzl,
        LineCode::Nrzi,
        LineCode::Manchester,
        LineCode::DifferentialManchester,
        LineCode::BipolarAmi,
        LineCode::Pseudoternary,
    ];

    /// Short identifier used in scenario ids (`codec-<slug>`).
    pub fn slug(self) -> &'static str {
        match self {
            LineCode::Nrzl => "nrz-l",
            LineCode::Nrzi => "nrz-i",
            LineCode::Manchester => "manchester",
            LineCode::DifferentialManchester => "differential-manchester",
            LineCode::BipolarAmi => "bipolar-ami",
            LineCode::Pseudoternary => "pseudoternary",
        }
    }

    /// Human-readable name, also the prefix of the wire names.
    pub fn label(self) -> &'static str {
        match self {
            LineCode::Nrzl => "NRZ-L",
            LineCode::Nrzi => "NRZ-I",
            LineCode::Manchester => "Manchester",
            LineCode::DifferentialManchester => "Differential Manchester",
            LineCode::BipolarAmi => "Bipolar-AMI",
            LineCode::Pseudoternary => "Pseudoternary",
        }
    }

    pub fn encoder(self, baud_rate: f64) -> StageResult<Box<dyn Component>> {
        Ok(match self {
            LineCode::Nrzl => Box::new(NrzlEncoder::new()),
            LineCode::Nrzi => Box::new(NrziEncoder::new(baud_rate)?),
            LineCode::Manchester => Box::new(ManchesterEncoder::new(baud_rate)?),
            LineCode::DifferentialManchester => {
                Box::new(DifferentialManchesterEncoder::new(baud_rate)?)
            }
            LineCode::BipolarAmi => Box::new(BipolarAmiEncoder::new(baud_rate)?),
            LineCode::Pseudoternary => Box::new(PseudoternaryEncoder::new(baud_rate)?),
        })
    }

    pub fn decoder(self, baud_rate: f64) -> StageResult<Box<dyn Component>> {
        Ok(match self {
            LineCode::Nrzl => Box::new(NrzlDecoder::new(baud_rate)?),
            LineCode::Nrzi => Box::new(NrziDecoder::new(baud_rate)?),
            LineCode::Manchester => Box::new(ManchesterDecoder::new(baud_rate)?),
            LineCode::DifferentialManchester => {
                Box::new(DifferentialManchesterDecoder::new(baud_rate)?)
            }
            LineCode::BipolarAmi => Box::new(BipolarAmiDecoder::new(baud_rate)?),
            LineCode::Pseudoternary => Box::new(PseudoternaryDecoder::new(baud_rate)?),
        })
    }
}
