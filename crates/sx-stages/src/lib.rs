//! sx-stages: concrete stages for simplexsim circuits.
//!
//! Provides:
//! - Input generators (digital bit patterns, sine waves, silence)
//! - Digital-to-digital line coders and their decoders
//! - Analog-to-analog modulators (AM, FM, PM) and demodulators
//! - Analog-to-digital encoders (delta modulation, PCM) and decoders
//! - Digital-to-analog keying modulators (ASK, FSK, PSK) and demodulators
//!
//! Every stage implements [`sx_engine::Component`]. Bit decisions treat an
//! input above 0.5 as logic one.

pub mod analog;
pub mod common;
pub mod decoders;
pub mod encoders;
pub mod error;
pub mod generators;
pub mod keying;
pub mod pulse;

pub use analog::{AmDemodulator, AmModulator, FmDemodulator, FmModulator, PmDemodulator, PmModulator};
pub use common::BitClock;
pub use decoders::{
    BipolarAmiDecoder, DifferentialManchesterDecoder, ManchesterDecoder, NrziDecoder,
    NrzlDecoder, PseudoternaryDecoder,
};
pub use encoders::{
    BipolarAmiEncoder, DifferentialManchesterEncoder, ManchesterEncoder, NrziEncoder,
    NrzlEncoder, PseudoternaryEncoder,
};
pub use error::{StageError, StageResult};
pub use generators::{constant, digital_signal, parse_bitstream, silence, sine_wave};
pub use keying::{AskDemodulator, AskModulator, FskDemodulator, FskModulator, PskDemodulator, PskModulator};
pub use pulse::{DeltaDecoder, DeltaEncoder, PcmDecoder, PcmEncoder};
