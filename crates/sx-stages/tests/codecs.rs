//! Line coders driven through the engine: encoder -> line -> decoder.

use proptest::prelude::*;
use sx_engine::{Component, Netlist, Simulation, WireId};
use sx_stages::{
    BipolarAmiDecoder, BipolarAmiEncoder, DifferentialManchesterDecoder,
    DifferentialManchesterEncoder, ManchesterDecoder, ManchesterEncoder, NrziDecoder,
    NrziEncoder, NrzlDecoder, NrzlEncoder, PseudoternaryDecoder, PseudoternaryEncoder,
    digital_signal,
};

const BAUD: f64 = 5.0;
const DT: f64 = 1e-3;
const TICKS_PER_BIT: usize = 200;
/// Late in each bit, after every decoder has made its decision.
const PROBE_OFFSET: usize = 190;

type Pair = (Box<dyn Component>, Box<dyn Component>);

fn pair(scheme: &str) -> Pair {
    match scheme {
        "nrz-l" => (
            Box::new(NrzlEncoder::new()),
            Box::new(NrzlDecoder::new(BAUD).unwrap()),
        ),
        "nrz-i" => (
            Box::new(NrziEncoder::new(BAUD).unwrap()),
            Box::new(NrziDecoder::new(BAUD).unwrap()),
        ),
        "manchester" => (
            Box::new(ManchesterEncoder::new(BAUD).unwrap()),
            Box::new(ManchesterDecoder::new(BAUD).unwrap()),
        ),
        "differential-manchester" => (
            Box::new(DifferentialManchesterEncoder::new(BAUD).unwrap()),
            Box::new(DifferentialManchesterDecoder::new(BAUD).unwrap()),
        ),
        "bipolar-ami" => (
            Box::new(BipolarAmiEncoder::new(BAUD).unwrap()),
            Box::new(BipolarAmiDecoder::new(BAUD).unwrap()),
        ),
        "pseudoternary" => (
            Box::new(PseudoternaryEncoder::new(BAUD).unwrap()),
            Box::new(PseudoternaryDecoder::new(BAUD).unwrap()),
        ),
        other => panic!("unknown scheme {other}"),
    }
}

const SCHEMES: [&str; 6] = [
    "nrz-l",
    "nrz-i",
    "manchester",
    "differential-manchester",
    "bipolar-ami",
    "pseudoternary",
];

fn build(scheme: &str, bits: &str) -> (Simulation, WireId) {
    let (encoder, decoder) = pair(scheme);
    let mut net = Netlist::new();
    let input = net.add_wire("Input");
    let line = net.add_wire("Line");
    let output = net.add_wire("Output");
    let enc = net.add_boxed(input, line, encoder).unwrap();
    let dec = net.add_boxed(line, output, decoder).unwrap();

    let signal = digital_signal(bits, BAUD, (0.0, 1.0)).unwrap();
    let mut sim = Simulation::new(net, input, signal, DT).unwrap();
    sim.add_component(enc).unwrap();
    sim.add_component(dec).unwrap();
    sim.reset();
    (sim, output)
}

fn decoded_bits(sim: &mut Simulation, output: WireId, n_bits: usize) -> String {
    for _ in 0..n_bits * TICKS_PER_BIT {
        sim.advance().unwrap();
    }
    let history = sim.wire(output).unwrap().history();
    (0..n_bits)
        .map(|k| {
            if history[k * TICKS_PER_BIT + PROBE_OFFSET] > 0.5 {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}

#[test]
fn every_scheme_round_trips_the_reference_pattern() {
    let bits = "01001100011";
    for scheme in SCHEMES {
        let (mut sim, output) = build(scheme, bits);
        assert_eq!(decoded_bits(&mut sim, output, bits.len()), bits, "{scheme}");
    }
}

#[test]
fn each_tick_settles_in_two_passes() {
    let (mut sim, _) = build("manchester", "10");
    for _ in 0..50 {
        let report = sim.advance().unwrap();
        assert_eq!(report.passes, 2);
        assert_eq!(report.ticks, 2);
    }
}

#[test]
fn reset_replays_identically() {
    let bits = "1101";
    for scheme in SCHEMES {
        let (mut sim, output) = build(scheme, bits);
        let first = decoded_bits(&mut sim, output, bits.len());
        let line_first = sim.wire_by_name("Line").unwrap().history().to_vec();

        sim.reset();
        let second = decoded_bits(&mut sim, output, bits.len());
        let line_second = sim.wire_by_name("Line").unwrap().history().to_vec();

        assert_eq!(first, second, "{scheme}");
        assert_eq!(line_first, line_second, "{scheme}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn random_patterns_round_trip(
        bits in proptest::collection::vec(any::<bool>(), 1..10),
        scheme in prop::sample::select(SCHEMES.to_vec()),
    ) {
        let bits: String = bits.iter().map(|b| if *b { '1' } else { '0' }).collect();
        let (mut sim, output) = build(scheme, &bits);
        prop_assert_eq!(decoded_bits(&mut sim, output, bits.len()), bits);
    }
}
