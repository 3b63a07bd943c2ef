use crate::sampler::{sample, ChannelConfig, TouchBus};
use crate::MEDIAN_SAMPLES;

/// Middle value of five readings
pub fn median5(mut readings: [u16; MEDIAN_SAMPLES]) -> u16 {
    readings.sort_unstable();
    readings[MEDIAN_SAMPLES / 2]
}

/// Measure the untouched level of a channel.
///
/// Takes `MEDIAN_SAMPLES` readings of `measures` cycles each and returns their
/// median. `yield_now` is called after every reading so that a long
/// calibration doesn't hold off other work (watchdog, serial, ...).
pub fn calibrate<B, Y>(bus: &mut B, channel: &ChannelConfig, measures: u16, mut yield_now: Y) -> u16
where
    B: TouchBus,
    Y: FnMut(),
{
    let mut readings = [0u16; MEDIAN_SAMPLES];

    for reading in readings.iter_mut() {
        *reading = sample(bus, channel, measures);
        yield_now();
    }

    median5(readings)
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::sampler::test::ScriptBus;
    use crate::sampler::Polarity;

    #[test]
    fn test_median_any_order() {
        assert_eq!(median5([1, 2, 3, 4, 5]), 3);
        assert_eq!(median5([5, 4, 3, 2, 1]), 3);
        assert_eq!(median5([9, 1, 7, 3, 5]), 5);
        assert_eq!(median5([100, 100, 2, 100, 1]), 100);
        assert_eq!(median5([4, 4, 4, 4, 4]), 4);
        assert_eq!(median5([0, u16::MAX, 0, u16::MAX, 7]), 7);
    }

    #[test]
    fn test_median_all_permutations() {
        // Every ordering of five distinct values
        let values = [10u16, 20, 30, 40, 50];
        let mut count = 0;
        for a in 0..5 {
            for b in 0..5 {
                for c in 0..5 {
                    for d in 0..5 {
                        for e in 0..5 {
                            let idx = [a, b, c, d, e];
                            let mut seen = [false; 5];
                            idx.iter().for_each(|&i| seen[i] = true);
                            if !seen.iter().all(|s| *s) {
                                continue;
                            }
                            let input = [values[a], values[b], values[c], values[d], values[e]];
                            assert_eq!(median5(input), 30, "input {:?}", input);
                            count += 1;
                        }
                    }
                }
            }
        }
        assert_eq!(count, 120);
    }

    #[test]
    fn test_calibrate_rejects_outliers() {
        let ch = ChannelConfig::new(2, 0, Polarity::Normal);
        // One cycle per reading, with two spikes among the five
        let mut bus = ScriptBus::new(2, &[100, 3000, 102, 98, 0]);
        let mut yields = 0;
        let baseline = calibrate(&mut bus, &ch, 1, || yields += 1);
        assert_eq!(baseline, 100);
        assert_eq!(yields, 5);
        assert!(bus.readings.is_empty());
    }
}
