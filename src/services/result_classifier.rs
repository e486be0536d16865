use crate::models::evaluation::Score;
use crate::models::view::ScoreBand;

const GREEN_THRESHOLD: f64 = 0.8;
const ORANGE_THRESHOLD: f64 = 0.6;

/// Maps a score to its display band. Each band includes its lower bound.
pub fn color_band(score: Score) -> ScoreBand {
    let value = score.value();
    if value >= GREEN_THRESHOLD {
        ScoreBand::Green
    } else if value >= ORANGE_THRESHOLD {
        ScoreBand::Orange
    } else {
        ScoreBand::Red
    }
}

/// Score as a percentage rounded to one decimal place, e.g. `0.85` -> `85.0`.
/// Ties round away from zero, so `0.8125` -> `81.3`.
pub fn percent_value(score: Score) -> f64 {
    (score.value() * 1000.0).round() / 10.0
}

/// Score as a one-decimal percentage label, e.g. `0.85` -> `"85.0%"`.
/// Always agrees with [`percent_value`].
pub fn format_percent(score: Score) -> String {
    format!("{:.1}%", percent_value(score))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(value: f64) -> Score {
        Score::new(value).expect("score in range")
    }

    fn parse_label(label: &str) -> f64 {
        label
            .trim_end_matches('%')
            .parse()
            .expect("numeric percent label")
    }

    #[test]
    fn band_boundaries_are_inclusive_on_the_lower_bound() {
        assert_eq!(color_band(score(1.0)), ScoreBand::Green);
        assert_eq!(color_band(score(0.8)), ScoreBand::Green);
        assert_eq!(color_band(score(0.799_999)), ScoreBand::Orange);
        assert_eq!(color_band(score(0.6)), ScoreBand::Orange);
        assert_eq!(color_band(score(0.599_999)), ScoreBand::Red);
        assert_eq!(color_band(score(0.0)), ScoreBand::Red);
    }

    #[test]
    fn bands_partition_the_unit_interval() {
        for step in 0..=1000 {
            let value = f64::from(step) / 1000.0;
            let band = color_band(score(value));
            let expected = if value >= 0.8 {
                ScoreBand::Green
            } else if value >= 0.6 {
                ScoreBand::Orange
            } else {
                ScoreBand::Red
            };
            assert_eq!(band, expected, "score {value:?}");
        }
    }

    #[test]
    fn formats_one_decimal_percent() {
        assert_eq!(format_percent(score(0.85)), "85.0%");
        assert_eq!(format_percent(score(0.0)), "0.0%");
        assert_eq!(format_percent(score(1.0)), "100.0%");
        assert_eq!(format_percent(score(0.7349)), "73.5%");
        assert_eq!(format_percent(score(0.6)), "60.0%");
    }

    #[test]
    fn formatting_is_stable_and_monotonic() {
        let mut previous = f64::NEG_INFINITY;
        for step in 0..=2000 {
            let value = score(f64::from(step) / 2000.0);
            let label = format_percent(value);
            assert_eq!(label, format_percent(value));

            let numeric = parse_label(&label);
            assert!(numeric >= previous, "{label} after {previous}");
            previous = numeric;
        }
    }

    #[test]
    fn percent_value_matches_label() {
        for step in 0..=10_000 {
            let value = score(f64::from(step) / 10_000.0);
            assert_eq!(percent_value(value), parse_label(&format_percent(value)), "score {value:?}");
        }
    }

    #[test]
    fn half_tenths_round_up() {
        assert_eq!(format_percent(score(0.8125)), "81.3%");
        assert_eq!(percent_value(score(0.8125)), 81.3);
        assert_eq!(format_percent(score(0.0625)), "6.3%");
        assert_eq!(percent_value(score(0.0625)), 6.3);
        assert_eq!(format_percent(score(0.3125)), "31.3%");
        assert_eq!(percent_value(score(0.3125)), 31.3);
        assert_eq!(format_percent(score(0.0005)), "0.1%");
    }
}
