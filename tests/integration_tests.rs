use speed_calib_tools::config::TruncMeanConfig;
use speed_calib_tools::math::median::MedianFilter;
use speed_calib_tools::math::truncated_mean::Variant;
use speed_calib_tools::output::{render_data_line, render_report};
use speed_calib_tools::setpoints::{Setpoints, format_f16_line};

#[test]
fn test_default_playground_report() {
    let config = TruncMeanConfig::default();

    assert_eq!(
        render_data_line(&config.samples),
        "Data: 2050,2055,2048,2,2051,2058,2050,3000"
    );

    for variant in [Variant::ThreePass, Variant::TwoPass] {
        let report = variant.compute(&config.samples, config.win).unwrap();
        let text = render_report(variant.label(), &report);

        assert!(text.starts_with(variant.label()));
        assert!(text.contains("Mean:   1914\n"));
        assert!(text.contains("Result: 2052\n"));
        assert!(text.contains("Sigma:  787 (allow [1048..2780])\n"));
        assert!(text.contains("Win:    1.1\n"));
        assert!(text.contains("Used:   6 of 8\n"));
    }
}

#[test]
fn test_outliers_excluded_by_every_variant() {
    let config = TruncMeanConfig::default();

    for variant in Variant::ALL {
        let report = variant.compute(&config.samples, config.win).unwrap();
        assert_eq!(report.used, 6, "{}", variant.label());
        assert_eq!(report.result, 2052, "{}", variant.label());
    }
}

#[test]
fn test_config_json_drives_computation() {
    let config = TruncMeanConfig::from_json(r#"{ "samples": [5, 5, 5, 5], "win": 1.5 }"#).unwrap();
    config.validate().unwrap();

    let report = Variant::TwoPass.compute(&config.samples, config.win).unwrap();
    assert_eq!(report.mean, 5);
    assert_eq!(report.result, 5);
    assert_eq!(report.used, 0);
    assert_eq!(report.total, 4);
}

#[test]
fn test_median_and_truncated_mean_agree_roughly() {
    let config = TruncMeanConfig::default();
    let mut filter = MedianFilter::new(32);
    filter.extend(config.samples.iter().copied());

    let report = Variant::ThreePass.compute(&config.samples, config.win).unwrap();
    assert!((filter.result() - report.result).abs() <= 5);
}

#[test]
fn test_setpoint_table_lines() {
    let lines: Vec<String> = Setpoints::new().map(format_f16_line).collect();

    assert_eq!(lines.first().map(String::as_str), Some("F16(0),"));
    assert_eq!(lines.get(1).map(String::as_str), Some("F16(0.015625),"));
    assert_eq!(lines.last().map(String::as_str), Some("F16(1),"));
}

#[test]
fn test_comparison_skips_fixed_point_for_long_runs() {
    use speed_calib_tools::comparison::Comparison;

    let mut samples = TruncMeanConfig::default().samples;
    samples.extend_from_slice(&[2049, 2052, 2053, 2047, 2056, 2054, 2051, 2050, 2048, 2055]);
    assert!(samples.len() > 16);

    let comparison = Comparison::run(&Variant::ALL, &samples, 1.1, true).unwrap();
    assert!(comparison.report(Variant::ThreePass).is_some());
    assert!(comparison.report(Variant::TwoPass).is_some());
    assert!(comparison.report(Variant::FixedPoint).is_none());
    assert_eq!(comparison.skipped.len(), 1);
}

#[test]
fn test_comparison_flags_diverging_routines() {
    use speed_calib_tools::comparison::Comparison;

    let comparison =
        Comparison::run(&[Variant::ThreePass, Variant::TwoPass], &[0, 1], 1.1, false).unwrap();
    assert!(comparison.disagreement().is_some());
}
