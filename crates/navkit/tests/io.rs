use approx::assert_relative_eq;
use nalgebra::Point3;
use navkit::fiducial::ReferenceError;
use navkit::{
    CoupleParams, NavkitConfig, NavkitConfigError, OperationSide, ResolveError, ResolveReport,
};
use std::path::Path;

fn layout_points() -> Vec<Point3<f64>> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(12.5, 3.1, 0.8),
        Point3::new(25.7, -1.9, 2.2),
        Point3::new(6.1, 18.4, -3.5),
        Point3::new(19.3, 21.7, 4.9),
    ]
}

#[test]
fn config_round_trips_through_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("navkit.json");

    let mut cfg = NavkitConfig::new(layout_points());
    cfg.resolver.max_avg_error = 0.5;
    cfg.couple = Some(CoupleParams::for_side(OperationSide::Left));
    cfg.output_path = Some("out.json".to_string());
    cfg.write_json(&path).expect("write");

    let back = NavkitConfig::load_json(&path).expect("load");
    assert_eq!(back, cfg);
    assert_eq!(back.output_path(), Path::new("out.json"));
}

#[test]
fn minimal_config_uses_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("minimal.json");
    std::fs::write(&path, r#"{"reference": [[0,0,0],[3,0,0],[0,4,0],[0,0,5]]}"#).expect("write");

    let cfg = NavkitConfig::load_json(&path).expect("load");
    assert!(cfg.couple.is_none());
    assert!(cfg.build_couple().is_none());
    assert_eq!(cfg.output_path(), Path::new("navkit_resolve_report.json"));

    let resolver = cfg.build_resolver().expect("resolver");
    assert_eq!(resolver.layout().len(), 4);
    assert_eq!(resolver.fingerprints().fingerprint_len(), 3);
    assert_relative_eq!(resolver.params().max_avg_error, 1.0);
}

#[test]
fn invalid_layout_is_a_config_error() {
    let cfg = NavkitConfig::new(layout_points()[..2].to_vec());
    assert!(matches!(
        cfg.build_resolver(),
        Err(NavkitConfigError::Reference(ReferenceError::TooFewMarkers { count: 2, .. }))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = NavkitConfig::load_json(dir.path().join("absent.json")).expect_err("missing");
    assert!(matches!(err, navkit::NavkitIoError::Io(_)));
}

#[test]
fn report_records_errors_and_planning() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("report.json");

    let mut cfg = NavkitConfig::new(layout_points());
    cfg.couple = Some(CoupleParams::for_side(OperationSide::Right));
    let mut report = ResolveReport::new(&cfg, Path::new("cfg.json"), 3);
    report.set_error(ResolveError::NoCandidates {
        scale_guard_tripped: true,
    });

    let mut couple = cfg.build_couple().expect("couple");
    couple.initialize().expect("init");
    report.set_planning(&couple).expect("planning");
    report.write_json(&path).expect("write");

    let back = ResolveReport::load_json(&path).expect("load");
    assert_eq!(back, report);
    assert_eq!(back.num_reference_markers, 5);
    assert!(back.resolved.is_none());
    assert!(back.error.as_deref().is_some_and(|e| e.contains("scale guard")));
    let stand = back.clinical_angles.expect("angles").stand;
    assert!(stand.inclination.abs() > 30.0);
}
