//! Resolve a synthetic fiducial scan and report planning angles.
//!
//! Usage: `resolve_fiducials [config.json]`. Without a config a built-in
//! seven-marker layout and a right-side plan are used.

use std::{env, path::PathBuf};

use nalgebra::{Point3, Vector3};
use navkit::{
    Axis, CoupleParams, NavkitConfig, OperationSide, PelvicTilt, PointCluster, Posture,
    ResolveReport, RigidTransform,
};
#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

const DEMO_LAYOUT: [[f64; 3]; 7] = [
    [0.0, 0.0, 0.0],
    [12.5, 3.1, 0.8],
    [25.7, -1.9, 2.2],
    [6.1, 18.4, -3.5],
    [19.3, 21.7, 4.9],
    [-8.2, 11.6, 6.3],
    [31.4, 14.2, -5.1],
];

fn demo_config() -> NavkitConfig {
    let mut cfg = NavkitConfig::new(
        DEMO_LAYOUT
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect(),
    );
    let mut couple = CoupleParams::for_side(OperationSide::Right);
    couple.pelvic_tilt = PelvicTilt {
        supine: 2.0,
        stand: -5.0,
        sit: 12.0,
    };
    couple.pivots.right = Point3::new(10.0, 20.0, 30.0);
    couple.pivots.left = Point3::new(-60.0, 20.0, 30.0);
    cfg.couple = Some(couple);
    cfg
}

/// Golden-spiral samples on a ball, one per facet.
fn ball(center: Point3<f64>, radius: f64, samples: usize) -> PointCluster {
    let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    let points = (0..samples)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / samples as f64;
            let r = (1.0 - z * z).sqrt();
            let phi = golden * i as f64;
            Point3::new(
                center.x + radius * r * phi.cos(),
                center.y + radius * r * phi.sin(),
                center.z + radius * z,
            )
        })
        .collect();
    PointCluster::from_points(points)
}

/// Markers seen under a known pose, one marker occluded, plus clutter.
fn synthetic_scan(reference: &[Point3<f64>]) -> (RigidTransform, Vec<PointCluster>) {
    let pose = RigidTransform::from_axis_angle_deg(Axis::X, -21.0)
        .pre_rotate(Axis::Z, 33.0)
        .pre_translate(Vector3::new(40.0, -12.0, 7.0));
    let mut clusters: Vec<_> = reference
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != 3)
        .map(|(_, p)| ball(pose.transform_point(p), 1.5, 400))
        .collect();
    clusters.push(ball(Point3::new(140.0, 90.0, -60.0), 1.5, 400));
    clusters.push(ball(Point3::new(60.0, 10.0, 0.0), 1.5, 40));
    (pose, clusters)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let (cfg, config_path) = match env::args().nth(1) {
        Some(path) => (NavkitConfig::load_json(&path)?, PathBuf::from(path)),
        None => (demo_config(), PathBuf::from("<built-in>")),
    };

    let resolver = cfg.build_resolver()?;
    let (truth, clusters) = synthetic_scan(resolver.layout().markers());
    let mut report = ResolveReport::new(&cfg, &config_path, clusters.len());

    match resolver.resolve(&clusters) {
        Ok(resolved) => {
            println!(
                "resolved {}/{} markers, unresolved {:?}, max error {:.4}",
                resolved.resolved_count(),
                resolver.layout().len(),
                resolved.unresolved,
                resolved.max_error()
            );
            let drift = (resolved.transform().inverse() * truth).translation().norm();
            println!("distance from true pose: {drift:.2e}");

            if let Some(mut couple) = cfg.build_couple() {
                couple.set_geometry(resolved.transform());
                report.set_planning(&couple)?;
                let angles = couple.clinical_angles()?;
                for posture in Posture::ALL {
                    let a = angles.get(posture);
                    println!(
                        "{posture:?}: inclination {:.2} deg, version {:.2} deg",
                        a.inclination, a.version
                    );
                }
            }
            report.set_resolution(resolved);
        }
        Err(err) => {
            eprintln!("resolution failed: {err}");
            report.set_error(err);
        }
    }

    let output_path = cfg.output_path();
    report.write_json(&output_path)?;
    println!("wrote report to {}", output_path.display());
    Ok(())
}

fn init_logging() {
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init();
        navkit::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = navkit::core::init_with_level(log::LevelFilter::Info);
    }
}
