//! Builds a small masonry stack on a support slab, identifies its contact
//! interfaces and prints them.
//!
//! Usage:
//! ```text
//! cargo run --example stack                      # default logging
//! RUST_LOG=rbe=trace cargo run --example stack   # one line per interface
//! cargo run --example stack -- out.json          # also write the assembly
//! ```

use rbe::assembly::{Assembly, Block};
use rbe::math::Point3;
use rbe::operations::{IdentifyInterfaces, InterfaceParams};
use rbe::Result;

fn brick(x: f64, z: f64) -> Result<Block> {
    Block::from_box(Point3::new(x, 0.0, z), Point3::new(x + 2.0, 1.0, z + 1.0))
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for rbe.
    // Override with RUST_LOG env var (e.g. RUST_LOG=rbe=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("rbe=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut assembly = Assembly::new();
    let ground = assembly.add_support(Block::from_box(
        Point3::new(-1.0, -0.5, -1.0),
        Point3::new(7.0, 1.5, 0.0),
    )?);
    assembly.set_name(ground, "ground")?;

    // Running bond: three courses, every other one offset by half a brick.
    for course in 0..3 {
        let z = f64::from(course);
        let offset = if course % 2 == 0 { 0.0 } else { 1.0 };
        for i in 0..3 {
            let key = assembly.add_block(brick(offset + 2.0 * f64::from(i), z)?);
            assembly.set_name(key, format!("C{course}B{i}"))?;
        }
    }

    let params = InterfaceParams::default().with_nmax(8);
    let report = IdentifyInterfaces::new(params).execute(&mut assembly)?;
    println!(
        "{} blocks, {} interfaces ({} face pairs tested, {} faces skipped)",
        assembly.block_count(),
        report.interfaces_created,
        report.face_pairs_tested,
        report.skipped.len()
    );

    let name = |key| {
        assembly
            .node(key)
            .ok()
            .and_then(|node| node.name.clone())
            .unwrap_or_else(|| format!("{key:?}"))
    };
    for (_, edge) in assembly.interfaces() {
        let interface = &edge.interface;
        println!(
            "{:>6} -> {:<6} area {:.3}  normal [{:+.2}, {:+.2}, {:+.2}]  {} points",
            name(edge.from),
            name(edge.to),
            interface.size,
            interface.normal().x,
            interface.normal().y,
            interface.normal().z,
            interface.points.len()
        );
    }

    if let Some(path) = std::env::args().nth(1) {
        rbe::io::write_json(&assembly, &path)?;
        println!("wrote {path}");
    }
    Ok(())
}
