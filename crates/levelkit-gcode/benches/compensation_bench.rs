use criterion::{black_box, criterion_group, criterion_main, Criterion};
use levelkit_core::Point3;
use levelkit_gcode::{CompensationOptions, Compensator};
use levelkit_heightmap::{HeightGrid, HeightPoint};
use std::fmt::Write;

fn height_grid(size: usize, spacing: f64) -> HeightGrid {
    let rows = (0..size)
        .map(|r| {
            (0..size)
                .map(|c| {
                    let (x, y) = (c as f64 * spacing, r as f64 * spacing);
                    HeightPoint::new(x, y, (x * 0.013).sin() * 0.2 + y * 0.001)
                })
                .collect()
        })
        .collect();
    HeightGrid::from_rows(rows).expect("rectangular grid")
}

fn zigzag_program(passes: usize, width: f64) -> String {
    let mut program = String::from("G21\nG90\nG0 Z3\n");
    for pass in 0..passes {
        let y = pass as f64 * 2.0;
        let x = if pass % 2 == 0 { width } else { 0.0 };
        let _ = writeln!(program, "G1 X{:.3} Y{:.3} Z-0.5 F600", x, y);
    }
    program
}

fn bench_compensation(c: &mut Criterion) {
    let grid = height_grid(10, 20.0);
    let compensator = Compensator::new(&grid, 20.0, Point3::default()).expect("enough samples");
    let program = zigzag_program(90, 180.0);
    let options = CompensationOptions::default();

    c.bench_function("compensate_zigzag_90_passes", |b| {
        b.iter(|| {
            compensator
                .apply(black_box(&program), &options)
                .expect("compensation")
        })
    });
}

criterion_group!(benches, bench_compensation);
criterion_main!(benches);
