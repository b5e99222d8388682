//! Measures PLY read (parse and decode) speeds.

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use criterion::{criterion_group, criterion_main, black_box, Criterion};

use lox_ply::{
    Error, Ply,
    ply::{ElementLayout, Handler, Record, TriangleHandler, VertexHandler},
};


// ===============================================================================================
// ===== Helper utilities
// ===============================================================================================

/// Number of vertices along one side of the generated grid.
const GRID_SIZE: u32 = 100;

/// A handler that claims every element and puts all records into the
/// `black_box`.
struct NullHandler;

impl Handler for NullHandler {
    fn setup(&mut self, layout: &ElementLayout) -> bool {
        black_box(layout);
        true
    }

    fn read(&mut self, record: &Record<'_>) -> Result<(), Error> {
        black_box(record.bytes());
        Ok(())
    }
}

fn header(format: &str) -> String {
    format!(
        "ply\nformat {} 1.0\ncomment generated grid\nelement vertex {}\n\
            property float x\nproperty float y\nproperty float z\nproperty uchar red\n\
            element face {}\nproperty list uchar uint vertex_indices\nend_header\n",
        format,
        GRID_SIZE * GRID_SIZE,
        (GRID_SIZE - 1) * (GRID_SIZE - 1) * 2,
    )
}

fn grid_triangles() -> impl Iterator<Item = [u32; 3]> {
    (0..GRID_SIZE - 1).flat_map(|y| (0..GRID_SIZE - 1).flat_map(move |x| {
        let i = y * GRID_SIZE + x;
        vec![[i, i + 1, i + GRID_SIZE], [i + 1, i + GRID_SIZE + 1, i + GRID_SIZE]]
    }))
}

fn grid_positions() -> impl Iterator<Item = [f32; 3]> {
    (0..GRID_SIZE * GRID_SIZE).map(|i| {
        let x = (i % GRID_SIZE) as f32 * 0.25;
        let y = (i / GRID_SIZE) as f32 * 0.25;
        [x, y, (x * y).sin()]
    })
}

fn grid_ascii() -> Vec<u8> {
    let mut out = header("ascii");
    for [x, y, z] in grid_positions() {
        out += &format!("{} {} {} 7\n", x, y, z);
    }
    for [a, b, c] in grid_triangles() {
        out += &format!("3 {} {} {}\n", a, b, c);
    }

    out.into_bytes()
}

fn grid_binary<B: ByteOrder>(format: &str) -> Vec<u8> {
    let mut out = header(format).into_bytes();
    for p in grid_positions() {
        for &v in &p {
            out.write_f32::<B>(v).unwrap();
        }
        out.write_u8(7).unwrap();
    }
    for t in grid_triangles() {
        out.write_u8(3).unwrap();
        for &i in &t {
            out.write_u32::<B>(i).unwrap();
        }
    }

    out
}

fn grid(encoding: &str) -> Vec<u8> {
    match encoding {
        "ble" => grid_binary::<LittleEndian>("binary_little_endian"),
        "bbe" => grid_binary::<BigEndian>("binary_big_endian"),
        "ascii" => grid_ascii(),
        _ => unreachable!(),
    }
}


// ===============================================================================================
// ===== Benchmarks
// ===============================================================================================

/// Measures header parsing only.
fn grid_header(c: &mut Criterion) {
    let data = grid("ascii");
    c.bench_function("ply_grid_header", move |b| {
        b.iter(|| {
            let mut ply = Ply::from_bytes(&data);
            black_box(ply.read_header().map(|h| h.elements.len()))
        })
    });
}

/// Measures decoding the whole body without any interpretation.
fn grid_raw(c: &mut Criterion) {
    c.bench_function_over_inputs(
        "ply_grid_raw",
        |b, encoding| {
            let data = grid(encoding);
            b.iter(|| {
                let mut ply = Ply::from_bytes(&data);
                ply.read_header().unwrap();
                ply.read_data(&mut [&mut NullHandler]).unwrap();
            })
        },
        vec!["ble", "bbe", "ascii"],
    );
}

/// Measures reading positions and triangles with the built-in handlers.
fn grid_mesh(c: &mut Criterion) {
    c.bench_function_over_inputs(
        "ply_grid_mesh",
        |b, encoding| {
            let data = grid(encoding);
            b.iter(|| {
                let mut ply = Ply::from_bytes(&data);
                ply.read_header().unwrap();
                ply.set_ignore_property("vertex", "red").unwrap();

                let mut vertices = VertexHandler::new();
                let mut triangles = TriangleHandler::new();
                ply.read_data(&mut [&mut vertices, &mut triangles]).unwrap();
                black_box((vertices.into_positions(), triangles.into_triangles()))
            })
        },
        vec!["ble", "bbe", "ascii"],
    );
}


criterion_group!(benches, grid_header, grid_raw, grid_mesh);
criterion_main!(benches);
