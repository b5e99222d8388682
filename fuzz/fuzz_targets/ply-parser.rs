#![no_main]

use libfuzzer_sys::fuzz_target;
use lox_ply::{Budget, Config, ply::{TriangleHandler, VertexHandler}, parse::buf::SliceReader};

fuzz_target!(|data: &[u8]| {
    // We are only interested in panics or worse, so all errors are ignored.
    // The budget keeps huge element counts from eating all memory.
    let mut ply = Config::new().into_reader(Budget::new(1 << 24), SliceReader::new(data));
    if ply.read_header().is_err() {
        return;
    }

    let mut vertices = VertexHandler::new();
    let mut triangles = TriangleHandler::new();
    let _ = ply.read_data(&mut [&mut vertices, &mut triangles]);
});
