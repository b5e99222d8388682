use super::{
    Span, read_line, read_token, trim,
    buf::{LineReader, SliceReader},
    num::{is_decimal, parse_float, parse_signed, parse_unsigned},
};


fn lines(input: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = input;
    while let Some((line, remaining)) = read_line(rest) {
        out.push(line.to_string_lossy());
        rest = remaining;
    }
    out
}

fn tokens(line: &[u8]) -> Vec<String> {
    let mut line = Span::new(line);
    let mut out = Vec::new();
    loop {
        let token = read_token(&mut line);
        if token.is_empty() {
            break;
        }
        out.push(token.to_string_lossy());
    }
    out
}

#[test]
fn line_terminators() {
    assert_eq!(lines(b"a\nb\r\nc\rd"), ["a", "b", "c", "d"]);
    assert_eq!(lines(b"a\r\n\nb\n"), ["a", "", "b"]);
    assert_eq!(lines(b"\n\nx"), ["", "", "x"]);
    assert!(lines(b"").is_empty());
}

#[test]
fn read_line_returns_rest() {
    let (line, rest) = read_line(b"end_header\n\x0a\x0d").unwrap();
    assert_eq!(line, "end_header");
    assert_eq!(rest, b"\x0a\x0d");
}

#[test]
fn tokenizing() {
    assert_eq!(tokens(b"property float x"), ["property", "float", "x"]);
    assert_eq!(tokens(b"  \t element\tvertex   8  "), ["element", "vertex", "8"]);
    assert!(tokens(b"").is_empty());
    assert!(tokens(b" \t ").is_empty());
}

#[test]
fn token_leaves_whitespace() {
    let mut line = Span::new(b"comment   made by hand ");
    assert_eq!(read_token(&mut line), "comment");
    assert_eq!(line.as_bytes(), b"   made by hand ");
    assert_eq!(line.trim().as_bytes(), b"made by hand");
}

#[test]
fn case_insensitive_compare() {
    assert_eq!(Span::new(b"ELEMENT"), "element");
    assert_eq!(Span::new(b"Float32"), Span::new(b"fLOAT32"));
    assert_ne!(Span::new(b"float"), "float32");
    assert_ne!(Span::new(b"int_8"), "int-8");
    assert!(Span::new(b"Alpha") < Span::new(b"beta"));
    assert!(Span::new(b"ab") < Span::new(b"AB_"));
}

#[test]
fn trimming() {
    assert_eq!(trim(b"  x y\t"), b"x y");
    assert_eq!(trim(b" \t "), b"");
    assert_eq!(trim(b""), b"");
}

#[test]
fn unsigned() {
    assert_eq!(parse_unsigned(b"42"), 42);
    assert_eq!(parse_unsigned(b" 7\t"), 7);
    assert_eq!(parse_unsigned(b"0"), 0);
    assert_eq!(parse_unsigned(b""), 0);
    assert_eq!(parse_unsigned(b"18446744073709551615"), u64::max_value());
}

#[test]
fn signed() {
    assert_eq!(parse_signed(b"-7"), -7);
    assert_eq!(parse_signed(b"+12"), 12);
    assert_eq!(parse_signed(b" -128 "), -128);
    assert_eq!(parse_signed(b"300"), 300);
}

#[test]
fn floats() {
    assert_eq!(parse_float::<f32>(b"3.25"), 3.25);
    assert_eq!(parse_float::<f32>(b"5"), 5.0);
    assert_eq!(parse_float::<f32>(b"5."), 5.0);
    assert_eq!(parse_float::<f64>(b"-0.5"), -0.5);
    assert_eq!(parse_float::<f64>(b"+2.125"), 2.125);
    assert_eq!(parse_float::<f64>(b" 0.75 "), 0.75);
    assert_eq!(parse_float::<f64>(b"1.5e2"), 150.0);
    assert_eq!(parse_float::<f64>(b"25E-1"), 2.5);
    assert!((parse_float::<f64>(b"0.1") - 0.1).abs() < 1e-15);
    assert!((parse_float::<f32>(b"152.99") - 152.99).abs() < 1e-4);
}

#[test]
fn float_exponent_out_of_range() {
    // 4294967297 is 2^32 + 1, which would wrap to an exponent of 1.
    assert!(parse_float::<f64>(b"1e4294967297").is_infinite());
    assert!(parse_float::<f64>(b"-1e4294967297").is_infinite());
    assert_eq!(parse_float::<f64>(b"1e-4294967297"), 0.0);
    assert_eq!(parse_float::<f32>(b"2.5e99999999999"), std::f32::INFINITY);
    assert_eq!(parse_float::<f64>(b"0e4294967297"), 0.0);
}

#[test]
fn decimal_check() {
    assert!(is_decimal(b"123"));
    assert!(!is_decimal(b""));
    assert!(!is_decimal(b"12a"));
    assert!(!is_decimal(b"-1"));
}

#[test]
fn slice_reader_lines_and_data() {
    let mut reader = SliceReader::new(&b"ply\r\nend_header\n\x01\x02\x03"[..]);
    assert_eq!(reader.read_line().unwrap(), "ply");
    assert_eq!(reader.read_line().unwrap(), "end_header");
    assert_eq!(reader.read_data(2).unwrap(), &[1u8, 2]);
    assert!(reader.read_data(2).is_none());
    assert_eq!(reader.read_data(1).unwrap(), &[3u8]);
    assert!(reader.is_eof());
    assert!(reader.read_line().is_none());
}
