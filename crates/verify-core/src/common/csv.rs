//! 引用符付き CSV の書き出しと数値の文字列化

use std::io::{self, Write};

pub fn write_csv_row<W: Write>(writer: &mut W, row: &[impl AsRef<str>]) -> io::Result<()> {
    for (idx, value) in row.iter().enumerate() {
        if idx > 0 {
            writer.write_all(b",")?;
        }
        write_csv_value(writer, value.as_ref())?;
    }
    writer.write_all(b"\n")
}

fn write_csv_value<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    let needs_quote = value.contains(',') || value.contains('"') || value.contains('\n');
    if !needs_quote {
        return writer.write_all(value.as_bytes());
    }

    writer.write_all(b"\"")?;
    for ch in value.chars() {
        if ch == '"' {
            writer.write_all(b"\"\"")?;
        } else {
            let mut buf = [0_u8; 4];
            writer.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
        }
    }
    writer.write_all(b"\"")
}

/// 整数値の float も `3.0` のように小数点付きで出す
pub fn fmt_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

pub fn fmt_opt_float(value: Option<f64>) -> String {
    value.map(fmt_float).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        let mut out = Vec::new();
        write_csv_row(&mut out, &["seed", "a,b", "say \"hi\"", ""]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "seed,\"a,b\",\"say \"\"hi\"\"\",\n");
    }

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(fmt_float(3.0), "3.0");
        assert_eq!(fmt_float(0.925), "0.925");
        assert_eq!(fmt_opt_float(None), "");
    }
}
