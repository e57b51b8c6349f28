//! JSON output for the CLI
//!
//! - Output: single JSON object on stdout
//! - Success: `{"status":"ok","data":...}`
//! - Failure: `{"status":"error","code":...,"message":...}`

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_envelope(&mut io::stdout(), &json!({"status": "ok", "data": data}))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_envelope(
        &mut io::stdout(),
        &json!({"status": "error", "code": code, "message": message}),
    )
}

/// Write one response object followed by a newline
pub fn write_envelope<W: Write>(writer: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_is_one_line() {
        let mut buffer = Vec::new();
        write_envelope(&mut buffer, &json!({"status": "ok", "data": [1, 2]})).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output, "{\"data\":[1,2],\"status\":\"ok\"}\n");
    }
}
