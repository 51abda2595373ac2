//! post command - POST to a resource
//!
//! Arguments are form-encoded into the body. With `--body` or `--body-file`
//! the body is sent as given and the arguments move to the query string.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;

use super::{fail, params_from, parse_header, parse_key_value, ConnectionArgs};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ResponseOutput};

/// POST to a resource
#[derive(Args, Debug)]
pub struct PostArgs {
    /// Resource path, e.g. "search/jobs"
    pub path: String,

    /// Form argument as key=value (repeatable)
    #[arg(short = 'a', long = "arg", value_parser = parse_key_value)]
    pub args: Vec<(String, String)>,

    /// Extra header as 'Name: value' (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Literal request body
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the request body from a file ("-" for stdin)
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// Include response headers in the output
    #[arg(short, long)]
    pub include: bool,
}

/// Execute the post command
pub fn execute(args: PostArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    match run(&args, connection) {
        Ok(output) => {
            output.print(&formatter, args.include);
            ExitCode::Success
        }
        Err(e) => fail(&formatter, e),
    }
}

fn run(args: &PostArgs, connection: &ConnectionArgs) -> anyhow::Result<ResponseOutput> {
    let mut params = params_from(&args.args);
    if let Some(body) = read_body(args.body.as_deref(), args.body_file.as_ref())? {
        params = params.body(body);
    }

    let mut ctx = connection.context()?;
    let response = ctx.post(&args.path, None, &args.headers, &params)?;
    Ok(ResponseOutput::read(response)?)
}

/// Body from `--body` text or `--body-file`, if either was given
pub(crate) fn read_body(text: Option<&str>, file: Option<&PathBuf>) -> anyhow::Result<Option<Vec<u8>>> {
    if let Some(text) = text {
        return Ok(Some(text.as_bytes().to_vec()));
    }
    let Some(path) = file else {
        return Ok(None);
    };

    let body = if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::Read::read_to_end(&mut std::io::stdin().lock(), &mut buf)
            .context("cannot read body from stdin")?;
        buf
    } else {
        std::fs::read(path).with_context(|| format!("cannot read body file {}", path.display()))?
    };
    Ok(Some(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_body_from_text() {
        let body = read_body(Some("a=1"), None).unwrap();
        assert_eq!(body.as_deref(), Some(&b"a=1"[..]));
    }

    #[test]
    fn test_read_body_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.log");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let body = read_body(None, Some(&path)).unwrap().unwrap();
        assert_eq!(body, b"line one\nline two\n");
    }

    #[test]
    fn test_read_body_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing");
        assert!(read_body(None, Some(&path)).is_err());
    }

    #[test]
    fn test_no_body() {
        assert!(read_body(None, None).unwrap().is_none());
        // Without a body, arguments stay form arguments.
        let params = params_from(&[("name".to_string(), "x".to_string())]);
        assert!(!params.has_body());
    }
}
