//! request command - Send a request with any method
//!
//! The path is resolved like the other commands and the session token is
//! added to the given headers; nothing else is added or encoded.

use std::path::PathBuf;

use clap::Args;
use splunkd_core::{Method, Request};

use super::post::read_body;
use super::{fail, parse_header, ConnectionArgs};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ResponseOutput};

/// Send a request with any method, headers and body
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Resource path, e.g. "/services/receivers/simple"
    pub path: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET", value_parser = parse_method)]
    pub method: Method,

    /// Header as 'Name: value' (repeatable)
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

fn parse_method(s: &str) -> Result<Method, String> {
    s.parse().map_err(|e: splunkd_core::Error| e.to_string())
}

/// Execute the request command
pub fn execute(args: RequestArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    match run(&args, connection) {
        Ok(output) => {
            output.print(&formatter, args.include);
            ExitCode::Success
        }
        Err(e) => fail(&formatter, e),
    }
}

fn run(args: &RequestArgs, connection: &ConnectionArgs) -> anyhow::Result<ResponseOutput> {
    let mut request = Request::new(args.method);
    request.headers = args.headers.clone();
    if let Some(body) = read_body(args.body.as_deref(), args.body_file.as_ref())? {
        request = request.body(body);
    }

    let mut ctx = connection.context()?;
    let response = ctx.request(&args.path, None, request)?;
    Ok(ResponseOutput::read(response)?)
}
