//! get command - GET a resource
//!
//! Relative paths are qualified with the session's namespace; absolute
//! paths (starting with `/`) are used as given.

use clap::Args;

use super::{fail, params_from, parse_key_value, ConnectionArgs};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ResponseOutput};

/// GET a resource
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Resource path, e.g. "saved/searches" or "/services/server/info"
    pub path: String,

    /// Query argument as key=value (repeatable)
    #[arg(short = 'a', long = "arg", value_parser = parse_key_value)]
    pub args: Vec<(String, String)>,

    /// Include response headers in the output
    #[arg(short, long)]
    pub include: bool,
}

/// Execute the get command
pub fn execute(args: GetArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    match run(&args, connection) {
        Ok(output) => {
            output.print(&formatter, args.include);
            ExitCode::Success
        }
        Err(e) => fail(&formatter, e),
    }
}

fn run(args: &GetArgs, connection: &ConnectionArgs) -> anyhow::Result<ResponseOutput> {
    let mut ctx = connection.context()?;
    let response = ctx.get(&args.path, None, &params_from(&args.args))?;
    Ok(ResponseOutput::read(response)?)
}
