//! delete command - DELETE a resource

use clap::Args;

use super::{fail, params_from, parse_key_value, ConnectionArgs};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ResponseOutput};

/// DELETE a resource
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Resource path, e.g. "saved/searches/my search"
    pub path: String,

    /// Query argument as key=value (repeatable)
    #[arg(short = 'a', long = "arg", value_parser = parse_key_value)]
    pub args: Vec<(String, String)>,

    /// Include response headers in the output
    #[arg(short, long)]
    pub include: bool,
}

/// Execute the delete command
pub fn execute(args: DeleteArgs, connection: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    match run(&args, connection) {
        Ok(output) => {
            output.print(&formatter, args.include);
            ExitCode::Success
        }
        Err(e) => fail(&formatter, e),
    }
}

fn run(args: &DeleteArgs, connection: &ConnectionArgs) -> anyhow::Result<ResponseOutput> {
    let mut ctx = connection.context()?;
    let response = ctx.delete(&args.path, None, &params_from(&args.args))?;
    Ok(ResponseOutput::read(response)?)
}
