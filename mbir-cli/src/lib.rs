//! Shared argument-parsing plumbing for the `mbir-sysmat` and `mbir-recon`
//! binaries.

use clap::error::ErrorKind;
use clap::Parser;

/// Parses `T` from the process arguments, preserving the original tool's
/// "help exits nonzero" behavior instead of clap's default exit-0-on-help.
pub fn parse_args<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let is_help = matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            );
            let _ = err.print();
            std::process::exit(if is_help { 1 } else { err.exit_code() });
        }
    }
}
