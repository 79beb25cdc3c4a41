use std::path::PathBuf;

use clap::Parser;
use utils::version;

use crate::metrics::encoders::OutputFormat;

/// Default libvirt URI when neither `--connect` nor `LIBVIRT_DEFAULT_URI` is set.
pub const DEFAULT_URI: &str = "qemu:///system";

/// Print a point-in-time telemetry snapshot of one virtual machine
#[derive(Parser, Debug, Clone)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[arg(help = "Domain UUID to sample")]
    pub target: String,

    #[arg(
        short = 'c',
        long = "connect",
        env = "LIBVIRT_DEFAULT_URI",
        default_value = DEFAULT_URI,
        help = "Hypervisor connection URI, e.g. qemu:///system"
    )]
    pub uri: String,

    #[arg(
        long,
        env = "VIRSH_BIN",
        value_hint = clap::ValueHint::CommandName,
        default_value = "virsh",
        help = "virsh executable used to query the hypervisor"
    )]
    pub virsh: PathBuf,

    #[arg(
        short,
        long,
        value_enum,
        default_value_t = OutputFormat::Console,
        help = "Report output format"
    )]
    pub format: OutputFormat,

    #[arg(
        short,
        long,
        value_hint = clap::ValueHint::FilePath,
        help = "Append the report to this file instead of printing it"
    )]
    pub output: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
}
