use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug, Default)]
#[command(
    name = "eshowkw",
    version,
    about = "Display keywords for specified package or for package that is in pwd."
)]
pub struct Cli {
    #[arg(help = "Packages to check")]
    pub packages: Vec<String>,
    #[arg(
        short = 'a',
        long = "arch",
        value_delimiter = ',',
        help = "Display only specified arch(s), comma separated"
    )]
    pub arch: Vec<String>,
    #[arg(
        short = 'A',
        long,
        value_enum,
        help = "Specify alignment for descriptions [default: bottom]"
    )]
    pub align: Option<Align>,
    #[arg(
        short = 'T',
        long = "top-position",
        value_enum,
        help = "Specify which fields we want to have in top listing [default: archlist]"
    )]
    pub top_position: Option<Topper>,
    #[arg(
        short = 'B',
        long,
        help = "Print out each other column in bold for easier visual separation"
    )]
    pub bold: bool,
    #[arg(short = 'C', long, help = "Force colored output")]
    pub color: bool,
    #[arg(short = 'O', long, help = "Search also overlays")]
    pub overlays: bool,
    #[arg(short = 'P', long, help = "Display prefix keywords in output")]
    pub prefix: bool,
    #[arg(
        short = 'S',
        long = "ignore-slot",
        help = "Treat slots as irrelevant during detection of redundant packages"
    )]
    pub ignore_slot: bool,
    #[arg(long, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        help = "Fail when no package is given instead of inspecting the current directory"
    )]
    pub require_package: bool,
}

/// Alignment of labels. After rotation `top` and `bottom` read literally; for
/// plain row labels they mean left and right justification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Top,
    #[default]
    Bottom,
}

/// Axis printed as rotated column headers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Topper {
    #[default]
    Archlist,
    Versionlist,
}
