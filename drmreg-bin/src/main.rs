//! Command-line interface for drmreg

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use drmreg::layout::LayoutEngine;
use drmreg::verify::{diff_targets, verify_against, ReferenceCodes, Snapshot};
use drmreg::{profiles, AbiTable, IoctlCode, Registry, TargetProfile};
use log::{debug, LevelFilter};

#[derive(Parser)]
#[command(name = "drmreg")]
#[command(version = drmreg::VERSION)]
#[command(about = "Offline lookup and verification of DRM ioctl codes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output verbosity
    #[arg(short, long, value_enum, default_value_t = Verbosity::Normal)]
    verbosity: Verbosity,

    /// Target architecture (defaults to the one this tool was built for)
    #[arg(short, long, global = true, env = "DRMREG_TARGET")]
    target: Option<String>,

    /// ABI table JSON to use instead of the built-in table
    #[arg(long, global = true, env = "DRMREG_TABLE")]
    table: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the request code and details of an ioctl
    Lookup {
        /// Ioctl name without the DRM_IOCTL_ prefix
        name: String,
    },

    /// Identify a raw request code
    Decode {
        /// Code in hex (0x...) or decimal
        code: String,
    },

    /// List a constant group, or explain a mask against it
    Group {
        /// Group name (omit to list all groups)
        name: Option<String>,

        /// Mask or value to decompose into member names
        #[arg(short, long)]
        mask: Option<String>,
    },

    /// Show member offsets of a structure
    Layout {
        /// Structure tag, e.g. drm_mode_crtc
        name: String,
    },

    /// List the built-in target profiles
    Profiles,

    /// Export the computed registry
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write only name -> code, in the reference file format
        #[arg(long)]
        reference: bool,
    },

    /// Compare computed codes with codes captured from kernel headers
    Verify {
        /// Reference file produced from compiled headers
        #[arg(short, long)]
        reference: PathBuf,
    },

    /// Show codes that differ between two targets
    Diff {
        /// Left target
        left: String,
        /// Right target
        right: String,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Verbosity {
    Minimal,
    Normal,
    Detailed,
    Debug,
}

impl Verbosity {
    fn level(self) -> LevelFilter {
        match self {
            Verbosity::Minimal => LevelFilter::Error,
            Verbosity::Normal => LevelFilter::Warn,
            Verbosity::Detailed => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbosity.level())
        .format_timestamp(None)
        .init();

    match &cli.command {
        Commands::Lookup { name } => {
            let registry = build_registry(&cli, cli.target.as_deref())?;
            let name = name.trim_start_matches("DRM_IOCTL_");
            let spec = registry.spec(name)?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(spec)?),
                OutputFormat::Text => {
                    println!("DRM_IOCTL_{} = {}", spec.name, registry.lookup(name)?);
                    println!("  direction:  {}", spec.direction);
                    println!("  number:     {:#04x}", spec.command_number);
                    if let Some(payload) = &spec.payload {
                        println!("  payload:    {} ({} bytes)", payload, spec.payload_size);
                    }
                    if spec.arch_dependent {
                        println!("  size depends on the target architecture");
                    }
                    if spec.deprecated {
                        println!("  deprecated");
                    }
                }
            }
        }

        Commands::Decode { code } => {
            let registry = build_registry(&cli, cli.target.as_deref())?;
            let code: IoctlCode = code.parse()?;
            let fields = registry.profile().ioctl.decode(code);
            match registry.decode(code) {
                Some(spec) => println!("{} = DRM_IOCTL_{}", code, spec.name),
                None => println!("{} is not a known DRM ioctl on {}", code, registry.profile().name),
            }
            if let Some(d) = fields {
                println!(
                    "  dir={} type={:#04x} nr={:#04x} size={}",
                    d.direction, d.ty, d.nr, d.size
                );
            }
        }

        Commands::Group { name: None, .. } => {
            let registry = build_registry(&cli, cli.target.as_deref())?;
            for group in registry.groups() {
                println!("{:<20} {:<9} {} constants", group.name, group.kind, group.constants.len());
            }
        }

        Commands::Group { name: Some(name), mask } => {
            let registry = build_registry(&cli, cli.target.as_deref())?;
            let group = registry.group(name)?;
            match mask {
                Some(mask) => {
                    let mask = parse_number(mask)?;
                    let names = group.decompose(mask);
                    if names.is_empty() {
                        println!("{:#x}: no {} members", mask, group.name);
                    } else {
                        println!("{:#x} = {}", mask, names.join(" | "));
                    }
                }
                None => match cli.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(group)?),
                    OutputFormat::Text => {
                        for (name, value) in group.pairs() {
                            println!("  {:<24} {:#010x} ({})", name, value, value);
                        }
                    }
                },
            }
        }

        Commands::Layout { name } => {
            let profile = resolve_profile(cli.target.as_deref())?;
            let table = load_table(&cli)?;
            let mut engine = LayoutEngine::new(&table.structs, &profile)?;
            let layout = engine.struct_layout(name)?;
            let offsets = engine.field_offsets(name)?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&offsets)?),
                OutputFormat::Text => {
                    println!(
                        "{} on {}: size {}, align {}",
                        name, profile.name, layout.size, layout.align
                    );
                    for field in offsets {
                        println!("  {:>4}  {:<24} {} bytes", field.offset, field.name, field.size);
                    }
                }
            }
        }

        Commands::Profiles => match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&profiles::load_profiles())?)
            }
            OutputFormat::Text => {
                for p in profiles::load_profiles() {
                    println!(
                        "{:<10} ptr={} long={} u64_align={} size_bits={} {}",
                        p.name,
                        p.pointer_width,
                        p.long_width,
                        p.u64_align,
                        p.ioctl.size_bits,
                        p.aliases.join(",")
                    );
                }
            }
        },

        Commands::Export { output, reference } => {
            let registry = build_registry(&cli, cli.target.as_deref())?;
            let json = if *reference {
                ReferenceCodes::from_registry(&registry).to_json()?
            } else {
                Snapshot::from_registry(&registry).to_json()?
            };
            match output {
                Some(path) => {
                    std::fs::write(path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Exported {} to {}", registry.profile().name, path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Verify { reference } => {
            let reference = ReferenceCodes::load(reference)
                .with_context(|| format!("reading {}", reference.display()))?;
            let target = cli.target.as_deref().unwrap_or(&reference.target);
            let registry = build_registry(&cli, Some(target))?;
            let report = verify_against(&registry, &reference)?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => print!("{}", report),
            }
            if !report.is_ok() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Diff { left, right } => {
            let l = build_registry(&cli, Some(left))?;
            let r = build_registry(&cli, Some(right))?;
            let diff = diff_targets(&l, &r);
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
                OutputFormat::Text => print!("{}", diff),
            }
        }

        Commands::Version => {
            println!("drmreg v{}", drmreg::version());
            println!("Built-in table: {}", drmreg::DRM_UAPI_VERSION);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn parse_number(s: &str) -> anyhow::Result<u32> {
    let s = s.trim();
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    value.with_context(|| format!("{:?} is not a number", s))
}

fn resolve_profile(target: Option<&str>) -> anyhow::Result<TargetProfile> {
    let profile = match target {
        Some(name) => profiles::by_name(name)?,
        None => TargetProfile::native()?,
    };
    Ok(profile)
}

fn load_table(cli: &Cli) -> anyhow::Result<AbiTable> {
    match &cli.table {
        Some(path) => {
            debug!("Loading ABI table from {}", path.display());
            AbiTable::from_file(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(AbiTable::builtin()),
    }
}

fn build_registry(cli: &Cli, target: Option<&str>) -> anyhow::Result<Registry> {
    let profile = resolve_profile(target)?;
    let table = load_table(cli)?;
    if table.ioctls.is_empty() {
        bail!("ABI table {} has no ioctls", table.version);
    }
    Ok(Registry::build(&table, profile)?)
}
