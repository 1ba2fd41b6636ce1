//! Rigport CLI - Command-line interface for Unity rig import

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{bones, hash, inspect, neck_attach, rig, simulate};

#[derive(Parser)]
#[command(name = "rigport")]
#[command(about = "Rebuild armatures and spring-bone physics rigs from Unity object dumps", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize armatures, static meshes and clips in a dump
    Inspect {
        /// Path to the JSON object dump
        dump: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print an armature's bone tree with paths and hashes
    Bones {
        /// Path to the JSON object dump
        dump: String,

        /// Armature name
        #[arg(long)]
        armature: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print the CRC-32 path hash of one or more bone paths
    Hash {
        /// Slash-delimited bone paths
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Emit edit bones and the physics rig of an armature
    Rig {
        /// Path to the JSON object dump
        dump: String,

        /// Armature name
        #[arg(long)]
        armature: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,

        /// Emit edit bones only
        #[arg(long)]
        no_physics: bool,
    },

    /// Instantiate an armature's physics rig in Rapier and step it
    Simulate {
        /// Path to the JSON object dump
        dump: String,

        /// Armature name
        #[arg(long)]
        armature: String,

        /// Number of steps
        #[arg(long, default_value = "60")]
        steps: u32,

        /// Step length in seconds
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
    },

    /// Make a face armature's bone follow a body armature's bone
    NeckAttach {
        /// Path to the JSON object dump
        dump: String,

        /// Face armature name
        #[arg(long)]
        face: String,

        /// Body armature name
        #[arg(long)]
        body: String,

        /// Bone to attach
        #[arg(long, default_value = rigport_physics::DEFAULT_ATTACH_BONE)]
        bone: String,

        /// Output format (toml or json)
        #[arg(long, default_value = "toml")]
        format: String,
    },
}

fn main() -> Result<()> {
    let default = "warn,rigport=info";
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { dump, format } => inspect::run(&dump, &format),
        Commands::Bones {
            dump,
            armature,
            format,
        } => bones::run(&dump, &armature, &format),
        Commands::Hash { paths } => hash::run(&paths),
        Commands::Rig {
            dump,
            armature,
            output,
            format,
            no_physics,
        } => rig::run(rig::RigArgs {
            dump,
            armature,
            output,
            format,
            no_physics,
        }),
        Commands::Simulate {
            dump,
            armature,
            steps,
            dt,
        } => simulate::run(&dump, &armature, steps, dt),
        Commands::NeckAttach {
            dump,
            face,
            body,
            bone,
            format,
        } => neck_attach::run(&dump, &face, &body, &bone, &format),
    }
}
