use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use pvr_core::config::{default_config_path, ContextPriorityConfig, PvrConfig};
use pvr_winsys::{
    SyncFlags, TransferCmd, TransferCmdFlags, TransferContext, TransferContextCreateInfo,
    TransferSubmitInfo, Winsys,
};

#[derive(Parser)]
#[command(name = "pvrsync")]
#[command(about = "pvrsync - PowerVR transfer-job submission with syncobj chaining")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for ContextPriorityConfig {
    fn from(p: PriorityArg) -> Self {
        match p {
            PriorityArg::Low => ContextPriorityConfig::Low,
            PriorityArg::Medium => ContextPriorityConfig::Medium,
            PriorityArg::High => ContextPriorityConfig::High,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration and open the render node
    Info {
        /// Render node to open (overrides the config file)
        #[arg(short, long)]
        render_node: Option<String>,
    },

    /// Submit a firmware transfer stream, chaining each job on the previous one's signal
    Submit {
        /// File holding the firmware command stream
        #[arg(short, long)]
        stream: String,

        /// Number of chained submissions
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,

        /// Restrict execution to a single core
        #[arg(long)]
        single_core: bool,

        /// Context priority (overrides the config file)
        #[arg(short, long, value_enum)]
        priority: Option<PriorityArg>,

        /// Render node to open (overrides the config file)
        #[arg(short, long)]
        render_node: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    pvr_common::init_logging();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = PvrConfig::load_or_default(&config_path);

    match cli.command {
        Commands::Info { render_node } => {
            if let Some(node) = render_node {
                config.device.render_node = node;
            }

            println!("platform:     {}", pvr_common::platform::platform_name());
            println!("config:       {}", config_path);
            println!("render node:  {}", config.device.render_node);
            println!("priority:     {:?}", config.transfer.priority);
            println!("single core:  {}", config.transfer.single_core);
            println!("wait timeout: {} ms", config.sync.wait_timeout_ms);

            let winsys = Winsys::open(&config.device)
                .with_context(|| format!("opening {}", config.device.render_node))?;
            println!("vm context:   {}", winsys.vm_context());
        }

        Commands::Submit {
            stream,
            count,
            single_core,
            priority,
            render_node,
        } => {
            if let Some(node) = render_node {
                config.device.render_node = node;
            }
            if let Some(p) = priority {
                config.transfer.priority = p.into();
            }
            config.transfer.single_core |= single_core;

            let fw_stream = std::fs::read(&stream).with_context(|| format!("reading {}", stream))?;
            anyhow::ensure!(!fw_stream.is_empty(), "{} is empty", stream);

            run_submit(&config, &fw_stream, count)?;
        }
    }

    Ok(())
}

/// Submit `count` copies of `fw_stream`, each waiting on the previous job's signal,
/// then block on the last signal.
fn run_submit(config: &PvrConfig, fw_stream: &[u8], count: u32) -> anyhow::Result<()> {
    let winsys = Winsys::open(&config.device)
        .with_context(|| format!("opening {}", config.device.render_node))?;

    let ctx = TransferContext::create(
        &winsys,
        &TransferContextCreateInfo {
            priority: config.transfer.priority.into(),
        },
    )?;

    let flags = if config.transfer.single_core {
        TransferCmdFlags::USE_SINGLE_CORE
    } else {
        TransferCmdFlags::empty()
    };
    let cmds = [TransferCmd { fw_stream, flags }];

    let mut previous = None;
    for i in 0..count {
        let signal_id = winsys.create_sync(SyncFlags::empty())?;
        let signal = winsys
            .sync(signal_id)
            .context("sync object vanished after creation")?;
        let wait = previous.and_then(|id| winsys.sync(id));

        ctx.submit(
            &TransferSubmitInfo {
                cmds: &cmds,
                wait: wait.as_ref(),
            },
            Some(&signal),
        )
        .with_context(|| format!("submission {} of {}", i + 1, count))?;

        if let Some(id) = previous.replace(signal_id) {
            winsys.destroy_sync(id)?;
        }
    }

    if let Some(last) = previous {
        winsys.wait_syncs(&[last], Duration::from_millis(config.sync.wait_timeout_ms))?;
        winsys.destroy_sync(last)?;
    }
    info!("{} transfer job(s) completed on {}", count, ctx.handle());

    ctx.destroy()?;
    Ok(())
}
